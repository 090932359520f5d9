use nalgebra::{Point2, Point3, Vector2, Vector3};
use std::f32::consts::PI;

pub trait ExtendF32 {
    /// Wrap an angle into `(-PI, PI]`.
    fn normalize_angle(self) -> Self;
}

impl ExtendF32 for f32 {
    fn normalize_angle(self) -> Self {
        if !self.is_finite() {
            return self;
        }
        let mut result = self % (2.0 * PI);
        if result > PI {
            result -= 2.0 * PI;
        } else if result <= -PI {
            result += 2.0 * PI;
        }
        result
    }
}

pub trait ExtendPoint3 {
    fn to_2d(&self) -> Point2<f32>;
}

impl ExtendPoint3 for Point3<f32> {
    fn to_2d(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }
}

pub trait ExtendPoint2 {
    fn to_3d(&self, z: f32) -> Point3<f32>;
}

impl ExtendPoint2 for Point2<f32> {
    fn to_3d(&self, z: f32) -> Point3<f32> {
        Point3::new(self.x, self.y, z)
    }
}

pub trait ExtendVector3 {
    fn to_2d(&self) -> Vector2<f32>;
}

impl ExtendVector3 for Vector3<f32> {
    fn to_2d(&self) -> Vector2<f32> {
        Vector2::new(self.x, self.y)
    }
}

pub trait ExtendVector2 {
    fn to_3d(&self, z: f32) -> Vector3<f32>;
    /// Counter-clockwise angle from the +X axis.
    fn bearing(&self) -> f32;
    /// The unit vector 90 degrees clockwise, i.e. to the right of `self` when
    /// looking down on the ground plane.
    fn right(&self) -> Vector2<f32>;
    /// Signed angle from `self` to `other`, positive counter-clockwise.
    fn signed_angle_to(&self, other: &Vector2<f32>) -> f32;
}

impl ExtendVector2 for Vector2<f32> {
    fn to_3d(&self, z: f32) -> Vector3<f32> {
        Vector3::new(self.x, self.y, z)
    }

    fn bearing(&self) -> f32 {
        self.y.atan2(self.x)
    }

    fn right(&self) -> Vector2<f32> {
        let norm = self.norm();
        if norm == 0.0 {
            return Vector2::zeros();
        }
        Vector2::new(self.y, -self.x) / norm
    }

    fn signed_angle_to(&self, other: &Vector2<f32>) -> f32 {
        self.perp(other).atan2(self.dot(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn normalize_angle_wraps() {
        assert_abs_diff_eq!((3.0 * PI).normalize_angle(), PI, epsilon = 1e-5);
        assert_abs_diff_eq!((-1.5 * PI).normalize_angle(), 0.5 * PI, epsilon = 1e-5);
        assert_abs_diff_eq!(0.25_f32.normalize_angle(), 0.25);
    }

    #[test]
    fn right_is_clockwise() {
        let forward = Vector2::new(0.0, 2.0);
        assert_abs_diff_eq!(forward.right(), Vector2::new(1.0, 0.0));
    }

    #[test]
    fn signed_angle_sign() {
        let forward = Vector2::new(0.0, 1.0);
        assert!(forward.signed_angle_to(&Vector2::new(-1.0, 1.0)) > 0.0);
        assert!(forward.signed_angle_to(&Vector2::new(1.0, 1.0)) < 0.0);
    }
}
