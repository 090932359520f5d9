use crate::ext::ExtendVector2;
use nalgebra::{Point2, Vector2};

/// A 2D line segment on the ground plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment2 {
    pub start: Point2<f32>,
    pub end: Point2<f32>,
}

impl Segment2 {
    pub fn new(start: Point2<f32>, end: Point2<f32>) -> Self {
        Self { start, end }
    }

    pub fn direction(&self) -> Vector2<f32> {
        self.end - self.start
    }

    pub fn length(&self) -> f32 {
        self.direction().norm()
    }

    /// The point on the segment closest to `p`.
    pub fn closest_point(&self, p: Point2<f32>) -> Point2<f32> {
        let dir = self.direction();
        let len_sq = dir.norm_squared();
        if len_sq == 0.0 {
            return self.start;
        }
        let t = ((p - self.start).dot(&dir) / len_sq).max(0.0).min(1.0);
        self.start + dir * t
    }

    pub fn distance_to(&self, p: Point2<f32>) -> f32 {
        (self.closest_point(p) - p).norm()
    }

    /// Positive if `p` is left of the segment (looking from start to end),
    /// negative if right, zero on the line.
    pub fn side_of(&self, p: Point2<f32>) -> f32 {
        side_of_line(self.start, self.end, p)
    }
}

/// Positive if `p` is left of the line through `a` and `b`.
pub fn side_of_line(a: Point2<f32>, b: Point2<f32>, p: Point2<f32>) -> f32 {
    (b - a).perp(&(p - a))
}

/// A circle on the ground plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Circle {
    pub center: Point2<f32>,
    pub radius: f32,
}

/// The circle that passes through `start` with `tangent` as its tangent there,
/// and also passes through `end`.
///
/// Returns `None` if `end` lies (almost) on the tangent line, in which case the
/// "circle" is a straight line.
pub fn circle_through_tangent(
    start: Point2<f32>,
    tangent: Vector2<f32>,
    end: Point2<f32>,
) -> Option<Circle> {
    let to_end = end - start;
    // Unit normal pointing towards the side `end` is on.
    let mut normal = -tangent.right();
    let mut offset = normal.dot(&to_end);
    if offset < 0.0 {
        normal = -normal;
        offset = -offset;
    }
    if offset < 1e-4 || !offset.is_finite() {
        return None;
    }
    // |start + n*r - end| = r  =>  r = |to_end|^2 / (2 n.to_end)
    let radius = to_end.norm_squared() / (2.0 * offset);
    Some(Circle {
        center: start + normal * radius,
        radius,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn closest_point_is_clamped() {
        let s = Segment2::new(Point2::new(0.0, 0.0), Point2::new(0.0, 10.0));
        assert_eq!(s.closest_point(Point2::new(3.0, 5.0)), Point2::new(0.0, 5.0));
        assert_eq!(s.closest_point(Point2::new(3.0, -5.0)), Point2::new(0.0, 0.0));
        assert_abs_diff_eq!(s.distance_to(Point2::new(0.0, 14.0)), 4.0);
    }

    #[test]
    fn side_of_line_sign() {
        let s = Segment2::new(Point2::new(0.0, 0.0), Point2::new(0.0, 10.0));
        assert!(s.side_of(Point2::new(-1.0, 5.0)) > 0.0);
        assert!(s.side_of(Point2::new(1.0, 5.0)) < 0.0);
    }

    #[test]
    fn quarter_circle() {
        // Driving north from the origin and ending up at (10, 10): a right hand
        // turn around (10, 0).
        let circle = circle_through_tangent(
            Point2::new(0.0, 0.0),
            Vector2::new(0.0, 1.0),
            Point2::new(10.0, 10.0),
        )
        .unwrap();
        assert_abs_diff_eq!(circle.radius, 10.0, epsilon = 1e-4);
        assert_abs_diff_eq!(circle.center, Point2::new(10.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn straight_has_no_circle() {
        let circle = circle_through_tangent(
            Point2::new(0.0, 0.0),
            Vector2::new(0.0, 1.0),
            Point2::new(0.0, 50.0),
        );
        assert!(circle.is_none());
    }
}
