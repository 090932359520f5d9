use common::{
    consts::{QUAD_MAX_HEIGHT_ABOVE, QUAD_MAX_HEIGHT_BELOW},
    geometry::side_of_line,
    prelude::*,
};
use nalgebra::Point3;

/// The four corners of one road slice: lower-left, lower-right, upper-right,
/// upper-left. Karts drive from the lower edge to the upper edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Quad {
    corners: [Point3<f32>; 4],
    min_height: f32,
    max_height: f32,
}

impl Quad {
    pub fn new(
        lower_left: Point3<f32>,
        lower_right: Point3<f32>,
        upper_right: Point3<f32>,
        upper_left: Point3<f32>,
    ) -> Self {
        let corners = [lower_left, lower_right, upper_right, upper_left];
        let min_height = corners.iter().map(|p| p.z).fold(f32::INFINITY, f32::min);
        let max_height = corners.iter().map(|p| p.z).fold(f32::NEG_INFINITY, f32::max);
        Self {
            corners,
            min_height,
            max_height,
        }
    }

    pub fn corners(&self) -> &[Point3<f32>; 4] {
        &self.corners
    }

    pub fn lower_center(&self) -> Point3<f32> {
        nalgebra::center(&self.corners[0], &self.corners[1])
    }

    pub fn upper_center(&self) -> Point3<f32> {
        nalgebra::center(&self.corners[3], &self.corners[2])
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.lower_center(), &self.upper_center())
    }

    /// Mean of the lower and upper edge lengths.
    pub fn width(&self) -> f32 {
        let lower = (self.corners[1].to_2d() - self.corners[0].to_2d()).norm();
        let upper = (self.corners[2].to_2d() - self.corners[3].to_2d()).norm();
        (lower + upper) * 0.5
    }

    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    /// Whether `p` is on this quad.
    ///
    /// The upper edge is excluded, so a point exactly on the edge shared by
    /// two consecutive quads belongs to only the later one.
    pub fn contains(&self, p: &Point3<f32>) -> bool {
        if p.z - self.max_height > QUAD_MAX_HEIGHT_ABOVE
            || p.z - self.min_height < -QUAD_MAX_HEIGHT_BELOW
        {
            return false;
        }

        let [p0, p1, p2, p3] = [
            self.corners[0].to_2d(),
            self.corners[1].to_2d(),
            self.corners[2].to_2d(),
            self.corners[3].to_2d(),
        ];
        let p = p.to_2d();
        // Split along the p0-p2 diagonal and test the triangle `p` is on.
        if side_of_line(p0, p2, p) < 0.0 {
            side_of_line(p0, p1, p) >= 0.0 && side_of_line(p1, p2, p) >= 0.0
        } else {
            side_of_line(p2, p3, p) > 0.0 && side_of_line(p3, p0, p) >= 0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> Quad {
        Quad::new(
            Point3::new(-5.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(5.0, 10.0, 0.0),
            Point3::new(-5.0, 10.0, 0.0),
        )
    }

    #[test]
    fn centers_and_width() {
        let quad = unit_quad();
        assert_eq!(quad.lower_center(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(quad.upper_center(), Point3::new(0.0, 10.0, 0.0));
        assert_eq!(quad.center(), Point3::new(0.0, 5.0, 0.0));
        assert_eq!(quad.width(), 10.0);
    }

    #[test]
    fn contains_inside_points() {
        let quad = unit_quad();
        assert!(quad.contains(&Point3::new(0.0, 5.0, 0.0)));
        assert!(quad.contains(&Point3::new(-4.9, 0.1, 0.0)));
        assert!(quad.contains(&Point3::new(4.9, 9.9, 2.0)));
        assert!(!quad.contains(&Point3::new(5.1, 5.0, 0.0)));
        assert!(!quad.contains(&Point3::new(0.0, 10.1, 0.0)));
    }

    #[test]
    fn height_window() {
        let quad = unit_quad();
        assert!(!quad.contains(&Point3::new(0.0, 5.0, 6.0)));
        assert!(!quad.contains(&Point3::new(0.0, 5.0, -2.0)));
    }

    #[test]
    fn shared_edge_belongs_to_one_quad() {
        let lower = unit_quad();
        let upper = Quad::new(
            Point3::new(-5.0, 10.0, 0.0),
            Point3::new(5.0, 10.0, 0.0),
            Point3::new(5.0, 20.0, 0.0),
            Point3::new(-5.0, 20.0, 0.0),
        );
        let on_edge = Point3::new(1.0, 10.0, 0.0);
        assert!(!lower.contains(&on_edge));
        assert!(upper.contains(&on_edge));
    }
}
