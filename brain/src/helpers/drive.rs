use common::{physics, prelude::*, KartState};
use nalgebra::{Point3, Vector2};
use track::{NodeIndex, TrackGraph};

/// Below this speed the velocity is too noisy to tell where the kart is going.
const MIN_TRAVEL_SPEED: f32 = 0.5;

/// Signed angle from the kart's forward axis to `target`, positive to the
/// right.
pub fn angle_to(me: &KartState, target: &Point3<f32>) -> f32 {
    let to_target = target.to_2d() - me.position.to_2d();
    if to_target.norm_squared() == 0.0 {
        return 0.0;
    }
    -physics::kart_forward_axis_2d(me.heading).signed_angle_to(&to_target)
}

/// Unit vector of where the kart is going: along its velocity when it is
/// moving, along its heading otherwise.
pub fn travel_direction(me: &KartState) -> Vector2<f32> {
    let velocity = me.velocity.to_2d();
    if velocity.norm() > MIN_TRAVEL_SPEED {
        velocity.normalize()
    } else {
        physics::kart_forward_axis_2d(me.heading)
    }
}

/// The node under `p`, if a kart of `kart_width` there would be fully on the
/// road. Only `candidates` are searched.
pub fn node_on_track(
    graph: &TrackGraph,
    p: &Point3<f32>,
    candidates: &[NodeIndex],
    kart_width: f32,
) -> Option<NodeIndex> {
    graph
        .find_road_sector(p, Some(candidates))
        .filter(|&node| graph.node(node).is_inside_corridor(p, kart_width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use brain_test_data::STRAIGHT;
    use nalgebra::Vector3;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn angle_sign() {
        let me = KartState::new(0, Point3::origin(), FRAC_PI_2);
        let right = angle_to(&me, &Point3::new(1.0, 1.0, 0.0));
        let left = angle_to(&me, &Point3::new(-1.0, 1.0, 0.0));
        assert_abs_diff_eq!(right, FRAC_PI_4, epsilon = 1e-5);
        assert_abs_diff_eq!(left, -FRAC_PI_4, epsilon = 1e-5);
        assert_eq!(angle_to(&me, &Point3::origin()), 0.0);
    }

    #[test]
    fn travel_direction_prefers_velocity() {
        let mut me = KartState::new(0, Point3::origin(), 0.0);
        assert_abs_diff_eq!(travel_direction(&me), Vector2::new(1.0, 0.0));
        me.velocity = Vector3::new(0.0, 5.0, 0.0);
        assert_abs_diff_eq!(travel_direction(&me), Vector2::new(0.0, 1.0));
    }

    #[test]
    fn on_track_respects_kart_width() {
        let candidates = [0, 1, 2];
        let on_track = |x, y| node_on_track(&STRAIGHT, &Point3::new(x, y, 0.0), &candidates, 1.0);
        assert_eq!(on_track(4.0, 5.0), Some(0));
        assert_eq!(on_track(4.0, 25.0), Some(2));
        assert_eq!(on_track(4.8, 5.0), None);
        assert_eq!(on_track(0.0, 45.0), None);
    }
}
