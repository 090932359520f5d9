use crate::helpers::drive::angle_to;
use common::{KartProperties, KartState};
use nalgebra::Point3;

/// With blocked vision the AI never steers harder than this.
const BLOCKED_VISION_STEER: f32 = 0.5;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Steering {
    /// The steering to emit this tick, in `[-1, 1]`.
    pub steer: f32,
    /// Angle to the target over the max steering angle, before clamping. Above
    /// 1 the target is sharper than the kart can turn.
    pub fraction: f32,
}

/// Steer towards `target`, moving the wheel from `previous` by at most
/// `dt / time_full_steer`.
pub fn steer_towards(
    me: &KartState,
    target: &Point3<f32>,
    props: &KartProperties,
    time_full_steer: f32,
    previous: f32,
    dt: f32,
) -> Steering {
    let fraction = angle_to(me, target) / props.max_steer_angle;
    let limit = if me.blocked_vision_time > 0.0 {
        BLOCKED_VISION_STEER
    } else {
        1.0
    };
    let wanted = fraction.max(-limit).min(limit);

    let max_change = if time_full_steer > 0.0 {
        dt / time_full_steer
    } else {
        f32::INFINITY
    };
    let steer = previous + (wanted - previous).max(-max_change).min(max_change);

    Steering { steer, fraction }
}
