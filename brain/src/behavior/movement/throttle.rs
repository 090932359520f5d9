use crate::properties::{AiProperties, NitroUsage};
use common::{geometry::Circle, KartProperties, KartState, RaceStanding};
use track::TrackDirection;

/// No braking below this speed.
const MIN_BRAKE_SPEED: f32 = 5.0;
/// In a turn at full lock, brake above this multiple of the curve's max speed.
const TURN_OVERSPEED_FACTOR: f32 = 1.5;
const FULL_STEER: f32 = 0.95;
/// With blocked vision, ease off above this fraction of max speed.
const BLOCKED_VISION_SPEED_FRACTION: f32 = 0.5;
const BLOCKED_VISION_ACCELERATION: f32 = 0.5;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Throttle {
    pub acceleration: f32,
    pub brake: bool,
    pub nitro: bool,
}

/// Decide acceleration, braking and nitro for this tick.
pub fn throttle(
    me: &KartState,
    props: &KartProperties,
    ai: &AiProperties,
    standing: &RaceStanding,
    direction: TrackDirection,
    curve: Option<&Circle>,
    steer: f32,
) -> Throttle {
    let speed = me.speed();
    let blocked_vision = me.blocked_vision_time > 0.0;

    let brake = match direction {
        // Facing the wrong way or at a fork the kart cannot tell where the
        // road goes.
        TrackDirection::Undefined => speed > MIN_BRAKE_SPEED,
        TrackDirection::Left | TrackDirection::Right => curve.map_or(false, |curve| {
            speed > MIN_BRAKE_SPEED
                && speed > TURN_OVERSPEED_FACTOR * props.speed_for_turn_radius(curve.radius)
                && steer.abs() > FULL_STEER
        }),
        TrackDirection::Straight => false,
    };

    let acceleration = if brake {
        0.0
    } else if blocked_vision && speed > me.max_speed * BLOCKED_VISION_SPEED_FRACTION {
        BLOCKED_VISION_ACCELERATION
    } else {
        1.0
    };

    let wants_nitro = match ai.nitro_usage {
        NitroUsage::None => false,
        NitroUsage::Some => me.energy >= props.nitro_max * 0.5 || standing.is_last_lap(),
        NitroUsage::All => true,
    };
    let nitro = wants_nitro
        && me.energy > 0.0
        && me.on_ground
        && direction == TrackDirection::Straight
        && !blocked_vision
        && !brake;

    Throttle {
        acceleration,
        brake,
        nitro,
    }
}
