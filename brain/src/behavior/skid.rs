use common::{geometry::Circle, prelude::*, SkidControl};
use log::debug;
use nalgebra::Point2;
use nameof::name_of_type;
use rand::Rng;
use track::{NodeIndex, TrackDirection};

/// No skidding below this speed.
pub const MIN_SKID_SPEED: f32 = 5.0;
/// Steering this far past full lock means the turn is too sharp to take
/// without skidding.
const SHARP_STEER_FRACTION: f32 = 1.5;
/// The estimate of the time left in a turn is stretched by this much.
const TURN_DURATION_FACTOR: f32 = 1.5;

/// Whether the kart skids through the current turn, drawn at most once per
/// turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkidProbability {
    NotYet,
    Skid,
    NoSkid,
}

#[derive(Copy, Clone, Debug)]
pub struct SkidInput {
    /// Steering angle to the aim point over max steering angle, unclamped.
    pub steer_fraction: f32,
    pub speed: f32,
    pub direction: TrackDirection,
    /// Last node of the current turn.
    pub last_direction_node: NodeIndex,
    /// Seconds until the end of the turn, if it is known.
    pub remaining_turn_time: Option<f32>,
    /// Seconds of skidding left until the skid bonus is earned.
    pub time_till_bonus: f32,
    /// Chance to skid through a turn.
    pub probability: f32,
}

/// Decides, every tick, whether to skid.
#[derive(Clone, Debug)]
pub struct SkidDecider {
    state: SkidProbability,
    turn: Option<(TrackDirection, NodeIndex)>,
}

impl Default for SkidDecider {
    fn default() -> Self {
        Self {
            state: SkidProbability::NotYet,
            turn: None,
        }
    }
}

impl SkidDecider {
    pub fn state(&self) -> SkidProbability {
        self.state
    }

    pub fn decide(&mut self, input: &SkidInput, rng: &mut impl Rng) -> SkidControl {
        let turn = (input.direction, input.last_direction_node);
        if self.turn != Some(turn) {
            self.turn = Some(turn);
            self.state = SkidProbability::NotYet;
        }

        let turn_side = match input.direction {
            TrackDirection::Left => SkidControl::Left,
            TrackDirection::Right => SkidControl::Right,
            TrackDirection::Straight | TrackDirection::Undefined => {
                self.state = SkidProbability::NotYet;
                return SkidControl::None;
            }
        };

        if input.speed < MIN_SKID_SPEED {
            return SkidControl::None;
        }

        // Positive steering is to the right.
        let steer_side = if input.steer_fraction > 0.0 {
            SkidControl::Right
        } else {
            SkidControl::Left
        };
        if steer_side != turn_side {
            return SkidControl::None;
        }

        if input.steer_fraction.abs() > SHARP_STEER_FRACTION {
            return turn_side;
        }

        let remaining = some_or_else!(input.remaining_turn_time, {
            return SkidControl::None;
        });
        if input.time_till_bonus > remaining {
            return SkidControl::None;
        }

        if self.state == SkidProbability::NotYet {
            let roll: f32 = rng.random();
            self.state = if roll < input.probability {
                SkidProbability::Skid
            } else {
                SkidProbability::NoSkid
            };
            debug!(
                "{}: {:?} for turn ending at node {}",
                name_of_type!(SkidDecider),
                self.state,
                input.last_direction_node,
            );
        }

        match self.state {
            SkidProbability::Skid => turn_side,
            SkidProbability::NotYet | SkidProbability::NoSkid => SkidControl::None,
        }
    }
}

/// Estimated seconds until the kart at `position` gets around `curve` to
/// `turn_end`, at `speed`.
pub fn remaining_turn_time(
    curve: &Circle,
    position: Point2<f32>,
    turn_end: Point2<f32>,
    speed: f32,
) -> Option<f32> {
    if speed <= 0.0 || !curve.radius.is_finite() {
        return None;
    }
    let angle = (position - curve.center).signed_angle_to(&(turn_end - curve.center));
    Some(curve.radius * angle.abs() / speed * TURN_DURATION_FACTOR)
}
