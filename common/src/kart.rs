use crate::physics;
use nalgebra::{Point3, Vector3};

/// Index of a kart in the race's kart list.
pub type KartId = usize;

/// Constant properties of a kart model.
#[derive(Clone, Debug)]
pub struct KartProperties {
    pub length: f32,
    pub width: f32,
    /// Steering angle at full lock, in radians.
    pub max_steer_angle: f32,
    pub max_speed: f32,
    /// How long a skid has to be held before the first speed bonus.
    pub skid_time_till_bonus: f32,
    /// Sideways acceleration the tyres can hold, used to derive the max speed
    /// for a given turn radius.
    pub max_lateral_acceleration: f32,
    pub nitro_max: f32,
    pub nitro_big: f32,
    pub nitro_small: f32,
}

impl Default for KartProperties {
    fn default() -> Self {
        Self {
            length: 1.5,
            width: 1.0,
            max_steer_angle: 0.6,
            max_speed: 25.0,
            skid_time_till_bonus: 1.0,
            max_lateral_acceleration: 25.0,
            nitro_max: 20.0,
            nitro_big: 20.0,
            nitro_small: 5.0,
        }
    }
}

impl KartProperties {
    /// The fastest a kart can go around a curve with the given radius.
    pub fn speed_for_turn_radius(&self, radius: f32) -> f32 {
        (self.max_lateral_acceleration * radius.max(0.0)).sqrt()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Slipstream {
    pub ready: bool,
    pub target: Option<KartId>,
}

/// What the physics collaborator tells us about a kart at the start of a tick.
#[derive(Clone, Debug)]
pub struct KartState {
    pub id: KartId,
    pub position: Point3<f32>,
    /// Counter-clockwise angle of the kart's forward axis from +X.
    pub heading: f32,
    pub velocity: Vector3<f32>,
    pub on_ground: bool,
    /// The kart's current max speed, which may be above the model's max speed
    /// while a speed bonus is active.
    pub max_speed: f32,
    /// Remaining time the kart's vision is blocked by a hazard.
    pub blocked_vision_time: f32,
    /// Nitro energy.
    pub energy: f32,
    /// How long the current skid has been held, 0 when not skidding.
    pub skid_time: f32,
    pub slipstream: Slipstream,
    pub eliminated: bool,
    /// A rescue, explosion, etc. currently owns the kart.
    pub animation_active: bool,
}

impl KartState {
    pub fn new(id: KartId, position: Point3<f32>, heading: f32) -> Self {
        Self {
            id,
            position,
            heading,
            velocity: Vector3::zeros(),
            on_ground: true,
            max_speed: KartProperties::default().max_speed,
            blocked_vision_time: 0.0,
            energy: 0.0,
            skid_time: 0.0,
            slipstream: Slipstream::default(),
            eliminated: false,
            animation_active: false,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }

    /// Velocity along the kart's own forward axis.
    pub fn forward_speed(&self) -> f32 {
        physics::forward_speed(self.heading, &self.velocity)
    }

    /// Add nitro from a pickup, up to a full tank of `max`.
    pub fn refill(&mut self, amount: f32, max: f32) {
        self.energy = (self.energy + amount).min(max);
    }

    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|x| x.is_finite())
            && self.velocity.iter().all(|x| x.is_finite())
            && self.heading.is_finite()
    }
}

/// Where a kart currently is in the race, used to scale rubber-banding.
#[derive(Copy, Clone, Debug)]
pub struct RaceStanding {
    /// 1 is the leader.
    pub position: usize,
    pub num_karts: usize,
    pub lap: usize,
    pub laps: usize,
}

impl RaceStanding {
    /// 0.0 for the leader, 1.0 for the last kart.
    pub fn fraction_behind(&self) -> f32 {
        if self.num_karts <= 1 {
            return 0.0;
        }
        (self.position.saturating_sub(1) as f32 / (self.num_karts - 1) as f32).min(1.0)
    }

    pub fn is_last_lap(&self) -> bool {
        self.lap + 1 >= self.laps
    }
}

impl Default for RaceStanding {
    fn default() -> Self {
        Self {
            position: 1,
            num_karts: 1,
            lap: 0,
            laps: 3,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkidControl {
    None,
    Left,
    Right,
}

impl Default for SkidControl {
    fn default() -> Self {
        SkidControl::None
    }
}

/// What the AI writes back to the kart each tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KartControls {
    /// In `[0, 1]`.
    pub acceleration: f32,
    pub brake: bool,
    /// In `[-1, 1]`, positive steers right.
    pub steer: f32,
    pub skid: SkidControl,
    pub nitro: bool,
    pub fire: bool,
    pub look_back: bool,
    /// Ask the host to put the kart back on the track.
    pub rescue: bool,
}

impl KartControls {
    /// No throttle, centered steering.
    pub fn safe_default() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_behind() {
        let mut standing = RaceStanding {
            position: 1,
            num_karts: 5,
            ..Default::default()
        };
        assert_eq!(standing.fraction_behind(), 0.0);
        standing.position = 5;
        assert_eq!(standing.fraction_behind(), 1.0);
        standing.position = 3;
        assert_eq!(standing.fraction_behind(), 0.5);
    }

    #[test]
    fn refill_stops_at_a_full_tank() {
        let mut state = KartState::new(0, Point3::origin(), 0.0);
        state.refill(3.0, 5.0);
        assert_eq!(state.energy, 3.0);
        state.refill(3.0, 5.0);
        assert_eq!(state.energy, 5.0);
    }

    #[test]
    fn non_finite_state() {
        let mut state = KartState::new(0, Point3::origin(), 0.0);
        assert!(state.is_finite());
        state.velocity.x = f32::NAN;
        assert!(!state.is_finite());
    }
}
