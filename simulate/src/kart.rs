use common::{physics, prelude::*, KartControls, KartProperties, KartState, SkidControl};
use nalgebra::{Point3, Vector3};

/// Skidding tightens the turn by this factor.
const SKID_TURN_FACTOR: f32 = 1.3;
/// Nitro energy burned per second.
const NITRO_BURN_RATE: f32 = 5.0;
const NITRO_SPEED_BONUS: f32 = 5.0;

/// A kinematic bicycle model of a kart. No grip limit, no collisions, the kart
/// never drives backwards.
pub struct KinematicKart {
    props: KartProperties,
    acceleration: f32,
    braking: f32,
    drag: f32,
}

impl KinematicKart {
    pub fn new(props: KartProperties) -> Self {
        Self {
            props,
            acceleration: 15.0,
            braking: 30.0,
            drag: 0.2,
        }
    }

    pub fn properties(&self) -> &KartProperties {
        &self.props
    }

    /// Advance `state` by `dt` seconds under `controls`.
    pub fn step(&self, state: &mut KartState, controls: &KartControls, dt: f32) {
        if dt <= 0.0 || !state.is_finite() {
            return;
        }

        let nitro = controls.nitro && state.energy > 0.0;
        let max_speed = self.props.max_speed + if nitro { NITRO_SPEED_BONUS } else { 0.0 };

        let mut speed = state.forward_speed().max(0.0);
        let throttle = controls.acceleration.max(0.0).min(1.0);
        let mut accel = self.acceleration * throttle - self.drag * speed;
        if controls.brake {
            accel -= self.braking;
        }
        if nitro {
            accel += self.acceleration;
            state.energy = (state.energy - NITRO_BURN_RATE * dt).max(0.0);
        }
        speed = (speed + accel * dt).max(0.0).min(max_speed);

        let steer = controls.steer.max(-1.0).min(1.0) * self.props.max_steer_angle;
        let mut yaw_rate = speed * steer.tan() / self.props.length;
        match controls.skid {
            SkidControl::None => state.skid_time = 0.0,
            SkidControl::Left | SkidControl::Right => {
                yaw_rate *= SKID_TURN_FACTOR;
                state.skid_time += dt;
            }
        }

        // Steering right turns clockwise, which is a decreasing heading.
        state.heading = (state.heading - yaw_rate * dt).normalize_angle();
        state.velocity = (physics::kart_forward_axis_2d(state.heading) * speed).to_3d(0.0);
        state.position += state.velocity * dt;
        state.max_speed = max_speed;
        state.blocked_vision_time = (state.blocked_vision_time - dt).max(0.0);
    }

    /// Put the kart down at `position`, at rest.
    pub fn rescue(&self, state: &mut KartState, position: Point3<f32>, heading: f32) {
        state.position = position;
        state.heading = heading;
        state.velocity = Vector3::zeros();
        state.skid_time = 0.0;
        state.animation_active = false;
    }
}
