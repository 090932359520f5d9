use crate::{context::Context, helpers::drive::travel_direction, helpers::path::AgentPath};
use common::{consts::MAX_ITERATIONS, prelude::*, KartId};
use log::warn;
use track::NodeIndex;

/// How far ahead in time the trajectory is projected.
pub const CRASH_LOOKAHEAD_TIME: f32 = 1.0;
/// Extra steps on top of the speed based count, so slow karts still look
/// ahead a bit.
const CRASH_STEP_PADDING: usize = 5;
const MIN_CRASH_STEPS: usize = 2;
/// Other karts are moved along their velocity by this much per step.
const OTHER_KART_STEP_TIME: f32 = 0.1;

/// What the straight line projection of the kart's movement runs into.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CrashReport {
    pub kart: Option<KartId>,
    /// The projection leaves the road.
    pub road: bool,
}

/// Number of kart-length steps to project at `forward_speed`.
pub fn crash_steps(forward_speed: f32, kart_length: f32) -> usize {
    let raw = forward_speed * CRASH_LOOKAHEAD_TIME / kart_length;
    let steps = if raw.is_nan() || raw <= 0.0 {
        0
    } else {
        raw.min(MAX_ITERATIONS as f32) as usize
    };
    let steps = steps.max(MIN_CRASH_STEPS) + CRASH_STEP_PADDING;
    if steps > MAX_ITERATIONS {
        warn!("capping {} crash steps at {}", steps, MAX_ITERATIONS);
        return MAX_ITERATIONS;
    }
    steps
}

/// Project the kart forward along its direction of travel and report the
/// first kart it would run into and whether it leaves the road.
pub fn check_crashes(ctx: &Context<'_>, path: &AgentPath, current: NodeIndex) -> CrashReport {
    let me = ctx.me();
    let mut report = CrashReport::default();
    if !me.is_finite() {
        return report;
    }

    // Pretend to crash into the slipstream target, which makes the kart close
    // in on it instead of overtaking right away.
    if ctx.ai.use_slipstream && me.slipstream.ready {
        report.kart = me.slipstream.target;
    }

    let length = ctx.props.length;
    let my_speed = me.forward_speed();
    let steps = crash_steps(my_speed, length);
    let direction = travel_direction(me);
    let window = path.search_window(current);
    let start = me.position.to_2d();

    for i in 1..steps {
        let step = start + direction * (length * i as f32);

        if report.kart.is_none() {
            for other in ctx.other_karts() {
                // Karts ahead that pull away are no threat.
                if my_speed > other.forward_speed() {
                    continue;
                }
                let ahead = OTHER_KART_STEP_TIME * i as f32;
                let other_pos = other.position.to_2d() + other.velocity.to_2d() * ahead;
                if (step - other_pos).norm() < length {
                    report.kart = Some(other.id);
                    break;
                }
            }
        }

        let step = step.to_3d(me.position.z);
        if ctx.graph.find_road_sector(&step, Some(&window)).is_none() {
            report.road = true;
            break;
        }
    }

    report
}
