use crate::{
    agent::AgentState,
    behavior::{
        aim::select_aim_point,
        crash::check_crashes,
        items::handle_items,
        movement::{steer_towards, throttle},
        skid::{remaining_turn_time, SkidInput},
    },
    context::{Context, World},
    eeg::{Drawable, Eeg},
    properties::AiProperties,
};
use common::{
    geometry::circle_through_tangent, physics, prelude::*, KartControls, KartId, KartProperties,
};
use log::{debug, trace, warn};
use nameof::name_of_type;
use ordered_float::OrderedFloat;
use std::f32::consts::PI;
use track::{NodeIndex, TrackDirection, TrackGraph};

/// Facing further than this from the road's direction, the kart cannot tell
/// which way the road turns.
const MAX_HEADING_DEVIATION: f32 = 0.2222 * PI;
/// A kart slower than `STUCK_SPEED` for `STUCK_TIME` seconds asks to be
/// rescued.
const STUCK_SPEED: f32 = 1.0;
const STUCK_TIME: f32 = 2.0;

/// The driving AI for one kart. Call [`KartAi::tick`] once per physics tick.
pub struct KartAi {
    id: KartId,
    props: KartProperties,
    ai: AiProperties,
    agent: AgentState,
    eeg: Eeg,
}

impl KartAi {
    pub fn new(id: KartId, props: KartProperties, ai: AiProperties, graph: &TrackGraph) -> Self {
        let agent = AgentState::new(graph, &ai, id, None);
        Self {
            id,
            props,
            ai,
            agent,
            eeg: Eeg::new(),
        }
    }

    /// Drive towards `target` instead of picking branches at random.
    pub fn with_route_target(mut self, graph: &TrackGraph, target: NodeIndex) -> Self {
        self.agent = AgentState::new(graph, &self.ai, self.id, Some(target));
        self
    }

    pub fn with_eeg(mut self, eeg: Eeg) -> Self {
        self.eeg = eeg;
        self
    }

    pub fn id(&self) -> KartId {
        self.id
    }

    pub fn properties(&self) -> &AiProperties {
        &self.ai
    }

    pub fn agent(&self) -> &AgentState {
        &self.agent
    }

    pub fn eeg(&self) -> &Eeg {
        &self.eeg
    }

    /// Forget everything, e.g. at the start of a new race. The route target is
    /// kept.
    pub fn reset(&mut self, graph: &TrackGraph) {
        debug!("resetting AI of kart {}", self.id);
        self.agent = AgentState::new(graph, &self.ai, self.id, self.agent.route_target);
    }

    pub fn tick(&mut self, world: &World<'_>, dt: f32) -> KartControls {
        self.eeg.begin_tick();

        let id = self.id;
        let me = some_or_else!(world.karts.iter().find(|k| k.id == id), {
            warn!("kart {} is not in the race", id);
            return KartControls::safe_default();
        });
        if !me.is_finite() {
            warn!("kart {} has a malformed state", id);
            return KartControls::safe_default();
        }
        if world.time < self.agent.start_delay {
            self.eeg.print_value("waiting", self.agent.start_delay - world.time);
            return KartControls::safe_default();
        }
        if me.animation_active || me.eliminated {
            return KartControls::safe_default();
        }

        let mut ctx = Context::new(world, me, &self.props, &self.ai, &mut self.eeg, dt);
        let agent = &mut self.agent;

        let current = some_or_else!(localize(&ctx, agent), {
            warn!("kart {} lost the track at {:?}", id, me.position);
            agent.current_node = None;
            return KartControls {
                rescue: true,
                ..KartControls::safe_default()
            };
        });
        agent.current_node = Some(current);
        ctx.eeg.print_value("node", current);

        update_direction(&ctx, agent, current);
        agent.crash = check_crashes(&ctx, &agent.path, current);
        let aim = select_aim_point(&mut ctx, agent, current);
        let decision = handle_items(&mut ctx, agent, current, &aim);
        let target = decision.aim.position;
        agent.last_aim = Some(decision.aim);
        agent.last_item_outcome = decision.outcome;
        ctx.eeg.draw(Drawable::Crosshair(target));
        ctx.eeg.print_value("items", decision.outcome);

        let time_full_steer = ctx.ai.time_full_steer;
        let steering = steer_towards(me, &target, ctx.props, time_full_steer, agent.steer, dt);
        agent.steer = steering.steer;

        let turn_end = ctx.graph.node(agent.last_direction_node).center().to_2d();
        let position = me.position.to_2d();
        let skid_input = SkidInput {
            steer_fraction: steering.fraction,
            speed: me.speed(),
            direction: agent.track_direction,
            last_direction_node: agent.last_direction_node,
            remaining_turn_time: agent
                .curve
                .as_ref()
                .and_then(|curve| remaining_turn_time(curve, position, turn_end, me.speed())),
            time_till_bonus: (ctx.props.skid_time_till_bonus - me.skid_time).max(0.0),
            probability: ctx.ai.skidding_probability.get(&ctx.standing),
        };
        let skid = agent.skid.decide(&skid_input, &mut agent.rng);

        let pedals = throttle(
            me,
            ctx.props,
            ctx.ai,
            &ctx.standing,
            agent.track_direction,
            agent.curve.as_ref(),
            steering.steer,
        );

        if me.speed() < STUCK_SPEED {
            agent.stuck_time += dt;
        } else {
            agent.stuck_time = 0.0;
        }
        let rescue = agent.stuck_time > STUCK_TIME;
        if rescue {
            ctx.eeg.log(name_of_type!(KartAi), format!("kart {} is stuck", id));
            agent.stuck_time = 0.0;
        }

        ctx.eeg.print_value("direction", agent.track_direction);
        ctx.eeg.print_value("skid", skid);
        trace!(
            "kart {}: node {} {:?}, aim {:?}, steer {:.2}, skid {:?}",
            id,
            current,
            agent.track_direction,
            target,
            steering.steer,
            skid,
        );

        KartControls {
            acceleration: pedals.acceleration,
            brake: pedals.brake,
            steer: steering.steer,
            skid,
            nitro: pedals.nitro,
            fire: false,
            look_back: false,
            rescue,
        }
    }
}

/// Find the node the kart is on: the one it was on last tick, then the nodes
/// ahead of it, then anywhere. A kart that left the road is matched to the
/// closest nearby node whose center line is within a road width.
fn localize(ctx: &Context<'_>, agent: &AgentState) -> Option<NodeIndex> {
    let position = &ctx.me().position;
    let graph = ctx.graph;

    if let Some(current) = agent.current_node {
        if let Some(node) = graph.find_road_sector(position, Some(&[current][..])) {
            return Some(node);
        }
        if let Some(node) = graph.find_road_sector(position, Some(agent.path.lookahead(current))) {
            return Some(node);
        }
    }
    if let Some(node) = graph.find_road_sector(position, None) {
        return Some(node);
    }

    let nearby = match agent.current_node {
        Some(current) => agent.path.search_window(current),
        None => (0..graph.num_nodes()).collect(),
    };
    let flat = position.to_2d();
    nearby
        .into_iter()
        .map(|i| (i, graph.node(i).line().distance_to(flat)))
        .filter(|&(i, distance)| distance <= graph.node(i).width())
        .min_by_key(|&(_, distance)| OrderedFloat(distance))
        .map(|(i, _)| i)
}

/// Classify the road ahead and, in a turn, fit the circle the kart is driving.
fn update_direction(ctx: &Context<'_>, agent: &mut AgentState, current: NodeIndex) {
    let me = ctx.me();
    let node = ctx.graph.node(current);
    let (direction, last) = match agent.path.successor(current) {
        Some(i) => node.direction_data(i),
        None => (TrackDirection::Straight, current),
    };

    let forward = physics::kart_forward_axis_2d(me.heading);
    let deviation = forward.signed_angle_to(&node.forward_axis());
    let direction = if deviation.abs() > MAX_HEADING_DEVIATION {
        TrackDirection::Undefined
    } else {
        direction
    };

    agent.track_direction = direction;
    agent.last_direction_node = last;
    agent.curve = if direction.is_turn() {
        circle_through_tangent(me.position.to_2d(), forward, ctx.graph.node(last).center().to_2d())
    } else {
        None
    };
}
