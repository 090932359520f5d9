use crate::{
    agent::AgentState,
    behavior::aim::AimPoint,
    context::Context,
    eeg::Drawable,
    helpers::{
        drive::{angle_to, node_on_track},
        path::AgentPath,
    },
};
use common::{geometry::Segment2, prelude::*};
use itertools::{Itertools, MinMaxResult};
use nalgebra::Point3;
use nameof::name_of_type;
use ordered_float::OrderedFloat;
use rand::Rng;
use track::{Item, ItemId, ItemKind, NodeIndex, TrackGraph};

/// Items are considered at least this far down the road, even if the aim
/// point is closer.
pub const ITEM_LOOKAHEAD_DISTANCE: f32 = 30.0;
/// A hazard this close to the item the kart is heading for spoils it.
pub const ITEM_CONFLICT_DISTANCE: f32 = 5.0;
/// A locked item this far off the kart's heading has been passed.
const PASSED_ITEM_ANGLE: f32 = 1.5;
/// Items this close to the aim direction are driven at directly.
const DIRECT_ITEM_ANGLE: f32 = 0.3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ItemOutcome {
    Unchanged,
    /// Locked onto an item and driving at it.
    Collecting(ItemId),
    /// Steering towards an item without committing to it.
    Approaching(ItemId),
    /// Steering around a hazard.
    Avoiding(ItemId),
    /// There is a hazard in the way and no way around it.
    NoSafeAvoidance,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ItemDecision {
    pub outcome: ItemOutcome,
    pub aim: AimPoint,
}

impl ItemDecision {
    fn new(outcome: ItemOutcome, aim: AimPoint) -> Self {
        Self { outcome, aim }
    }

    fn unchanged(aim: &AimPoint) -> Self {
        Self::new(ItemOutcome::Unchanged, *aim)
    }

    /// Head for `item`, on the node it lies on.
    fn towards(outcome: ItemOutcome, item: &Item, fallback: NodeIndex) -> Self {
        let node = item.node().unwrap_or(fallback);
        Self::new(outcome, AimPoint::new(item.position(), node))
    }
}

/// Items near the kart's path, nearest first.
struct NearbyItems<'a> {
    avoid: Vec<&'a Item>,
    collect: Vec<&'a Item>,
}

/// Adjust the aim point for the items ahead: steer around hazards, steer
/// through bonuses worth having.
pub fn handle_items(
    ctx: &mut Context<'_>,
    agent: &mut AgentState,
    current: NodeIndex,
    aim: &AimPoint,
) -> ItemDecision {
    let me = ctx.me();
    let nodes = scan_nodes(ctx.graph, &agent.path, current, aim.node);
    let nearby = nearby_items(ctx, &nodes, &aim.position);

    if let Some(id) = agent.item_to_collect {
        let conflict = ctx.items.get(id).map_or(false, |item| {
            nearby.avoid.iter().any(|hazard| {
                nalgebra::distance(&hazard.position(), &item.position()) < ITEM_CONFLICT_DISTANCE
            })
        });
        if conflict {
            ctx.eeg.log(name_of_type!(ItemDecision), format!("hazard next to item {}", id));
            agent.item_to_collect = None;
        }
    }

    if let Some(id) = agent.item_to_collect {
        match ctx.items.get(id) {
            Some(item)
                if item.is_available(ctx.time)
                    && angle_to(me, &item.position()).abs() < PASSED_ITEM_ANGLE =>
            {
                ctx.eeg.draw(Drawable::Crosshair(item.position()));
                return ItemDecision::towards(ItemOutcome::Collecting(id), item, aim.node);
            }
            _ => {
                ctx.eeg.log(name_of_type!(ItemDecision), format!("giving up on item {}", id));
                agent.item_to_collect = None;
            }
        }
    }

    if !nearby.avoid.is_empty() {
        let width = ctx.props.width;
        let avoided = steer_to_avoid(ctx.graph, &nodes, &nearby.avoid, &me.position, aim, width);
        if let Some(decision) = avoided {
            if let ItemOutcome::Avoiding(id) = decision.outcome {
                ctx.eeg.print_value("avoiding", id);
            }
            return decision;
        }
    }

    if let Some(item) = nearby.collect.first() {
        if let Some(decision) = steer_to_collect(ctx, agent, &nodes, &nearby.avoid, item, aim) {
            return decision;
        }
    }

    ItemDecision::unchanged(aim)
}

/// The nodes ahead of the kart whose items matter: up to the aim point, and
/// at least `ITEM_LOOKAHEAD_DISTANCE` down the road.
fn scan_nodes(
    graph: &TrackGraph,
    path: &AgentPath,
    current: NodeIndex,
    aim_node: NodeIndex,
) -> Vec<NodeIndex> {
    let mut nodes = Vec::new();
    let mut distance = 0.0;
    let mut reached_aim = false;
    for node in path.walk(current, graph.num_nodes()) {
        nodes.push(node);
        reached_aim |= node == aim_node;
        if reached_aim && distance >= ITEM_LOOKAHEAD_DISTANCE {
            break;
        }
        if let Some(succ) = path.successor(node) {
            distance += graph.node(node).distance_to_next(succ);
        }
    }
    nodes
}

fn nearby_items<'a>(ctx: &Context<'a>, nodes: &[NodeIndex], aim: &Point3<f32>) -> NearbyItems<'a> {
    let me = ctx.me();
    let position = me.position.to_2d();
    let aim_direction = aim.to_2d() - position;
    let max_angle = if me.speed() > ctx.ai.high_speed_fraction * ctx.props.max_speed {
        ctx.ai.max_item_angle_high_speed
    } else {
        ctx.ai.max_item_angle
    };
    let items = ctx.items;

    let mut avoid = Vec::new();
    let mut collect = Vec::new();
    for &node in nodes {
        for item in items.items_in_node(node) {
            if !item.is_available(ctx.time) {
                continue;
            }
            let wanted = match item.kind() {
                ItemKind::Trigger => continue,
                ItemKind::Banana | ItemKind::Bubblegum => {
                    avoid.push(item);
                    continue;
                }
                ItemKind::BonusBox => true,
                ItemKind::NitroBig => me.energy + ctx.props.nitro_big <= ctx.props.nitro_max,
                ItemKind::NitroSmall => me.energy + ctx.props.nitro_small <= ctx.props.nitro_max,
            };
            let angle = aim_direction.signed_angle_to(&(item.position().to_2d() - position));
            if wanted && angle.abs() <= max_angle {
                collect.push(item);
            }
        }
    }

    let distance = |item: &&Item| OrderedFloat((item.position().to_2d() - position).norm());
    avoid.sort_by_key(distance);
    collect.sort_by_key(distance);
    NearbyItems { avoid, collect }
}

/// Find a way around `hazards`. `None` if the path to the aim point already
/// misses them.
fn steer_to_avoid(
    graph: &TrackGraph,
    nodes: &[NodeIndex],
    hazards: &[&Item],
    from: &Point3<f32>,
    aim: &AimPoint,
    kart_width: f32,
) -> Option<ItemDecision> {
    let line = Segment2::new(from.to_2d(), aim.position.to_2d());
    // The hazard in the way nearest to the line, not necessarily the outermost.
    let blocking = some_or_else!(
        hazards
            .iter()
            .filter(|i| i.hits_line(&line, kart_width))
            .min_by_key(|i| OrderedFloat(line.distance_to(i.position().to_2d()))),
        { return None }
    );
    let across = hazards.iter().minmax_by_key(|i| OrderedFloat(i.distance_from_center()));
    let (leftmost, rightmost) = match across {
        MinMaxResult::NoElements => return None,
        MinMaxResult::OneElement(item) => (item, item),
        MinMaxResult::MinMax(left, right) => (left, right),
    };

    // Avoidance points to try in order of preference, paired with the hazard
    // they belong to.
    let mut candidates: Vec<(ItemId, Option<Point3<f32>>)> = Vec::new();
    let mut push_both = |item: &Item, first_left: bool| {
        candidates.push((item.id(), item.avoidance_point(first_left)));
        candidates.push((item.id(), item.avoidance_point(!first_left)));
    };

    // `side_of` is positive left of the line.
    if line.side_of(leftmost.position().to_2d()) <= 0.0 {
        // Every hazard is on the right, pass left of all of them.
        push_both(*leftmost, true);
        push_both(*blocking, true);
    } else if line.side_of(rightmost.position().to_2d()) >= 0.0 {
        push_both(*rightmost, false);
        push_both(*blocking, false);
    } else {
        // Driving between hazards: only the nearest one on each side can be
        // in the way.
        let nearest = |left: bool| {
            hazards
                .iter()
                .filter(|i| (line.side_of(i.position().to_2d()) >= 0.0) == left)
                .min_by_key(|i| OrderedFloat(line.distance_to(i.position().to_2d())))
                .filter(|i| i.hits_line(&line, kart_width))
        };
        if let Some(item) = nearest(true) {
            push_both(*item, false);
        }
        if let Some(item) = nearest(false) {
            push_both(*item, true);
        }
    }

    let safe = |point: &Point3<f32>| {
        let escape = Segment2::new(from.to_2d(), point.to_2d());
        if hazards.iter().any(|hazard| hazard.hits_line(&escape, kart_width)) {
            return None;
        }
        node_on_track(graph, point, nodes, kart_width).map(|node| AimPoint::new(*point, node))
    };
    for (id, point) in candidates {
        if let Some(point) = point.and_then(|p| safe(&p)) {
            return Some(ItemDecision::new(ItemOutcome::Avoiding(id), point));
        }
    }
    Some(ItemDecision::new(ItemOutcome::NoSafeAvoidance, *aim))
}

fn steer_to_collect(
    ctx: &mut Context<'_>,
    agent: &mut AgentState,
    nodes: &[NodeIndex],
    hazards: &[&Item],
    item: &Item,
    aim: &AimPoint,
) -> Option<ItemDecision> {
    let me = ctx.me();
    let kart_width = ctx.props.width;
    let to_item = Segment2::new(me.position.to_2d(), item.position().to_2d());
    if hazards.iter().any(|hazard| hazard.hits_line(&to_item, kart_width)) {
        return None;
    }

    // Each item gets one chance, so karts do not all farm the same boxes.
    let wanted = match agent.last_item_random {
        Some((id, wanted)) if id == item.id() => wanted,
        _ => {
            let probability = ctx.ai.collect_item_probability.get(&ctx.standing);
            let wanted = agent.rng.random::<f32>() < probability;
            ctx.eeg.log(
                name_of_type!(ItemDecision),
                format!("item {} is {}", item.id(), if wanted { "wanted" } else { "ignored" }),
            );
            agent.last_item_random = Some((item.id(), wanted));
            wanted
        }
    };
    if !wanted {
        return None;
    }

    let to_aim = Segment2::new(me.position.to_2d(), aim.position.to_2d());
    if item.hits_line(&to_aim, kart_width) {
        ctx.eeg.log(name_of_type!(ItemDecision), format!("collecting item {}", item.id()));
        agent.item_to_collect = Some(item.id());
        return Some(ItemDecision::towards(ItemOutcome::Collecting(item.id()), item, aim.node));
    }

    let angle = to_aim.direction().signed_angle_to(&to_item.direction());
    if angle.abs() < DIRECT_ITEM_ANGLE {
        return Some(ItemDecision::towards(ItemOutcome::Approaching(item.id()), item, aim.node));
    }

    let halfway = nalgebra::center(&aim.position, &item.position());
    node_on_track(ctx.graph, &halfway, nodes, kart_width).map(|node| {
        ItemDecision::new(ItemOutcome::Approaching(item.id()), AimPoint::new(halfway, node))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        behavior::{
            aim::{is_corridor_safe, select_aim_point},
            crash::CrashReport,
        },
        context::test_support::Scene,
        properties::{AiProperties, Difficulty, StandingProbability},
    };
    use approx::assert_abs_diff_eq;
    use brain_test_data::{HAIRPIN, OVAL, STRAIGHT};
    use track::TrackCoords;
    use rand::{rngs::StdRng, SeedableRng};
    use std::f32::consts::FRAC_PI_2;

    fn scene(kart: Point3<f32>) -> Scene {
        let mut scene = Scene::new(&STRAIGHT).with_kart(kart, FRAC_PI_2, 10.0);
        scene.ai.collect_item_probability = StandingProbability::constant(1.0);
        scene
    }

    fn agent() -> AgentState {
        AgentState::new(&STRAIGHT, &AiProperties::for_difficulty(Difficulty::Hard), 0, None)
    }

    fn aim_ahead(x: f32) -> AimPoint {
        AimPoint::new(Point3::new(x, 45.0, 0.0), 4)
    }

    fn decide(scene: &mut Scene, agent: &mut AgentState, aim: &AimPoint) -> ItemDecision {
        let current = STRAIGHT.find_road_sector(&scene.karts[0].position, None).unwrap();
        handle_items(&mut scene.context(0), agent, current, aim)
    }

    fn clears_all(scene: &Scene, decision: &ItemDecision) -> bool {
        let line = Segment2::new(scene.karts[0].position.to_2d(), decision.aim.position.to_2d());
        scene
            .items
            .items()
            .iter()
            .filter(|i| i.kind().is_hazard())
            .all(|i| !i.hits_line(&line, scene.props.width))
    }

    #[test]
    fn scan_reaches_past_a_close_aim_point() {
        let mut rng = StdRng::seed_from_u64(0);
        let path = AgentPath::compute(&STRAIGHT, None, &mut rng);
        assert_eq!(scan_nodes(&STRAIGHT, &path, 2, 3), vec![2, 3, 4, 5]);
        assert_eq!(scan_nodes(&STRAIGHT, &path, 2, 9), (2..=9).collect::<Vec<_>>());
        assert_eq!(scan_nodes(&STRAIGHT, &path, 17, 18), vec![17, 18, 19]);
    }

    #[test]
    fn no_items_no_change() {
        let mut scene = scene(Point3::new(0.0, 5.0, 0.0));
        let decision = decide(&mut scene, &mut agent(), &aim_ahead(0.0));
        assert_eq!(decision, ItemDecision::unchanged(&aim_ahead(0.0)));
    }

    #[test]
    fn hazard_beside_the_path_is_ignored() {
        let mut scene = scene(Point3::new(0.0, 5.0, 0.0));
        scene.items.add(ItemKind::Banana, Point3::new(3.0, 15.0, 0.0), &STRAIGHT);
        let decision = decide(&mut scene, &mut agent(), &aim_ahead(0.0));
        assert_eq!(decision.outcome, ItemOutcome::Unchanged);
    }

    #[test]
    fn falls_back_to_the_other_side_when_off_track() {
        // The banana's left avoidance point is right on the edge of the road.
        let mut scene = scene(Point3::new(-3.5, 5.0, 0.0));
        let banana = scene.items.add(ItemKind::Banana, Point3::new(-2.5, 15.0, 0.0), &STRAIGHT);
        let decision = decide(&mut scene, &mut agent(), &aim_ahead(-3.5));
        assert_eq!(decision.outcome, ItemOutcome::Avoiding(banana));
        assert_abs_diff_eq!(decision.aim.position, Point3::new(0.0, 15.0, 0.0), epsilon = 1e-4);
        assert_eq!(decision.aim.node, 1);
        assert!(clears_all(&scene, &decision));
    }

    #[test]
    fn hazard_nearest_the_line_counts_not_the_outermost() {
        // Driving diagonally across the road: the left banana is further from
        // the center line but clear of the path, the right one is in the way.
        let mut scene = scene(Point3::new(-4.0, 5.0, 0.0));
        let outer = scene.items.add(ItemKind::Banana, Point3::new(-1.0, 10.0, 0.0), &STRAIGHT);
        scene.items.add(ItemKind::Banana, Point3::new(3.5, 40.0, 0.0), &STRAIGHT);
        let decision = decide(&mut scene, &mut agent(), &aim_ahead(4.0));
        assert_eq!(decision.outcome, ItemOutcome::Avoiding(outer));
        assert_abs_diff_eq!(decision.aim.position, Point3::new(-3.5, 10.0, 0.0), epsilon = 1e-4);
        assert!(clears_all(&scene, &decision));
    }

    #[test]
    fn straddling_hazards_are_cleared() {
        let mut scene = scene(Point3::new(0.0, 5.0, 0.0));
        let left = scene.items.add(ItemKind::Banana, Point3::new(-0.8, 15.0, 0.0), &STRAIGHT);
        scene.items.add(ItemKind::Bubblegum, Point3::new(0.8, 15.0, 0.0), &STRAIGHT);
        let decision = decide(&mut scene, &mut agent(), &aim_ahead(0.0));
        assert_eq!(decision.outcome, ItemOutcome::Avoiding(left));
        assert!(clears_all(&scene, &decision));
        assert!(decision.aim.position.x < 0.0);
    }

    #[test]
    fn boxed_in_reports_no_safe_avoidance() {
        let mut scene = scene(Point3::new(0.0, 5.0, 0.0));
        for &x in &[-3.5, -0.8, 0.8, 3.5] {
            scene.items.add(ItemKind::Banana, Point3::new(x, 15.0, 0.0), &STRAIGHT);
        }
        let decision = decide(&mut scene, &mut agent(), &aim_ahead(0.0));
        assert_eq!(decision, ItemDecision::new(ItemOutcome::NoSafeAvoidance, aim_ahead(0.0)));
    }

    #[test]
    fn locks_onto_item_in_the_way() {
        let mut scene = scene(Point3::new(0.0, 5.0, 0.0));
        let bonus = scene.items.add(ItemKind::BonusBox, Point3::new(0.5, 20.0, 0.0), &STRAIGHT);
        let mut agent = agent();

        let decision = decide(&mut scene, &mut agent, &aim_ahead(0.0));
        assert_eq!(decision.outcome, ItemOutcome::Collecting(bonus));
        assert_eq!(agent.item_to_collect, Some(bonus));

        // Held while it is ahead.
        let decision = decide(&mut scene, &mut agent, &aim_ahead(0.0));
        assert_eq!(decision.outcome, ItemOutcome::Collecting(bonus));

        // Released once collected.
        scene.items.disable_until(bonus, scene.time + 5.0);
        let decision = decide(&mut scene, &mut agent, &aim_ahead(0.0));
        assert_eq!(decision.outcome, ItemOutcome::Unchanged);
        assert_eq!(agent.item_to_collect, None);
    }

    #[test]
    fn hazard_next_to_locked_item_releases_it() {
        let mut scene = scene(Point3::new(0.0, 5.0, 0.0));
        let bonus = scene.items.add(ItemKind::BonusBox, Point3::new(0.0, 20.0, 0.0), &STRAIGHT);
        let mut agent = agent();
        decide(&mut scene, &mut agent, &aim_ahead(0.0));
        assert_eq!(agent.item_to_collect, Some(bonus));

        let banana = scene.items.add(ItemKind::Banana, Point3::new(0.0, 22.0, 0.0), &STRAIGHT);
        let decision = decide(&mut scene, &mut agent, &aim_ahead(0.0));
        assert_ne!(agent.item_to_collect, Some(bonus));
        assert_eq!(decision.outcome, ItemOutcome::Avoiding(banana));
    }

    #[test]
    fn nudges_towards_item_off_the_line() {
        let mut scene = scene(Point3::new(0.0, 5.0, 0.0));
        let bonus = scene.items.add(ItemKind::BonusBox, Point3::new(-4.0, 15.0, 0.0), &STRAIGHT);
        let mut agent = agent();
        let aim = aim_ahead(0.0);
        let decision = decide(&mut scene, &mut agent, &aim);
        assert_eq!(decision.outcome, ItemOutcome::Approaching(bonus));
        assert_eq!(agent.item_to_collect, None);
        assert_abs_diff_eq!(decision.aim.position, Point3::new(-2.0, 30.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn declined_item_is_not_redrawn() {
        let mut scene = scene(Point3::new(0.0, 5.0, 0.0));
        scene.ai.collect_item_probability = StandingProbability::constant(0.0);
        let bonus = scene.items.add(ItemKind::BonusBox, Point3::new(0.0, 20.0, 0.0), &STRAIGHT);
        let mut agent = agent();
        assert_eq!(decide(&mut scene, &mut agent, &aim_ahead(0.0)).outcome, ItemOutcome::Unchanged);
        assert_eq!(agent.last_item_random, Some((bonus, false)));

        scene.ai.collect_item_probability = StandingProbability::constant(1.0);
        assert_eq!(decide(&mut scene, &mut agent, &aim_ahead(0.0)).outcome, ItemOutcome::Unchanged);
    }

    /// The node `k` steps down the road from `node`, on tracks without forks.
    fn ahead(graph: &TrackGraph, node: NodeIndex, k: usize) -> Option<NodeIndex> {
        (0..k).try_fold(node, |n, _| match graph.node(n).num_successors() {
            0 => None,
            _ => Some(graph.node(n).successor(0)),
        })
    }

    fn on_node(graph: &TrackGraph, node: NodeIndex, lateral: f32) -> Point3<f32> {
        let node = graph.node(node);
        node.track_to_spatial(TrackCoords {
            lateral: lateral * node.width(),
            forward: node.line().length() * 0.5,
        })
    }

    #[test]
    fn final_aim_stays_in_the_corridor() {
        for graph in [&*OVAL, &*HAIRPIN].iter() {
            for node in (0..graph.num_nodes()).step_by(2) {
                let start = graph.node(node);
                let position = start.track_to_spatial(TrackCoords { lateral: 0.0, forward: 1.0 });
                let heading = start.forward_axis().bearing();
                let mut scene = Scene::new(*graph).with_kart(position, heading, 10.0);
                scene.ai.collect_item_probability = StandingProbability::constant(1.0);
                let placed = [
                    (ItemKind::Banana, 2, 0.4),
                    (ItemKind::BonusBox, 3, -0.4),
                    (ItemKind::Bubblegum, 4, -0.1),
                    (ItemKind::NitroSmall, 5, 0.4),
                ];
                for &(kind, k, lateral) in &placed {
                    if let Some(n) = ahead(graph, node, k) {
                        scene.items.add(kind, on_node(graph, n, lateral), graph);
                    }
                }

                let mut agent = AgentState::new(graph, &scene.ai, 0, None);
                let mut ctx = scene.context(0);
                let aim = select_aim_point(&mut ctx, &mut agent, node);
                let decision = handle_items(&mut ctx, &mut agent, node, &aim);

                let aim = decision.aim;
                let safe = is_corridor_safe(graph, &aim, scene.props.width);
                assert!(safe, "node {}: {:?}", node, decision);
                assert_eq!(
                    graph.find_road_sector(&aim.position, Some(&[aim.node][..])),
                    Some(aim.node),
                    "node {}: {:?}",
                    node,
                    decision,
                );
            }
        }
    }

    #[test]
    fn escape_aim_stays_in_the_corridor() {
        for graph in [&*OVAL, &*HAIRPIN].iter() {
            for node in 0..graph.num_nodes() {
                for &lateral in &[-0.4, 0.4] {
                    let start = graph.node(node);
                    let heading = start.forward_axis().bearing();
                    let mut scene = Scene::new(*graph)
                        .with_kart(on_node(graph, node, lateral), heading, 10.0)
                        .with_kart(on_node(graph, node, 0.0), heading, 10.0);
                    let mut agent = AgentState::new(graph, &scene.ai, 0, None);
                    agent.crash = CrashReport {
                        kart: Some(1),
                        road: false,
                    };

                    let aim = select_aim_point(&mut scene.context(0), &mut agent, node);
                    assert_eq!(aim.node, node);
                    let safe = is_corridor_safe(graph, &aim, scene.props.width);
                    assert!(safe, "node {}: {:?}", node, aim);
                }
            }
        }
    }

    #[test]
    fn full_tank_skips_nitro_and_triggers_are_ignored() {
        let mut scene = scene(Point3::new(0.0, 5.0, 0.0));
        scene.karts[0].energy = scene.props.nitro_max;
        scene.items.add(ItemKind::NitroSmall, Point3::new(0.0, 20.0, 0.0), &STRAIGHT);
        scene.items.add(ItemKind::Trigger, Point3::new(0.0, 15.0, 0.0), &STRAIGHT);
        let decision = decide(&mut scene, &mut agent(), &aim_ahead(0.0));
        assert_eq!(decision.outcome, ItemOutcome::Unchanged);
    }
}
