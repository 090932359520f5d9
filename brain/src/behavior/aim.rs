use crate::{agent::AgentState, context::Context, eeg::Drawable, helpers::path::AgentPath};
use common::{consts::MAX_ITERATIONS, prelude::*, KartProperties};
use derive_new::new;
use nalgebra::Point3;
use nameof::name_of_type;
use track::{NodeIndex, TrackCoords, TrackGraph};

/// Never look further ahead than this many nodes.
const MAX_AIM_NODES: usize = 100;
/// Bends sharper than this stop the look-ahead of
/// [`AimStrategy::SharpTurnAware`].
const SHARP_TURN_ANGLE: f32 = 1.5;
/// How far sideways the kart aims when dodging another kart.
const ESCAPE_DISTANCE: f32 = 5.0;

/// How the furthest safely reachable point ahead is found.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AimStrategy {
    /// Test the line to each candidate in the frame of the last accepted node.
    Fixed,
    /// Like `Fixed`, but never look past a sharp bend.
    SharpTurnAware,
    /// Test every sample in the frame of the node it actually lies on.
    Localized,
}

/// Where the kart is steering to.
#[derive(new, Copy, Clone, Debug, PartialEq)]
pub struct AimPoint {
    pub position: Point3<f32>,
    pub node: NodeIndex,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl AimStrategy {
    /// Walk the path ahead of `current` and return the center of the furthest
    /// node the kart can drive to in a straight line without leaving the road.
    pub fn find_aim_point(
        self,
        graph: &TrackGraph,
        path: &AgentPath,
        current: NodeIndex,
        position: &Point3<f32>,
        props: &KartProperties,
    ) -> AimPoint {
        let mut last = some_or_else!(path.next(current), {
            return AimPoint::new(graph.node(current).center(), current);
        });
        let current_bearing = graph.node(current).forward_axis().bearing();
        // The nodes from the kart to the candidate, for `Localized`.
        let mut window = vec![current, last];

        for _ in 0..MAX_AIM_NODES {
            let candidate = some_or_else!(path.next(last), { break });
            if candidate == current {
                break;
            }
            let target = graph.node(candidate).center();

            if self == AimStrategy::SharpTurnAware {
                let bend = graph.node(candidate).forward_axis().bearing() - current_bearing;
                if bend.normalize_angle().abs() > SHARP_TURN_ANGLE {
                    return AimPoint::new(target, candidate);
                }
            }

            window.push(candidate);
            if !self.line_is_clear(graph, &window, last, position, &target, props) {
                break;
            }
            last = candidate;
        }

        AimPoint::new(graph.node(last).center(), last)
    }

    fn line_is_clear(
        self,
        graph: &TrackGraph,
        window: &[NodeIndex],
        last: NodeIndex,
        from: &Point3<f32>,
        to: &Point3<f32>,
        props: &KartProperties,
    ) -> bool {
        let delta = to - from;
        let length = delta.to_2d().norm();
        let steps = ((length / (props.length * 0.5)) as usize).max(2).min(MAX_ITERATIONS);

        (1..=steps).all(|i| {
            let sample = from + delta * (i as f32 / steps as f32);
            let node = match self {
                AimStrategy::Fixed | AimStrategy::SharpTurnAware => last,
                AimStrategy::Localized => {
                    some_or_else!(graph.find_road_sector(&sample, Some(window)), {
                        return false;
                    })
                }
            };
            graph.node(node).is_inside_corridor(&sample, props.width)
        })
    }
}

/// Pick this tick's aim point: back onto the road if the kart is off it, away
/// from an imminent kart collision, otherwise as far ahead as the strategy
/// allows.
pub fn select_aim_point(
    ctx: &mut Context<'_>,
    agent: &mut AgentState,
    current: NodeIndex,
) -> AimPoint {
    let me = ctx.me();
    let node = ctx.graph.node(current);
    let coords = node.spatial_to_track(&me.position);

    if coords.lateral.abs() > node.width() * 0.5 {
        let next = agent.path.next(current).unwrap_or(current);
        ctx.eeg.print_value("aim", "off track");
        return AimPoint::new(ctx.graph.node(next).center(), next);
    }

    match agent.crash.kart {
        Some(other) if !agent.crash.road => {
            let side = match agent.escape_side {
                Some(side) => side,
                None => {
                    let other_lateral = ctx
                        .karts
                        .iter()
                        .find(|k| k.id == other)
                        .map_or(0.0, |k| node.spatial_to_track(&k.position).lateral);
                    let side = if coords.lateral > other_lateral {
                        Side::Right
                    } else {
                        Side::Left
                    };
                    ctx.eeg.log(
                        name_of_type!(AimPoint),
                        format!("escaping {:?} of kart {}", side, other),
                    );
                    agent.escape_side = Some(side);
                    side
                }
            };
            let aim = escape_point(ctx.graph, current, coords, side);
            ctx.eeg.print_value("aim", side);
            return aim;
        }
        Some(_) => {}
        None => agent.escape_side = None,
    }

    let aim = ctx
        .ai
        .aim_strategy
        .find_aim_point(ctx.graph, &agent.path, current, &me.position, ctx.props);
    ctx.eeg.draw(Drawable::Line(me.position, aim.position));
    aim
}

/// A point straight to the side of the kart, across the track direction,
/// clamped to the road.
fn escape_point(graph: &TrackGraph, node: NodeIndex, kart: TrackCoords, side: Side) -> AimPoint {
    let half_width = graph.node(node).width() * 0.5;
    let lateral = match side {
        Side::Left => kart.lateral - ESCAPE_DISTANCE,
        Side::Right => kart.lateral + ESCAPE_DISTANCE,
    };
    let coords = TrackCoords {
        lateral: lateral.max(-half_width).min(half_width),
        forward: kart.forward,
    };
    AimPoint::new(graph.track_to_spatial(coords, node), node)
}

/// Whether `aim` keeps the kart on the road: its offset from its node's center
/// line is at most half the road plus half a kart.
pub fn is_corridor_safe(graph: &TrackGraph, aim: &AimPoint, kart_width: f32) -> bool {
    let node = graph.node(aim.node);
    let lateral = node.spatial_to_track(&aim.position).lateral;
    lateral.abs() <= node.width() * 0.5 + kart_width * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        behavior::crash::CrashReport,
        context::test_support::Scene,
        properties::{AiProperties, Difficulty},
    };
    use approx::assert_abs_diff_eq;
    use brain_test_data::{HAIRPIN, OVAL, STRAIGHT};
    use rand::{rngs::StdRng, SeedableRng};
    use std::f32::consts::FRAC_PI_2;
    use track::{Link, Quad, TrackLayout};

    const STRATEGIES: [AimStrategy; 3] = [
        AimStrategy::Fixed,
        AimStrategy::SharpTurnAware,
        AimStrategy::Localized,
    ];

    fn path(graph: &TrackGraph) -> AgentPath {
        AgentPath::compute(graph, None, &mut StdRng::seed_from_u64(0))
    }

    fn agent(graph: &TrackGraph) -> AgentState {
        AgentState::new(graph, &AiProperties::for_difficulty(Difficulty::Hard), 0, None)
    }

    #[test]
    fn centered_kart_sees_to_the_end_of_a_straight() {
        let path = path(&STRAIGHT);
        let props = KartProperties {
            width: 2.0,
            ..Default::default()
        };
        for &strategy in &STRATEGIES {
            let position = Point3::new(0.0, 5.0, 0.0);
            let aim = strategy.find_aim_point(&STRAIGHT, &path, 0, &position, &props);
            assert_eq!(aim.node, 19, "{:?}", strategy);
            assert_abs_diff_eq!(aim.position, STRAIGHT.node(19).center());
        }
    }

    #[test]
    fn aim_points_are_corridor_safe() {
        let props = KartProperties::default();
        for graph in [&*OVAL, &*HAIRPIN].iter() {
            let path = path(graph);
            for node in graph.nodes() {
                for &lateral in &[-0.4, 0.0, 0.4] {
                    let coords = TrackCoords {
                        lateral: lateral * node.width(),
                        forward: 1.0,
                    };
                    let position = node.track_to_spatial(coords);
                    for &strategy in &STRATEGIES {
                        let aim =
                            strategy.find_aim_point(graph, &path, node.index(), &position, &props);
                        assert!(is_corridor_safe(graph, &aim, props.width));
                    }
                }
            }
        }
    }

    #[test]
    fn curve_limits_the_view() {
        let path = path(&OVAL);
        let props = KartProperties::default();
        for &strategy in &STRATEGIES {
            let position = Point3::new(30.0, -45.0, 0.0);
            let aim = strategy.find_aim_point(&OVAL, &path, 0, &position, &props);
            // Somewhere past the start, but not around the far end.
            assert!(aim.node > 1 && aim.node < 20, "{:?}: {}", strategy, aim.node);
        }
    }

    /// Three straight nodes, then the road turns left by 90 degrees.
    fn elbow() -> TrackGraph {
        let p = |x: f32, y: f32| Point3::new(x, y, 0.0);
        let mut layout = TrackLayout::new();
        for i in 0..4 {
            let y = i as f32 * 10.0;
            layout.push_quad(Quad::new(p(-5.0, y), p(5.0, y), p(5.0, y + 10.0), p(-5.0, y + 10.0)));
        }
        layout.push_quad(Quad::new(p(0.0, 40.0), p(0.0, 50.0), p(-10.0, 50.0), p(-10.0, 40.0)));
        layout.push_quad(Quad::new(p(-10.0, 40.0), p(-10.0, 50.0), p(-20.0, 50.0), p(-20.0, 40.0)));
        for i in 0..5 {
            layout.link(i, Link::new(i + 1));
        }
        TrackGraph::new(layout).unwrap()
    }

    #[test]
    fn sharp_turn_stops_the_walk() {
        let graph = elbow();
        let path = path(&graph);
        let props = KartProperties::default();
        let position = Point3::new(0.0, 5.0, 0.0);

        // The straight line into the bend clips the corner in the frame of the
        // last straight node.
        let fixed = AimStrategy::Fixed.find_aim_point(&graph, &path, 0, &position, &props);
        assert_eq!(fixed.node, 3);
        // Aims right at the first node past the bend.
        let sharp = AimStrategy::SharpTurnAware.find_aim_point(&graph, &path, 0, &position, &props);
        assert_eq!(sharp.node, 4);
        // Just past the corner the line hugs the inside edge of the bend.
        let localized = AimStrategy::Localized.find_aim_point(&graph, &path, 0, &position, &props);
        assert_eq!(localized.node, 3);
    }

    #[test]
    fn off_track_kart_aims_at_next_node() {
        let mut scene =
            Scene::new(&STRAIGHT).with_kart(Point3::new(6.0, 25.0, 0.0), FRAC_PI_2, 5.0);
        let mut agent = agent(&STRAIGHT);
        let aim = select_aim_point(&mut scene.context(0), &mut agent, 2);
        assert_eq!(aim.node, 3);
        assert_abs_diff_eq!(aim.position, STRAIGHT.node(3).center());
    }

    #[test]
    fn escape_side_is_held() {
        let mut scene = Scene::new(&STRAIGHT)
            .with_kart(Point3::new(1.0, 25.0, 0.0), FRAC_PI_2, 5.0)
            .with_kart(Point3::new(-1.0, 28.0, 0.0), FRAC_PI_2, 6.0);
        let mut agent = agent(&STRAIGHT);
        agent.crash = CrashReport {
            kart: Some(1),
            road: false,
        };

        let aim = select_aim_point(&mut scene.context(0), &mut agent, 2);
        assert_eq!(agent.escape_side, Some(Side::Right));
        assert!(aim.position.x > 1.0);
        assert_abs_diff_eq!(aim.position.y, 25.0, epsilon = 1e-4);
        assert!(is_corridor_safe(&STRAIGHT, &aim, scene.props.width));

        // The other kart moves over, the side does not flip.
        scene.karts[1].position.x = 3.0;
        select_aim_point(&mut scene.context(0), &mut agent, 2);
        assert_eq!(agent.escape_side, Some(Side::Right));

        agent.crash = CrashReport::default();
        let aim = select_aim_point(&mut scene.context(0), &mut agent, 2);
        assert_eq!(agent.escape_side, None);
        assert_eq!(aim.node, 19);
    }

    #[test]
    fn road_departure_disables_escape() {
        let mut scene = Scene::new(&STRAIGHT)
            .with_kart(Point3::new(1.0, 25.0, 0.0), FRAC_PI_2, 5.0)
            .with_kart(Point3::new(-1.0, 28.0, 0.0), FRAC_PI_2, 6.0);
        let mut agent = agent(&STRAIGHT);
        agent.crash = CrashReport {
            kart: Some(1),
            road: true,
        };
        let aim = select_aim_point(&mut scene.context(0), &mut agent, 2);
        assert_eq!(agent.escape_side, None);
        assert!(aim.node > 2);
    }
}
