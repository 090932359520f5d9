#![warn(future_incompatible, rust_2018_compatibility, rust_2018_idioms, unused)]
#![cfg_attr(feature = "strict", deny(warnings))]

use brain::{AiProperties, Difficulty, KartAi, World};
use common::{prelude::*, KartProperties, KartState, RaceStanding};
use log::{info, warn};
use nalgebra::Point3;
use simulate::KinematicKart;
use std::{env, error::Error, f32::consts::PI};
use track::{ItemKind, ItemStore, TrackGraph, TrackLayout};

const DT: f32 = 1.0 / 60.0;
const REPORT_INTERVAL: f32 = 5.0;
const ITEM_RESPAWN_TIME: f32 = 3.0;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let difficulty: Difficulty = match args.next() {
        Some(arg) => arg.parse()?,
        None => Difficulty::Hard,
    };
    let num_karts: usize = match args.next() {
        Some(arg) => arg.parse()?,
        None => 4,
    };
    let duration: f32 = match args.next() {
        Some(arg) => arg.parse()?,
        None => 60.0,
    };

    let graph = TrackGraph::new(oval_layout())?;
    info!("track has {} nodes", graph.num_nodes());

    let mut items = ItemStore::new(&graph);
    place_items(&mut items, &graph);

    let model = KinematicKart::new(KartProperties::default());
    let mut karts = start_grid(&graph, num_karts);
    let mut ais: Vec<_> = karts
        .iter()
        .map(|kart| {
            let ai = AiProperties::for_difficulty(difficulty).with_seed(kart.id as u64);
            KartAi::new(kart.id, model.properties().clone(), ai, &graph)
        })
        .collect();
    let mut distance = vec![0.0; karts.len()];
    let mut rescues = vec![0; karts.len()];

    info!("racing {} {:?} karts for {}s", num_karts, difficulty, duration);
    let mut time = 0.0;
    let mut next_report = REPORT_INTERVAL;
    while time < duration {
        let standings = standings(&distance);
        let controls: Vec<_> = ais
            .iter_mut()
            .map(|ai| {
                let world = World::new(&graph, &items, &karts, standings[ai.id()], time);
                ai.tick(&world, DT)
            })
            .collect();

        for (kart, controls) in karts.iter_mut().zip(&controls) {
            if controls.rescue {
                let node = ais[kart.id]
                    .agent()
                    .current_node()
                    .or_else(|| graph.find_road_sector(&kart.position, None))
                    .unwrap_or(0);
                let node = graph.node(node);
                warn!("rescuing kart {} at node {}", kart.id, node.index());
                model.rescue(kart, node.center(), node.forward_axis().bearing());
                rescues[kart.id] += 1;
                continue;
            }
            let before = kart.position;
            model.step(kart, controls, DT);
            distance[kart.id] += (kart.position - before).norm();
        }

        pick_up_items(&mut items, &mut karts, model.properties(), time);

        time += DT;
        if time >= next_report {
            next_report += REPORT_INTERVAL;
            for (kart, ai) in karts.iter().zip(&ais) {
                info!(
                    "t={:.0}s kart {}: node {:?}, {:.1} m/s, {:.0}m driven, {:?}",
                    time,
                    kart.id,
                    ai.agent().current_node(),
                    kart.speed(),
                    distance[kart.id],
                    ai.agent().last_item_outcome(),
                );
            }
        }
    }

    for kart in &karts {
        info!(
            "kart {} drove {:.0}m with {} rescues",
            kart.id, distance[kart.id], rescues[kart.id],
        );
    }
    Ok(())
}

/// Two 100m straights joined by half circles.
fn oval_layout() -> TrackLayout {
    let radius = 40.0;
    let mut points = Vec::new();
    points.extend((0..10).map(|i| Point3::new(radius, -50.0 + i as f32 * 10.0, 0.0)));
    points.extend((0..12).map(|k| {
        let angle = k as f32 * PI / 12.0;
        Point3::new(radius * angle.cos(), 50.0 + radius * angle.sin(), 0.0)
    }));
    points.extend((0..10).map(|i| Point3::new(-radius, 50.0 - i as f32 * 10.0, 0.0)));
    points.extend((0..12).map(|k| {
        let angle = PI + k as f32 * PI / 12.0;
        Point3::new(radius * angle.cos(), -50.0 + radius * angle.sin(), 0.0)
    }));
    TrackLayout::from_centerline(&points, 14.0, true)
}

fn place_items(items: &mut ItemStore, graph: &TrackGraph) {
    for &x in &[-4.0, 0.0, 4.0] {
        items.add(ItemKind::BonusBox, Point3::new(40.0 + x, 0.0, 0.0), graph);
        items.add(ItemKind::NitroSmall, Point3::new(-40.0 + x, 0.0, 0.0), graph);
    }
    items.add(ItemKind::Banana, Point3::new(38.0, 30.0, 0.0), graph);
    items.add(ItemKind::Bubblegum, Point3::new(-42.0, -20.0, 0.0), graph);
    items.add(ItemKind::NitroBig, Point3::new(0.0, 90.0, 0.0), graph);
}

/// Two karts per row behind the start line.
fn start_grid(graph: &TrackGraph, num_karts: usize) -> Vec<KartState> {
    let start = graph.node(0);
    let heading = start.forward_axis().bearing();
    (0..num_karts)
        .map(|id| {
            let side = if id % 2 == 0 { -2.5 } else { 2.5 };
            let back = 3.0 * (id / 2) as f32;
            let offset = start.right_axis() * side - start.forward_axis() * back;
            let position = start.lower_center() + offset.to_3d(0.0);
            KartState::new(id, position, heading)
        })
        .collect()
}

/// Race positions from distance driven.
fn standings(distance: &[f32]) -> Vec<RaceStanding> {
    distance
        .iter()
        .map(|d| RaceStanding {
            position: 1 + distance.iter().filter(|other| *other > d).count(),
            num_karts: distance.len(),
            ..Default::default()
        })
        .collect()
}

fn pick_up_items(
    items: &mut ItemStore,
    karts: &mut [KartState],
    props: &KartProperties,
    time: f32,
) {
    for kart in karts {
        let position = kart.position.to_2d();
        let hit: Vec<_> = items
            .items()
            .iter()
            .filter(|item| item.is_available(time) && item.hits_point(position, props.width))
            .map(|item| (item.id(), item.kind()))
            .collect();
        for (id, kind) in hit {
            match kind {
                ItemKind::Banana | ItemKind::Bubblegum => kart.blocked_vision_time = 1.0,
                ItemKind::NitroBig => kart.refill(props.nitro_big, props.nitro_max),
                ItemKind::NitroSmall => kart.refill(props.nitro_small, props.nitro_max),
                ItemKind::BonusBox => {}
                ItemKind::Trigger => continue,
            }
            info!("kart {} picked up {:?}", kart.id, kind);
            items.disable_until(id, time + ITEM_RESPAWN_TIME);
        }
    }
}
