//! Canned tracks for tests.

#![warn(future_incompatible, rust_2018_compatibility, rust_2018_idioms, unused)]
#![cfg_attr(feature = "strict", deny(warnings))]

use lazy_static::lazy_static;
use nalgebra::Point3;
use std::f32::consts::PI;
use track::{Link, Quad, TrackGraph, TrackLayout};

lazy_static! {
    /// 20 nodes of 10 units along +Y, width 10, ending in a dead end.
    pub static ref STRAIGHT: TrackGraph = build(straight());
    /// A closed counter-clockwise oval: two 100 unit straights joined by
    /// half circles of radius 30, width 12.
    pub static ref OVAL: TrackGraph = build(oval());
    /// A straight that forks into two parallel branches which merge again.
    pub static ref FORK: TrackGraph = build(fork());
    /// Up along +Y, a tight left U-turn, and back down.
    pub static ref HAIRPIN: TrackGraph = build(hairpin());
}

/// Where a kart sits on the start line of [`OVAL`], and its heading.
pub fn oval_start() -> (Point3<f32>, f32) {
    (Point3::new(30.0, -45.0, 0.0), PI / 2.0)
}

/// The two branches of [`FORK`], as inclusive node ranges.
pub const FORK_LEFT_BRANCH: (usize, usize) = (5, 8);
pub const FORK_RIGHT_BRANCH: (usize, usize) = (9, 12);
/// Where the branches of [`FORK`] merge.
pub const FORK_MERGE: usize = 13;

fn build(layout: TrackLayout) -> TrackGraph {
    match TrackGraph::new(layout) {
        Ok(graph) => graph,
        Err(err) => panic!("bad fixture track: {}", err),
    }
}

fn straight() -> TrackLayout {
    let points: Vec<_> = (0..=20)
        .map(|i| Point3::new(0.0, i as f32 * 10.0, 0.0))
        .collect();
    TrackLayout::from_centerline(&points, 10.0, false)
}

fn oval() -> TrackLayout {
    let radius = 30.0;
    let arc = |center_y: f32, start: f32, k: usize| {
        let angle = start + k as f32 * PI / 10.0;
        Point3::new(radius * angle.cos(), center_y + radius * angle.sin(), 0.0)
    };

    let mut points = Vec::new();
    points.extend((0..10).map(|i| Point3::new(radius, -50.0 + i as f32 * 10.0, 0.0)));
    points.extend((0..10).map(|k| arc(50.0, 0.0, k)));
    points.extend((0..10).map(|i| Point3::new(-radius, 50.0 - i as f32 * 10.0, 0.0)));
    points.extend((0..10).map(|k| arc(-50.0, PI, k)));
    TrackLayout::from_centerline(&points, 12.0, true)
}

fn fork() -> TrackLayout {
    let quad = |x: f32, y: f32| {
        Quad::new(
            Point3::new(x - 3.0, y, 0.0),
            Point3::new(x + 3.0, y, 0.0),
            Point3::new(x + 3.0, y + 10.0, 0.0),
            Point3::new(x - 3.0, y + 10.0, 0.0),
        )
    };

    let mut layout = TrackLayout::new();
    let strip = |layout: &mut TrackLayout, x: f32, y0: f32, count: usize| {
        let first = layout.len();
        for i in 0..count {
            layout.push_quad(quad(x, y0 + i as f32 * 10.0));
            if i > 0 {
                layout.link(first + i - 1, Link::new(first + i));
            }
        }
        (first, first + count - 1)
    };

    let (_, main_end) = strip(&mut layout, 0.0, 0.0, 5);
    let (left_start, left_end) = strip(&mut layout, -4.0, 50.0, 4);
    let (right_start, right_end) = strip(&mut layout, 4.0, 50.0, 4);
    let (merge, _) = strip(&mut layout, 0.0, 90.0, 6);

    layout.link(main_end, Link::new(left_start));
    layout.link(main_end, Link::new(right_start));
    layout.link(left_end, Link::new(merge));
    layout.link(right_end, Link::new(merge));
    layout
}

fn hairpin() -> TrackLayout {
    let radius = 8.0;
    let mut points = Vec::new();
    points.extend((0..6).map(|i| Point3::new(0.0, i as f32 * 10.0, 0.0)));
    points.extend((0..6).map(|k| {
        let angle = k as f32 * PI / 6.0;
        Point3::new(-radius + radius * angle.cos(), 60.0 + radius * angle.sin(), 0.0)
    }));
    points.extend((0..7).map(|i| Point3::new(-2.0 * radius, 60.0 - i as f32 * 10.0, 0.0)));
    TrackLayout::from_centerline(&points, 8.0, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_build() {
        assert_eq!(STRAIGHT.num_nodes(), 20);
        assert_eq!(OVAL.num_nodes(), 40);
        assert_eq!(FORK.num_nodes(), 19);
        assert_eq!(HAIRPIN.num_nodes(), 18);
    }

    #[test]
    fn oval_start_is_on_the_track() {
        assert_eq!(OVAL.find_road_sector(&oval_start().0, None), Some(0));
    }

    #[test]
    fn fork_topology() {
        let fork = FORK.node(FORK_LEFT_BRANCH.0 - 1);
        assert_eq!(fork.num_successors(), 2);
        assert_eq!(fork.successor(0), FORK_LEFT_BRANCH.0);
        assert_eq!(fork.successor(1), FORK_RIGHT_BRANCH.0);
        assert_eq!(FORK.node(FORK_MERGE).predecessors().len(), 2);
    }
}
