use crate::{node::NodeIndex, quad::Quad};
use common::prelude::*;
use itertools::Itertools;
use nalgebra::{Point3, Vector2};
use std::ops::Range;

/// An outgoing edge in a [`TrackLayout`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub to: NodeIndex,
    /// The AI should not take this edge unless it has no other choice.
    pub ai_ignored: bool,
}

impl Link {
    pub fn new(to: NodeIndex) -> Self {
        Self {
            to,
            ai_ignored: false,
        }
    }

    pub fn hidden(to: NodeIndex) -> Self {
        Self {
            to,
            ai_ignored: true,
        }
    }
}

/// Parsed track content: quads plus explicit successor links. This is what the
/// content loader hands over; [`TrackGraph::new`](crate::TrackGraph::new)
/// turns it into the navigation graph.
#[derive(Clone, Debug, Default)]
pub struct TrackLayout {
    pub quads: Vec<Quad>,
    /// One list of outgoing links per quad.
    pub links: Vec<Vec<Link>>,
}

impl TrackLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Append one quad with no links yet. Returns its index.
    pub fn push_quad(&mut self, quad: Quad) -> NodeIndex {
        self.quads.push(quad);
        self.links.push(Vec::new());
        self.quads.len() - 1
    }

    pub fn link(&mut self, from: NodeIndex, link: Link) {
        self.links[from].push(link);
    }

    /// Build a road of constant `width` along a center line polyline. Each
    /// pair of consecutive points becomes one quad; neighboring quads share
    /// their edges exactly.
    pub fn from_centerline(points: &[Point3<f32>], width: f32, closed: bool) -> Self {
        let mut layout = Self::new();
        let range = layout.append_strip(points, width, closed);
        if closed && !range.is_empty() {
            layout.link(range.end - 1, Link::new(range.start));
        }
        layout
    }

    /// Append a strip of quads along `points`, linked to each other in order.
    /// Returns the indices of the new quads. Linking the strip to the rest of
    /// the layout is left to the caller.
    pub fn append_strip(
        &mut self,
        points: &[Point3<f32>],
        width: f32,
        closed: bool,
    ) -> Range<NodeIndex> {
        let start = self.quads.len();
        if points.len() < 2 {
            return start..start;
        }

        let rights = edge_normals(points, closed);
        let half = width * 0.5;
        let count = if closed { points.len() } else { points.len() - 1 };
        for i in 0..count {
            let j = (i + 1) % points.len();
            let (a, b) = (points[i], points[j]);
            let (ra, rb) = (rights[i].to_3d(0.0) * half, rights[j].to_3d(0.0) * half);
            self.push_quad(Quad::new(a - ra, a + ra, b + rb, b - rb));
        }
        let end = self.quads.len();
        for i in start..end - 1 {
            self.link(i, Link::new(i + 1));
        }
        start..end
    }
}

/// Per point, the unit vector to the right of the road, averaged between the
/// incoming and outgoing segment so that quads meet without gaps.
fn edge_normals(points: &[Point3<f32>], closed: bool) -> Vec<Vector2<f32>> {
    let n = points.len();
    let mut segments: Vec<Vector2<f32>> = points
        .iter()
        .tuple_windows()
        .map(|(a, b)| (b.to_2d() - a.to_2d()).normalize())
        .collect();
    if closed {
        segments.push((points[0].to_2d() - points[n - 1].to_2d()).normalize());
    }

    (0..n)
        .map(|i| {
            let outgoing = segments.get(i).copied();
            let incoming = if i > 0 {
                segments.get(i - 1).copied()
            } else if closed {
                segments.last().copied()
            } else {
                None
            };
            let tangent = match (incoming, outgoing) {
                (Some(a), Some(b)) => a + b,
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => Vector2::y(),
            };
            tangent.right()
        })
        .collect()
}
