use common::{geometry::Segment2, prelude::*};
use nalgebra::{Point3, Vector2};
use smallvec::SmallVec;

/// Index of a node in the [`TrackGraph`](crate::TrackGraph).
pub type NodeIndex = usize;

pub(crate) type Links = SmallVec<[NodeIndex; 2]>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrackDirection {
    Straight,
    Left,
    Right,
    /// The stretch ahead cannot be classified, e.g. at a fork.
    Undefined,
}

impl TrackDirection {
    pub fn is_turn(self) -> bool {
        match self {
            TrackDirection::Left | TrackDirection::Right => true,
            TrackDirection::Straight | TrackDirection::Undefined => false,
        }
    }
}

/// A point expressed relative to a node's center line.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrackCoords {
    /// Signed distance from the center line, positive to the right.
    pub lateral: f32,
    /// Distance along the center line from the lower edge.
    pub forward: f32,
}

/// Data precomputed for one outgoing edge of a node.
#[derive(Clone, Debug)]
pub struct SuccessorData {
    pub node: NodeIndex,
    /// Distance between the two nodes' lower centers.
    pub distance: f32,
    /// Bearing of the line between the two quad centers.
    pub bearing: f32,
    pub direction: TrackDirection,
    /// The last node that still shares `direction`.
    pub last_same_direction: NodeIndex,
    /// Hidden from the AI, e.g. a shortcut.
    pub ai_ignored: bool,
}

/// One road slice of the track graph.
#[derive(Clone, Debug)]
pub struct DriveNode {
    pub(crate) index: NodeIndex,
    pub(crate) quad: usize,
    pub(crate) lower_center: Point3<f32>,
    pub(crate) upper_center: Point3<f32>,
    pub(crate) center: Point3<f32>,
    pub(crate) width: f32,
    pub(crate) line: Segment2,
    pub(crate) successors: SmallVec<[SuccessorData; 2]>,
    pub(crate) predecessors: Links,
    /// Only filled in for nodes with more than one successor.
    pub(crate) path_to_node: Vec<Option<u8>>,
}

impl DriveNode {
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn lower_center(&self) -> Point3<f32> {
        self.lower_center
    }

    pub fn upper_center(&self) -> Point3<f32> {
        self.upper_center
    }

    pub fn center(&self) -> Point3<f32> {
        self.center
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn line(&self) -> &Segment2 {
        &self.line
    }

    /// Unit vector along the center line.
    pub fn forward_axis(&self) -> Vector2<f32> {
        self.line.direction().normalize()
    }

    /// Unit vector to the right of the center line.
    pub fn right_axis(&self) -> Vector2<f32> {
        self.line.direction().right()
    }

    pub fn num_successors(&self) -> usize {
        self.successors.len()
    }

    pub fn successor(&self, i: usize) -> NodeIndex {
        self.successors[i].node
    }

    pub fn successors(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.successors.iter().map(|s| s.node)
    }

    pub fn successor_data(&self, i: usize) -> &SuccessorData {
        &self.successors[i]
    }

    pub fn predecessors(&self) -> &[NodeIndex] {
        &self.predecessors
    }

    pub fn distance_to_next(&self, i: usize) -> f32 {
        self.successors[i].distance
    }

    pub fn bearing_to_next(&self, i: usize) -> f32 {
        self.successors[i].bearing
    }

    pub fn direction_data(&self, i: usize) -> (TrackDirection, NodeIndex) {
        let data = &self.successors[i];
        (data.direction, data.last_same_direction)
    }

    /// Convert a world position into this node's frame.
    pub fn spatial_to_track(&self, p: &Point3<f32>) -> TrackCoords {
        let rel = p.to_2d() - self.line.start;
        TrackCoords {
            lateral: rel.dot(&self.right_axis()),
            forward: rel.dot(&self.forward_axis()),
        }
    }

    /// The inverse of [`spatial_to_track`](Self::spatial_to_track). The height
    /// follows the center line.
    pub fn track_to_spatial(&self, coords: TrackCoords) -> Point3<f32> {
        let p = self.line.start
            + self.forward_axis() * coords.forward
            + self.right_axis() * coords.lateral;
        let length = self.line.length();
        let z = if length > 0.0 {
            let t = coords.forward / length;
            self.lower_center.z + (self.upper_center.z - self.lower_center.z) * t
        } else {
            self.lower_center.z
        };
        p.to_3d(z)
    }

    /// Whether a kart of `kart_width` centered at `p` is entirely inside this
    /// node's corridor (laterally).
    pub fn is_inside_corridor(&self, p: &Point3<f32>, kart_width: f32) -> bool {
        let lateral = self.spatial_to_track(p).lateral;
        lateral.abs() + kart_width * 0.5 <= self.width * 0.5
    }
}
