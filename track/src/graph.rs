use crate::{
    error::GraphError,
    layout::TrackLayout,
    node::{DriveNode, Links, NodeIndex, SuccessorData, TrackCoords, TrackDirection},
    quad::Quad,
};
use common::{consts::MAX_STRAIGHT_ANGLE, geometry::Segment2, prelude::*};
use log::{debug, warn};
use nalgebra::Point3;
use ordered_float::OrderedFloat;
use smallvec::SmallVec;

/// Forks store which successor leads to each node in a byte.
const MAX_SUCCESSORS: usize = u8::MAX as usize + 1;

/// The immutable navigation graph of a track.
///
/// Node `i` always covers quad `i`. Nothing in here changes after
/// [`TrackGraph::new`] returns, so one instance can be shared by reference
/// between every kart's AI.
#[derive(Clone, Debug)]
pub struct TrackGraph {
    quads: Vec<Quad>,
    nodes: Vec<DriveNode>,
}

impl TrackGraph {
    pub fn new(layout: TrackLayout) -> Result<Self, GraphError> {
        let TrackLayout { quads, links } = layout;
        if quads.is_empty() {
            return Err(GraphError::Empty);
        }
        if quads.len() != links.len() {
            return Err(GraphError::LinkCountMismatch {
                quads: quads.len(),
                links: links.len(),
            });
        }

        let mut nodes = Vec::with_capacity(quads.len());
        for (index, quad) in quads.iter().enumerate() {
            nodes.push(create_node(index, quad)?);
        }

        for (index, node_links) in links.iter().enumerate() {
            if node_links.len() > MAX_SUCCESSORS {
                return Err(GraphError::TooManySuccessors {
                    node: index,
                    successors: node_links.len(),
                });
            }
            for link in node_links {
                if link.to >= quads.len() {
                    return Err(GraphError::SuccessorOutOfRange {
                        node: index,
                        successor: link.to,
                    });
                }
                let (from, to) = (&nodes[index], &nodes[link.to]);
                let distance = nalgebra::distance(&from.lower_center, &to.lower_center);
                let bearing = (to.center.to_2d() - from.center.to_2d()).bearing();
                nodes[index].successors.push(SuccessorData {
                    node: link.to,
                    distance,
                    bearing,
                    direction: TrackDirection::Undefined,
                    last_same_direction: link.to,
                    ai_ignored: link.ai_ignored,
                });
                nodes[link.to].predecessors.push(index);
            }
        }

        let mut graph = Self { quads, nodes };
        for node in &graph.nodes {
            if node.successors.is_empty() {
                warn!("node {} is a dead end", node.index);
            }
        }
        graph.compute_direction_data();
        graph.compute_paths_to_nodes();
        debug!("built track graph with {} nodes", graph.nodes.len());
        Ok(graph)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, index: NodeIndex) -> &DriveNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[DriveNode] {
        &self.nodes
    }

    pub fn quad(&self, index: usize) -> &Quad {
        &self.quads[index]
    }

    /// Find the node whose quad contains `p`.
    ///
    /// Only `candidates` are tested if given, otherwise every node. When
    /// several quads overlap (bridges, loops) the one `p` is closest above
    /// wins. The graph never guesses: `None` means `p` is off the track.
    pub fn find_road_sector(
        &self,
        p: &Point3<f32>,
        candidates: Option<&[NodeIndex]>,
    ) -> Option<NodeIndex> {
        let quad = |index: NodeIndex| &self.quads[self.nodes[index].quad];
        let matches = |&index: &NodeIndex| quad(index).contains(p);
        let height = |&index: &NodeIndex| OrderedFloat((p.z - quad(index).min_height()).abs());

        match candidates {
            Some(candidates) => candidates.iter().copied().filter(matches).min_by_key(height),
            None => (0..self.nodes.len()).filter(matches).min_by_key(height),
        }
    }

    pub fn spatial_to_track(&self, p: &Point3<f32>, node: NodeIndex) -> TrackCoords {
        self.nodes[node].spatial_to_track(p)
    }

    pub fn track_to_spatial(&self, coords: TrackCoords, node: NodeIndex) -> Point3<f32> {
        self.nodes[node].track_to_spatial(coords)
    }

    /// Which successor of `node` leads towards `destination`.
    ///
    /// Nodes with a single successor always answer 0. For forks, the answer was
    /// determined by flooding from each successor in order, so it is the
    /// first branch that reaches `destination`, not necessarily the shortest.
    pub fn successor_to_reach(&self, node: NodeIndex, destination: NodeIndex) -> Option<usize> {
        let node = &self.nodes[node];
        match node.successors.len() {
            0 => None,
            1 => Some(0),
            _ => node.path_to_node.get(destination).copied().flatten().map(usize::from),
        }
    }

    fn compute_direction_data(&mut self) {
        for current in 0..self.nodes.len() {
            for succ_index in 0..self.nodes[current].successors.len() {
                let (direction, last) = self.determine_direction(current, succ_index);
                let data = &mut self.nodes[current].successors[succ_index];
                data.direction = direction;
                data.last_same_direction = last;
            }
        }
    }

    /// Classify the stretch of road starting with edge `current -> succ`, and
    /// find how far that classification extends along the main line.
    fn determine_direction(
        &self,
        current: NodeIndex,
        succ_index: usize,
    ) -> (TrackDirection, NodeIndex) {
        let next = self.nodes[current].successor(succ_index);
        match self.nodes[next].successors.len() {
            0 => return (TrackDirection::Straight, next),
            1 => {}
            _ => return (TrackDirection::Undefined, next),
        }

        let angle_current = self.nodes[current].bearing_to_next(succ_index);
        let mut angle_next = self.nodes[next].bearing_to_next(0);
        let direction = classify_turn(angle_next - angle_current);

        let mut last = next;
        let mut node = self.nodes[next].successor(0);
        for _ in 0..self.nodes.len() {
            if node == current || self.nodes[node].successors.len() != 1 {
                break;
            }
            let angle = self.nodes[node].bearing_to_next(0);
            if classify_turn(angle - angle_next) != direction {
                break;
            }
            last = node;
            angle_next = angle;
            node = self.nodes[node].successor(0);
        }
        (direction, last)
    }

    fn compute_paths_to_nodes(&mut self) {
        let num_nodes = self.nodes.len();
        for index in 0..num_nodes {
            if self.nodes[index].successors.len() < 2 {
                continue;
            }

            let mut path = vec![None; num_nodes];
            path[index] = Some(0);
            for (succ_index, succ) in self.nodes[index].successors().enumerate() {
                self.mark_reachable(succ, succ_index as u8, &mut path);
            }

            let unreachable = path.iter().filter(|p| p.is_none()).count();
            if unreachable > 0 {
                warn!("{} nodes cannot be reached from fork node {}", unreachable, index);
            }
            self.nodes[index].path_to_node = path;
        }
    }

    /// Mark every node reachable from `start` that has no path yet with
    /// `succ_index`.
    fn mark_reachable(&self, start: NodeIndex, succ_index: u8, path: &mut [Option<u8>]) {
        let mut stack: SmallVec<[NodeIndex; 16]> = SmallVec::new();
        stack.push(start);
        while let Some(node) = stack.pop() {
            if path[node].is_some() {
                continue;
            }
            path[node] = Some(succ_index);
            stack.extend(self.nodes[node].successors().filter(|&s| path[s].is_none()));
        }
    }
}

fn create_node(index: NodeIndex, quad: &Quad) -> Result<DriveNode, GraphError> {
    let lower_center = quad.lower_center();
    let upper_center = quad.upper_center();
    let line = Segment2::new(lower_center.to_2d(), upper_center.to_2d());
    let width = quad.width();
    let finite = quad.corners().iter().all(|p| p.coords.iter().all(|x| x.is_finite()));
    if !finite || line.length() <= 0.0 || width <= 0.0 {
        return Err(GraphError::DegenerateQuad(index));
    }

    Ok(DriveNode {
        index,
        quad: index,
        lower_center,
        upper_center,
        center: quad.center(),
        width,
        line,
        successors: SmallVec::new(),
        predecessors: Links::new(),
        path_to_node: Vec::new(),
    })
}

fn classify_turn(angle: f32) -> TrackDirection {
    let angle = angle.normalize_angle();
    if angle.abs() < MAX_STRAIGHT_ANGLE {
        TrackDirection::Straight
    } else if angle > 0.0 {
        TrackDirection::Left
    } else {
        TrackDirection::Right
    }
}
