use crate::{graph::TrackGraph, node::NodeIndex};
use common::{
    consts::{ITEM_AVOIDANCE_OFFSET, ITEM_HIT_RADIUS},
    geometry::Segment2,
    prelude::*,
};
use log::warn;
use nalgebra::{Point2, Point3};

pub type ItemId = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    BonusBox,
    NitroBig,
    NitroSmall,
    Banana,
    Bubblegum,
    /// Invisible trigger volume, not something a kart drives at or around.
    Trigger,
}

impl ItemKind {
    /// The item system's numeric codes.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ItemKind::BonusBox),
            1 => Some(ItemKind::Banana),
            2 => Some(ItemKind::NitroBig),
            3 => Some(ItemKind::NitroSmall),
            4 => Some(ItemKind::Bubblegum),
            5 => Some(ItemKind::Trigger),
            _ => None,
        }
    }

    pub fn is_hazard(self) -> bool {
        match self {
            ItemKind::Banana | ItemKind::Bubblegum => true,
            ItemKind::BonusBox | ItemKind::NitroBig | ItemKind::NitroSmall | ItemKind::Trigger => {
                false
            }
        }
    }
}

/// An item lying on the track.
#[derive(Clone, Debug)]
pub struct Item {
    id: ItemId,
    kind: ItemKind,
    position: Point3<f32>,
    disabled_until: f32,
    node: Option<NodeIndex>,
    distance_from_center: f32,
    /// Left and right of the item, far enough that a kart passing through
    /// either point misses it.
    avoidance_points: Option<[Point3<f32>; 2]>,
}

impl Item {
    /// Create an item and precompute where it sits on `graph`.
    pub fn new(id: ItemId, kind: ItemKind, position: Point3<f32>, graph: &TrackGraph) -> Self {
        let node = graph.find_road_sector(&position, None);
        let (distance_from_center, avoidance_points) = match node {
            Some(node) => {
                let node = graph.node(node);
                let right = node.right_axis().to_3d(0.0) * ITEM_AVOIDANCE_OFFSET;
                (
                    node.spatial_to_track(&position).lateral,
                    Some([position - right, position + right]),
                )
            }
            None => (0.0, None),
        };
        Self {
            id,
            kind,
            position,
            disabled_until: 0.0,
            node,
            distance_from_center,
            avoidance_points,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    /// The node the item lies on, `None` if it is off the track.
    pub fn node(&self) -> Option<NodeIndex> {
        self.node
    }

    /// Signed lateral offset in its node's frame, positive to the right.
    pub fn distance_from_center(&self) -> f32 {
        self.distance_from_center
    }

    pub fn disabled_until(&self) -> f32 {
        self.disabled_until
    }

    pub fn is_available(&self, time: f32) -> bool {
        time >= self.disabled_until
    }

    /// The point to drive through to pass the item on its left (`left`) or
    /// right side.
    pub fn avoidance_point(&self, left: bool) -> Option<Point3<f32>> {
        self.avoidance_points
            .map(|points| if left { points[0] } else { points[1] })
    }

    /// Whether a kart of `kart_width` centered at `p` touches the item.
    pub fn hits_point(&self, p: Point2<f32>, kart_width: f32) -> bool {
        (p - self.position.to_2d()).norm() < ITEM_HIT_RADIUS + kart_width * 0.5
    }

    /// Whether a kart driving along `line` touches the item.
    pub fn hits_line(&self, line: &Segment2, kart_width: f32) -> bool {
        self.hits_point(line.closest_point(self.position.to_2d()), kart_width)
    }
}

/// The items on a track, bucketed by the node they lie on. Owned and refreshed
/// by the item system; the AI only reads it.
#[derive(Clone, Debug, Default)]
pub struct ItemStore {
    items: Vec<Item>,
    by_node: Vec<Vec<ItemId>>,
}

impl ItemStore {
    pub fn new(graph: &TrackGraph) -> Self {
        Self {
            items: Vec::new(),
            by_node: vec![Vec::new(); graph.num_nodes()],
        }
    }

    pub fn add(&mut self, kind: ItemKind, position: Point3<f32>, graph: &TrackGraph) -> ItemId {
        let id = self.items.len();
        let item = Item::new(id, kind, position, graph);
        match item.node {
            Some(node) => self.by_node[node].push(id),
            None => warn!("item {} at {:?} is not on the track", id, position),
        }
        self.items.push(item);
        id
    }

    /// Add an item given the item system's numeric kind. Unknown kinds are
    /// skipped.
    pub fn add_with_code(
        &mut self,
        code: u8,
        position: Point3<f32>,
        graph: &TrackGraph,
    ) -> Option<ItemId> {
        match ItemKind::from_code(code) {
            Some(kind) => Some(self.add(kind, position, graph)),
            None => {
                warn!("ignoring item of unknown kind {} at {:?}", code, position);
                None
            }
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn items_in_node(&self, node: NodeIndex) -> impl Iterator<Item = &Item> + '_ {
        self.by_node
            .get(node)
            .into_iter()
            .flatten()
            .map(move |&id| &self.items[id])
    }

    /// Mark an item as collected until `time`.
    pub fn disable_until(&mut self, id: ItemId, time: f32) {
        if let Some(item) = self.items.get_mut(id) {
            item.disabled_until = time;
        }
    }

}
