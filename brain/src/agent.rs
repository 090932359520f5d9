use crate::{
    behavior::{
        aim::{AimPoint, Side},
        crash::CrashReport,
        items::ItemOutcome,
        skid::SkidDecider,
    },
    helpers::path::AgentPath,
    properties::AiProperties,
};
use common::{geometry::Circle, KartId};
use rand::{rngs::StdRng, Rng, SeedableRng};
use track::{ItemId, NodeIndex, TrackDirection, TrackGraph};

/// Everything one kart's AI remembers from one tick to the next.
pub struct AgentState {
    pub(crate) kart: KartId,
    pub(crate) path: AgentPath,
    pub(crate) route_target: Option<NodeIndex>,
    pub(crate) current_node: Option<NodeIndex>,
    pub(crate) track_direction: TrackDirection,
    pub(crate) last_direction_node: NodeIndex,
    /// The circle the kart is driving around, while in a turn.
    pub(crate) curve: Option<Circle>,
    pub(crate) crash: CrashReport,
    pub(crate) escape_side: Option<Side>,
    pub(crate) item_to_collect: Option<ItemId>,
    /// The last item that was rolled for, and whether it was wanted.
    pub(crate) last_item_random: Option<(ItemId, bool)>,
    pub(crate) skid: SkidDecider,
    pub(crate) steer: f32,
    pub(crate) stuck_time: f32,
    pub(crate) start_delay: f32,
    pub(crate) last_aim: Option<AimPoint>,
    pub(crate) last_item_outcome: ItemOutcome,
    pub(crate) rng: StdRng,
}

impl AgentState {
    pub fn new(
        graph: &TrackGraph,
        ai: &AiProperties,
        kart: KartId,
        route_target: Option<NodeIndex>,
    ) -> Self {
        let seed = ai.seed ^ (kart as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mut rng = StdRng::seed_from_u64(seed);
        let start_delay = if ai.max_start_delay > ai.min_start_delay {
            rng.random_range(ai.min_start_delay..ai.max_start_delay)
        } else {
            ai.min_start_delay
        };
        let path = AgentPath::compute(graph, route_target, &mut rng);

        Self {
            kart,
            path,
            route_target,
            current_node: None,
            track_direction: TrackDirection::Straight,
            last_direction_node: 0,
            curve: None,
            crash: CrashReport::default(),
            escape_side: None,
            item_to_collect: None,
            last_item_random: None,
            skid: SkidDecider::default(),
            steer: 0.0,
            stuck_time: 0.0,
            start_delay,
            last_aim: None,
            last_item_outcome: ItemOutcome::Unchanged,
            rng,
        }
    }

    pub fn kart(&self) -> KartId {
        self.kart
    }

    pub fn path(&self) -> &AgentPath {
        &self.path
    }

    pub fn route_target(&self) -> Option<NodeIndex> {
        self.route_target
    }

    /// The node the kart was last localized on.
    pub fn current_node(&self) -> Option<NodeIndex> {
        self.current_node
    }

    pub fn track_direction(&self) -> TrackDirection {
        self.track_direction
    }

    pub fn crash(&self) -> CrashReport {
        self.crash
    }

    pub fn item_to_collect(&self) -> Option<ItemId> {
        self.item_to_collect
    }

    pub fn start_delay(&self) -> f32 {
        self.start_delay
    }

    /// Where the kart steered to on the last full tick.
    pub fn last_aim(&self) -> Option<AimPoint> {
        self.last_aim
    }

    pub fn last_item_outcome(&self) -> ItemOutcome {
        self.last_item_outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Difficulty;
    use brain_test_data::STRAIGHT;

    #[test]
    fn start_delay_within_range() {
        let ai = AiProperties::for_difficulty(Difficulty::Medium);
        for kart in 0..20 {
            let agent = AgentState::new(&STRAIGHT, &ai, kart, None);
            assert!(agent.start_delay() >= ai.min_start_delay);
            assert!(agent.start_delay() < ai.max_start_delay);
        }

        let fixed = ai.with_start_delay(0.3, 0.3);
        assert_eq!(AgentState::new(&STRAIGHT, &fixed, 0, None).start_delay(), 0.3);
    }

    #[test]
    fn seed_and_kart_pick_the_delay() {
        let ai = AiProperties::for_difficulty(Difficulty::Easy).with_seed(7);
        let a = AgentState::new(&STRAIGHT, &ai, 3, None);
        let b = AgentState::new(&STRAIGHT, &ai, 3, None);
        assert_eq!(a.start_delay(), b.start_delay());
    }
}
