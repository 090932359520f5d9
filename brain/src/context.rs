use crate::{eeg::Eeg, properties::AiProperties};
use common::{KartProperties, KartState, RaceStanding};
use derive_new::new;
use track::{ItemStore, TrackGraph};

/// Everything about the race one tick of the AI reads. Shared by every kart.
#[derive(new, Copy, Clone)]
pub struct World<'a> {
    pub graph: &'a TrackGraph,
    pub items: &'a ItemStore,
    pub karts: &'a [KartState],
    pub standing: RaceStanding,
    /// Seconds since the start signal.
    pub time: f32,
}

/// The view of the world from one kart during one tick.
pub struct Context<'a> {
    pub graph: &'a TrackGraph,
    pub items: &'a ItemStore,
    pub karts: &'a [KartState],
    pub standing: RaceStanding,
    pub time: f32,
    pub dt: f32,
    pub props: &'a KartProperties,
    pub ai: &'a AiProperties,
    pub eeg: &'a mut Eeg,
    me: &'a KartState,
}

impl<'a> Context<'a> {
    pub fn new(
        world: &World<'a>,
        me: &'a KartState,
        props: &'a KartProperties,
        ai: &'a AiProperties,
        eeg: &'a mut Eeg,
        dt: f32,
    ) -> Self {
        Self {
            graph: world.graph,
            items: world.items,
            karts: world.karts,
            standing: world.standing,
            time: world.time,
            dt,
            props,
            ai,
            eeg,
            me,
        }
    }

    pub fn me(&self) -> &'a KartState {
        self.me
    }

    /// Every other kart still in the race.
    pub fn other_karts(&self) -> impl Iterator<Item = &'a KartState> + 'a {
        let id = self.me.id;
        self.karts.iter().filter(move |k| k.id != id && !k.eliminated)
    }
}
