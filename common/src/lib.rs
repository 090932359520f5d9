#![warn(future_incompatible, rust_2018_compatibility, rust_2018_idioms, unused)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub use crate::kart::{
    KartControls, KartId, KartProperties, KartState, RaceStanding, SkidControl, Slipstream,
};

#[macro_use]
mod macros;

pub mod consts;
pub mod ext;
pub mod geometry;
mod kart;
pub mod physics;
pub mod prelude;
