//! Simple kinematic models used to test the AI without a physics engine.

#![warn(future_incompatible, rust_2018_compatibility, rust_2018_idioms, unused)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub use crate::kart::KinematicKart;

mod kart;
