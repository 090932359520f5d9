//! The driving AI: each tick, work out where on the track the kart is, pick a
//! point to steer at, and turn that into controls.

#![warn(future_incompatible, rust_2018_compatibility, rust_2018_idioms, unused)]
#![cfg_attr(feature = "strict", deny(warnings))]

#[macro_use]
extern crate common;

pub use crate::{
    agent::AgentState,
    behavior::{
        aim::{AimPoint, AimStrategy},
        crash::CrashReport,
        items::ItemOutcome,
    },
    context::World,
    controller::KartAi,
    eeg::{Drawable, Eeg},
    properties::{AiProperties, Difficulty, NitroUsage, ParseDifficultyError, StandingProbability},
};

mod agent;
pub mod behavior;
mod context;
mod controller;
mod eeg;
pub mod helpers;
mod properties;
