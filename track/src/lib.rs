//! The navigation graph the AI drives on: one node per quadrilateral road
//! slice, linked to its successors. Built once when a track is loaded and
//! read-only afterwards.

#![warn(future_incompatible, rust_2018_compatibility, rust_2018_idioms, unused)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub use crate::{
    error::GraphError,
    graph::TrackGraph,
    items::{Item, ItemId, ItemKind, ItemStore},
    layout::{Link, TrackLayout},
    node::{DriveNode, NodeIndex, SuccessorData, TrackCoords, TrackDirection},
    quad::Quad,
};

mod error;
mod graph;
mod items;
mod layout;
mod node;
mod quad;
