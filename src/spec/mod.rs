//! Topology input: what the user writes in topology.json.
//!
//! Core ids and their natural ordering live in `core_id`; the model schema
//! and its validation into graphs and schedules live in `topology`. Nothing
//! here knows about matrix indices.

pub mod core_id;
pub mod topology;

pub use core_id::{CoreId, NaturalSorter};
pub use topology::{Module, ModelSpec, ValidatedTopology, load_topology};
