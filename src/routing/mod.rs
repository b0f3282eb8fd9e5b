//! Routing layer: pure, in-memory matrix construction.
//!
//! It owns:
//! - core index assignment
//! - the breadth-first tree walk and the per-core matrix builder
//! - shared-memory region numbering
//! - the next-hop table

pub mod error;
pub mod fill;
pub mod graph;
pub mod index;
pub mod matrix;
pub mod next_hop;
pub mod schedule;
pub mod shm;
pub mod walk;

pub use error::RoutingError;
pub use fill::{RoutingContext, TreeWalk, build_tree_matrix};
pub use graph::{DEFAULT_WEIGHT, Graph};
pub use index::CoreIndex;
pub use matrix::Matrix;
pub use next_hop::build_next_hop;
pub use schedule::{Schedule, TableSchedule, WeightSchedule};
pub use shm::{ShmRegions, fill_shm};
