//! Structural errors raised while building routing matrices.
//!
//! Every variant names the core that exposed the problem. None of them is
//! transient: the input topology has to be fixed.

use crate::routing::matrix::MAX_CHILDREN;
use crate::routing::shm::SHM_REGIONS_OFFSET;
use crate::spec::CoreId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The walk reached a core a second time: the input is not a tree.
    #[error("core {node} was reached twice while walking the tree (cycle or multiple parents)")]
    DuplicateVisit { node: CoreId },

    /// Child send orders would collide with the parent sentinel.
    #[error("core {node} has {children} tree children, the send-order encoding allows fewer than {}", MAX_CHILDREN)]
    TooManyChildren { node: CoreId, children: usize },

    /// The schedule names a receiver the sender is not linked to.
    #[error("schedule for core {sender} names {receiver}, which is not one of its neighbors")]
    ScheduleMismatch { sender: CoreId, receiver: CoreId },

    /// Some tree children never appear in the sender's schedule.
    #[error("schedule for core {sender} does not order its tree children {}", join(.children))]
    UnscheduledChildren {
        sender: CoreId,
        children: Vec<CoreId>,
    },

    #[error("root {root} is not part of the tree")]
    UnknownRoot { root: CoreId },

    /// The tree has cores the walk from `root` never reached.
    #[error("cores {} are not reachable from root {root}", join(.nodes))]
    Unreachable { root: CoreId, nodes: Vec<CoreId> },

    #[error("core {core} has no matrix index")]
    UnknownCore { core: CoreId },

    /// Two modules disagree about the same matrix cell.
    #[error("cell [{row}][{col}] already holds {existing}, refusing to overwrite it with {value}")]
    CellConflict {
        row: CoreId,
        col: CoreId,
        existing: i32,
        value: i32,
    },

    #[error("shared-memory sender {sender} is not among its own receivers")]
    ShmSenderNotReceiver { sender: CoreId },

    #[error("shared-memory module of core {sender} needs more than {} regions", SHM_REGIONS_OFFSET)]
    ShmRegionsExhausted { sender: CoreId },

    /// Integer ids are used as indices directly and must cover 0..count.
    #[error("integer core ids must be exactly 0..{count}, but {core} is out of range")]
    NonContiguousIds { core: CoreId, count: usize },

    #[error("core {core} is listed more than once")]
    DuplicateCore { core: CoreId },

    #[error("core ids mix integers and names ({index} and {name})")]
    MixedCoreIds { index: CoreId, name: CoreId },
}

fn join(ids: &[CoreId]) -> String {
    ids.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
