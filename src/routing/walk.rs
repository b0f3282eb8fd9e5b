//! Breadth-first tree walk.
//!
//! `active` holds cores that are reachable but not handled yet, as
//! (core, parent) pairs; `done` holds handled cores. A core can be queued
//! twice only if two handled cores both reach it, which means the input is
//! not a tree; dequeuing it the second time fails the walk.

use crate::routing::error::RoutingError;
use crate::routing::graph::Graph;
use crate::spec::CoreId;
use std::collections::{BTreeSet, VecDeque};

/// One handler invocation.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: &'a CoreId,
    /// Neighbors not yet handled when `node` was dequeued, in neighbor order.
    pub children: &'a [CoreId],
    /// The core `node` was discovered from; `None` for the root.
    pub parent: Option<&'a CoreId>,
}

/// Walk `graph` from `root`, calling `handle` once per core in breadth-first
/// order. Returns the cores in the order they were handled.
pub fn walk_tree<F>(graph: &Graph, root: &CoreId, mut handle: F) -> Result<Vec<CoreId>, RoutingError>
where
    F: FnMut(Visit<'_>) -> Result<(), RoutingError>,
{
    if !graph.contains(root) {
        return Err(RoutingError::UnknownRoot { root: root.clone() });
    }

    let mut active: VecDeque<(CoreId, Option<CoreId>)> = VecDeque::new();
    let mut done: BTreeSet<CoreId> = BTreeSet::new();
    let mut order: Vec<CoreId> = Vec::with_capacity(graph.len());

    active.push_back((root.clone(), None));

    while let Some((node, parent)) = active.pop_front() {
        if !done.insert(node.clone()) {
            return Err(RoutingError::DuplicateVisit { node });
        }

        let mut children = Vec::new();
        for nb in graph.neighbors(&node) {
            if !done.contains(nb) {
                active.push_back((nb.clone(), Some(node.clone())));
                children.push(nb.clone());
            }
        }

        handle(Visit {
            node: &node,
            children: &children,
            parent: parent.as_ref(),
        })?;
        order.push(node);
    }

    let missing: Vec<CoreId> = graph
        .nodes()
        .iter()
        .filter(|n| !done.contains(*n))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(RoutingError::Unreachable {
            root: root.clone(),
            nodes: missing,
        });
    }

    Ok(order)
}
