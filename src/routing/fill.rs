//! Send-order matrix builder, run once per core of a tree walk.
//!
//! For sender `s` the schedule ranks all of its neighbors; the tree children
//! get send orders 1, 2, ... in that ranking and the parent gets
//! [`ROUTE_TO_PARENT`].

use crate::routing::error::RoutingError;
use crate::routing::graph::Graph;
use crate::routing::index::CoreIndex;
use crate::routing::matrix::{MAX_CHILDREN, Matrix, ROUTE_TO_PARENT};
use crate::routing::schedule::Schedule;
use crate::routing::walk::{Visit, walk_tree};
use crate::spec::CoreId;

/// Read-only inputs shared by every handler call of one model.
#[derive(Clone, Copy)]
pub struct RoutingContext<'a> {
    pub schedule: &'a dyn Schedule,
    /// Full topology the schedule ranks over (a superset of the tree).
    pub overlay: &'a Graph,
    pub index: &'a CoreIndex,
}

/// Result of filling one tree into the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeWalk {
    /// Cores in the order they were handled.
    pub order: Vec<CoreId>,
    /// Cores without tree children.
    pub leaves: Vec<CoreId>,
}

/// Write `value` at (row, col). Rewriting the same value is fine; replacing a
/// different non-default value is a conflict.
pub fn write_cell(
    matrix: &mut Matrix,
    index: &CoreIndex,
    row: &CoreId,
    col: &CoreId,
    value: i32,
) -> Result<(), RoutingError> {
    let r = index.lookup(row)?;
    let c = index.lookup(col)?;
    let existing = matrix.get(r, c);
    if !matrix.is_default(r, c) && existing != value {
        return Err(RoutingError::CellConflict {
            row: row.clone(),
            col: col.clone(),
            existing,
            value,
        });
    }
    matrix.set(r, c, value);
    Ok(())
}

/// Handle one core of the walk.
pub fn fill_matrix(
    visit: Visit<'_>,
    matrix: &mut Matrix,
    ctx: &RoutingContext<'_>,
) -> Result<(), RoutingError> {
    let Visit {
        node: s,
        children,
        parent,
    } = visit;

    if children.len() >= MAX_CHILDREN {
        return Err(RoutingError::TooManyChildren {
            node: s.clone(),
            children: children.len(),
        });
    }

    log::info!(
        "{} -> {}",
        ctx.index.lookup(s)?,
        children
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    );

    let mut order = 1;
    let mut scheduled: Vec<CoreId> = Vec::with_capacity(children.len());

    for (_cost, r) in ctx.schedule.final_schedule(s) {
        if !ctx.overlay.has_edge(s, &r) {
            return Err(RoutingError::ScheduleMismatch {
                sender: s.clone(),
                receiver: r,
            });
        }
        let is_child = children.contains(&r);
        log::debug!(
            "{} -> {} [{}]",
            ctx.index.lookup(s)?,
            ctx.index.lookup(&r)?,
            is_child
        );
        if is_child {
            write_cell(matrix, ctx.index, s, &r, order)?;
            order += 1;
            scheduled.push(r);
        }
    }

    let missing: Vec<CoreId> = children
        .iter()
        .filter(|c| !scheduled.contains(*c))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(RoutingError::UnscheduledChildren {
            sender: s.clone(),
            children: missing,
        });
    }

    if let Some(p) = parent {
        write_cell(matrix, ctx.index, s, p, ROUTE_TO_PARENT)?;
    }
    Ok(())
}

/// Walk `tree` from `root`, filling `matrix` at every core.
pub fn build_tree_matrix(
    tree: &Graph,
    root: &CoreId,
    matrix: &mut Matrix,
    ctx: &RoutingContext<'_>,
) -> Result<TreeWalk, RoutingError> {
    let mut leaves = Vec::new();
    let order = walk_tree(tree, root, |visit| {
        if visit.children.is_empty() {
            leaves.push(visit.node.clone());
        }
        fill_matrix(visit, matrix, ctx)
    })?;
    Ok(TreeWalk { order, leaves })
}
