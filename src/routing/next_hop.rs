//! Next-hop forwarding table derived from the broadcast tree.
//!
//! For every tree edge (c, n), all cores on `n`'s side of the edge are
//! reached from `c` by forwarding to `n`.

use crate::routing::error::RoutingError;
use crate::routing::graph::Graph;
use crate::routing::index::CoreIndex;
use crate::routing::matrix::Matrix;
use crate::spec::CoreId;
use std::collections::BTreeSet;

/// Cores reachable from `from` through its neighbor `via`, `via` included,
/// never stepping back through `from`.
pub fn reachable_through(tree: &Graph, from: &CoreId, via: &CoreId) -> Vec<CoreId> {
    let mut seen: BTreeSet<&CoreId> = BTreeSet::from([from, via]);
    let mut stack: Vec<&CoreId> = vec![via];
    let mut out = Vec::new();

    while let Some(n) = stack.pop() {
        out.push(n.clone());
        for nb in tree.neighbors(n) {
            if seen.insert(nb) {
                stack.push(nb);
            }
        }
    }
    out
}

/// Build the (sender, destination) -> next hop table. Pairs without a route
/// stay at `NEXT_HOP_UNSET`.
pub fn build_next_hop(tree: &Graph, index: &CoreIndex) -> Result<Matrix, RoutingError> {
    let mut table = Matrix::next_hop(index.len());
    for c in tree.nodes() {
        let ci = index.lookup(c)?;
        for n in tree.neighbors(c) {
            let ni = index.lookup(n)? as i32;
            for dest in reachable_through(tree, c, n) {
                table.set(ci, index.lookup(&dest)?, ni);
            }
        }
    }
    Ok(table)
}
