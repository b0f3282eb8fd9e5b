//! Undirected, optionally weighted graph over cores.
//!
//! Neighbor lists keep edge insertion order; the tree walk hands children to
//! the matrix builder in exactly this order.

use crate::spec::CoreId;
use std::collections::BTreeMap;

/// Weight assumed for edges given without one.
pub const DEFAULT_WEIGHT: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<CoreId>,
    adjacency: BTreeMap<CoreId, Vec<(CoreId, u32)>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: CoreId) {
        if !self.adjacency.contains_key(&id) {
            self.adjacency.insert(id.clone(), Vec::new());
            self.nodes.push(id);
        }
    }

    /// Add the undirected edge `a - b`. Returns false (and changes nothing
    /// beyond registering the nodes) for self-loops and already present edges.
    pub fn add_edge(&mut self, a: CoreId, b: CoreId, weight: u32) -> bool {
        self.add_node(a.clone());
        self.add_node(b.clone());
        if a == b || self.has_edge(&a, &b) {
            return false;
        }
        self.adjacency
            .entry(a.clone())
            .or_default()
            .push((b.clone(), weight));
        self.adjacency.entry(b).or_default().push((a, weight));
        true
    }

    pub fn contains(&self, id: &CoreId) -> bool {
        self.adjacency.contains_key(id)
    }

    pub fn has_edge(&self, a: &CoreId, b: &CoreId) -> bool {
        self.adjacency
            .get(a)
            .map(|nbs| nbs.iter().any(|(n, _)| n == b))
            .unwrap_or(false)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[CoreId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn neighbors<'a>(&'a self, id: &CoreId) -> impl Iterator<Item = &'a CoreId> + use<'a> {
        self.weighted_neighbors(id).iter().map(|(n, _)| n)
    }

    pub fn weighted_neighbors(&self, id: &CoreId) -> &[(CoreId, u32)] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every edge once, as (a, b, weight) with `a` the endpoint inserted first.
    pub fn edges(&self) -> Vec<(CoreId, CoreId, u32)> {
        let position: BTreeMap<&CoreId, usize> =
            self.nodes.iter().enumerate().map(|(i, n)| (n, i)).collect();
        let mut out = Vec::new();
        for a in &self.nodes {
            for (b, w) in self.weighted_neighbors(a) {
                if position[a] < position[b] {
                    out.push((a.clone(), b.clone(), *w));
                }
            }
        }
        out
    }

    /// Add all nodes and edges of `other`, keeping existing weights.
    pub fn merge(&mut self, other: &Graph) {
        for n in other.nodes() {
            self.add_node(n.clone());
        }
        for (a, b, w) in other.edges() {
            self.add_edge(a, b, w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn c(i: u32) -> CoreId {
        CoreId::Index(i)
    }

    #[test]
    fn neighbors_keep_insertion_order() {
        let mut g = Graph::new();
        g.add_edge(c(0), c(3), 1);
        g.add_edge(c(0), c(1), 1);
        g.add_edge(c(2), c(0), 1);
        let nbs: Vec<&CoreId> = g.neighbors(&c(0)).collect();
        assert_eq!(nbs, vec![&c(3), &c(1), &c(2)]);
        assert_eq!(g.nodes(), &[c(0), c(3), c(1), c(2)]);
    }

    #[test]
    fn duplicate_edges_and_self_loops_are_rejected() {
        let mut g = Graph::new();
        assert!(g.add_edge(c(0), c(1), 4));
        assert!(!g.add_edge(c(1), c(0), 7));
        assert!(!g.add_edge(c(2), c(2), 1));
        assert_eq!(g.weighted_neighbors(&c(0)), &[(c(1), 4)]);
        assert!(g.contains(&c(2)));
        assert_eq!(g.neighbors(&c(2)).count(), 0);
    }

    #[test]
    fn merge_unions_edges() {
        let mut a = Graph::new();
        a.add_edge(c(0), c(1), 1);
        let mut b = Graph::new();
        b.add_edge(c(1), c(2), 5);
        b.add_edge(c(0), c(1), 9);
        a.merge(&b);
        assert_eq!(
            a.edges(),
            vec![(c(0), c(1), 1), (c(1), c(2), 5)]
        );
    }
}
