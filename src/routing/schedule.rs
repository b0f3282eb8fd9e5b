//! Transmission schedules: the order in which a core sends to its neighbors.

use crate::routing::graph::Graph;
use crate::routing::index::CoreIndex;
use crate::spec::CoreId;
use std::collections::BTreeMap;

pub type Cost = u32;

pub trait Schedule {
    /// Ordered (cost, receiver) pairs for `sender`. The order is the
    /// transmission order; costs are informational.
    fn final_schedule(&self, sender: &CoreId) -> Vec<(Cost, CoreId)>;
}

/// Schedule given explicitly per sender. Senders without an entry send to nobody.
#[derive(Debug, Clone, Default)]
pub struct TableSchedule {
    entries: BTreeMap<CoreId, Vec<(Cost, CoreId)>>,
}

impl TableSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the order for `sender`, returning the previous one if any.
    pub fn insert(
        &mut self,
        sender: CoreId,
        order: Vec<(Cost, CoreId)>,
    ) -> Option<Vec<(Cost, CoreId)>> {
        self.entries.insert(sender, order)
    }
}

impl Schedule for TableSchedule {
    fn final_schedule(&self, sender: &CoreId) -> Vec<(Cost, CoreId)> {
        self.entries.get(sender).cloned().unwrap_or_default()
    }
}

impl FromIterator<(CoreId, Vec<(Cost, CoreId)>)> for TableSchedule {
    fn from_iter<I: IntoIterator<Item = (CoreId, Vec<(Cost, CoreId)>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Cheapest link first: orders a sender's overlay neighbors by ascending edge
/// weight, ties broken by matrix index.
#[derive(Debug, Clone, Copy)]
pub struct WeightSchedule<'a> {
    overlay: &'a Graph,
    index: &'a CoreIndex,
}

impl<'a> WeightSchedule<'a> {
    pub fn new(overlay: &'a Graph, index: &'a CoreIndex) -> Self {
        Self { overlay, index }
    }
}

impl Schedule for WeightSchedule<'_> {
    fn final_schedule(&self, sender: &CoreId) -> Vec<(Cost, CoreId)> {
        let mut out: Vec<(Cost, CoreId)> = self
            .overlay
            .weighted_neighbors(sender)
            .iter()
            .map(|(r, w)| (*w, r.clone()))
            .collect();
        out.sort_by_key(|(w, r)| (*w, self.index.get(r).unwrap_or(usize::MAX)));
        out
    }
}
