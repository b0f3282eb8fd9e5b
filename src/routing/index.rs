//! Core id -> matrix index assignment.
//!
//! Integer ids index the matrix directly. Names are ranked by natural sort,
//! so the same set of names always maps to the same indices no matter in
//! which order the topology lists them.

use crate::routing::error::RoutingError;
use crate::spec::{CoreId, NaturalSorter};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreIndex {
    by_core: BTreeMap<CoreId, usize>,
    /// cores[i] is the core with index i.
    cores: Vec<CoreId>,
}

impl CoreIndex {
    pub fn assign(cores: &[CoreId], sorter: &NaturalSorter) -> Result<Self, RoutingError> {
        let first_index = cores.iter().find(|c| c.is_index());
        let first_name = cores.iter().find(|c| !c.is_index());
        if let (Some(index), Some(name)) = (first_index, first_name) {
            return Err(RoutingError::MixedCoreIds {
                index: index.clone(),
                name: name.clone(),
            });
        }

        let count = cores.len();
        let mut ordered: Vec<Option<CoreId>> = vec![None; count];

        if first_index.is_some() {
            for core in cores {
                let CoreId::Index(i) = core else {
                    continue;
                };
                let slot = ordered
                    .get_mut(*i as usize)
                    .ok_or_else(|| RoutingError::NonContiguousIds {
                        core: core.clone(),
                        count,
                    })?;
                if slot.is_some() {
                    return Err(RoutingError::DuplicateCore { core: core.clone() });
                }
                *slot = Some(core.clone());
            }
        } else {
            let mut names: Vec<String> = cores
                .iter()
                .filter_map(|c| match c {
                    CoreId::Name(n) => Some(n.clone()),
                    CoreId::Index(_) => None,
                })
                .collect();
            sorter.sort(&mut names);
            if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
                return Err(RoutingError::DuplicateCore {
                    core: CoreId::Name(dup[0].clone()),
                });
            }
            for (slot, name) in ordered.iter_mut().zip(names) {
                *slot = Some(CoreId::Name(name));
            }
        }

        // Every slot is filled: `count` distinct ids landed in `count` slots.
        let cores: Vec<CoreId> = ordered.into_iter().flatten().collect();
        let by_core = cores
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Ok(Self { by_core, cores })
    }

    pub fn get(&self, core: &CoreId) -> Option<usize> {
        self.by_core.get(core).copied()
    }

    pub fn lookup(&self, core: &CoreId) -> Result<usize, RoutingError> {
        self.get(core)
            .ok_or_else(|| RoutingError::UnknownCore { core: core.clone() })
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &CoreId)> {
        self.cores.iter().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assign(cores: Vec<CoreId>) -> Result<CoreIndex, RoutingError> {
        CoreIndex::assign(&cores, &NaturalSorter::new().unwrap())
    }

    #[test]
    fn integer_ids_map_to_themselves() {
        let idx = assign(vec![2.into(), 0.into(), 1.into()]).unwrap();
        assert_eq!(idx.get(&CoreId::Index(2)), Some(2));
        assert_eq!(idx.get(&CoreId::Index(0)), Some(0));
        assert_eq!(idx.iter().nth(1), Some((1, &CoreId::Index(1))));
    }

    #[test]
    fn names_use_natural_order() {
        let idx = assign(vec!["node2".into(), "node10".into(), "node1".into()]).unwrap();
        let order: Vec<String> = idx.iter().map(|(_, c)| c.to_string()).collect();
        assert_eq!(order, vec!["node1", "node2", "node10"]);
        assert_eq!(idx.lookup(&"node10".into()), Ok(2));
    }

    #[test]
    fn assignment_ignores_input_order() {
        let a = assign(vec!["b".into(), "A".into(), "c1".into()]).unwrap();
        let b = assign(vec!["c1".into(), "b".into(), "A".into()]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sparse_integer_ids_are_rejected() {
        let err = assign(vec![0.into(), 5.into()]).unwrap_err();
        assert_eq!(
            err,
            RoutingError::NonContiguousIds {
                core: CoreId::Index(5),
                count: 2
            }
        );
    }

    #[test]
    fn mixed_ids_are_rejected() {
        let err = assign(vec![0.into(), "x".into()]).unwrap_err();
        assert!(matches!(err, RoutingError::MixedCoreIds { .. }));
    }

    #[test]
    fn duplicates_are_rejected() {
        assert!(matches!(
            assign(vec![0.into(), 0.into()]),
            Err(RoutingError::DuplicateCore { .. })
        ));
        assert!(matches!(
            assign(vec!["a".into(), "a".into()]),
            Err(RoutingError::DuplicateCore { .. })
        ));
    }

    #[test]
    fn unknown_core_lookup_fails() {
        let idx = assign(vec![0.into()]).unwrap();
        assert_eq!(
            idx.lookup(&CoreId::Index(4)),
            Err(RoutingError::UnknownCore {
                core: CoreId::Index(4)
            })
        );
    }
}
