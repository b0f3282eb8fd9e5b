//! Topology spec (topology.json): the cores of one machine plus one or more
//! broadcast models over them.
//!
//! JSON shape:
//! {
//!   "machine": "gruyere",          // MACHINE string in model_defs.h
//!   "topology": "multi-model",     // TOPOLOGY string in model_defs.h
//!   "cores": [0, 1, 2, 3],         // optional, defaults to referenced cores
//!   "models": [
//!     {
//!       "name": "binary",
//!       "root": 0,
//!       "last_node": 3,            // optional, from the simulator
//!       "links": [[0, 1, 10], [0, 2], {"from": 1, "to": 3, "weight": 2}],
//!       "modules": [
//!         { "kind": "mp_tree", "edges": [[0, 1], [0, 2], [1, 3]] },
//!         { "kind": "shm_spmc", "sender": 2, "receivers": [2, 3] }
//!       ],
//!       "schedule": [ { "sender": 0, "order": [[1, 2], [2, 1]] } ]
//!     }
//!   ]
//! }
//!
//! `links` is the overlay the schedule ranks over; without it the union of
//! the tree edges is used. Without `schedule`, senders rank neighbors by link
//! weight.

use crate::Result;
use crate::routing::schedule::Cost;
use crate::routing::{DEFAULT_WEIGHT, Graph, TableSchedule};
use crate::spec::CoreId;

use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct TopologySpec {
    #[serde(default = "default_machine")]
    pub machine: String,

    #[serde(default = "default_topology")]
    pub topology: String,

    #[serde(default)]
    pub cores: Option<Vec<CoreId>>,

    #[serde(default)]
    pub models: Vec<RawModel>,
}

fn default_machine() -> String {
    "unknown".to_string()
}

fn default_topology() -> String {
    "multi-model".to_string()
}

/// Raw model shape as it appears in topology.json.
#[derive(Debug, Clone, Deserialize)]
pub struct RawModel {
    pub name: String,

    pub root: CoreId,

    #[serde(default)]
    pub last_node: Option<CoreId>,

    #[serde(default)]
    pub links: Option<Vec<EdgeSpec>>,

    #[serde(default)]
    pub modules: Vec<RawModule>,

    #[serde(default)]
    pub schedule: Option<Vec<RawScheduleRow>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawModule {
    MpTree {
        edges: Vec<EdgeSpec>,
    },
    ShmSpmc {
        sender: CoreId,
        receivers: Vec<CoreId>,
    },
}

/// Edges in topology.json.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EdgeSpec {
    // [a, b, weight]
    Weighted(CoreId, CoreId, u32),
    // [a, b]
    Pair(CoreId, CoreId),
    // { "from": a, "to": b, "weight": w }
    Explicit {
        from: CoreId,
        to: CoreId,
        #[serde(default)]
        weight: Option<u32>,
    },
}

impl EdgeSpec {
    fn parts(&self) -> (&CoreId, &CoreId, u32) {
        match self {
            EdgeSpec::Weighted(a, b, w) => (a, b, *w),
            EdgeSpec::Pair(a, b) => (a, b, DEFAULT_WEIGHT),
            EdgeSpec::Explicit { from, to, weight } => {
                (from, to, weight.unwrap_or(DEFAULT_WEIGHT))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawScheduleRow {
    pub sender: CoreId,
    /// (cost, receiver) pairs in transmission order.
    #[serde(default)]
    pub order: Vec<(Cost, CoreId)>,
}

/// A model's building blocks. Each kind carries what it writes into the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Module {
    /// Message-passing tree, walked from the model root.
    MpTree { tree: Graph },
    /// Shared-memory region with one writer and several readers.
    ShmSpmc {
        sender: CoreId,
        receivers: Vec<CoreId>,
    },
}

/// Validated model ready for matrix construction.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub name: String,
    pub root: CoreId,
    pub last_node: Option<CoreId>,
    pub overlay: Graph,
    pub modules: Vec<Module>,
    /// `None` means rank by link weight.
    pub schedule: Option<TableSchedule>,
}

#[derive(Debug, Clone)]
pub struct ValidatedTopology {
    pub machine: String,
    pub topology: String,
    pub cores: Vec<CoreId>,
    pub models: Vec<ModelSpec>,
}

/// Read and deserialize a topology file.
pub fn load_topology(path: &str) -> Result<TopologySpec> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read topology file {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("parse topology file {}", path))
}

impl TopologySpec {
    /// Validate models and core references and build graphs.
    ///
    /// Three phases:
    /// 1) Model names: at least one model, names unique and non-empty.
    /// 2) Per model: build tree / overlay graphs and schedules, collecting
    ///    every core the model mentions.
    /// 3) Core set: use declared cores (and check every reference against
    ///    them) or fall back to the referenced ones.
    pub fn validate_and_build(&self) -> Result<ValidatedTopology> {
        // Phase 1.
        if self.models.is_empty() {
            bail!("topology contains no models");
        }
        let mut names = BTreeSet::new();
        for m in &self.models {
            if m.name.trim().is_empty() {
                bail!("model names cannot be empty");
            }
            if !names.insert(m.name.as_str()) {
                bail!("duplicate model name in topology: {}", m.name);
            }
        }

        // Phase 2.
        let mut models = Vec::with_capacity(self.models.len());
        let mut referenced: Vec<(String, Vec<CoreId>)> = Vec::new();
        for raw in &self.models {
            let (model, cores) = build_model(raw)?;
            referenced.push((raw.name.clone(), cores));
            models.push(model);
        }

        // Phase 3.
        let cores = match &self.cores {
            Some(declared) => {
                let mut known = BTreeSet::new();
                for c in declared {
                    if !known.insert(c) {
                        bail!("duplicate core in cores: {}", c);
                    }
                }
                for (model, cores) in &referenced {
                    for c in cores {
                        if !known.contains(c) {
                            bail!("model '{}' references undeclared core {}", model, c);
                        }
                    }
                }
                declared.clone()
            }
            None => {
                let mut seen = BTreeSet::new();
                referenced
                    .iter()
                    .flat_map(|(_, cores)| cores.iter())
                    .filter(|c| seen.insert(*c))
                    .cloned()
                    .collect()
            }
        };

        Ok(ValidatedTopology {
            machine: self.machine.clone(),
            topology: self.topology.clone(),
            cores,
            models,
        })
    }
}

/// Validate one model and return it with every core it references.
fn build_model(raw: &RawModel) -> Result<(ModelSpec, Vec<CoreId>)> {
    let name = &raw.name;
    let mut referenced = vec![raw.root.clone()];
    referenced.extend(raw.last_node.iter().cloned());

    if raw.modules.is_empty() {
        bail!("model '{}' has no modules", name);
    }

    let mut modules = Vec::with_capacity(raw.modules.len());
    let mut tree_edges = Graph::new();
    for (i, module) in raw.modules.iter().enumerate() {
        match module {
            RawModule::MpTree { edges } => {
                if edges.is_empty() {
                    bail!("model '{}' module {}: mp_tree has no edges", name, i);
                }
                let tree = build_graph(edges)
                    .with_context(|| format!("model '{}' module {}", name, i))?;
                referenced.extend(tree.nodes().iter().cloned());
                tree_edges.merge(&tree);
                modules.push(Module::MpTree { tree });
            }
            RawModule::ShmSpmc { sender, receivers } => {
                if receivers.is_empty() {
                    bail!("model '{}' module {}: shm_spmc has no receivers", name, i);
                }
                let mut seen = BTreeSet::new();
                for r in receivers {
                    if !seen.insert(r) {
                        bail!(
                            "model '{}' module {}: receiver {} listed twice",
                            name,
                            i,
                            r
                        );
                    }
                }
                referenced.push(sender.clone());
                referenced.extend(receivers.iter().cloned());
                modules.push(Module::ShmSpmc {
                    sender: sender.clone(),
                    receivers: receivers.clone(),
                });
            }
        }
    }

    let overlay = match &raw.links {
        Some(links) => {
            let overlay =
                build_graph(links).with_context(|| format!("model '{}' links", name))?;
            for (a, b, _) in tree_edges.edges() {
                if !overlay.has_edge(&a, &b) {
                    bail!(
                        "model '{}': tree edge {} - {} is not one of its links",
                        name,
                        a,
                        b
                    );
                }
            }
            referenced.extend(overlay.nodes().iter().cloned());
            overlay
        }
        None => tree_edges,
    };

    let schedule = match &raw.schedule {
        Some(rows) => {
            let mut table = TableSchedule::new();
            for row in rows {
                referenced.push(row.sender.clone());
                referenced.extend(row.order.iter().map(|(_, r)| r.clone()));
                if table.insert(row.sender.clone(), row.order.clone()).is_some() {
                    bail!(
                        "model '{}': schedule lists sender {} more than once",
                        name,
                        row.sender
                    );
                }
            }
            Some(table)
        }
        None => None,
    };

    Ok((
        ModelSpec {
            name: name.clone(),
            root: raw.root.clone(),
            last_node: raw.last_node.clone(),
            overlay,
            modules,
            schedule,
        },
        referenced,
    ))
}

fn build_graph(edges: &[EdgeSpec]) -> Result<Graph> {
    let mut g = Graph::new();
    for edge in edges {
        let (a, b, w) = edge.parts();
        if a == b {
            bail!("self-loop on core {}", a);
        }
        if !g.add_edge(a.clone(), b.clone(), w) {
            bail!("duplicate edge {} - {}", a, b);
        }
    }
    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Schedule;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> Result<ValidatedTopology> {
        let spec: TopologySpec = serde_json::from_str(json)?;
        spec.validate_and_build()
    }

    fn c(i: u32) -> CoreId {
        CoreId::Index(i)
    }

    #[test]
    fn parses_full_model() {
        let topo = parse(
            r#"{
              "machine": "gruyere",
              "cores": [0, 1, 2, 3],
              "models": [{
                "name": "binary",
                "root": 0,
                "last_node": 3,
                "links": [[0, 1, 10], [0, 2], {"from": 1, "to": 3, "weight": 2}, [2, 3, 7]],
                "modules": [
                  {"kind": "mp_tree", "edges": [[0, 1], [0, 2], [1, 3]]},
                  {"kind": "shm_spmc", "sender": 2, "receivers": [2, 3]}
                ],
                "schedule": [{"sender": 0, "order": [[1, 2], [2, 1]]}]
              }]
            }"#,
        )
        .unwrap();

        assert_eq!(topo.machine, "gruyere");
        assert_eq!(topo.topology, "multi-model");
        assert_eq!(topo.cores, vec![c(0), c(1), c(2), c(3)]);

        let m = &topo.models[0];
        assert_eq!(m.root, c(0));
        assert_eq!(m.last_node, Some(c(3)));
        assert_eq!(
            m.overlay.weighted_neighbors(&c(1)),
            &[(c(0), 10), (c(3), 2)]
        );
        assert_eq!(m.overlay.weighted_neighbors(&c(2)), &[(c(0), 1), (c(3), 7)]);
        assert!(matches!(&m.modules[0], Module::MpTree { tree } if tree.len() == 4));
        assert_eq!(
            m.modules[1],
            Module::ShmSpmc {
                sender: c(2),
                receivers: vec![c(2), c(3)]
            }
        );
        let sched = m.schedule.as_ref().unwrap();
        assert_eq!(sched.final_schedule(&c(0)), vec![(1, c(2)), (2, c(1))]);
    }

    #[test]
    fn cores_default_to_referenced_ones() {
        let topo = parse(
            r#"{"models": [{"name": "m", "root": "b",
                "modules": [{"kind": "mp_tree", "edges": [["b", "a"], ["a", "c"]]}]}]}"#,
        )
        .unwrap();
        assert_eq!(
            topo.cores,
            vec![CoreId::from("b"), CoreId::from("a"), CoreId::from("c")]
        );
        assert!(topo.models[0].schedule.is_none());
        // Without links the overlay is the tree itself.
        assert!(topo.models[0].overlay.has_edge(&"a".into(), &"c".into()));
    }

    #[test]
    fn rejects_missing_models() {
        let err = parse(r#"{"machine": "x"}"#).unwrap_err();
        assert!(err.to_string().contains("no models"));
    }

    #[test]
    fn rejects_duplicate_model_names() {
        let err = parse(
            r#"{"models": [
                {"name": "a", "root": 0, "modules": [{"kind": "mp_tree", "edges": [[0, 1]]}]},
                {"name": "a", "root": 0, "modules": [{"kind": "mp_tree", "edges": [[0, 1]]}]}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate model name"));
    }

    #[test]
    fn rejects_undeclared_cores() {
        let err = parse(
            r#"{"cores": [0, 1], "models": [
                {"name": "a", "root": 0, "modules": [{"kind": "mp_tree", "edges": [[0, 1], [1, 2]]}]}
            ]}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "model 'a' references undeclared core 2");
    }

    #[test]
    fn rejects_self_loops_and_duplicate_edges() {
        let err = parse(
            r#"{"models": [{"name": "a", "root": 0,
                "modules": [{"kind": "mp_tree", "edges": [[0, 1], [1, 1]]}]}]}"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("self-loop on core 1"));

        let err = parse(
            r#"{"models": [{"name": "a", "root": 0,
                "modules": [{"kind": "mp_tree", "edges": [[0, 1], [1, 0]]}]}]}"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("duplicate edge 1 - 0"));
    }

    #[test]
    fn tree_edges_must_be_links() {
        let err = parse(
            r#"{"models": [{"name": "a", "root": 0, "links": [[0, 1]],
                "modules": [{"kind": "mp_tree", "edges": [[0, 1], [0, 2]]}]}]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "model 'a': tree edge 0 - 2 is not one of its links"
        );
    }

    #[test]
    fn rejects_repeated_schedule_senders() {
        let err = parse(
            r#"{"models": [{"name": "a", "root": 0,
                "modules": [{"kind": "mp_tree", "edges": [[0, 1]]}],
                "schedule": [{"sender": 0, "order": [[1, 1]]}, {"sender": 0, "order": []}]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("sender 0 more than once"));
    }

    #[test]
    fn rejects_empty_modules_and_unknown_kinds() {
        let err = parse(r#"{"models": [{"name": "a", "root": 0, "modules": []}]}"#).unwrap_err();
        assert_eq!(err.to_string(), "model 'a' has no modules");

        assert!(
            parse(r#"{"models": [{"name": "a", "root": 0, "modules": [{"kind": "ring"}]}]}"#)
                .is_err()
        );
    }

    #[test]
    fn rejects_repeated_shm_receivers() {
        let err = parse(
            r#"{"models": [{"name": "a", "root": 0,
                "modules": [{"kind": "shm_spmc", "sender": 0, "receivers": [0, 1, 1]}]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("receiver 1 listed twice"));
    }
}
