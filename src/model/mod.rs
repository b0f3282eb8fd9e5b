//! Build model: turn a validated topology into per-model routing and
//! next-hop matrices.

use crate::Result;
use crate::routing::{
    CoreIndex, Graph, Matrix, RoutingContext, RoutingError, Schedule, ShmRegions, TreeWalk,
    WeightSchedule, build_next_hop, build_tree_matrix, fill_shm,
};
use crate::spec::{CoreId, ModelSpec, Module, NaturalSorter, ValidatedTopology};

use anyhow::Context;
use serde::Serialize;

/// Matrices and metadata of one model, all cores given as matrix indices.
#[derive(Debug, Clone)]
pub struct ModelBuild {
    pub name: String,
    pub root: usize,
    pub routing: Matrix,
    pub next_hop: Matrix,
    /// Cores without children in the last tree, ascending.
    pub leaf_nodes: Vec<usize>,
    pub last_node: usize,
}

#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub machine: String,
    pub topology: String,
    pub index: CoreIndex,
    pub models: Vec<ModelBuild>,
    /// Shared-memory regions handed out across all models.
    pub shm_regions_used: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoreEntry {
    pub index: usize,
    pub core: CoreId,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub root: usize,
    pub last_node: usize,
    pub leaf_nodes: Vec<usize>,
    /// Non-zero cells of the routing matrix.
    pub routed_cells: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub machine: String,
    pub topology: String,
    pub cores: Vec<CoreEntry>,
    pub models: Vec<ModelSummary>,
    pub shm_regions_used: usize,
}

/// Build every model of `topo`. Fails on the first structural error; no
/// partial result is returned.
pub fn build_topology(topo: &ValidatedTopology) -> Result<BuildOutput> {
    let sorter = NaturalSorter::new()?;
    let index = CoreIndex::assign(&topo.cores, &sorter).context("assign core indices")?;
    log::info!(
        "{} cores on machine {}, {} model(s)",
        index.len(),
        topo.machine,
        topo.models.len()
    );

    // Region numbers are unique across the whole generated header.
    let mut regions = ShmRegions::new();
    let mut models = Vec::with_capacity(topo.models.len());
    for model in &topo.models {
        let built = build_model(model, &index, &mut regions)
            .with_context(|| format!("build model '{}'", model.name))?;
        models.push(built);
    }

    Ok(BuildOutput {
        machine: topo.machine.clone(),
        topology: topo.topology.clone(),
        index,
        models,
        shm_regions_used: regions.used(),
    })
}

fn build_model(
    model: &ModelSpec,
    index: &CoreIndex,
    regions: &mut ShmRegions,
) -> std::result::Result<ModelBuild, RoutingError> {
    let weights;
    let schedule: &dyn Schedule = match &model.schedule {
        Some(table) => table,
        None => {
            weights = WeightSchedule::new(&model.overlay, index);
            &weights
        }
    };
    let ctx = RoutingContext {
        schedule,
        overlay: &model.overlay,
        index,
    };

    let mut routing = Matrix::routing(index.len());
    // Next hop, leaves and the default last node come from the last tree.
    let mut forwarding: Option<(&Graph, TreeWalk)> = None;

    for module in &model.modules {
        match module {
            Module::MpTree { tree } => {
                let walk = build_tree_matrix(tree, &model.root, &mut routing, &ctx)?;
                forwarding = Some((tree, walk));
            }
            Module::ShmSpmc { sender, receivers } => {
                fill_shm(sender, receivers, &mut routing, index, regions)?;
            }
        }
    }

    let empty = Graph::new();
    let (tree, walk) = match &forwarding {
        Some((tree, walk)) => (*tree, Some(walk)),
        None => (&empty, None),
    };
    let next_hop = build_next_hop(tree, index)?;

    let mut leaf_nodes = Vec::new();
    for leaf in walk.iter().flat_map(|w| w.leaves.iter()) {
        leaf_nodes.push(index.lookup(leaf)?);
    }
    leaf_nodes.sort_unstable();

    let last = model
        .last_node
        .as_ref()
        .or(walk.and_then(|w| w.order.last()))
        .unwrap_or(&model.root);

    Ok(ModelBuild {
        name: model.name.clone(),
        root: index.lookup(&model.root)?,
        routing,
        next_hop,
        leaf_nodes,
        last_node: index.lookup(last)?,
    })
}

impl BuildOutput {
    pub fn summary(&self) -> BuildSummary {
        BuildSummary {
            machine: self.machine.clone(),
            topology: self.topology.clone(),
            cores: self
                .index
                .iter()
                .map(|(index, core)| CoreEntry {
                    index,
                    core: core.clone(),
                })
                .collect(),
            models: self
                .models
                .iter()
                .map(|m| ModelSummary {
                    name: m.name.clone(),
                    root: m.root,
                    last_node: m.last_node,
                    leaf_nodes: m.leaf_nodes.clone(),
                    routed_cells: m
                        .routing
                        .rows()
                        .flat_map(|r| r.iter())
                        .filter(|v| **v != 0)
                        .count(),
                })
                .collect(),
            shm_regions_used: self.shm_regions_used,
        }
    }
}
