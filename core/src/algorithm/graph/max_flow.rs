//! Augmenting-path maximum flow
//!
//! This module implements the Ford-Fulkerson method over integral capacities.
//! A residual graph is built once from the current flow state of the network,
//! then the solver repeatedly searches it depth-first for an `s`-`t` path
//! whose edges all have positive capacity and pushes the bottleneck amount of
//! flow along it. When no such path is left the flow is maximum, and the
//! capacities of the reverse residual edges are written back as the flow of
//! their network edges.
//!
//! Every augmentation raises the flow value by at least one unit, so a solve
//! performs at most `F` searches of cost `O(V + E)` each, where `F` is the
//! value of the maximum flow. The bound is pseudo-polynomial; bounded
//! capacities keep it practical.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashSet;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{
    checked_total, Capacity, CapacitySource, Flow, FlowError, FlowResult, Node,
};
use crate::data_structures::graph::{FlowEdge, FlowNetwork};
use crate::data_structures::residual::{EdgeHandle, ResidualGraph};
use crate::validation::correctness::{cut_capacity, MinCut};

/// Solver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Stop after this many augmentations even if more paths exist
    pub max_augmentations: Option<u64>,
    /// Derive the minimum cut from the final residual graph
    pub compute_min_cut: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_augmentations: None,
            compute_min_cut: true,
        }
    }
}

impl SolverConfig {
    /// Parses and validates a JSON configuration. Missing fields take their
    /// default values.
    pub fn from_json(json: &str) -> FlowResult<Self> {
        let config: SolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_augmentations(mut self, limit: u64) -> Self {
        self.max_augmentations = Some(limit);
        self
    }

    pub fn with_min_cut(mut self, enabled: bool) -> Self {
        self.compute_min_cut = enabled;
        self
    }

    pub fn validate(&self) -> FlowResult<()> {
        if self.max_augmentations == Some(0) {
            return Err(FlowError::InvalidConfiguration(
                "max_augmentations must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Why a solve stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// No augmenting path is left; the flow is maximum
    Exhausted,
    /// The configured augmentation limit was reached first
    AugmentationLimit,
    /// Source and sink are the same node; flows were left untouched
    SourceIsSink,
}

/// Outcome of a solve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolveReport<N> {
    /// Net flow leaving the source after the solve
    pub flow_value: Flow,
    /// Number of paths flow was pushed along
    pub augmentations: u64,
    /// Number of path searches, including the final unsuccessful one
    pub searches: u64,
    pub termination: Termination,
    /// Present when the flow is maximum and cut extraction is enabled
    pub min_cut: Option<MinCut<N>>,
}

impl<N> SolveReport<N> {
    pub fn is_maximum(&self) -> bool {
        matches!(self.termination, Termination::Exhausted | Termination::SourceIsSink)
    }
}

/// One level of the explicit depth-first search stack
struct SearchFrame<'a> {
    edges: &'a [EdgeHandle],
    cursor: usize,
}

/// Augmenting-path max-flow solver
#[derive(Debug, Clone, Default)]
pub struct MaxFlowSolver {
    config: SolverConfig,
}

impl MaxFlowSolver {
    pub fn new(config: SolverConfig) -> FlowResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Sets a configuration parameter from its textual value
    pub fn set_parameter(&mut self, name: &str, value: &str) -> FlowResult<()> {
        match name {
            "max_augmentations" => {
                let limit = if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(value.parse::<u64>().map_err(|_| {
                        FlowError::InvalidConfiguration(
                            "max_augmentations must be a positive integer or \"none\"".to_string(),
                        )
                    })?)
                };
                let updated = SolverConfig {
                    max_augmentations: limit,
                    ..self.config.clone()
                };
                updated.validate()?;
                self.config = updated;
                Ok(())
            }
            "compute_min_cut" => {
                self.config.compute_min_cut = value.parse::<bool>().map_err(|_| {
                    FlowError::InvalidConfiguration(
                        "compute_min_cut must be true or false".to_string(),
                    )
                })?;
                Ok(())
            }
            _ => Err(FlowError::InvalidConfiguration(format!("Unknown parameter: {}", name))),
        }
    }

    pub fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "max_augmentations" => Some(
                self.config
                    .max_augmentations
                    .map_or_else(|| "none".to_string(), |limit| limit.to_string()),
            ),
            "compute_min_cut" => Some(self.config.compute_min_cut.to_string()),
            _ => None,
        }
    }

    /// Copies the nodes and capacities of `graph` into a fresh network with
    /// zero flow, then solves it.
    ///
    /// Fails with `InvalidArgument` if the source graph carries a negative
    /// capacity.
    pub fn solve_source<N, G>(
        &self,
        graph: &G,
        source: &N,
        sink: &N,
    ) -> FlowResult<(FlowNetwork<N>, SolveReport<N>)>
    where
        N: Node,
        G: CapacitySource<N>,
    {
        let mut network = FlowNetwork::new();
        for node in graph.source_nodes() {
            network.add_node(node.clone());
        }
        for node in graph.source_nodes() {
            for (end, capacity) in graph.capacities_from(node)? {
                network.add_edge(node, end)?.set_capacity(capacity)?;
            }
        }

        let report = self.solve(&mut network, source, sink)?;
        Ok((network, report))
    }

    /// Maximizes the flow of `network` in place.
    ///
    /// Existing flow is used as the starting point. Fails with `NodeNotFound`
    /// if either terminal is missing, and with `Overflow` if the capacity
    /// entering or leaving the source adds up to more than [`Flow`] holds.
    /// When source and sink are the same node the flow is zero by definition
    /// and the network is left untouched.
    pub fn solve<N: Node>(
        &self,
        network: &mut FlowNetwork<N>,
        source: &N,
        sink: &N,
    ) -> FlowResult<SolveReport<N>> {
        if !network.contains_node(source) {
            return Err(FlowError::missing_node(source));
        }
        if !network.contains_node(sink) {
            return Err(FlowError::missing_node(sink));
        }

        // Every node trivially reaches itself, so the search would find an
        // empty path forever
        if source == sink {
            return Ok(SolveReport {
                flow_value: 0,
                augmentations: 0,
                searches: 0,
                termination: Termination::SourceIsSink,
                min_cut: None,
            });
        }

        ensure_flow_fits(network, source)?;

        debug!(
            "Solving max flow {:?} -> {:?} over {} nodes and {} edges",
            source,
            sink,
            network.size(),
            network.edge_count()
        );

        let mut residual = ResidualGraph::from_network(network);
        let mut augmentations = 0u64;
        let mut searches = 0u64;

        let termination = loop {
            if self
                .config
                .max_augmentations
                .is_some_and(|limit| augmentations >= limit)
            {
                warn!(
                    "Augmentation limit of {} reached before the flow {:?} -> {:?} was maximal",
                    augmentations, source, sink
                );
                break Termination::AugmentationLimit;
            }

            searches += 1;
            let Some(path) = find_augmenting_path(&residual, source, sink)? else {
                break Termination::Exhausted;
            };

            let pushed = augment(&mut residual, &path)?;
            augmentations += 1;
            trace!(
                "Augmentation {}: pushed {} units along {} edges",
                augmentations,
                pushed,
                path.len()
            );
        };

        write_back(&residual, network)?;

        let min_cut = if termination == Termination::Exhausted && self.config.compute_min_cut {
            let source_side: Vec<N> = residual.reachable_from(source)?.into_iter().collect();
            let capacity = cut_capacity(network, &source_side)?;
            Some(MinCut {
                source_side,
                capacity,
            })
        } else {
            None
        };

        let flow_value = network.flow_value(source)?;
        debug!(
            "Max flow {:?} -> {:?} finished with value {} after {} augmentations ({:?})",
            source, sink, flow_value, augmentations, termination
        );

        Ok(SolveReport {
            flow_value,
            augmentations,
            searches,
            termination,
            min_cut,
        })
    }
}

/// Builds a network from the capacities of `graph` and fills in a maximum
/// flow from `source` to `sink`
pub fn max_flow<N, G>(graph: &G, source: &N, sink: &N) -> FlowResult<FlowNetwork<N>>
where
    N: Node,
    G: CapacitySource<N>,
{
    let (network, _) = MaxFlowSolver::default().solve_source(graph, source, sink)?;
    Ok(network)
}

/// Maximizes the flow of `network` in place, starting from its current flow
pub fn find_max_flow<N: Node>(
    network: &mut FlowNetwork<N>,
    source: &N,
    sink: &N,
) -> FlowResult<()> {
    MaxFlowSolver::default().solve(network, source, sink)?;
    Ok(())
}

/// Checks that any flow value, and so any cut the solve can report, fits in
/// [`Flow`]. The net outflow of the source is bounded by the capacity leaving
/// it and the capacity entering it.
fn ensure_flow_fits<N: Node>(network: &FlowNetwork<N>, source: &N) -> FlowResult<()> {
    let leaving = network.edges_from(source)?.map(FlowEdge::capacity);
    checked_total(leaving, "capacity leaving the source")?;
    let entering = network
        .edges()
        .filter(|edge| edge.end() == source)
        .map(FlowEdge::capacity);
    checked_total(entering, "capacity entering the source")?;
    Ok(())
}

/// Depth-first search for a path of positive-capacity edges.
///
/// Uses an explicit stack of frames so memory stays `O(V)` however deep the
/// graph is. Neighbors are tried in construction order and a node is never
/// entered twice within one search.
fn find_augmenting_path<N: Node>(
    residual: &ResidualGraph<N>,
    source: &N,
    sink: &N,
) -> FlowResult<Option<Vec<EdgeHandle>>> {
    let mut visited: HashSet<&N> = HashSet::new();
    let mut stack = vec![SearchFrame {
        edges: residual.handles_from(source)?,
        cursor: 0,
    }];
    // path[i] is the edge entering the node of stack[i + 1]
    let mut path: Vec<EdgeHandle> = Vec::new();
    visited.insert(source);

    loop {
        let Some(frame) = stack.last_mut() else {
            return Ok(None);
        };
        if frame.cursor == frame.edges.len() {
            stack.pop();
            path.pop();
            continue;
        }
        let handle = frame.edges[frame.cursor];
        frame.cursor += 1;

        let Some(edge) = residual.edge(handle) else {
            continue;
        };
        if edge.capacity() == 0 || visited.contains(edge.end()) {
            continue;
        }

        visited.insert(edge.end());
        path.push(handle);
        if edge.end() == sink {
            return Ok(Some(path));
        }
        stack.push(SearchFrame {
            edges: residual.handles_from(edge.end())?,
            cursor: 0,
        });
    }
}

/// Pushes the bottleneck capacity along `path` and returns it
fn augment<N: Node>(residual: &mut ResidualGraph<N>, path: &[EdgeHandle]) -> FlowResult<Capacity> {
    let bottleneck = path
        .iter()
        .filter_map(|&handle| residual.edge(handle))
        .map(|edge| edge.capacity())
        .min()
        .unwrap_or(0);

    for &handle in path {
        residual.add_flow(handle, bottleneck)?;
    }
    Ok(bottleneck)
}

/// Copies the flow implied by each reverse residual edge onto its network edge
fn write_back<N: Node>(
    residual: &ResidualGraph<N>,
    network: &mut FlowNetwork<N>,
) -> FlowResult<()> {
    for (_, edge) in residual.edges().filter(|(_, edge)| !edge.is_original()) {
        let original = network
            .get_edge_mut(edge.end(), edge.start())?
            .ok_or_else(|| FlowError::missing_endpoints(edge.end(), edge.start()))?;
        original.set_flow(edge.capacity())?;
    }
    Ok(())
}
