//! Flow correctness verification
//!
//! Independent checks of a flow assignment: the capacity invariant on every
//! edge, conservation at every node other than the terminals, and
//! max-flow/min-cut duality. Duality is certified two ways: in polynomial
//! time through residual reachability, and by exhaustive cut enumeration for
//! small graphs, which shares no code with the solver.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::algorithm::traits::{Capacity, Flow, FlowError, FlowResult, Node};
use crate::data_structures::graph::FlowNetwork;
use crate::data_structures::residual::ResidualGraph;

/// Largest graph the exhaustive cut enumeration accepts
pub const MAX_BRUTE_FORCE_NODES: usize = 20;

/// An `s`-`t` cut: the source side of the partition and the total capacity of
/// the edges leaving it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinCut<N> {
    pub source_side: Vec<N>,
    pub capacity: Capacity,
}

/// A broken flow invariant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FlowViolation<N> {
    /// Edge flow outside `0..=capacity`
    CapacityBound {
        start: N,
        end: N,
        flow: Flow,
        capacity: Capacity,
    },
    /// Inflow differs from outflow at a non-terminal node
    Conservation { node: N, excess: Flow },
}

/// Result of checking a flow assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowCertificate<N> {
    /// Net flow leaving the source
    pub flow_value: Flow,
    pub violations: Vec<FlowViolation<N>>,
}

impl<N> FlowCertificate<N> {
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Checks the capacity invariant on every edge and conservation at every node
/// other than `source` and `sink`.
///
/// Fails with `Overflow` if a node balance does not fit in [`Flow`].
pub fn verify_flow<N: Node>(
    network: &FlowNetwork<N>,
    source: &N,
    sink: &N,
) -> FlowResult<FlowCertificate<N>> {
    ensure_terminals(network, source, sink)?;

    let mut violations = Vec::new();
    let mut excess: HashMap<&N, Flow> = network.nodes().map(|node| (node, 0)).collect();

    for edge in network.edges() {
        if edge.flow() < 0 || edge.flow() > edge.capacity() {
            violations.push(FlowViolation::CapacityBound {
                start: edge.start().clone(),
                end: edge.end().clone(),
                flow: edge.flow(),
                capacity: edge.capacity(),
            });
        }
        let leaving = excess.entry(edge.start()).or_insert(0);
        *leaving = leaving.checked_sub(edge.flow()).ok_or_else(balance_overflow)?;
        let entering = excess.entry(edge.end()).or_insert(0);
        *entering = entering.checked_add(edge.flow()).ok_or_else(balance_overflow)?;
    }

    for node in network.nodes() {
        if node == source || node == sink {
            continue;
        }
        let balance = excess.get(node).copied().unwrap_or(0);
        if balance != 0 {
            violations.push(FlowViolation::Conservation {
                node: node.clone(),
                excess: balance,
            });
        }
    }

    let flow_value = if source == sink {
        0
    } else {
        excess
            .get(source)
            .copied()
            .unwrap_or(0)
            .checked_neg()
            .ok_or_else(balance_overflow)?
    };

    Ok(FlowCertificate {
        flow_value,
        violations,
    })
}

/// Total capacity of the edges leaving `source_side`.
///
/// Fails with `Overflow` if the total does not fit in [`Capacity`].
pub fn cut_capacity<N: Node>(network: &FlowNetwork<N>, source_side: &[N]) -> FlowResult<Capacity> {
    let side: HashSet<&N> = source_side.iter().collect();
    let mut capacity: Capacity = 0;
    for node in source_side {
        for edge in network.edges_from(node)? {
            if !side.contains(edge.end()) {
                capacity = capacity.checked_add(edge.capacity()).ok_or_else(|| {
                    FlowError::Overflow(format!(
                        "capacity of the cut around {:?} does not fit in {} bits",
                        source_side,
                        Capacity::BITS
                    ))
                })?;
            }
        }
    }
    Ok(capacity)
}

/// Certifies that the flow of `network` is maximum.
///
/// Returns the minimum cut formed by the nodes reachable from `source` in the
/// residual graph, or `None` if an augmenting path to `sink` still exists.
pub fn certify_maximum<N: Node>(
    network: &FlowNetwork<N>,
    source: &N,
    sink: &N,
) -> FlowResult<Option<MinCut<N>>> {
    ensure_terminals(network, source, sink)?;
    if source == sink {
        return Err(FlowError::InvalidArgument(
            "no cut separates a node from itself".to_string(),
        ));
    }

    let reached = ResidualGraph::from_network(network).reachable_from(source)?;
    if reached.contains(sink) {
        return Ok(None);
    }

    let source_side: Vec<N> = reached.into_iter().collect();
    let capacity = cut_capacity(network, &source_side)?;
    Ok(Some(MinCut {
        source_side,
        capacity,
    }))
}

/// Finds a minimum `s`-`t` cut by enumerating every partition.
///
/// Exponential in the node count, so graphs above
/// [`MAX_BRUTE_FORCE_NODES`] are refused with `TooLarge`. Ties go to the
/// partition whose membership bitmask over the non-terminal nodes, in
/// insertion order, is smallest.
pub fn brute_force_min_cut<N: Node>(
    network: &FlowNetwork<N>,
    source: &N,
    sink: &N,
) -> FlowResult<MinCut<N>> {
    ensure_terminals(network, source, sink)?;
    if source == sink {
        return Err(FlowError::InvalidArgument(
            "no cut separates a node from itself".to_string(),
        ));
    }
    if network.size() > MAX_BRUTE_FORCE_NODES {
        return Err(FlowError::TooLarge(format!(
            "exhaustive cut enumeration supports at most {} nodes, got {}",
            MAX_BRUTE_FORCE_NODES,
            network.size()
        )));
    }

    let inner: Vec<&N> = network
        .nodes()
        .filter(|&node| node != source && node != sink)
        .collect();

    let mut best: Option<MinCut<N>> = None;
    for mask in 0u32..(1u32 << inner.len()) {
        let source_side: Vec<N> = network
            .nodes()
            .filter(|&node| {
                node == source
                    || inner
                        .iter()
                        .position(|&candidate| candidate == node)
                        .is_some_and(|bit| mask & (1 << bit) != 0)
            })
            .cloned()
            .collect();
        let capacity = cut_capacity(network, &source_side)?;

        if best.as_ref().map_or(true, |cut| capacity < cut.capacity) {
            best = Some(MinCut {
                source_side,
                capacity,
            });
        }
    }

    best.ok_or_else(|| FlowError::InvalidArgument("graph has no s-t partition".to_string()))
}

fn balance_overflow() -> FlowError {
    FlowError::Overflow(format!("node flow balance does not fit in {} bits", Flow::BITS))
}

fn ensure_terminals<N: Node>(network: &FlowNetwork<N>, source: &N, sink: &N) -> FlowResult<()> {
    for terminal in [source, sink] {
        if !network.contains_node(terminal) {
            return Err(FlowError::missing_node(terminal));
        }
    }
    Ok(())
}
