//! Augmenting-path maximum flow core
//!
//! Computes maximum `s`-`t` flows in directed graphs with integral capacities
//! using the Ford-Fulkerson method. The crate is organized leaf to root:
//!
//! - [`data_structures::graph`]: the caller-owned capacitated network, with
//!   `0 <= flow <= capacity` enforced on every mutation
//! - [`data_structures::residual`]: the per-solve residual graph of paired
//!   sibling edges
//! - [`algorithm::graph::max_flow`]: the search, augment and write-back loop
//! - [`validation`]: independent feasibility and min-cut certificates
//!
//! ```
//! use maxflow_core::{max_flow, IntegralDirectedGraph};
//!
//! let graph = IntegralDirectedGraph::from_edges([("s", "x", 100), ("s", "t", 10)]);
//! let network = max_flow(&graph, &"s", &"t").unwrap();
//! assert_eq!(network.flow_value(&"s").unwrap(), 10);
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod data_structures;
pub mod validation;

pub use crate::algorithm::graph::max_flow::{
    find_max_flow, max_flow, MaxFlowSolver, SolveReport, SolverConfig, Termination,
};
pub use crate::algorithm::traits::{Capacity, CapacitySource, Flow, FlowError, FlowResult, Node};
pub use crate::data_structures::{FlowEdge, FlowNetwork, IntegralDirectedGraph};
pub use crate::validation::{FlowCertificate, MinCut};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
