//! Graph data structures for flow computation
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod graph;
pub mod integral;
pub mod residual;

pub use self::graph::{FlowEdge, FlowNetwork};
pub use self::integral::IntegralDirectedGraph;
pub use self::residual::{EdgeHandle, ResidualEdge, ResidualGraph};
