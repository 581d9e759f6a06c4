//! Core trait and error definitions for the max-flow core
//!
//! This module establishes the vocabulary shared by every graph structure and
//! solver in the crate: the node identity bound, the integral capacity and
//! flow types, the error taxonomy, and the abstract weighted-adjacency
//! contract a solver consumes from external graph sources.
//!
//! # Key Design Principles
//! - Node identities are opaque; only equality and hashing are used
//! - Absence of a node is expressed with `Option`, never a sentinel value
//! - Every precondition is checked before any state is mutated
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt::Debug;
use std::hash::Hash;

/// Edge capacity type. Signed so that negative inputs are caught and rejected.
pub type Capacity = i64;

/// Flow value type, bounded by the capacity of the edge carrying it
pub type Flow = i64;

/// Node identity bound.
///
/// Any caller-supplied type with value equality and a hash qualifies. The
/// identity is used for set and map membership only, never for ordering
/// decisions in the search.
pub trait Node: Clone + Eq + Hash + Debug {}

impl<T> Node for T where T: Clone + Eq + Hash + Debug {}

/// Error taxonomy for graph mutation and flow computation
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid solver configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration could not be parsed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Graph too large: {0}")]
    TooLarge(String),

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

/// Result type for flow operations
pub type FlowResult<T> = Result<T, FlowError>;

impl FlowError {
    /// Builds a `NodeNotFound` error naming the missing node
    pub fn missing_node<N: Debug>(node: &N) -> Self {
        FlowError::NodeNotFound(format!("{:?}", node))
    }

    /// Builds a `NodeNotFound` error for an edge whose endpoints must both exist
    pub fn missing_endpoints<N: Debug>(start: &N, end: &N) -> Self {
        FlowError::NodeNotFound(format!(
            "both endpoints of {:?} -> {:?} must be in the graph",
            start, end
        ))
    }
}

/// Sums capacities or flows, failing with `Overflow` instead of wrapping.
///
/// Individual edges are bounded by `Capacity::MAX`, but totals over several
/// edges are not.
pub fn checked_total<I>(values: I, what: &str) -> FlowResult<Flow>
where
    I: IntoIterator<Item = Flow>,
{
    values.into_iter().try_fold(0, |total: Flow, value| {
        total.checked_add(value).ok_or_else(|| {
            FlowError::Overflow(format!("{} does not fit in {} bits", what, Flow::BITS))
        })
    })
}

/// Abstract weighted-adjacency source consumed by the solver.
///
/// This is the minimal shape a solve needs from any external graph: the set of
/// nodes, and for each node the `(neighbor, capacity)` pairs leaving it.
/// Implementations should enumerate in a stable order so that solves are
/// reproducible.
pub trait CapacitySource<N: Node> {
    /// Iterates over every node of the source graph
    fn source_nodes<'a>(&'a self) -> impl Iterator<Item = &'a N> + 'a
    where
        N: 'a;

    /// Iterates over the `(neighbor, capacity)` pairs leaving `node`.
    ///
    /// Fails with `NodeNotFound` when `node` is not part of the source.
    fn capacities_from<'a>(
        &'a self,
        node: &N,
    ) -> FlowResult<impl Iterator<Item = (&'a N, Capacity)> + 'a>
    where
        N: 'a;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_node<N: Node>(_: &N) {}

    #[test]
    fn test_common_types_are_nodes() {
        assert_node(&"s");
        assert_node(&String::from("t"));
        assert_node(&42usize);
        assert_node(&(1u32, 'x'));
    }

    #[test]
    fn test_error_messages_name_the_node() {
        let err = FlowError::missing_node(&"ghost");
        assert_eq!(err.to_string(), "Node not found: \"ghost\"");

        let err = FlowError::missing_endpoints(&1, &2);
        assert!(err.to_string().contains("1 -> 2"));
    }

    #[test]
    fn test_checked_total() {
        assert_eq!(checked_total([1, 2, 3], "sum").unwrap(), 6);
        assert_eq!(checked_total([Flow::MAX, -1, 1], "sum").unwrap(), Flow::MAX);
        assert_eq!(checked_total(std::iter::empty(), "sum").unwrap(), 0);

        let err = checked_total([Flow::MAX, 1], "cut capacity").unwrap_err();
        assert!(matches!(err, FlowError::Overflow(_)));
        assert!(err.to_string().contains("cut capacity"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: FlowError = parse.unwrap_err().into();
        assert!(matches!(err, FlowError::Serialization(_)));
    }
}
