//! Plain integral weighted digraph
//!
//! A directed graph that only records one integral capacity per ordered pair
//! of nodes, with no notion of flow. It is the simplest implementation of
//! [`CapacitySource`] and the usual input to
//! [`max_flow`](crate::algorithm::graph::max_flow::max_flow).
//!
//! Capacities are stored exactly as given; sign checks happen when the solver
//! copies them into a [`FlowNetwork`](crate::data_structures::graph::FlowNetwork).
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{Capacity, CapacitySource, FlowError, FlowResult, Node};

/// Directed graph with integral edge capacities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegralDirectedGraph<N: Node> {
    adjacency: IndexMap<N, IndexMap<N, Capacity>>,
}

impl<N: Node> Default for IntegralDirectedGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Node> IntegralDirectedGraph<N> {
    pub fn new() -> Self {
        Self {
            adjacency: IndexMap::new(),
        }
    }

    /// Builds a graph from `(start, end, capacity)` triples, adding endpoints
    /// as they are first seen. A repeated pair keeps the last capacity.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (N, N, Capacity)>,
    {
        let mut graph = Self::new();
        for (start, end, capacity) in edges {
            graph.add_node(start.clone());
            graph.add_node(end.clone());
            graph
                .adjacency
                .entry(start)
                .or_default()
                .insert(end, capacity);
        }
        graph
    }

    /// Adds a node; returns whether it was new
    pub fn add_node(&mut self, node: N) -> bool {
        if self.adjacency.contains_key(&node) {
            return false;
        }
        self.adjacency.insert(node, IndexMap::new());
        true
    }

    /// Sets the capacity of the edge from `start` to `end`, creating it if
    /// needed. Both endpoints must already exist.
    pub fn add_edge(&mut self, start: &N, end: &N, capacity: Capacity) -> FlowResult<()> {
        if !self.adjacency.contains_key(end) {
            return Err(FlowError::missing_endpoints(start, end));
        }
        let arcs = self
            .adjacency
            .get_mut(start)
            .ok_or_else(|| FlowError::missing_endpoints(start, end))?;
        arcs.insert(end.clone(), capacity);
        Ok(())
    }

    pub fn edge_capacity(&self, start: &N, end: &N) -> FlowResult<Option<Capacity>> {
        if !self.adjacency.contains_key(end) {
            return Err(FlowError::missing_endpoints(start, end));
        }
        let arcs = self
            .adjacency
            .get(start)
            .ok_or_else(|| FlowError::missing_endpoints(start, end))?;
        Ok(arcs.get(end).copied())
    }

    pub fn remove_edge(&mut self, start: &N, end: &N) -> FlowResult<Option<Capacity>> {
        if !self.adjacency.contains_key(end) {
            return Err(FlowError::missing_endpoints(start, end));
        }
        let arcs = self
            .adjacency
            .get_mut(start)
            .ok_or_else(|| FlowError::missing_endpoints(start, end))?;
        Ok(arcs.shift_remove(end))
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    pub fn size(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(IndexMap::len).sum()
    }
}

impl<N: Node> CapacitySource<N> for IntegralDirectedGraph<N> {
    fn source_nodes<'a>(&'a self) -> impl Iterator<Item = &'a N> + 'a
    where
        N: 'a,
    {
        self.adjacency.keys()
    }

    fn capacities_from<'a>(
        &'a self,
        node: &N,
    ) -> FlowResult<impl Iterator<Item = (&'a N, Capacity)> + 'a>
    where
        N: 'a,
    {
        let arcs = self
            .adjacency
            .get(node)
            .ok_or_else(|| FlowError::missing_node(node))?;
        Ok(arcs.iter().map(|(end, &capacity)| (end, capacity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_edges_collects_nodes_in_order() {
        let graph =
            IntegralDirectedGraph::from_edges([("s", "a", 3), ("a", "t", 2), ("s", "t", 1)]);
        let nodes: Vec<_> = graph.source_nodes().copied().collect();
        assert_eq!(nodes, vec!["s", "a", "t"]);
        assert_eq!(graph.edge_count(), 3);

        let from_s: Vec<_> = graph
            .capacities_from(&"s")
            .unwrap()
            .map(|(end, capacity)| (*end, capacity))
            .collect();
        assert_eq!(from_s, vec![("a", 3), ("t", 1)]);
    }

    #[test]
    fn test_repeated_pair_keeps_last_capacity() {
        let mut graph = IntegralDirectedGraph::from_edges([(1, 2, 4), (1, 2, 9)]);
        assert_eq!(graph.edge_capacity(&1, &2).unwrap(), Some(9));

        graph.add_edge(&1, &2, 5).unwrap();
        assert_eq!(graph.edge_capacity(&1, &2).unwrap(), Some(5));
        assert_eq!(graph.edge_capacity(&2, &1).unwrap(), None);
    }

    #[test]
    fn test_missing_nodes() {
        let mut graph: IntegralDirectedGraph<u32> = IntegralDirectedGraph::new();
        assert!(graph.is_empty());
        assert!(graph.add_node(1));
        assert!(!graph.add_node(1));

        assert!(matches!(graph.add_edge(&1, &2, 3), Err(FlowError::NodeNotFound(_))));
        assert!(matches!(graph.edge_capacity(&2, &1), Err(FlowError::NodeNotFound(_))));
        assert!(matches!(graph.remove_edge(&1, &2), Err(FlowError::NodeNotFound(_))));
        assert!(graph.capacities_from(&2).is_err());
        assert_eq!(graph.size(), 1);
    }

    #[test]
    fn test_remove_edge() {
        let mut graph = IntegralDirectedGraph::from_edges([('a', 'b', 1), ('a', 'c', 2)]);
        assert_eq!(graph.remove_edge(&'a', &'b').unwrap(), Some(1));
        assert_eq!(graph.remove_edge(&'a', &'b').unwrap(), None);
        assert!(graph.contains_node(&'b'));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let graph = IntegralDirectedGraph::from_edges([
            ("s".to_string(), "t".to_string(), 10),
            ("s".to_string(), "x".to_string(), 100),
        ]);
        let json = serde_json::to_string(&graph).unwrap();
        let parsed: IntegralDirectedGraph<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, graph);
    }
}
