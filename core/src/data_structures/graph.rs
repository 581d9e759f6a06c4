//! Capacitated flow network
//!
//! This module implements the caller-owned directed graph a max-flow solve
//! reads capacities from and writes flows back into. Every edge carries an
//! integral capacity and a current flow, and the invariant
//! `0 <= flow <= capacity` is enforced on every mutation: an offending call
//! fails before touching any state and nothing is ever clamped.
//!
//! # Representation
//! Nodes map to an insertion-ordered map of outgoing edges keyed by endpoint,
//! so there is at most one edge per ordered pair and iteration over nodes and
//! over a node's outgoing edges is stable across runs.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use indexmap::IndexMap;
use serde::Serialize;

use crate::algorithm::traits::{
    checked_total, Capacity, CapacitySource, Flow, FlowError, FlowResult, Node,
};

/// Directed edge with capacity and current flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowEdge<N> {
    /// Start node
    start: N,
    /// End node
    end: N,
    /// Maximum permissible flow
    capacity: Capacity,
    /// Flow currently assigned to this edge
    flow: Flow,
}

impl<N: Node> FlowEdge<N> {
    fn new(start: N, end: N) -> Self {
        Self {
            start,
            end,
            capacity: 0,
            flow: 0,
        }
    }

    #[inline]
    pub fn start(&self) -> &N {
        &self.start
    }

    #[inline]
    pub fn end(&self) -> &N {
        &self.end
    }

    #[inline]
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    #[inline]
    pub fn flow(&self) -> Flow {
        self.flow
    }

    /// Capacity still available for additional flow
    #[inline]
    pub fn residual(&self) -> Capacity {
        self.capacity - self.flow
    }

    /// Sets the capacity of this edge.
    ///
    /// Fails with `InvalidArgument` if the capacity is negative or lower than
    /// the flow currently crossing the edge.
    pub fn set_capacity(&mut self, capacity: Capacity) -> FlowResult<()> {
        if capacity < 0 {
            return Err(FlowError::InvalidArgument(format!(
                "capacity must be non-negative, got {}",
                capacity
            )));
        }
        if capacity < self.flow {
            return Err(FlowError::InvalidArgument(format!(
                "cannot lower capacity of {:?} -> {:?} to {} below its current flow {}",
                self.start, self.end, capacity, self.flow
            )));
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Sets the flow across this edge.
    ///
    /// Fails with `InvalidArgument` if the flow is negative or exceeds the
    /// capacity.
    pub fn set_flow(&mut self, flow: Flow) -> FlowResult<()> {
        if flow < 0 {
            return Err(FlowError::InvalidArgument(format!(
                "flow must be non-negative, got {}",
                flow
            )));
        }
        if flow > self.capacity {
            return Err(FlowError::InvalidArgument(format!(
                "cannot set flow along {:?} -> {:?} of capacity {} to {}",
                self.start, self.end, self.capacity, flow
            )));
        }
        self.flow = flow;
        Ok(())
    }
}

/// Directed capacitated graph with per-edge flow
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct FlowNetwork<N: Node> {
    /// Outgoing edges keyed by start node, then by end node
    adjacency: IndexMap<N, IndexMap<N, FlowEdge<N>>>,
}

impl<N: Node> Default for FlowNetwork<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Node> FlowNetwork<N> {
    /// Creates an empty network
    pub fn new() -> Self {
        Self {
            adjacency: IndexMap::new(),
        }
    }

    /// Adds a node. Returns `false` and leaves the graph untouched if the node
    /// already exists.
    pub fn add_node(&mut self, node: N) -> bool {
        if self.adjacency.contains_key(&node) {
            return false;
        }
        self.adjacency.insert(node, IndexMap::new());
        true
    }

    /// Returns the edge from `start` to `end`, creating it with zero capacity
    /// and zero flow if absent. An existing edge is returned unmodified.
    pub fn add_edge(&mut self, start: &N, end: &N) -> FlowResult<&mut FlowEdge<N>> {
        if !self.adjacency.contains_key(end) {
            return Err(FlowError::missing_endpoints(start, end));
        }
        let arcs = self
            .adjacency
            .get_mut(start)
            .ok_or_else(|| FlowError::missing_endpoints(start, end))?;

        Ok(arcs
            .entry(end.clone())
            .or_insert_with(|| FlowEdge::new(start.clone(), end.clone())))
    }

    /// Looks up the edge from `start` to `end`.
    ///
    /// A missing endpoint is an error; a missing edge between present nodes is
    /// `Ok(None)`.
    pub fn get_edge(&self, start: &N, end: &N) -> FlowResult<Option<&FlowEdge<N>>> {
        let arcs = self.arcs_between(start, end)?;
        Ok(arcs.get(end))
    }

    /// Mutable variant of [`get_edge`](Self::get_edge)
    pub fn get_edge_mut(&mut self, start: &N, end: &N) -> FlowResult<Option<&mut FlowEdge<N>>> {
        if !self.adjacency.contains_key(end) {
            return Err(FlowError::missing_endpoints(start, end));
        }
        let arcs = self
            .adjacency
            .get_mut(start)
            .ok_or_else(|| FlowError::missing_endpoints(start, end))?;
        Ok(arcs.get_mut(end))
    }

    /// Removes the edge from `start` to `end`, returning it if it existed.
    /// Remaining edges keep their relative order.
    pub fn remove_edge(&mut self, start: &N, end: &N) -> FlowResult<Option<FlowEdge<N>>> {
        if !self.adjacency.contains_key(end) {
            return Err(FlowError::missing_endpoints(start, end));
        }
        let arcs = self
            .adjacency
            .get_mut(start)
            .ok_or_else(|| FlowError::missing_endpoints(start, end))?;
        Ok(arcs.shift_remove(end))
    }

    /// Read-only view of the edges leaving `node`, in insertion order
    pub fn edges_from(
        &self,
        node: &N,
    ) -> FlowResult<impl ExactSizeIterator<Item = &FlowEdge<N>> + '_> {
        self.adjacency
            .get(node)
            .map(|arcs| arcs.values())
            .ok_or_else(|| FlowError::missing_node(node))
    }

    /// Iterates over every edge, grouped by start node
    pub fn edges(&self) -> impl Iterator<Item = &FlowEdge<N>> + '_ {
        self.adjacency.values().flat_map(|arcs| arcs.values())
    }

    /// Iterates over nodes in insertion order
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &N> + '_ {
        self.adjacency.keys()
    }

    #[inline]
    pub fn contains_node(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Number of nodes
    #[inline]
    pub fn size(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(IndexMap::len).sum()
    }

    /// Net flow leaving `source`: outgoing flow minus incoming flow.
    ///
    /// For a solve started from zero flow nothing ever enters the source, so
    /// this is the sum of flow on the edges leaving it.
    ///
    /// Fails with `Overflow` if the total does not fit in [`Flow`].
    pub fn flow_value(&self, source: &N) -> FlowResult<Flow> {
        let outgoing = checked_total(self.edges_from(source)?.map(FlowEdge::flow), "outflow")?;
        let incoming = self.inflow(source)?;
        outgoing
            .checked_sub(incoming)
            .ok_or_else(|| FlowError::Overflow(format!("flow value of {:?}", source)))
    }

    /// Incoming flow minus outgoing flow at `node`
    pub fn excess(&self, node: &N) -> FlowResult<Flow> {
        let outgoing = checked_total(self.edges_from(node)?.map(FlowEdge::flow), "outflow")?;
        let incoming = self.inflow(node)?;
        incoming
            .checked_sub(outgoing)
            .ok_or_else(|| FlowError::Overflow(format!("excess of {:?}", node)))
    }

    fn inflow(&self, node: &N) -> FlowResult<Flow> {
        let entering = self
            .edges()
            .filter(|edge| edge.end() == node)
            .map(FlowEdge::flow);
        checked_total(entering, "inflow")
    }

    /// Sets the flow on every edge back to zero
    pub fn reset_flows(&mut self) {
        for arcs in self.adjacency.values_mut() {
            for edge in arcs.values_mut() {
                edge.flow = 0;
            }
        }
    }

    fn arcs_between(&self, start: &N, end: &N) -> FlowResult<&IndexMap<N, FlowEdge<N>>> {
        if !self.adjacency.contains_key(end) {
            return Err(FlowError::missing_endpoints(start, end));
        }
        self.adjacency
            .get(start)
            .ok_or_else(|| FlowError::missing_endpoints(start, end))
    }
}

impl<N: Node> CapacitySource<N> for FlowNetwork<N> {
    fn source_nodes<'a>(&'a self) -> impl Iterator<Item = &'a N> + 'a
    where
        N: 'a,
    {
        self.nodes()
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
        Ok(arcs.values().map(|edge| (edge.end(), edge.capacity())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> FlowNetwork<&'static str> {
        let mut network = FlowNetwork::new();
        for node in ["a", "b", "c"] {
            network.add_node(node);
        }
        network.add_edge(&"a", &"b").unwrap().set_capacity(5).unwrap();
        network.add_edge(&"b", &"c").unwrap().set_capacity(3).unwrap();
        network.add_edge(&"a", &"c").unwrap().set_capacity(2).unwrap();
        network
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut network = FlowNetwork::new();
        assert!(network.is_empty());
        assert!(network.add_node("s"));
        assert!(!network.add_node("s"));
        assert_eq!(network.size(), 1);
        assert!(network.contains_node(&"s"));
        assert!(!network.contains_node(&"t"));
    }

    #[test]
    fn test_add_edge_returns_existing_edge_unmodified() {
        let mut network = triangle();
        network.get_edge_mut(&"a", &"b").unwrap().unwrap().set_flow(4).unwrap();

        let edge = network.add_edge(&"a", &"b").unwrap();
        assert_eq!(edge.capacity(), 5);
        assert_eq!(edge.flow(), 4);
        assert_eq!(network.edge_count(), 3);
    }

    #[test]
    fn test_new_edge_starts_empty() {
        let mut network = triangle();
        let edge = network.add_edge(&"c", &"a").unwrap();
        assert_eq!(edge.start(), &"c");
        assert_eq!(edge.end(), &"a");
        assert_eq!(edge.capacity(), 0);
        assert_eq!(edge.flow(), 0);
    }

    #[test]
    fn test_missing_endpoints_are_not_found() {
        let mut network = triangle();
        assert!(matches!(network.add_edge(&"a", &"z"), Err(FlowError::NodeNotFound(_))));
        assert!(matches!(network.add_edge(&"z", &"a"), Err(FlowError::NodeNotFound(_))));
        assert!(matches!(network.get_edge(&"z", &"a"), Err(FlowError::NodeNotFound(_))));
        assert!(matches!(network.remove_edge(&"a", &"z"), Err(FlowError::NodeNotFound(_))));
        assert!(matches!(network.edges_from(&"z"), Err(FlowError::NodeNotFound(_))));
        assert_eq!(network.edge_count(), 3);
    }

    #[test]
    fn test_absent_edge_between_present_nodes() {
        let network = triangle();
        assert!(network.get_edge(&"c", &"a").unwrap().is_none());
        assert!(network.get_edge(&"a", &"c").unwrap().is_some());
    }

    #[test]
    fn test_remove_edge() {
        let mut network = triangle();

        let removed = network.remove_edge(&"a", &"b").unwrap();
        assert_eq!(removed.map(|edge| edge.capacity()), Some(5));
        assert!(network.get_edge(&"a", &"b").unwrap().is_none());

        // Removing again is a no-op
        assert!(network.remove_edge(&"a", &"b").unwrap().is_none());
        assert_eq!(network.edge_count(), 2);
    }

    #[test]
    fn test_capacity_mutation_rules() {
        let mut network = triangle();
        let edge = network.get_edge_mut(&"a", &"b").unwrap().unwrap();

        assert!(matches!(edge.set_capacity(-1), Err(FlowError::InvalidArgument(_))));
        edge.set_flow(3).unwrap();
        assert!(matches!(edge.set_capacity(2), Err(FlowError::InvalidArgument(_))));
        assert_eq!(edge.capacity(), 5);

        // Lowering to exactly the current flow is allowed
        edge.set_capacity(3).unwrap();
        assert_eq!(edge.capacity(), 3);
        assert_eq!(edge.residual(), 0);
    }

    #[test]
    fn test_flow_mutation_rules() {
        let mut network = triangle();
        let edge = network.get_edge_mut(&"b", &"c").unwrap().unwrap();

        assert!(matches!(edge.set_flow(-1), Err(FlowError::InvalidArgument(_))));
        assert!(matches!(edge.set_flow(4), Err(FlowError::InvalidArgument(_))));
        assert_eq!(edge.flow(), 0);

        edge.set_flow(3).unwrap();
        assert_eq!(edge.flow(), 3);
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut network = FlowNetwork::new();
        for node in [5, 1, 4, 2] {
            network.add_node(node);
        }
        network.add_edge(&5, &2).unwrap();
        network.add_edge(&5, &1).unwrap();
        network.add_edge(&5, &4).unwrap();
        network.remove_edge(&5, &1).unwrap();

        let nodes: Vec<_> = network.nodes().copied().collect();
        assert_eq!(nodes, vec![5, 1, 4, 2]);

        let ends: Vec<_> = network.edges_from(&5).unwrap().map(|edge| *edge.end()).collect();
        assert_eq!(ends, vec![2, 4]);
    }

    #[test]
    fn test_flow_value_and_excess() {
        let mut network = triangle();
        network.get_edge_mut(&"a", &"b").unwrap().unwrap().set_flow(2).unwrap();
        network.get_edge_mut(&"b", &"c").unwrap().unwrap().set_flow(2).unwrap();
        network.get_edge_mut(&"a", &"c").unwrap().unwrap().set_flow(1).unwrap();

        assert_eq!(network.flow_value(&"a").unwrap(), 3);
        assert_eq!(network.excess(&"b").unwrap(), 0);
        assert_eq!(network.excess(&"c").unwrap(), 3);

        network.reset_flows();
        assert!(network.edges().all(|edge| edge.flow() == 0));
        assert_eq!(network.edges().map(FlowEdge::capacity).sum::<Capacity>(), 10);
    }

    #[test]
    fn test_flow_totals_report_overflow() {
        let mut network = FlowNetwork::new();
        for node in ["s", "a", "b"] {
            network.add_node(node);
        }
        for end in ["a", "b"] {
            let edge = network.add_edge(&"s", &end).unwrap();
            edge.set_capacity(Capacity::MAX).unwrap();
            edge.set_flow(Capacity::MAX).unwrap();
        }

        assert!(matches!(network.flow_value(&"s"), Err(FlowError::Overflow(_))));
        assert!(matches!(network.excess(&"s"), Err(FlowError::Overflow(_))));
        assert_eq!(network.excess(&"a").unwrap(), Capacity::MAX);
    }

    #[test]
    fn test_capacity_source_view() {
        let network = triangle();
        let pairs: Vec<_> = network
            .capacities_from(&"a")
            .unwrap()
            .map(|(end, capacity)| (*end, capacity))
            .collect();
        assert_eq!(pairs, vec![("b", 5), ("c", 2)]);
        assert_eq!(network.source_nodes().count(), 3);
        assert!(network.capacities_from(&"z").is_err());
    }

    #[test]
    fn test_serializes_as_nested_map() {
        let network = triangle();
        let json = serde_json::to_value(&network).unwrap();
        assert_eq!(json["a"]["b"]["capacity"], 5);
        assert_eq!(json["b"]["c"]["flow"], 0);
    }
}
