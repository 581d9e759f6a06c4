//! Residual graph with paired sibling edges
//!
//! The residual graph of a flow network keeps every node of the network and
//! replaces each edge `(u, v)` carrying `flow` out of `capacity` by two
//! edges: a forward edge `(u, v)` whose capacity is `capacity - flow`, and a
//! reverse edge `(v, u)` whose capacity is `flow`. Pushing a unit across the
//! forward edge adds a unit of flow to the original edge; pushing it across
//! the reverse edge retracts one. Only capacities are stored, the flow is
//! implicit in the remaining capacity of the reverse sibling.
//!
//! # Representation
//! Edges live in an arena and refer to their sibling by [`EdgeHandle`], so the
//! pair never forms an ownership cycle and sibling lookup stays O(1). For
//! every pair the sum of both capacities equals the original capacity for the
//! whole lifetime of the graph, and [`ResidualGraph::add_flow`] is the only
//! mutator.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use indexmap::{IndexMap, IndexSet};

use crate::algorithm::traits::{Capacity, Flow, FlowError, FlowResult, Node};
use crate::data_structures::graph::FlowNetwork;

/// Arena index of a residual edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeHandle(usize);

impl EdgeHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Residual edge with a link to its sibling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidualEdge<N> {
    start: N,
    end: N,
    capacity: Capacity,
    /// Same direction as the network edge it was built from
    original: bool,
    /// Sibling with swapped endpoints
    reverse: EdgeHandle,
}

impl<N: Node> ResidualEdge<N> {
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

    /// Whether this edge points the same way as the network edge
    #[inline]
    pub fn is_original(&self) -> bool {
        self.original
    }

    #[inline]
    pub fn reverse(&self) -> EdgeHandle {
        self.reverse
    }
}

/// Residual graph derived from a snapshot of a [`FlowNetwork`]
#[derive(Debug, Clone)]
pub struct ResidualGraph<N: Node> {
    /// Edge arena; siblings are always allocated next to each other
    edges: Vec<ResidualEdge<N>>,
    /// Outgoing edge handles per node, in construction order
    adjacency: IndexMap<N, Vec<EdgeHandle>>,
}

impl<N: Node> ResidualGraph<N> {
    /// Builds the residual graph of the current flow state of `network`
    pub fn from_network(network: &FlowNetwork<N>) -> Self {
        let mut adjacency: IndexMap<N, Vec<EdgeHandle>> = network
            .nodes()
            .map(|node| (node.clone(), Vec::new()))
            .collect();
        let mut edges = Vec::with_capacity(2 * network.edge_count());

        for edge in network.edges() {
            let forward = EdgeHandle(edges.len());
            let reverse = EdgeHandle(edges.len() + 1);

            edges.push(ResidualEdge {
                start: edge.start().clone(),
                end: edge.end().clone(),
                capacity: edge.residual(),
                original: true,
                reverse,
            });
            edges.push(ResidualEdge {
                start: edge.end().clone(),
                end: edge.start().clone(),
                capacity: edge.flow(),
                original: false,
                reverse: forward,
            });

            // Endpoints of a network edge are always network nodes
            if let Some(outgoing) = adjacency.get_mut(edge.start()) {
                outgoing.push(forward);
            }
            if let Some(outgoing) = adjacency.get_mut(edge.end()) {
                outgoing.push(reverse);
            }
        }

        Self { edges, adjacency }
    }

    /// Pushes `amount` units of flow across the edge at `handle`.
    ///
    /// A negative amount retracts flow, which is the same as pushing the
    /// opposite amount across the sibling. Fails with `InvalidArgument` if the
    /// amount exceeds the available capacity; nothing is changed in that case.
    pub fn add_flow(&mut self, handle: EdgeHandle, amount: Flow) -> FlowResult<()> {
        let edge = self.lookup(handle)?;
        let reverse = edge.reverse;
        if amount < 0 {
            let retracted = amount.checked_neg().ok_or_else(|| {
                FlowError::InvalidArgument(format!("cannot retract {} units of flow", amount))
            })?;
            return self.add_flow(reverse, retracted);
        }
        if amount > edge.capacity {
            return Err(FlowError::InvalidArgument(format!(
                "cannot push {} units of flow across {:?} -> {:?} of capacity {}",
                amount, edge.start, edge.end, edge.capacity
            )));
        }

        self.edges[handle.0].capacity -= amount;
        self.edges[reverse.0].capacity += amount;
        Ok(())
    }

    /// Returns the edge at `handle`, if it belongs to this graph
    pub fn edge(&self, handle: EdgeHandle) -> Option<&ResidualEdge<N>> {
        self.edges.get(handle.0)
    }

    /// Read-only view of the edges leaving `node`
    pub fn edges_from(
        &self,
        node: &N,
    ) -> FlowResult<impl ExactSizeIterator<Item = (EdgeHandle, &ResidualEdge<N>)> + '_> {
        let handles = self.handles_from(node)?;
        Ok(handles.iter().map(move |&handle| (handle, &self.edges[handle.0])))
    }

    /// Handles of the edges leaving `node`, in construction order
    pub fn handles_from(&self, node: &N) -> FlowResult<&[EdgeHandle]> {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .ok_or_else(|| FlowError::missing_node(node))
    }

    /// Iterates over every edge together with its handle
    pub fn edges(&self) -> impl ExactSizeIterator<Item = (EdgeHandle, &ResidualEdge<N>)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .map(|(index, edge)| (EdgeHandle(index), edge))
    }

    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &N> + '_ {
        self.adjacency.keys()
    }

    #[inline]
    pub fn contains_node(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes reachable from `source` over edges with positive capacity, in
    /// discovery order.
    ///
    /// Once no augmenting path is left this is the source side of a minimum
    /// cut.
    pub fn reachable_from(&self, source: &N) -> FlowResult<IndexSet<N>> {
        let mut reached = IndexSet::new();
        let mut pending = vec![self.handles_from(source)?];
        reached.insert(source.clone());

        while let Some(handles) = pending.pop() {
            for &handle in handles {
                let edge = &self.edges[handle.0];
                if edge.capacity > 0 && reached.insert(edge.end.clone()) {
                    pending.push(self.handles_from(&edge.end)?);
                }
            }
        }

        Ok(reached)
    }

    fn lookup(&self, handle: EdgeHandle) -> FlowResult<&ResidualEdge<N>> {
        self.edges.get(handle.0).ok_or_else(|| {
            FlowError::InvalidArgument(format!(
                "edge handle {} is not part of this graph",
                handle.0
            ))
        })
    }
}
