//! Weighted graph representation shared by every algorithm in the engine.
//!
//! The graph owns its node set and edge list. Adjacency is stored as
//! per-node vectors of edge indices, and an ordered `(source, target)`
//! lookup map gives O(1) weight queries. A single [`Edge`] is traversable
//! in both directions when the graph is undirected and one-way otherwise.
//!
//! Validation happens at construction time: an edge referencing a node
//! that does not exist or carrying a non-finite weight is rejected with a
//! descriptive [`GraphError`] instead of producing silently wrong results
//! later in an algorithm run.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Node identifier, opaque to callers and owned by the [`Graph`].
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A weighted edge between two nodes of the owning graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

impl Edge {
    /// Returns the endpoint opposite to `node`, if `node` is an endpoint.
    pub fn opposite(&self, node: NodeId) -> Option<NodeId> {
        if node == self.source {
            Some(self.target)
        } else if node == self.target {
            Some(self.source)
        } else {
            None
        }
    }
}

/// Errors raised while building or querying a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} does not exist in this graph")]
    InvalidNode(NodeId),

    #[error("edge weight must be finite, got {0}")]
    InvalidWeight(f64),
}

/// Weighted graph with directed or undirected edge semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    directed: bool,
    edges: Vec<Edge>,
    /// Per-node indices into `edges`. For undirected graphs every edge
    /// appears in the adjacency of both endpoints.
    adjacency: Vec<Vec<usize>>,
    /// Ordered `(source, target)` pair to edge index. When parallel edges
    /// exist the lightest one is kept, so weight queries stay exact for
    /// shortest-path purposes.
    lookup: HashMap<(NodeId, NodeId), usize>,
}

impl Graph {
    /// Creates an empty graph. `directed` fixes the traversal semantics of
    /// every edge added later.
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            edges: Vec::new(),
            adjacency: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Creates a graph with `n` nodes and no edges.
    pub fn with_nodes(n: usize, directed: bool) -> Self {
        Self {
            directed,
            edges: Vec::new(),
            adjacency: vec![Vec::new(); n],
            lookup: HashMap::new(),
        }
    }

    /// Adds a node and returns its identifier.
    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId(self.adjacency.len());
        self.adjacency.push(Vec::new());
        id
    }

    /// Adds a weighted edge. Fails fast on unknown endpoints or non-finite
    /// weights.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: f64,
    ) -> Result<(), GraphError> {
        self.check_node(source)?;
        self.check_node(target)?;
        if !weight.is_finite() {
            return Err(GraphError::InvalidWeight(weight));
        }

        let index = self.edges.len();
        self.edges.push(Edge {
            source,
            target,
            weight,
        });
        self.adjacency[source.index()].push(index);
        if !self.directed && source != target {
            self.adjacency[target.index()].push(index);
        }

        self.index_edge((source, target), index, weight);
        if !self.directed {
            self.index_edge((target, source), index, weight);
        }
        Ok(())
    }

    fn index_edge(&mut self, key: (NodeId, NodeId), index: usize, weight: f64) {
        match self.lookup.get(&key) {
            Some(&existing) if self.edges[existing].weight <= weight => {}
            _ => {
                self.lookup.insert(key, index);
            }
        }
    }

    fn check_node(&self, node: NodeId) -> Result<(), GraphError> {
        if node.index() < self.adjacency.len() {
            Ok(())
        } else {
            Err(GraphError::InvalidNode(node))
        }
    }

    #[inline]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over all node identifiers.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.adjacency.len()).map(NodeId)
    }

    /// Iterates over the full edge set in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Edges incident to `node` that may be traversed starting from it:
    /// outgoing edges in a directed graph, all incident edges otherwise.
    pub fn incident_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.adjacency
            .get(node.index())
            .map(|indices| indices.iter().map(|&i| &self.edges[i]))
            .into_iter()
            .flatten()
    }

    /// Neighbors reachable from `node` in one step, paired with the
    /// connecting edge weight.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.incident_edges(node)
            .filter_map(move |edge| Some((edge.opposite(node)?, edge.weight)))
    }

    /// Weight of the lightest edge traversable from `source` to `target`.
    pub fn edge_weight(&self, source: NodeId, target: NodeId) -> Option<f64> {
        self.lookup
            .get(&(source, target))
            .map(|&i| self.edges[i].weight)
    }

    /// Sum of all edge weights. A spanning tree's total weight and a
    /// tour's total cost both reduce to this.
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }
}
