//! Minimum spanning trees: Kruskal and Prim.
//!
//! Kruskal sorts the edge set and grows a forest guarded by a union-find
//! structure (path compression + union by rank, near-constant amortized
//! operations). Prim grows a single tree from a root with a binary-heap
//! frontier. Both apply only to undirected graphs and report a
//! disconnected input as [`MstError::NotConnected`] rather than returning
//! a partial forest.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data_structures::{Edge, Graph, MinHeap, NodeId};

/// Errors raised by the spanning-tree algorithms.
#[derive(Debug, Error)]
pub enum MstError {
    #[error("graph is not connected; no spanning tree exists")]
    NotConnected,

    #[error("spanning trees are defined for undirected graphs only")]
    DirectedGraph,

    #[error("root node {0} does not exist in this graph")]
    InvalidRoot(NodeId),

    #[error("graph has no nodes")]
    Empty,
}

/// A minimum spanning tree: its edge set and total weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MstResult {
    pub edges: Vec<Edge>,
    pub total_weight: f64,
}

impl MstResult {
    /// Materializes the tree as an undirected [`Graph`] over the same node
    /// identifiers.
    pub fn to_graph(&self, node_count: usize) -> Graph {
        let mut tree = Graph::with_nodes(node_count, false);
        for edge in &self.edges {
            // Edges came out of a valid graph; re-adding cannot fail.
            let _ = tree.add_edge(edge.source, edge.target, edge.weight);
        }
        tree
    }
}

/// Disjoint-set forest with path compression and union by rank.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
    components: usize,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            components: n,
        }
    }

    /// Representative of the set containing `x`, compressing the walked
    /// path.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merges the sets of `x` and `y`; returns false when they were
    /// already joined (adding the edge would close a cycle).
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return false;
        }
        let (low, high) = if self.rank[root_x] < self.rank[root_y] {
            (root_x, root_y)
        } else {
            (root_y, root_x)
        };
        self.parent[low] = high;
        if self.rank[low] == self.rank[high] {
            self.rank[high] += 1;
        }
        self.components -= 1;
        true
    }

    pub fn connected(&mut self, x: usize, y: usize) -> bool {
        self.find(x) == self.find(y)
    }

    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }
}

/// Kruskal's algorithm: edges in ascending weight order, cycle edges
/// skipped via union-find.
pub fn kruskal(graph: &Graph) -> Result<MstResult, MstError> {
    if graph.is_directed() {
        return Err(MstError::DirectedGraph);
    }
    let n = graph.node_count();
    if n == 0 {
        return Err(MstError::Empty);
    }

    let mut sorted: Vec<&Edge> = graph.edges().collect();
    sorted.sort_by(|a, b| a.weight.total_cmp(&b.weight));

    let mut forest = UnionFind::new(n);
    let mut edges = Vec::with_capacity(n.saturating_sub(1));
    let mut total_weight = 0.0;

    for edge in sorted {
        if forest.union(edge.source.index(), edge.target.index()) {
            edges.push(*edge);
            total_weight += edge.weight;
            if edges.len() == n - 1 {
                break;
            }
        }
    }

    if edges.len() != n - 1 {
        return Err(MstError::NotConnected);
    }
    Ok(MstResult {
        edges,
        total_weight,
    })
}

/// Prim's algorithm growing from `root` with a lazy-decrease-key heap.
pub fn prim(graph: &Graph, root: NodeId) -> Result<MstResult, MstError> {
    if graph.is_directed() {
        return Err(MstError::DirectedGraph);
    }
    let n = graph.node_count();
    if n == 0 {
        return Err(MstError::Empty);
    }
    if root.index() >= n {
        return Err(MstError::InvalidRoot(root));
    }

    let mut in_tree = vec![false; n];
    let mut edges = Vec::with_capacity(n - 1);
    let mut total_weight = 0.0;
    let mut frontier: MinHeap<(NodeId, Option<Edge>)> = MinHeap::with_capacity(n);
    frontier.push(0.0, (root, None));

    while let Some((weight, (node, via))) = frontier.pop() {
        if in_tree[node.index()] {
            continue;
        }
        in_tree[node.index()] = true;
        if let Some(edge) = via {
            edges.push(edge);
            total_weight += weight;
        }
        for edge in graph.incident_edges(node) {
            if let Some(other) = edge.opposite(node) {
                if !in_tree[other.index()] {
                    frontier.push(edge.weight, (other, Some(*edge)));
                }
            }
        }
    }

    if edges.len() != n - 1 {
        return Err(MstError::NotConnected);
    }
    Ok(MstResult {
        edges,
        total_weight,
    })
}
