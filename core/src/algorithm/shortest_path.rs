//! Single-source shortest paths: Dijkstra and Bellman-Ford.
//!
//! Both algorithms produce a [`ShortestPathTree`], a per-node mapping of
//! (predecessor, distance, reachable) rooted at the source. Dijkstra
//! requires non-negative weights and validates that precondition up front;
//! Bellman-Ford accepts arbitrary weights and reports a reachable negative
//! cycle as data via [`ShortestPathTree::has_negative_cycle`], after which
//! distances are advisory upper bounds only.
//!
//! Neither algorithm mutates the graph, so read-only queries may run
//! repeatedly (or concurrently) with identical results.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data_structures::{Graph, MinHeap, NodeId};

/// Errors raised when a shortest-path precondition is violated.
#[derive(Debug, Error)]
pub enum ShortestPathError {
    #[error("source node {0} does not exist in this graph")]
    InvalidSource(NodeId),

    // Field names avoid `source`, which thiserror reserves for error
    // chaining.
    #[error("Dijkstra requires non-negative weights; edge {tail} -> {head} has weight {weight}")]
    NegativeWeight {
        tail: NodeId,
        head: NodeId,
        weight: f64,
    },
}

/// Predecessor/distance structure built by a shortest-path run.
///
/// Immutable after construction. Unreached nodes report a distance of
/// `f64::INFINITY` and no predecessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortestPathTree {
    source: NodeId,
    distances: Vec<f64>,
    predecessors: Vec<Option<NodeId>>,
    negative_cycle: bool,
}

impl ShortestPathTree {
    fn new(node_count: usize, source: NodeId) -> Self {
        let mut distances = vec![f64::INFINITY; node_count];
        distances[source.index()] = 0.0;
        Self {
            source,
            distances,
            predecessors: vec![None; node_count],
            negative_cycle: false,
        }
    }

    #[inline]
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Distance from the source, `f64::INFINITY` if unreached. Not
    /// trustworthy as a minimum once [`Self::has_negative_cycle`] is true.
    #[inline]
    pub fn distance_to(&self, node: NodeId) -> f64 {
        self.distances[node.index()]
    }

    #[inline]
    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.predecessors[node.index()]
    }

    #[inline]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.distances[node.index()].is_finite()
    }

    /// True when a cycle of strictly negative total weight is reachable
    /// from the source.
    #[inline]
    pub fn has_negative_cycle(&self) -> bool {
        self.negative_cycle
    }

    /// Reconstructs the source-to-`node` path by walking predecessors.
    /// Returns `None` for unreached nodes and for trees poisoned by a
    /// negative cycle (where predecessor chains may loop).
    pub fn path_to(&self, node: NodeId) -> Option<Vec<NodeId>> {
        if self.negative_cycle || !self.is_reachable(node) {
            return None;
        }
        let mut path = vec![node];
        let mut current = node;
        while let Some(prev) = self.predecessors[current.index()] {
            path.push(prev);
            current = prev;
            if path.len() > self.distances.len() {
                // Defensive bound; cannot trigger without a cycle.
                return None;
            }
        }
        if current != self.source {
            return None;
        }
        path.reverse();
        Some(path)
    }
}

/// Dijkstra's algorithm with a binary-heap frontier and lazy decrease-key.
///
/// Fails fast with [`ShortestPathError::NegativeWeight`] if any edge weight
/// is negative; use [`bellman_ford`] for such graphs.
pub fn dijkstra(graph: &Graph, source: NodeId) -> Result<ShortestPathTree, ShortestPathError> {
    if source.index() >= graph.node_count() {
        return Err(ShortestPathError::InvalidSource(source));
    }
    if let Some(edge) = graph.edges().find(|e| e.weight < 0.0) {
        return Err(ShortestPathError::NegativeWeight {
            tail: edge.source,
            head: edge.target,
            weight: edge.weight,
        });
    }

    let mut tree = ShortestPathTree::new(graph.node_count(), source);
    let mut visited = vec![false; graph.node_count()];
    let mut frontier = MinHeap::with_capacity(graph.node_count());
    frontier.push(0.0, source);

    while let Some((distance, node)) = frontier.pop() {
        if visited[node.index()] {
            continue; // stale entry left behind by a lazy decrease-key
        }
        visited[node.index()] = true;
        trace!("dijkstra: settle {node} at distance {distance}");

        for (neighbor, weight) in graph.neighbors(node) {
            if visited[neighbor.index()] {
                continue;
            }
            let candidate = distance + weight;
            if candidate < tree.distances[neighbor.index()] {
                tree.distances[neighbor.index()] = candidate;
                tree.predecessors[neighbor.index()] = Some(node);
                frontier.push(candidate, neighbor);
            }
        }
    }

    Ok(tree)
}

/// Bellman-Ford with early exit and negative-cycle detection.
///
/// Runs `n - 1` relaxation rounds over the full edge set, then one extra
/// pass: any relaxation still possible means a negative cycle is reachable
/// from the source, which is recorded on the tree rather than reported as
/// an error. Unreachable nodes never participate in relaxation and are
/// excluded from cycle consideration.
pub fn bellman_ford(graph: &Graph, source: NodeId) -> Result<ShortestPathTree, ShortestPathError> {
    if source.index() >= graph.node_count() {
        return Err(ShortestPathError::InvalidSource(source));
    }

    let mut tree = ShortestPathTree::new(graph.node_count(), source);
    let n = graph.node_count();

    let mut rounds = 0;
    for _ in 1..n {
        rounds += 1;
        if !relax_all(graph, &mut tree) {
            break;
        }
    }
    debug!("bellman-ford: converged after {rounds} rounds");

    // One extra pass; a further improvement certifies a negative cycle.
    if relax_all(graph, &mut tree) {
        debug!("bellman-ford: negative cycle reachable from {source}");
        tree.negative_cycle = true;
    }

    Ok(tree)
}

/// Relaxes every traversable edge once, returning whether anything
/// improved.
fn relax_all(graph: &Graph, tree: &mut ShortestPathTree) -> bool {
    let mut improved = false;
    for edge in graph.edges() {
        improved |= relax(tree, edge.source, edge.target, edge.weight);
        if !graph.is_directed() {
            improved |= relax(tree, edge.target, edge.source, edge.weight);
        }
    }
    improved
}

#[inline]
fn relax(tree: &mut ShortestPathTree, from: NodeId, to: NodeId, weight: f64) -> bool {
    let base = tree.distances[from.index()];
    if !base.is_finite() {
        return false;
    }
    let candidate = base + weight;
    if candidate < tree.distances[to.index()] {
        tree.distances[to.index()] = candidate;
        tree.predecessors[to.index()] = Some(from);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::Graph;

    fn n(i: usize) -> NodeId {
        NodeId(i)
    }

    /// Directed graph with two routes from 0 to 3 and an unreachable node 4.
    fn sample_directed() -> Graph {
        let mut g = Graph::with_nodes(5, true);
        g.add_edge(n(0), n(1), 1.0).unwrap();
        g.add_edge(n(1), n(2), 2.0).unwrap();
        g.add_edge(n(0), n(2), 4.0).unwrap();
        g.add_edge(n(2), n(3), 1.0).unwrap();
        g
    }

    #[test]
    fn dijkstra_finds_cheapest_route() {
        let g = sample_directed();
        let tree = dijkstra(&g, n(0)).unwrap();
        assert_eq!(tree.distance_to(n(3)), 4.0);
        assert_eq!(tree.path_to(n(3)), Some(vec![n(0), n(1), n(2), n(3)]));
    }

    #[test]
    fn unreached_nodes_have_infinite_distance() {
        let g = sample_directed();
        let tree = dijkstra(&g, n(0)).unwrap();
        assert!(!tree.is_reachable(n(4)));
        assert_eq!(tree.distance_to(n(4)), f64::INFINITY);
        assert_eq!(tree.path_to(n(4)), None);
    }

    #[test]
    fn dijkstra_rejects_negative_weights() {
        let mut g = sample_directed();
        g.add_edge(n(3), n(4), -1.0).unwrap();
        let err = dijkstra(&g, n(0)).unwrap_err();
        match err {
            ShortestPathError::NegativeWeight { tail, head, weight } => {
                assert_eq!(tail, n(3));
                assert_eq!(head, n(4));
                assert_eq!(weight, -1.0);
            }
            other => panic!("expected NegativeWeight, got {other}"),
        }
        let message = ShortestPathError::NegativeWeight {
            tail: n(3),
            head: n(4),
            weight: -1.0,
        }
        .to_string();
        assert!(message.contains("n3 -> n4"));
    }

    #[test]
    fn dijkstra_rejects_unknown_source() {
        let g = sample_directed();
        assert!(matches!(
            dijkstra(&g, n(99)),
            Err(ShortestPathError::InvalidSource(_))
        ));
    }

    #[test]
    fn bellman_ford_matches_dijkstra_on_non_negative_weights() {
        let g = sample_directed();
        let d = dijkstra(&g, n(0)).unwrap();
        let b = bellman_ford(&g, n(0)).unwrap();
        assert!(!b.has_negative_cycle());
        for node in g.nodes() {
            assert_eq!(d.distance_to(node), b.distance_to(node), "node {node}");
        }
    }

    #[test]
    fn bellman_ford_handles_negative_edges_without_cycle() {
        let mut g = Graph::with_nodes(4, true);
        g.add_edge(n(0), n(1), 4.0).unwrap();
        g.add_edge(n(0), n(2), 2.0).unwrap();
        g.add_edge(n(2), n(1), -3.0).unwrap();
        g.add_edge(n(1), n(3), 1.0).unwrap();
        let tree = bellman_ford(&g, n(0)).unwrap();
        assert!(!tree.has_negative_cycle());
        assert_eq!(tree.distance_to(n(1)), -1.0);
        assert_eq!(tree.distance_to(n(3)), 0.0);
    }

    #[test]
    fn three_node_cycle_summing_to_minus_one_sets_flag() {
        let mut g = Graph::with_nodes(3, true);
        g.add_edge(n(0), n(1), 2.0).unwrap();
        g.add_edge(n(1), n(2), 1.0).unwrap();
        g.add_edge(n(2), n(0), -4.0).unwrap();
        let tree = bellman_ford(&g, n(0)).unwrap();
        assert!(tree.has_negative_cycle());
    }

    #[test]
    fn zero_and_positive_sum_cycles_leave_flag_clear() {
        for closing in [1.0, -3.0] {
            // Cycle weights: 2 + 1 + closing, i.e. sums to 4.0 and 0.0.
            let mut g = Graph::with_nodes(3, true);
            g.add_edge(n(0), n(1), 2.0).unwrap();
            g.add_edge(n(1), n(2), 1.0).unwrap();
            g.add_edge(n(2), n(0), closing).unwrap();
            let tree = bellman_ford(&g, n(0)).unwrap();
            assert!(!tree.has_negative_cycle(), "closing weight {closing}");
        }
    }

    #[test]
    fn unreachable_negative_cycle_is_ignored() {
        let mut g = Graph::with_nodes(5, true);
        g.add_edge(n(0), n(1), 1.0).unwrap();
        // Cycle 2 -> 3 -> 4 -> 2 with sum -1, not reachable from 0.
        g.add_edge(n(2), n(3), 1.0).unwrap();
        g.add_edge(n(3), n(4), 1.0).unwrap();
        g.add_edge(n(4), n(2), -3.0).unwrap();
        let tree = bellman_ford(&g, n(0)).unwrap();
        assert!(!tree.has_negative_cycle());
        assert_eq!(tree.distance_to(n(1)), 1.0);
    }

    #[test]
    fn undirected_graphs_relax_both_directions() {
        let mut g = Graph::with_nodes(3, false);
        g.add_edge(n(0), n(1), 5.0).unwrap();
        g.add_edge(n(2), n(1), 1.0).unwrap();
        let d = dijkstra(&g, n(0)).unwrap();
        let b = bellman_ford(&g, n(0)).unwrap();
        assert_eq!(d.distance_to(n(2)), 6.0);
        assert_eq!(b.distance_to(n(2)), 6.0);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let g = sample_directed();
        let first = dijkstra(&g, n(0)).unwrap();
        let second = dijkstra(&g, n(0)).unwrap();
        assert_eq!(first, second);
        let bf_first = bellman_ford(&g, n(0)).unwrap();
        let bf_second = bellman_ford(&g, n(0)).unwrap();
        assert_eq!(bf_first, bf_second);
    }
}
