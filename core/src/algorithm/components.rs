//! Unweighted traversal: breadth-first search and connectivity.
//!
//! BFS ignores edge weights and finds a path with the fewest edges.
//! Connectivity is evaluated on the undirected view of the graph, so a
//! directed graph counts weakly connected components.

use std::collections::VecDeque;

use log::debug;

use crate::algorithm::mst::UnionFind;
use crate::data_structures::{Graph, NodeId};

/// Fewest-edge path from `source` to `target`, endpoints included.
/// Returns `None` when `target` is unreachable or either endpoint is
/// unknown. `source == target` yields the single-node path.
pub fn breadth_first_search(graph: &Graph, source: NodeId, target: NodeId) -> Option<Vec<NodeId>> {
    let n = graph.node_count();
    if source.index() >= n || target.index() >= n {
        return None;
    }
    if source == target {
        return Some(vec![source]);
    }

    let mut predecessor: Vec<Option<NodeId>> = vec![None; n];
    let mut seen = vec![false; n];
    let mut queue = VecDeque::new();
    seen[source.index()] = true;
    queue.push_back(source);

    'search: while let Some(node) = queue.pop_front() {
        for (next, _) in graph.neighbors(node) {
            if seen[next.index()] {
                continue;
            }
            seen[next.index()] = true;
            predecessor[next.index()] = Some(node);
            if next == target {
                break 'search;
            }
            queue.push_back(next);
        }
    }

    if !seen[target.index()] {
        return None;
    }

    let mut path = vec![target];
    let mut current = target;
    while let Some(prev) = predecessor[current.index()] {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    debug_assert_eq!(path.first(), Some(&source));
    Some(path)
}

/// Number of connected components, treating every edge as undirected.
pub fn connected_components(graph: &Graph) -> usize {
    let mut forest = UnionFind::new(graph.node_count());
    for edge in graph.edges() {
        forest.union(edge.source.index(), edge.target.index());
    }
    let count = forest.components();
    debug!(
        "connectivity: {count} components over {} nodes",
        graph.node_count()
    );
    count
}
