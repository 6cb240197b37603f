//! Traveling-salesman tours over complete undirected graphs.
//!
//! Three strategies with different cost/quality trade-offs:
//!
//! * [`brute_force`] enumerates permutations with branch-and-bound
//!   pruning and is exact. The first branching level fans out across a
//!   rayon thread pool, one subtree per choice of second node.
//! * [`nearest_neighbor`] greedily extends the tour by the cheapest
//!   unvisited node. Fast, no quality guarantee.
//! * [`double_tree`] walks a minimum spanning tree in preorder and
//!   shortcuts repeated nodes. On metric instances the tour costs at
//!   most twice the optimum.
//!
//! All three require a complete graph; incompleteness is detected up
//! front rather than mid-search.

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::mst::{self, MstError};
use crate::data_structures::{Graph, NodeId};

/// Errors raised by the tour constructions.
#[derive(Debug, Error)]
pub enum TspError {
    #[error("tour construction requires a complete graph; edge {0} -> {1} is missing")]
    IncompleteGraph(NodeId, NodeId),

    #[error("tours are defined for undirected graphs only")]
    DirectedGraph,

    #[error("start node {0} does not exist in this graph")]
    InvalidStart(NodeId),

    #[error("graph has no nodes")]
    Empty,
}

impl From<MstError> for TspError {
    fn from(err: MstError) -> Self {
        match err {
            MstError::DirectedGraph => TspError::DirectedGraph,
            MstError::InvalidRoot(node) => TspError::InvalidStart(node),
            // A complete graph is connected; these cannot surface after the
            // completeness check.
            MstError::NotConnected | MstError::Empty => TspError::Empty,
        }
    }
}

/// A closed tour: `nodes` lists the visiting order and ends back at the
/// start node, so a tour over `n` nodes holds `n + 1` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub nodes: Vec<NodeId>,
    pub total_cost: f64,
}

impl Route {
    /// Number of edges traversed by the tour.
    pub fn count_edges(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// Dense weight matrix built once so the inner search never touches the
/// hash-based edge lookup.
fn weight_matrix(graph: &Graph) -> Result<Vec<Vec<f64>>, TspError> {
    if graph.is_directed() {
        return Err(TspError::DirectedGraph);
    }
    let n = graph.node_count();
    if n == 0 {
        return Err(TspError::Empty);
    }
    let mut weights = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let (u, v) = (NodeId(i), NodeId(j));
            let w = graph
                .edge_weight(u, v)
                .ok_or(TspError::IncompleteGraph(u, v))?;
            weights[i][j] = w;
            weights[j][i] = w;
        }
    }
    Ok(weights)
}

/// Exact minimum tour by exhaustive search with pruning.
///
/// The start is fixed at node 0 (a closed tour's cost does not depend on
/// where it starts). Branches whose partial cost already reaches the best
/// known tour are cut; the nearest-neighbor tour seeds that bound so
/// pruning bites from the first subtree on.
pub fn brute_force(graph: &Graph) -> Result<Route, TspError> {
    let weights = weight_matrix(graph)?;
    let n = weights.len();
    let start = NodeId(0);
    if n == 1 {
        return Ok(Route {
            nodes: vec![start],
            total_cost: 0.0,
        });
    }

    let seed = nearest_neighbor(graph, start)?;
    debug!("tsp brute force: seeding bound with {}", seed.total_cost);

    let best = (1..n)
        .into_par_iter()
        .filter_map(|second| {
            let mut visited = vec![false; n];
            visited[0] = true;
            visited[second] = true;
            let mut order = Vec::with_capacity(n);
            order.push(0);
            order.push(second);
            let mut branch = BranchState {
                weights: &weights,
                best_cost: seed.total_cost,
                best_order: None,
            };
            branch.extend(&mut order, &mut visited, weights[0][second]);
            let cost = branch.best_cost;
            branch.best_order.map(|order| (cost, order))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0));

    let (total_cost, mut order) = match best {
        Some(found) => found,
        // No branch improved on the greedy seed.
        None => {
            return Ok(seed);
        }
    };
    order.push(0);
    Ok(Route {
        nodes: order.into_iter().map(NodeId).collect(),
        total_cost,
    })
}

struct BranchState<'a> {
    weights: &'a [Vec<f64>],
    best_cost: f64,
    best_order: Option<Vec<usize>>,
}

impl BranchState<'_> {
    fn extend(&mut self, order: &mut Vec<usize>, visited: &mut [bool], cost: f64) {
        if cost >= self.best_cost {
            return;
        }
        let n = self.weights.len();
        let last = order[order.len() - 1];
        if order.len() == n {
            let closed = cost + self.weights[last][0];
            if closed < self.best_cost {
                self.best_cost = closed;
                self.best_order = Some(order.clone());
            }
            return;
        }
        for next in 1..n {
            if visited[next] {
                continue;
            }
            visited[next] = true;
            order.push(next);
            self.extend(order, visited, cost + self.weights[last][next]);
            order.pop();
            visited[next] = false;
        }
    }
}

/// Greedy tour: always move to the cheapest unvisited node.
pub fn nearest_neighbor(graph: &Graph, start: NodeId) -> Result<Route, TspError> {
    let weights = weight_matrix(graph)?;
    let n = weights.len();
    if start.index() >= n {
        return Err(TspError::InvalidStart(start));
    }
    if n == 1 {
        return Ok(Route {
            nodes: vec![start],
            total_cost: 0.0,
        });
    }

    let mut visited = vec![false; n];
    visited[start.index()] = true;
    let mut nodes = vec![start];
    let mut total_cost = 0.0;
    let mut current = start.index();

    for _ in 1..n {
        let mut next = None;
        for candidate in 0..n {
            if visited[candidate] {
                continue;
            }
            let w = weights[current][candidate];
            match next {
                Some((_, best)) if best <= w => {}
                _ => next = Some((candidate, w)),
            }
        }
        // Completeness guarantees an unvisited candidate exists.
        if let Some((candidate, w)) = next {
            visited[candidate] = true;
            nodes.push(NodeId(candidate));
            total_cost += w;
            current = candidate;
        }
    }

    total_cost += weights[current][start.index()];
    nodes.push(start);
    Ok(Route { nodes, total_cost })
}

/// Double-tree heuristic: preorder walk of a minimum spanning tree with
/// shortcuts over already-visited nodes.
pub fn double_tree(graph: &Graph, start: NodeId) -> Result<Route, TspError> {
    let weights = weight_matrix(graph)?;
    let n = weights.len();
    if start.index() >= n {
        return Err(TspError::InvalidStart(start));
    }
    if n == 1 {
        return Ok(Route {
            nodes: vec![start],
            total_cost: 0.0,
        });
    }

    let tree = mst::prim(graph, start)?.to_graph(n);

    // Iterative preorder DFS over the tree; the visit order is the tour.
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        if visited[node.index()] {
            continue;
        }
        visited[node.index()] = true;
        order.push(node);
        for (next, _) in tree.neighbors(node) {
            if !visited[next.index()] {
                stack.push(next);
            }
        }
    }
    debug_assert_eq!(order.len(), n);

    let mut total_cost = 0.0;
    for pair in order.windows(2) {
        total_cost += weights[pair[0].index()][pair[1].index()];
    }
    total_cost += weights[order[n - 1].index()][start.index()];
    order.push(start);
    Ok(Route {
        nodes: order,
        total_cost,
    })
}
