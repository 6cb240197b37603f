//! Graph algorithms: traversal, shortest paths, spanning trees, tours,
//! maximum flow, and minimum-cost flow.

pub mod components;
pub mod max_flow;
pub mod min_cost_flow;
pub mod mst;
pub mod shortest_path;
pub mod tsp;

pub use components::{breadth_first_search, connected_components};
pub use max_flow::{edmonds_karp, MaxFlowResult};
pub use min_cost_flow::{cycle_canceling, successive_shortest_paths, MinCostFlowResult};
pub use mst::{kruskal, prim, MstError, MstResult, UnionFind};
pub use shortest_path::{bellman_ford, dijkstra, ShortestPathError, ShortestPathTree};
pub use tsp::{brute_force, double_tree, nearest_neighbor, Route, TspError};
