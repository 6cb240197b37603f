//! GRAPHFLOW core: graph algorithms and flow solvers.
//!
//! The crate is organized in three layers:
//!
//! * [`data_structures`] holds the weighted [`Graph`], the
//!   [`FlowNetwork`] with its implicit residual graph, and the
//!   float-keyed [`MinHeap`] backing the distance-ordered searches.
//! * [`algorithm`] implements the solvers: BFS and connectivity,
//!   Dijkstra and Bellman-Ford shortest paths, Kruskal and Prim spanning
//!   trees, traveling-salesman tours, Edmonds-Karp maximum flow, and two
//!   minimum-cost flow methods (cycle canceling and successive shortest
//!   paths).
//! * [`io`] parses the line-oriented text formats for graphs and
//!   balanced flow networks.
//!
//! Algorithms that mutate flow take `&mut FlowNetwork` and run to
//! completion on the calling thread; the exhaustive tour search is the
//! one internally parallel routine. Infeasibility is reported through
//! typed errors ([`FlowError::NoFeasibleFlow`] when supplies cannot be
//! routed at all, [`FlowError::NoCostMinimalFlow`] when the cost-minimal
//! routing cannot absorb the remaining supply), never through panics.
//!
//! ```
//! use graphflow_core::algorithm::{dijkstra, edmonds_karp};
//! use graphflow_core::data_structures::{FlowNetwork, Graph, NodeId};
//!
//! let mut g = Graph::with_nodes(3, true);
//! g.add_edge(NodeId(0), NodeId(1), 2.0)?;
//! g.add_edge(NodeId(1), NodeId(2), 2.0)?;
//! g.add_edge(NodeId(0), NodeId(2), 5.0)?;
//!
//! let tree = dijkstra(&g, NodeId(0))?;
//! assert_eq!(tree.distance_to(NodeId(2)), 4.0);
//!
//! let mut net = FlowNetwork::from_graph(&g)?;
//! let flow = edmonds_karp(&mut net, NodeId(0), NodeId(2))?;
//! assert_eq!(flow.value, 7.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod algorithm;
pub mod data_structures;
pub mod io;

pub use data_structures::{
    Edge, FlowEdge, FlowError, FlowNetwork, Graph, GraphError, MinHeap, NodeId, Orientation,
    ResidualArc,
};
