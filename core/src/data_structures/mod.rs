//! Core data structures: the weighted graph, the flow network with its
//! implicit residual graph, and the priority queue backing the
//! distance-ordered searches.

pub mod flow_network;
pub mod graph;
pub mod priority_queue;

pub use flow_network::{FlowEdge, FlowError, FlowNetwork, Orientation, ResidualArc};
pub use graph::{Edge, Graph, GraphError, NodeId};
pub use priority_queue::MinHeap;
