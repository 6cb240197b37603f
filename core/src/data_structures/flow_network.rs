//! Flow network with an implicit residual graph.
//!
//! Every forward edge carries a capacity, a cost, and the current flow.
//! The residual counterpart of an edge is never materialized: a
//! [`ResidualArc`] is an orientation over a stored edge record, and its
//! residual capacity is computed as `capacity - flow` (forward) or `flow`
//! (reverse). This keeps one mutable flow value per edge, so forward and
//! reverse views can never drift apart, and avoids a doubled edge list with
//! cyclic ownership between paired arc objects.
//!
//! Nodes carry a balance: positive for supply, negative for demand, zero
//! for transshipment nodes. Flow-mutating algorithms take the network as an
//! exclusively borrowed argument; there is no shared graph state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::graph::{Graph, NodeId};

/// Tolerance for floating-point capacity and balance comparisons.
pub(crate) const EPS: f64 = 1e-9;

/// Errors raised by flow-network construction and the flow solvers.
///
/// The two infeasibility conditions are first-class outcomes, not bugs:
/// callers are expected to match on them.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("node {0} does not exist in this network")]
    InvalidNode(NodeId),

    #[error("edge capacity must be non-negative, got {0}")]
    NegativeCapacity(f64),

    #[error("capacity and cost must be finite, got {0}")]
    NonFiniteValue(f64),

    #[error("an arc from {0} to {1} already exists; parallel arcs are not representable")]
    DuplicateEdge(NodeId, NodeId),

    #[error("augmentation of {requested} exceeds path bottleneck {available}")]
    InsufficientCapacity { requested: f64, available: f64 },

    #[error("node balances sum to {imbalance}, not zero")]
    UnbalancedNetwork { imbalance: f64 },

    #[error("no feasible flow satisfies the supply/demand constraints")]
    NoFeasibleFlow,

    #[error("no cost-minimal flow possible: remaining supply cannot be routed")]
    NoCostMinimalFlow,
}

/// A forward edge of the network with its mutable flow value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlowEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub capacity: f64,
    pub cost: f64,
    pub flow: f64,
}

impl FlowEdge {
    /// Residual capacity in the forward direction.
    #[inline]
    pub fn residual(&self) -> f64 {
        self.capacity - self.flow
    }

    /// Residual capacity in the reverse direction.
    #[inline]
    pub fn reverse_residual(&self) -> f64 {
        self.flow
    }
}

/// Traversal direction of a residual arc relative to its stored edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Forward,
    Reverse,
}

/// A view on one direction of a stored edge in the residual graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidualArc {
    pub edge: usize,
    pub orientation: Orientation,
}

impl ResidualArc {
    #[inline]
    pub fn forward(edge: usize) -> Self {
        Self {
            edge,
            orientation: Orientation::Forward,
        }
    }

    #[inline]
    pub fn reverse(edge: usize) -> Self {
        Self {
            edge,
            orientation: Orientation::Reverse,
        }
    }
}

/// A directed flow network with node balances and an implicit residual
/// graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNetwork {
    balances: Vec<f64>,
    edges: Vec<FlowEdge>,
    /// Forward edges leaving each node.
    out_edges: Vec<Vec<usize>>,
    /// Forward edges entering each node; their reverse arcs leave it.
    in_edges: Vec<Vec<usize>>,
    /// Ordered `(source, target)` pair to edge index.
    index: HashMap<(NodeId, NodeId), usize>,
    /// Maximum-flow value recorded by the last max-flow run, if any.
    max_flow: Option<f64>,
}

impl FlowNetwork {
    /// Creates a network with `n` nodes, all balances zero.
    pub fn with_nodes(n: usize) -> Self {
        Self {
            balances: vec![0.0; n],
            edges: Vec::new(),
            out_edges: vec![Vec::new(); n],
            in_edges: vec![Vec::new(); n],
            index: HashMap::new(),
            max_flow: None,
        }
    }

    /// Wraps a graph as a flow network: every edge weight becomes a
    /// capacity, costs default to zero, flow starts at zero. Undirected
    /// edges become one arc per direction.
    pub fn from_graph(graph: &Graph) -> Result<Self, FlowError> {
        let mut network = Self::with_nodes(graph.node_count());
        for edge in graph.edges() {
            network.add_edge(edge.source, edge.target, edge.weight, 0.0)?;
            if !graph.is_directed() && edge.source != edge.target {
                network.add_edge(edge.target, edge.source, edge.weight, 0.0)?;
            }
        }
        Ok(network)
    }

    /// Adds a node with the given balance (supply > 0, demand < 0).
    pub fn add_node(&mut self, balance: f64) -> NodeId {
        let id = NodeId(self.balances.len());
        self.balances.push(balance);
        self.out_edges.push(Vec::new());
        self.in_edges.push(Vec::new());
        id
    }

    /// Adds a forward arc. Validation is fail-fast: negative or non-finite
    /// capacity, non-finite cost, unknown endpoints, and duplicate ordered
    /// pairs are all rejected.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        capacity: f64,
        cost: f64,
    ) -> Result<usize, FlowError> {
        self.check_node(source)?;
        self.check_node(target)?;
        if !capacity.is_finite() {
            return Err(FlowError::NonFiniteValue(capacity));
        }
        if !cost.is_finite() {
            return Err(FlowError::NonFiniteValue(cost));
        }
        if capacity < 0.0 {
            return Err(FlowError::NegativeCapacity(capacity));
        }
        if self.index.contains_key(&(source, target)) {
            return Err(FlowError::DuplicateEdge(source, target));
        }

        let index = self.edges.len();
        self.edges.push(FlowEdge {
            source,
            target,
            capacity,
            cost,
            flow: 0.0,
        });
        self.out_edges[source.index()].push(index);
        self.in_edges[target.index()].push(index);
        self.index.insert((source, target), index);
        Ok(index)
    }

    fn check_node(&self, node: NodeId) -> Result<(), FlowError> {
        if node.index() < self.balances.len() {
            Ok(())
        } else {
            Err(FlowError::InvalidNode(node))
        }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.balances.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.balances.len()).map(NodeId)
    }

    pub fn edges(&self) -> impl Iterator<Item = &FlowEdge> {
        self.edges.iter()
    }

    #[inline]
    pub fn edge(&self, index: usize) -> &FlowEdge {
        &self.edges[index]
    }

    #[inline]
    pub fn balance(&self, node: NodeId) -> f64 {
        self.balances[node.index()]
    }

    pub fn set_balance(&mut self, node: NodeId, balance: f64) {
        self.balances[node.index()] = balance;
    }

    pub(crate) fn set_flow(&mut self, edge: usize, flow: f64) {
        self.edges[edge].flow = flow;
    }

    /// Net excess at `node`: its balance plus inflow minus outflow. Zero
    /// everywhere means the flow meets all supply/demand constraints.
    pub fn excess(&self, node: NodeId) -> f64 {
        let inflow: f64 = self.in_edges[node.index()]
            .iter()
            .map(|&i| self.edges[i].flow)
            .sum();
        let outflow: f64 = self.out_edges[node.index()]
            .iter()
            .map(|&i| self.edges[i].flow)
            .sum();
        self.balances[node.index()] + inflow - outflow
    }

    /// Residual capacity between an ordered node pair: remaining forward
    /// capacity if a forward arc exists, current flow if only the reverse
    /// of a stored arc connects them, zero otherwise.
    pub fn residual_capacity(&self, source: NodeId, target: NodeId) -> f64 {
        if let Some(&i) = self.index.get(&(source, target)) {
            return self.edges[i].residual();
        }
        if let Some(&i) = self.index.get(&(target, source)) {
            return self.edges[i].reverse_residual();
        }
        0.0
    }

    /// All residual arcs leaving `node`, including fully saturated ones;
    /// callers filter by [`FlowNetwork::residual`].
    pub fn residual_arcs_from(&self, node: NodeId) -> impl Iterator<Item = ResidualArc> + '_ {
        let forward = self.out_edges[node.index()]
            .iter()
            .map(|&i| ResidualArc::forward(i));
        let reverse = self.in_edges[node.index()]
            .iter()
            .map(|&i| ResidualArc::reverse(i));
        forward.chain(reverse)
    }

    /// Tail node of a residual arc (where traversal starts).
    #[inline]
    pub fn arc_tail(&self, arc: ResidualArc) -> NodeId {
        let edge = &self.edges[arc.edge];
        match arc.orientation {
            Orientation::Forward => edge.source,
            Orientation::Reverse => edge.target,
        }
    }

    /// Head node of a residual arc (where traversal ends).
    #[inline]
    pub fn arc_head(&self, arc: ResidualArc) -> NodeId {
        let edge = &self.edges[arc.edge];
        match arc.orientation {
            Orientation::Forward => edge.target,
            Orientation::Reverse => edge.source,
        }
    }

    /// Residual capacity of an arc.
    #[inline]
    pub fn residual(&self, arc: ResidualArc) -> f64 {
        let edge = &self.edges[arc.edge];
        match arc.orientation {
            Orientation::Forward => edge.residual(),
            Orientation::Reverse => edge.reverse_residual(),
        }
    }

    /// Cost of traversing an arc; reverse traversal refunds the forward
    /// cost.
    #[inline]
    pub fn cost(&self, arc: ResidualArc) -> f64 {
        let edge = &self.edges[arc.edge];
        match arc.orientation {
            Orientation::Forward => edge.cost,
            Orientation::Reverse => -edge.cost,
        }
    }

    /// Smallest residual capacity along `path`.
    pub fn bottleneck(&self, path: &[ResidualArc]) -> f64 {
        path.iter()
            .map(|&arc| self.residual(arc))
            .fold(f64::INFINITY, f64::min)
    }

    /// Pushes `amount` along every arc of `path`, decreasing flow where the
    /// path traverses a stored edge in reverse.
    ///
    /// Precondition: `amount` must not exceed the path bottleneck. On
    /// success, flow conservation is restored at every interior path node
    /// (what enters through one arc leaves through the next).
    pub fn augment(&mut self, path: &[ResidualArc], amount: f64) -> Result<(), FlowError> {
        if path.is_empty() || amount <= 0.0 {
            return Ok(());
        }
        let available = self.bottleneck(path);
        if amount > available + EPS {
            return Err(FlowError::InsufficientCapacity {
                requested: amount,
                available,
            });
        }
        for &arc in path {
            let edge = &mut self.edges[arc.edge];
            match arc.orientation {
                Orientation::Forward => edge.flow += amount,
                Orientation::Reverse => edge.flow -= amount,
            }
            // Clamp float drift so 0 <= flow <= capacity stays exact.
            if edge.flow < 0.0 && edge.flow > -EPS {
                edge.flow = 0.0;
            }
            if edge.flow > edge.capacity && edge.flow < edge.capacity + EPS {
                edge.flow = edge.capacity;
            }
        }
        Ok(())
    }

    /// Total cost of the current flow: Σ flow · cost over forward edges.
    pub fn total_cost(&self) -> f64 {
        self.edges.iter().map(|e| e.flow * e.cost).sum()
    }

    /// Checks that all balances cancel out; a transportation problem with
    /// unequal total supply and demand has no feasible flow by
    /// construction.
    pub fn validate_balanced(&self) -> Result<(), FlowError> {
        let imbalance: f64 = self.balances.iter().sum();
        if imbalance.abs() > EPS {
            Err(FlowError::UnbalancedNetwork { imbalance })
        } else {
            Ok(())
        }
    }

    /// Max-flow value recorded by the last maximum-flow run on this
    /// network, if any.
    pub fn recorded_max_flow(&self) -> Option<f64> {
        self.max_flow
    }

    pub(crate) fn record_max_flow(&mut self, value: f64) {
        self.max_flow = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> FlowNetwork {
        // s=0, a=1, b=2, t=3
        let mut net = FlowNetwork::with_nodes(4);
        net.add_edge(NodeId(0), NodeId(1), 4.0, 1.0).unwrap();
        net.add_edge(NodeId(0), NodeId(2), 3.0, 2.0).unwrap();
        net.add_edge(NodeId(1), NodeId(3), 2.0, 1.0).unwrap();
        net.add_edge(NodeId(2), NodeId(3), 5.0, 1.0).unwrap();
        net
    }

    #[test]
    fn residual_capacity_follows_flow() {
        let mut net = diamond();
        assert_eq!(net.residual_capacity(NodeId(0), NodeId(1)), 4.0);
        assert_eq!(net.residual_capacity(NodeId(1), NodeId(0)), 0.0);
        assert_eq!(net.residual_capacity(NodeId(1), NodeId(2)), 0.0);

        net.set_flow(0, 3.0);
        assert_eq!(net.residual_capacity(NodeId(0), NodeId(1)), 1.0);
        assert_eq!(net.residual_capacity(NodeId(1), NodeId(0)), 3.0);
    }

    #[test]
    fn augment_updates_both_directions() {
        let mut net = diamond();
        let path = [ResidualArc::forward(0), ResidualArc::forward(2)];
        net.augment(&path, 2.0).unwrap();
        assert_eq!(net.edge(0).flow, 2.0);
        assert_eq!(net.edge(2).flow, 2.0);

        // Undo one unit through the reverse arcs.
        let back = [ResidualArc::reverse(2), ResidualArc::reverse(0)];
        net.augment(&back, 1.0).unwrap();
        assert_eq!(net.edge(0).flow, 1.0);
        assert_eq!(net.edge(2).flow, 1.0);
    }

    #[test]
    fn augment_rejects_amount_over_bottleneck() {
        let mut net = diamond();
        let path = [ResidualArc::forward(0), ResidualArc::forward(2)];
        let err = net.augment(&path, 3.0).unwrap_err();
        assert!(matches!(
            err,
            FlowError::InsufficientCapacity { available, .. } if available == 2.0
        ));
    }

    #[test]
    fn conservation_at_interior_nodes_after_augment() {
        let mut net = diamond();
        net.augment(&[ResidualArc::forward(0), ResidualArc::forward(2)], 2.0)
            .unwrap();
        net.augment(&[ResidualArc::forward(1), ResidualArc::forward(3)], 3.0)
            .unwrap();
        // Interior nodes have zero balance, so excess must be zero.
        assert!(net.excess(NodeId(1)).abs() < EPS);
        assert!(net.excess(NodeId(2)).abs() < EPS);
    }

    #[test]
    fn rejects_negative_capacity_and_duplicates() {
        let mut net = FlowNetwork::with_nodes(2);
        assert!(matches!(
            net.add_edge(NodeId(0), NodeId(1), -1.0, 0.0),
            Err(FlowError::NegativeCapacity(_))
        ));
        net.add_edge(NodeId(0), NodeId(1), 1.0, 0.0).unwrap();
        assert!(matches!(
            net.add_edge(NodeId(0), NodeId(1), 2.0, 0.0),
            Err(FlowError::DuplicateEdge(_, _))
        ));
        assert!(matches!(
            net.add_edge(NodeId(0), NodeId(7), 1.0, 0.0),
            Err(FlowError::InvalidNode(NodeId(7)))
        ));
    }

    #[test]
    fn from_graph_uses_weights_as_capacities() {
        let mut g = Graph::with_nodes(3, true);
        g.add_edge(NodeId(0), NodeId(1), 5.0).unwrap();
        g.add_edge(NodeId(1), NodeId(2), 7.0).unwrap();
        let net = FlowNetwork::from_graph(&g).unwrap();
        assert_eq!(net.edge_count(), 2);
        assert_eq!(net.edge(0).capacity, 5.0);
        assert_eq!(net.edge(0).cost, 0.0);
        assert_eq!(net.edge(0).flow, 0.0);
    }

    #[test]
    fn from_undirected_graph_adds_both_arcs() {
        let mut g = Graph::with_nodes(2, false);
        g.add_edge(NodeId(0), NodeId(1), 3.0).unwrap();
        let net = FlowNetwork::from_graph(&g).unwrap();
        assert_eq!(net.edge_count(), 2);
        assert_eq!(net.residual_capacity(NodeId(0), NodeId(1)), 3.0);
        assert_eq!(net.residual_capacity(NodeId(1), NodeId(0)), 3.0);
    }

    #[test]
    fn total_cost_sums_forward_flow() {
        let mut net = diamond();
        net.augment(&[ResidualArc::forward(0), ResidualArc::forward(2)], 2.0)
            .unwrap();
        // 2 units over costs 1.0 + 1.0.
        assert_eq!(net.total_cost(), 4.0);
    }

    #[test]
    fn balance_validation() {
        let mut net = FlowNetwork::with_nodes(2);
        net.set_balance(NodeId(0), 4.0);
        net.set_balance(NodeId(1), -3.0);
        assert!(matches!(
            net.validate_balanced(),
            Err(FlowError::UnbalancedNetwork { .. })
        ));
        net.set_balance(NodeId(1), -4.0);
        assert!(net.validate_balanced().is_ok());
    }
}
