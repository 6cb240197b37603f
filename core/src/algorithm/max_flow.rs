//! Maximum flow via Edmonds-Karp.
//!
//! Repeatedly augments along the residual path with the fewest edges,
//! found by breadth-first search over arcs with positive residual
//! capacity. Costs are ignored entirely; only capacities matter here. The
//! fewest-edges policy bounds the number of augmentations polynomially,
//! and termination is guaranteed for integral or rational capacities.

use std::collections::VecDeque;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::data_structures::flow_network::EPS;
use crate::data_structures::{FlowError, FlowNetwork, NodeId, ResidualArc};

/// Outcome of a maximum-flow computation. The network itself retains the
/// final flow assignment and records the value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxFlowResult {
    /// Total flow leaving the source.
    pub value: f64,
    /// Number of augmenting paths applied.
    pub augmentations: usize,
}

/// Computes the maximum `source`-to-`sink` flow, mutating `network` in
/// place. Requires exclusive access for its whole duration.
pub fn edmonds_karp(
    network: &mut FlowNetwork,
    source: NodeId,
    sink: NodeId,
) -> Result<MaxFlowResult, FlowError> {
    for node in [source, sink] {
        if node.index() >= network.node_count() {
            return Err(FlowError::InvalidNode(node));
        }
    }

    let mut value = 0.0;
    let mut augmentations = 0;

    if source == sink {
        network.record_max_flow(0.0);
        return Ok(MaxFlowResult {
            value,
            augmentations,
        });
    }

    while let Some(path) = shortest_augmenting_path(network, source, sink) {
        let bottleneck = network.bottleneck(&path);
        debug_assert!(bottleneck > EPS);
        network.augment(&path, bottleneck)?;
        value += bottleneck;
        augmentations += 1;
        trace!(
            "edmonds-karp: augmented {bottleneck} along {} arcs (total {value})",
            path.len()
        );
    }

    debug!("edmonds-karp: max flow {value} after {augmentations} augmentations");
    network.record_max_flow(value);
    Ok(MaxFlowResult {
        value,
        augmentations,
    })
}

/// BFS over the residual graph; an arc is traversable iff its residual
/// capacity is positive. Returns the fewest-edge augmenting path as a
/// sequence of residual arcs, or `None` when the sink is unreachable.
fn shortest_augmenting_path(
    network: &FlowNetwork,
    source: NodeId,
    sink: NodeId,
) -> Option<Vec<ResidualArc>> {
    let mut incoming: Vec<Option<ResidualArc>> = vec![None; network.node_count()];
    let mut seen = vec![false; network.node_count()];
    let mut queue = VecDeque::new();

    seen[source.index()] = true;
    queue.push_back(source);

    'search: while let Some(node) = queue.pop_front() {
        for arc in network.residual_arcs_from(node) {
            if network.residual(arc) <= EPS {
                continue;
            }
            let head = network.arc_head(arc);
            if seen[head.index()] {
                continue;
            }
            seen[head.index()] = true;
            incoming[head.index()] = Some(arc);
            if head == sink {
                break 'search;
            }
            queue.push_back(head);
        }
    }

    if !seen[sink.index()] {
        return None;
    }

    let mut path = Vec::new();
    let mut current = sink;
    while current != source {
        let arc = incoming[current.index()].expect("BFS predecessor chain is contiguous");
        path.push(arc);
        current = network.arc_tail(arc);
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::Graph;

    fn n(i: usize) -> NodeId {
        NodeId(i)
    }

    /// 4-node network whose middle edges bottleneck the flow at 5.
    fn bottleneck_network() -> FlowNetwork {
        let mut net = FlowNetwork::with_nodes(4);
        net.add_edge(n(0), n(1), 4.0, 0.0).unwrap();
        net.add_edge(n(0), n(2), 3.0, 0.0).unwrap();
        net.add_edge(n(1), n(3), 3.0, 0.0).unwrap();
        net.add_edge(n(2), n(3), 2.0, 0.0).unwrap();
        net
    }

    #[test]
    fn bottleneck_of_five_yields_flow_five() {
        let mut net = bottleneck_network();
        let result = edmonds_karp(&mut net, n(0), n(3)).unwrap();
        // Min cut: {1->3, 2->3} with capacity 3 + 2 = 5.
        assert_eq!(result.value, 5.0);
        assert_eq!(net.recorded_max_flow(), Some(5.0));
    }

    #[test]
    fn flow_value_matches_known_min_cut() {
        // Classic 6-node instance, max flow = min cut = 23.
        let mut net = FlowNetwork::with_nodes(6);
        net.add_edge(n(0), n(1), 16.0, 0.0).unwrap();
        net.add_edge(n(0), n(2), 13.0, 0.0).unwrap();
        net.add_edge(n(1), n(3), 12.0, 0.0).unwrap();
        net.add_edge(n(2), n(1), 4.0, 0.0).unwrap();
        net.add_edge(n(2), n(4), 14.0, 0.0).unwrap();
        net.add_edge(n(3), n(2), 9.0, 0.0).unwrap();
        net.add_edge(n(3), n(5), 20.0, 0.0).unwrap();
        net.add_edge(n(4), n(3), 7.0, 0.0).unwrap();
        net.add_edge(n(4), n(5), 4.0, 0.0).unwrap();
        let result = edmonds_karp(&mut net, n(0), n(5)).unwrap();
        assert_eq!(result.value, 23.0);
    }

    #[test]
    fn conservation_holds_at_interior_nodes() {
        let mut net = bottleneck_network();
        edmonds_karp(&mut net, n(0), n(3)).unwrap();
        assert!(net.excess(n(1)).abs() < EPS);
        assert!(net.excess(n(2)).abs() < EPS);
        // Source deficit equals sink surplus equals the flow value.
        assert_eq!(net.excess(n(0)), -5.0);
        assert_eq!(net.excess(n(3)), 5.0);
    }

    #[test]
    fn augmentation_saturates_at_least_one_arc() {
        let mut net = bottleneck_network();
        let path = super::shortest_augmenting_path(&net, n(0), n(3)).unwrap();
        let bottleneck = net.bottleneck(&path);
        net.augment(&path, bottleneck).unwrap();
        assert!(
            path.iter().any(|&arc| net.residual(arc) <= EPS),
            "bottleneck augmentation must saturate an arc"
        );
    }

    #[test]
    fn disconnected_sink_gives_zero_flow() {
        let mut net = FlowNetwork::with_nodes(3);
        net.add_edge(n(0), n(1), 10.0, 0.0).unwrap();
        let result = edmonds_karp(&mut net, n(0), n(2)).unwrap();
        assert_eq!(result.value, 0.0);
        assert_eq!(result.augmentations, 0);
    }

    #[test]
    fn works_on_network_wrapped_from_graph() {
        let mut g = Graph::with_nodes(4, true);
        g.add_edge(n(0), n(1), 8.0).unwrap();
        g.add_edge(n(0), n(2), 8.0).unwrap();
        g.add_edge(n(1), n(3), 5.0).unwrap();
        g.add_edge(n(2), n(3), 5.0).unwrap();
        let mut net = FlowNetwork::from_graph(&g).unwrap();
        let result = edmonds_karp(&mut net, n(0), n(3)).unwrap();
        assert_eq!(result.value, 10.0);
    }

    #[test]
    fn reroutes_through_reverse_arcs() {
        // A greedy first path 0->1->2->3 must be partially undone to reach
        // the optimum of 2.
        let mut net = FlowNetwork::with_nodes(4);
        net.add_edge(n(0), n(1), 1.0, 0.0).unwrap();
        net.add_edge(n(0), n(2), 1.0, 0.0).unwrap();
        net.add_edge(n(1), n(2), 1.0, 0.0).unwrap();
        net.add_edge(n(1), n(3), 1.0, 0.0).unwrap();
        net.add_edge(n(2), n(3), 1.0, 0.0).unwrap();
        let result = edmonds_karp(&mut net, n(0), n(3)).unwrap();
        assert_eq!(result.value, 2.0);
    }

    #[test]
    fn result_serializes_for_reporting() {
        let mut net = bottleneck_network();
        let result = edmonds_karp(&mut net, n(0), n(3)).unwrap();
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["value"], 5.0);
        assert_eq!(json["augmentations"], result.augmentations as u64);
    }

    #[test]
    fn rejects_unknown_terminals() {
        let mut net = bottleneck_network();
        assert!(matches!(
            edmonds_karp(&mut net, n(0), n(9)),
            Err(FlowError::InvalidNode(NodeId(9)))
        ));
    }
}
