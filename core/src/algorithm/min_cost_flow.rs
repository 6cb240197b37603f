//! Minimum-cost flow for balanced supply/demand networks.
//!
//! Two independent solvers over the same residual model:
//!
//! - [`cycle_canceling`] starts from any feasible flow (built here via an
//!   auxiliary super-source/super-sink maximum-flow run) and cancels
//!   negative-cost residual cycles until none remain. The absence of a
//!   negative residual cycle is exactly the optimality condition, so the
//!   final flow is cost-minimal for its balances.
//! - [`successive_shortest_paths`] grows the flow from a pseudo-flow that
//!   saturates every negative-cost edge, repeatedly augmenting along the
//!   cheapest residual path from an excess node to a deficit node. Node
//!   potentials keep reduced costs non-negative, so the first search uses
//!   Bellman-Ford and later ones plain Dijkstra.
//!
//! Both report the same total cost on any feasible network, which callers
//! can use as a correctness cross-check. Infeasibility is a first-class
//! outcome: [`FlowError::NoFeasibleFlow`] when the balances cannot be met
//! at all, [`FlowError::NoCostMinimalFlow`] when the path-based solver
//! finds remaining supply it cannot route.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::algorithm::max_flow::edmonds_karp;
use crate::data_structures::flow_network::EPS;
use crate::data_structures::{FlowError, FlowNetwork, MinHeap, NodeId, ResidualArc};

/// Outcome of a minimum-cost-flow computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinCostFlowResult {
    /// Total cost of the final flow: Σ flow · cost over forward edges.
    pub cost: f64,
    /// Cycles canceled or paths augmented, depending on the solver.
    pub iterations: usize,
}

/// Establishes some feasible flow for the network's balances by solving a
/// maximum-flow problem on an auxiliary network with a super source feeding
/// every supply node and a super sink draining every demand node.
///
/// Fails with [`FlowError::NoFeasibleFlow`] when the auxiliary max flow
/// cannot saturate the total supply.
fn establish_feasible_flow(network: &mut FlowNetwork) -> Result<(), FlowError> {
    network.validate_balanced()?;

    let total_supply: f64 = network
        .nodes()
        .map(|v| network.balance(v).max(0.0))
        .sum();
    if total_supply <= EPS {
        // All balances zero; the zero flow is feasible.
        for i in 0..network.edge_count() {
            network.set_flow(i, 0.0);
        }
        return Ok(());
    }

    let n = network.node_count();
    let mut auxiliary = FlowNetwork::with_nodes(n + 2);
    let super_source = NodeId(n);
    let super_sink = NodeId(n + 1);

    // Original edges keep their indices; costs are irrelevant here.
    for edge in network.edges() {
        auxiliary.add_edge(edge.source, edge.target, edge.capacity, 0.0)?;
    }
    for node in network.nodes() {
        let balance = network.balance(node);
        if balance > EPS {
            auxiliary.add_edge(super_source, node, balance, 0.0)?;
        } else if balance < -EPS {
            auxiliary.add_edge(node, super_sink, -balance, 0.0)?;
        }
    }

    let result = edmonds_karp(&mut auxiliary, super_source, super_sink)?;
    if result.value < total_supply - EPS {
        debug!(
            "feasible-flow bootstrap: routed {} of {} supply",
            result.value, total_supply
        );
        return Err(FlowError::NoFeasibleFlow);
    }

    for i in 0..network.edge_count() {
        network.set_flow(i, auxiliary.edge(i).flow);
    }
    Ok(())
}

/// Minimum-cost flow by negative-cycle canceling.
///
/// The network is left holding the optimal flow assignment.
pub fn cycle_canceling(network: &mut FlowNetwork) -> Result<MinCostFlowResult, FlowError> {
    establish_feasible_flow(network)?;

    let mut iterations = 0;
    while let Some(cycle) = find_negative_cycle(network) {
        let bottleneck = network.bottleneck(&cycle);
        debug_assert!(bottleneck > EPS);
        let gain: f64 = cycle.iter().map(|&arc| network.cost(arc)).sum();
        network.augment(&cycle, bottleneck)?;
        iterations += 1;
        trace!(
            "cycle-canceling: canceled {}-arc cycle, gain {} per unit, amount {bottleneck}",
            cycle.len(),
            gain
        );
    }

    let cost = network.total_cost();
    debug!("cycle-canceling: optimal cost {cost} after {iterations} cancellations");
    Ok(MinCostFlowResult { cost, iterations })
}

/// Bellman-Ford adapted to locate (not merely flag) a negative-cost cycle
/// in the residual graph. All distances start at zero, which is equivalent
/// to relaxing from a virtual source connected to every node, so cycles
/// anywhere in the residual graph are found.
fn find_negative_cycle(network: &FlowNetwork) -> Option<Vec<ResidualArc>> {
    let n = network.node_count();
    if n == 0 {
        return None;
    }
    let mut distances = vec![0.0_f64; n];
    let mut incoming: Vec<Option<ResidualArc>> = vec![None; n];

    let mut witness = None;
    for round in 0..n {
        witness = relax_residual_pass(network, &mut distances, &mut incoming);
        if witness.is_none() {
            return None; // converged, no negative cycle
        }
        if round + 1 == n {
            break; // still relaxing after n rounds: cycle certified
        }
    }
    let witness = witness?;

    // The witness may hang off the cycle on a tail of predecessors; walking
    // n steps back is guaranteed to land inside the cycle itself.
    let mut inside = witness;
    for _ in 0..n {
        inside = network.arc_tail(incoming[inside.index()]?);
    }

    let mut cycle = Vec::new();
    let mut current = inside;
    loop {
        let arc = incoming[current.index()]?;
        cycle.push(arc);
        current = network.arc_tail(arc);
        if current == inside {
            break;
        }
    }
    cycle.reverse();
    Some(cycle)
}

/// One relaxation pass over every residual arc with positive capacity.
/// Returns the head of the last improved arc, or `None` when the pass
/// changed nothing.
fn relax_residual_pass(
    network: &FlowNetwork,
    distances: &mut [f64],
    incoming: &mut [Option<ResidualArc>],
) -> Option<NodeId> {
    let mut improved = None;
    for node in network.nodes() {
        for arc in network.residual_arcs_from(node) {
            if network.residual(arc) <= EPS {
                continue;
            }
            let head = network.arc_head(arc);
            let candidate = distances[node.index()] + network.cost(arc);
            if candidate < distances[head.index()] - EPS {
                distances[head.index()] = candidate;
                incoming[head.index()] = Some(arc);
                improved = Some(head);
            }
        }
    }
    improved
}

/// Minimum-cost flow by successive shortest paths with node potentials.
///
/// Resets any existing flow, saturates negative-cost edges to form the
/// initial pseudo-flow, and then routes all remaining excess along
/// cheapest residual paths. The network is left holding the optimal flow.
pub fn successive_shortest_paths(
    network: &mut FlowNetwork,
) -> Result<MinCostFlowResult, FlowError> {
    network.validate_balanced()?;

    // Pseudo-flow start: negative-cost edges are saturated, which leaves
    // the residual graph free of negative arcs at the price of temporary
    // imbalance at their endpoints.
    for i in 0..network.edge_count() {
        let edge = *network.edge(i);
        network.set_flow(i, if edge.cost < 0.0 { edge.capacity } else { 0.0 });
    }

    let n = network.node_count();
    let mut potentials = vec![0.0_f64; n];
    let mut iterations = 0;

    loop {
        let Some(origin) = network.nodes().find(|&v| network.excess(v) > EPS) else {
            break; // every supply routed, every demand met
        };

        // Cheapest residual distances under reduced costs. Bellman-Ford on
        // the first augmentation as a matter of robustness; Dijkstra once
        // the potentials are in place.
        let (distances, incoming) = if iterations == 0 {
            residual_bellman_ford(network, origin, &potentials)
        } else {
            residual_dijkstra(network, origin, &potentials)
        };

        // Nearest deficit node reachable from the origin.
        let target = network
            .nodes()
            .filter(|&v| network.excess(v) < -EPS && distances[v.index()].is_finite())
            .min_by(|&a, &b| distances[a.index()].total_cmp(&distances[b.index()]));
        let Some(target) = target else {
            debug!("ssp: excess at {origin} but no deficit node reachable");
            return Err(FlowError::NoCostMinimalFlow);
        };

        let mut path = Vec::new();
        let mut current = target;
        while current != origin {
            let arc = incoming[current.index()].expect("reachable node has an incoming arc");
            path.push(arc);
            current = network.arc_tail(arc);
        }
        path.reverse();

        let amount = network
            .excess(origin)
            .min(-network.excess(target))
            .min(network.bottleneck(&path));
        debug_assert!(amount > EPS);
        network.augment(&path, amount)?;
        iterations += 1;
        trace!("ssp: routed {amount} from {origin} to {target} over {} arcs", path.len());

        // Potential update capped at the target distance keeps reduced
        // costs non-negative even for nodes the search did not reach.
        let cap = distances[target.index()];
        for v in 0..n {
            potentials[v] += distances[v].min(cap);
        }
    }

    let cost = network.total_cost();
    debug!("ssp: optimal cost {cost} after {iterations} augmentations");
    Ok(MinCostFlowResult { cost, iterations })
}

/// Bellman-Ford over positive-residual arcs with reduced costs.
fn residual_bellman_ford(
    network: &FlowNetwork,
    origin: NodeId,
    potentials: &[f64],
) -> (Vec<f64>, Vec<Option<ResidualArc>>) {
    let n = network.node_count();
    let mut distances = vec![f64::INFINITY; n];
    let mut incoming: Vec<Option<ResidualArc>> = vec![None; n];
    distances[origin.index()] = 0.0;

    for _ in 1..n.max(2) {
        let mut improved = false;
        for node in network.nodes() {
            if !distances[node.index()].is_finite() {
                continue;
            }
            for arc in network.residual_arcs_from(node) {
                if network.residual(arc) <= EPS {
                    continue;
                }
                let head = network.arc_head(arc);
                let candidate = distances[node.index()] + reduced_cost(network, arc, potentials);
                if candidate < distances[head.index()] - EPS {
                    distances[head.index()] = candidate;
                    incoming[head.index()] = Some(arc);
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
    (distances, incoming)
}

/// Dijkstra over positive-residual arcs with reduced costs; valid once the
/// potentials make every reduced cost non-negative.
fn residual_dijkstra(
    network: &FlowNetwork,
    origin: NodeId,
    potentials: &[f64],
) -> (Vec<f64>, Vec<Option<ResidualArc>>) {
    let n = network.node_count();
    let mut distances = vec![f64::INFINITY; n];
    let mut incoming: Vec<Option<ResidualArc>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut frontier = MinHeap::with_capacity(n);

    distances[origin.index()] = 0.0;
    frontier.push(0.0, origin);

    while let Some((distance, node)) = frontier.pop() {
        if visited[node.index()] {
            continue;
        }
        visited[node.index()] = true;

        for arc in network.residual_arcs_from(node) {
            if network.residual(arc) <= EPS {
                continue;
            }
            let head = network.arc_head(arc);
            if visited[head.index()] {
                continue;
            }
            let step = reduced_cost(network, arc, potentials);
            debug_assert!(step > -EPS, "reduced cost must stay non-negative");
            let candidate = distance + step.max(0.0);
            if candidate < distances[head.index()] {
                distances[head.index()] = candidate;
                incoming[head.index()] = Some(arc);
                frontier.push(candidate, head);
            }
        }
    }
    (distances, incoming)
}

#[inline]
fn reduced_cost(network: &FlowNetwork, arc: ResidualArc, potentials: &[f64]) -> f64 {
    let tail = network.arc_tail(arc);
    let head = network.arc_head(arc);
    network.cost(arc) + potentials[tail.index()] - potentials[head.index()]
}
