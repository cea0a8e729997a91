//! Loss-arc flow: overshooting placements are shifted to end on T and the
//! skipped length runs down a chain of loss arcs.

use crate::assemble::arc_sum;
use crate::decode::{arc_step, DecodeError, TracedPath};
use crate::formulation::Formulation;
use crate::warm_start::{WarmStart, WarmStartError};
use ssp_core::{
    Arc, ArcNaming, DecodedPattern, FlowValues, Instance, Network, Node, Pattern, Tolerance,
};
use ssp_model::{Expr, Model, ModelError, VariableId};

pub fn build_network(instance: &Instance) -> Network {
    let threshold = instance.threshold() as Node;
    let mut network = Network::new(instance.threshold(), ArcNaming::Full);
    let mut min_shifted = threshold;

    for (item, length, availability) in instance.items() {
        let length = length as Node;
        for node in network.nodes().snapshot_desc() {
            for rep in 0..Node::from(availability) {
                let mut start = node + rep * length;
                if start >= threshold {
                    break;
                }
                let mut end = start + length;
                if end > threshold {
                    start = threshold - length;
                    end = threshold;
                    min_shifted = min_shifted.min(start);
                }
                network.add_arc(Arc::segment(start, end, item));
                network.activate(end);
            }
        }
    }

    let starts: Vec<Node> = network.arcs().map(|(_, arc)| arc.start).collect();
    for start in starts {
        network.activate(start);
    }

    let chain: Vec<Node> = network
        .nodes()
        .iter_desc()
        .filter(|&node| node != threshold)
        .take_while(|&node| node >= min_shifted)
        .collect();
    for pair in chain.windows(2) {
        network.add_arc(Arc::loss(pair[0], pair[1]));
    }
    network.set_min_loss_node(min_shifted);
    network
}

/// Replay patterns; each overshoot also fills the loss chain from the
/// unshifted start down to the shifted one.
pub fn warm_start(
    instance: &Instance,
    network: &Network,
    patterns: &[Pattern],
) -> Result<WarmStart, WarmStartError> {
    let threshold = network.threshold();
    let mut start_values = WarmStart::new();
    let mut skipped: Vec<(Node, Node)> = Vec::new();

    for pattern in patterns {
        let mut start: Node = 0;
        for item in pattern.items() {
            let length = instance.length(item) as Node;
            let mut end = start + length;
            if end > threshold {
                let shifted = threshold - length;
                skipped.push((start, shifted));
                start = shifted;
                end = threshold;
            }
            start_values.add(network, Arc::segment(start, end, item), 1.0)?;
            start = end;
        }
    }

    for (from, to) in skipped {
        let nodes: Vec<Node> = network.nodes().range_desc(to, from).collect();
        start_values.add_loss_chain(network, &nodes, 1.0)?;
    }
    Ok(start_values)
}

/// Conservation at every active node except 0 and T. Returns the objective:
/// total flow into T over every arc kind.
pub(crate) fn add_rows(
    model: &mut Model,
    network: &Network,
    columns: &[VariableId],
) -> Result<Expr, ModelError> {
    let threshold = network.threshold();
    for node in network.nodes().iter() {
        if node == 0 || node == threshold {
            continue;
        }
        let outflow = arc_sum(columns, network.outgoing(node).iter().copied());
        let inflow = arc_sum(columns, network.incoming(node).iter().copied());
        let row = model.add_constraint_expr(outflow.equal_to(&inflow))?;
        model.set_constraint_name(row, format!("flow[{}]", node))?;
    }
    Ok(arc_sum(columns, network.incoming(threshold).iter().copied()))
}

/// Peel paths from node 0 to T, preferring the positive arc with the smallest
/// end at every node (insertion order among equal ends).
pub fn decode(
    instance: &Instance,
    network: &Network,
    flow: &FlowValues,
    tol: Tolerance,
) -> Result<Vec<DecodedPattern>, DecodeError> {
    let threshold = network.threshold();
    let mut vals = flow.clone();
    let mut patterns = Vec::new();

    for &first in network.outgoing(0) {
        while vals.is_positive(first, tol) {
            let mut path = TracedPath::start(&mut vals, first);
            let mut node = network[first].end;
            while node < threshold {
                let inconsistent = DecodeError::FlowInconsistency {
                    node,
                    formulation: Formulation::LossArcFlow,
                };
                if path.len() > network.len() {
                    return Err(inconsistent);
                }
                let next = network
                    .outgoing(node)
                    .iter()
                    .copied()
                    .filter(|&id| vals.is_positive(id, tol))
                    .min_by_key(|&id| network[id].end)
                    .ok_or(inconsistent)?;
                path.push(&mut vals, next);
                node = network[next].end;
            }
            let bound = path.bound();
            let steps = path
                .into_arcs()
                .into_iter()
                .filter_map(|id| arc_step(&network[id]));
            patterns.push(DecodedPattern::from_steps(instance, bound, steps));
        }
    }
    Ok(patterns)
}
