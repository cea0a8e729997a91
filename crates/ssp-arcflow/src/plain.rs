//! Plain arc-flow: segment arcs clipped at the threshold.

use crate::assemble::arc_sum;
use crate::decode::DecodeError;
use crate::formulation::Formulation;
use crate::warm_start::{WarmStart, WarmStartError};
use ssp_core::{
    Arc, ArcId, ArcNaming, DecodedPattern, FlowValues, Instance, Network, Node, PathStep, Pattern,
    Tolerance,
};
use ssp_model::{Expr, Model, ModelError, VariableId};

/// Expand every active node by up to `b_i` copies of each item, in item order.
///
/// Nodes reached while an item is processed are only expanded by later items.
pub fn build_network(instance: &Instance) -> Network {
    let threshold = instance.threshold() as Node;
    let mut network = Network::new(instance.threshold(), ArcNaming::Short);
    for (item, length, availability) in instance.items() {
        let length = length as Node;
        for node in network.nodes().snapshot_desc() {
            if node == threshold {
                continue;
            }
            for rep in 0..Node::from(availability) {
                let start = node + rep * length;
                if start >= threshold {
                    break;
                }
                let end = threshold.min(start + length);
                network.add_arc(Arc::segment(start, end, item));
                network.activate(end);
            }
        }
    }
    network
}

/// Replay each pattern from node 0 in ascending item order.
pub fn warm_start(
    instance: &Instance,
    network: &Network,
    patterns: &[Pattern],
) -> Result<WarmStart, WarmStartError> {
    let threshold = network.threshold();
    let mut start_values = WarmStart::new();
    for pattern in patterns {
        let mut start: Node = 0;
        for item in pattern.items() {
            let end = threshold.min(start + instance.length(item) as Node);
            start_values.add(network, Arc::segment(start, end, item), 1.0)?;
            start = end;
        }
    }
    Ok(start_values)
}

/// Conservation at every active node except 0 and T. Returns the objective:
/// total flow leaving node 0.
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
    Ok(arc_sum(columns, network.outgoing(0).iter().copied()))
}

/// Peel paths from node 0 to T, taking the first positive outgoing arc at
/// every node.
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
            let mut path: Vec<ArcId> = vec![first];
            let mut bound = vals.get(first);
            let mut node = network[first].end;
            while node < threshold {
                let next = network
                    .outgoing(node)
                    .iter()
                    .copied()
                    .find(|&id| vals.is_positive(id, tol))
                    .ok_or(DecodeError::FlowInconsistency {
                        node,
                        formulation: Formulation::ArcFlow,
                    })?;
                bound = bound.min(vals.get(next));
                path.push(next);
                node = network[next].end;
            }
            for &id in &path {
                vals.sub(id, bound);
            }
            let steps = path
                .iter()
                .filter_map(|&id| network[id].item.map(PathStep::Item));
            patterns.push(DecodedPattern::from_steps(instance, bound, steps));
        }
    }
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use super::*;

    fn instance() -> Instance {
        Instance::new(10, vec![6, 5, 4, 3], vec![1, 1, 2, 4]).unwrap()
    }

    #[test]
    fn first_item_opens_node_six() {
        let single = Instance::new(10, vec![6], vec![1]).unwrap();
        let network = build_network(&single);
        assert_eq!(network.nodes().iter().collect::<Vec<_>>(), vec![0, 6]);
        assert_eq!(network.len(), 1);
        assert!(network.find(&Arc::segment(0, 6, 0)).is_some());
    }

    #[test]
    fn threshold_never_expands() {
        let network = build_network(&instance());
        assert!(network.nodes().contains(10));
        assert!(network.outgoing(10).is_empty());
        for (_, arc) in network.arcs() {
            assert!(arc.end <= 10);
            assert!(arc.start < arc.end);
        }
    }

    #[test]
    fn repetitions_chain_from_snapshot_nodes() {
        let network = build_network(&instance());
        // item 3 (length 3, four copies) from node 0
        for (start, end) in [(0, 3), (3, 6), (6, 9), (9, 10)] {
            assert!(network.find(&Arc::segment(start, end, 3)).is_some());
        }
        // item 2 from node 6 clips at 10
        assert!(network.find(&Arc::segment(6, 10, 2)).is_some());
        // item 0 is processed first, so nothing but node 0 feeds it
        assert_eq!(network.item_arcs(0).count(), 1);
    }

    #[test]
    fn warm_start_clips_at_threshold() {
        let inst = instance();
        let network = build_network(&inst);
        let start = warm_start(&inst, &network, &[Pattern::from_items([0, 3, 3])]).unwrap();
        assert_eq!(start.get(network.find(&Arc::segment(0, 6, 0)).unwrap()), 1.0);
        assert_eq!(start.get(network.find(&Arc::segment(6, 9, 3)).unwrap()), 1.0);
        assert_eq!(start.get(network.find(&Arc::segment(9, 10, 3)).unwrap()), 1.0);
        assert_eq!(start.len(), 3);
    }

    #[test]
    fn decode_follows_insertion_order() {
        let inst = instance();
        let network = build_network(&inst);
        let flow = FlowValues::from_arcs(
            &network,
            [
                (Arc::segment(0, 6, 0), 1.0),
                (Arc::segment(6, 9, 3), 1.0),
                (Arc::segment(9, 10, 3), 1.0),
            ],
        )
        .unwrap();
        let patterns = decode(&inst, &network, &flow, Tolerance::default()).unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].multiplicity, 1.0);
        assert_eq!(patterns[0].length, 12);
        assert_eq!(patterns[0].pattern(), Pattern::from_items([0, 3, 3]));
        // the caller's flow is untouched
        assert_eq!(flow.get(network.find(&Arc::segment(0, 6, 0)).unwrap()), 1.0);
    }

    #[test]
    fn dead_end_reports_node() {
        let inst = instance();
        let network = build_network(&inst);
        let flow = FlowValues::from_arcs(
            &network,
            [(Arc::segment(0, 6, 0), 1.0), (Arc::segment(6, 9, 3), 1.0)],
        )
        .unwrap();
        assert_eq!(
            decode(&inst, &network, &flow, Tolerance::default()),
            Err(DecodeError::FlowInconsistency {
                node: 9,
                formulation: Formulation::ArcFlow
            })
        );
    }

    #[test]
    fn fractional_flow_splits_by_bound() {
        let inst = instance();
        let network = build_network(&inst);
        let flow = FlowValues::from_arcs(
            &network,
            [
                (Arc::segment(0, 6, 0), 0.75),
                (Arc::segment(6, 10, 2), 0.5),
                (Arc::segment(6, 9, 3), 0.25),
                (Arc::segment(9, 10, 3), 0.25),
            ],
        )
        .unwrap();
        let patterns = decode(&inst, &network, &flow, Tolerance::default()).unwrap();
        assert_eq!(patterns.len(), 2);
        let total: f64 = patterns.iter().map(|p| p.multiplicity).sum();
        assert_eq!(total, 0.75);
    }
}
