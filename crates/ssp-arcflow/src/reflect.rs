//! Reflect formulation.
//!
//! Coordinates are doubled lengths. A placement that stays within T is a
//! forward segment arc; one that overshoots is folded back to `2T - end` as a
//! reflect arc. An object is a forward path and a reflected path meeting at
//! the same coordinate, possibly joined by loss arcs that run upward to T.

use crate::assemble::arc_sum;
use crate::decode::{arc_step, DecodeError};
use crate::formulation::Formulation;
use crate::warm_start::{WarmStart, WarmStartError};
use ssp_core::{
    Arc, ArcId, ArcKind, ArcNaming, DecodedPattern, FlowValues, Instance, Network, Node, NodeSet,
    PathStep, Pattern, Tolerance,
};
use ssp_model::{Expr, Model, ModelError, VariableId};
use std::collections::BTreeSet;

pub fn build_network(instance: &Instance) -> Network {
    let threshold = instance.threshold() as Node;
    let mut network = Network::new(instance.threshold(), ArcNaming::Full);
    // coordinates reached by forward arcs; only these are expanded
    let mut forward: NodeSet = [0].into_iter().collect();
    let mut min_rpoint = threshold;

    for (item, length, availability) in instance.items() {
        let doubled = 2 * length as Node;
        let mut done = BTreeSet::new();
        for _ in 0..availability {
            for start in forward.snapshot_desc() {
                if start == threshold || !done.insert(start) {
                    continue;
                }
                let end = start + doubled;
                let arc = if end <= threshold {
                    forward.insert(end);
                    Arc::segment(start, end, item)
                } else {
                    let folded = 2 * threshold - end;
                    min_rpoint = min_rpoint.min(folded);
                    Arc::reflect(start, folded, Some(item))
                };
                network.add_arc(arc);
                network.activate(arc.end);
            }
        }
    }

    let chain = loss_path(network.nodes(), threshold, min_rpoint, threshold);
    for pair in chain.windows(2) {
        network.add_arc(Arc::loss(pair[0], pair[1]));
    }
    network.add_arc(Arc::reflect(threshold, threshold, None));
    network.set_min_loss_node(min_rpoint);
    network
}

/// Loss-chain coordinates from `from` up to `to`: active nodes below T, with
/// T appended when `to` is T.
fn loss_path(nodes: &NodeSet, threshold: Node, from: Node, to: Node) -> Vec<Node> {
    let mut path: Vec<Node> = nodes
        .range(from, to)
        .filter(|&node| node != threshold)
        .collect();
    if to == threshold {
        path.push(threshold);
    }
    path
}

/// Replay patterns into forward and reflected chains and close them so that
/// the start satisfies every row of the model.
///
/// Each pattern is replayed from 0 in ascending item order. An overshooting
/// placement ends a reflected chain, a placement landing on T ends a forward
/// chain, and the chain left open at the end is a forward chain. Reflected
/// chains are paired with the forward chain ending closest above them and the
/// loss arcs between both ends are filled. Unpaired chains are closed on T
/// through the slack arc, half a unit each.
pub fn warm_start(
    instance: &Instance,
    network: &Network,
    patterns: &[Pattern],
) -> Result<WarmStart, WarmStartError> {
    let threshold = network.threshold();
    let mut start_values = WarmStart::new();
    let mut slack = 0.0;

    for (index, pattern) in patterns.iter().enumerate() {
        let mut forward_ends: Vec<Node> = Vec::new();
        let mut reflect_ends: Vec<Node> = Vec::new();
        let mut start: Node = 0;
        for item in pattern.items() {
            let end = start + 2 * instance.length(item) as Node;
            if end <= threshold {
                start_values.add(network, Arc::segment(start, end, item), 1.0)?;
                start = end;
                if start == threshold {
                    forward_ends.push(threshold);
                    start = 0;
                }
            } else {
                let folded = 2 * threshold - end;
                start_values.add(network, Arc::reflect(start, folded, Some(item)), 1.0)?;
                reflect_ends.push(folded);
                start = 0;
            }
        }
        if start != 0 {
            forward_ends.push(start);
        }

        forward_ends.sort_unstable();
        reflect_ends.sort_unstable_by(|a, b| b.cmp(a));
        for reflect_end in reflect_ends {
            let partner = forward_ends.iter().position(|&end| end >= reflect_end);
            let to = match partner {
                Some(position) => forward_ends.remove(position),
                None => {
                    slack -= 0.5;
                    threshold
                }
            };
            let path = loss_path(network.nodes(), threshold, reflect_end, to);
            start_values.add_loss_chain(network, &path, 1.0)?;
        }
        for end in forward_ends {
            if end != threshold {
                return Err(WarmStartError::UnclosedPattern {
                    pattern: index,
                    end,
                });
            }
            slack += 0.5;
        }
    }

    if slack != 0.0 {
        start_values.add(network, Arc::reflect(threshold, threshold, None), slack)?;
    }
    Ok(start_values)
}

fn kind_sum(network: &Network, columns: &[VariableId], ids: &[ArcId], kind: ArcKind) -> Expr {
    arc_sum(
        columns,
        ids.iter().copied().filter(|&id| network[id].kind == kind),
    )
}

/// Direction-aware conservation, the no-fabrication rows on the loss chain and
/// the global balance. Returns the objective: total reflect-arc flow.
pub(crate) fn add_rows(
    model: &mut Model,
    network: &Network,
    columns: &[VariableId],
) -> Result<Expr, ModelError> {
    let threshold = network.threshold();
    let min_rpoint = network.min_loss_node().unwrap_or(threshold);

    for node in network.nodes().iter() {
        if node == 0 {
            continue;
        }
        let incoming = network.incoming(node);
        let outgoing = network.outgoing(node);
        let sin = kind_sum(network, columns, incoming, ArcKind::Segment);
        let sout = kind_sum(network, columns, outgoing, ArcKind::Segment);
        let rin = kind_sum(network, columns, incoming, ArcKind::Reflect);
        let rout = kind_sum(network, columns, outgoing, ArcKind::Reflect);
        let lin = kind_sum(network, columns, incoming, ArcKind::Loss);
        let lout = kind_sum(network, columns, outgoing, ArcKind::Loss);

        let lhs = sin.add(&lout);
        let rhs = rin.add(&lin).add(&rout).add(&sout);
        let row = model.add_constraint_expr(lhs.equal_to(&rhs))?;
        model.set_constraint_name(row, format!("flow[{}]", node))?;

        if node >= min_rpoint && node < threshold {
            let row = model.add_constraint_expr(lin.add(&rin).greater_equal(&lout))?;
            model.set_constraint_name(row, format!("loss[{}]", node))?;
        }
    }

    let reflected = arc_sum(columns, network.arcs_of_kind(ArcKind::Reflect));
    let started = arc_sum(columns, network.outgoing(0).iter().copied());
    let row = model.add_constraint_expr(started.equal_to(&reflected.scale(2.0)))?;
    model.set_constraint_name(row, "balance".to_string())?;
    Ok(reflected)
}

/// A traced half of an object with its remaining multiplicity.
#[derive(Debug, Clone)]
struct Partial {
    value: f64,
    arcs: Vec<ArcId>,
}

impl Partial {
    fn end(&self, network: &Network) -> Node {
        self.arcs.last().map_or(0, |&id| network[id].end)
    }
}

fn emit(
    instance: &Instance,
    network: &Network,
    multiplicity: f64,
    parts: &[&[ArcId]],
) -> DecodedPattern {
    let steps = parts
        .iter()
        .flat_map(|part| part.iter())
        .filter_map(|&id| arc_step(&network[id]));
    DecodedPattern::from_steps(instance, multiplicity, steps)
}

/// One object made of two closed reflected halves meeting on T.
fn join(
    instance: &Instance,
    network: &Network,
    closed: &mut [Partial],
    (first, second): (usize, usize),
    amount: f64,
) -> DecodedPattern {
    let mut pattern = emit(
        instance,
        network,
        amount,
        &[&closed[first].arcs[..], &closed[second].arcs[..]],
    );
    pattern.steps.push(PathStep::Complete);
    closed[first].value -= amount;
    closed[second].value -= amount;
    pattern
}

/// Two-pass decomposition.
///
/// Pass one traces forward from node 0 over non-loss arcs, stopping on the
/// first reflect arc (a reflected half) or where no positive arc continues (a
/// forward half). Pass two takes the forward halves by ascending end, walks
/// down the loss chain until a reflected half ends at the same coordinate,
/// and joins them. Reflected halves left over are closed by walking the loss
/// chain up to T; while the slack arc carries negative flow they are joined
/// two at a time through T, and only the rest close as single objects.
pub fn decode(
    instance: &Instance,
    network: &Network,
    flow: &FlowValues,
    tol: Tolerance,
) -> Result<Vec<DecodedPattern>, DecodeError> {
    let threshold = network.threshold();
    let inconsistent = |node| DecodeError::FlowInconsistency {
        node,
        formulation: Formulation::Reflect,
    };
    let mut vals = flow.clone();
    let mut forward_halves: Vec<Partial> = Vec::new();
    let mut reflect_halves: Vec<Partial> = Vec::new();

    for &first in network.outgoing(0) {
        if network[first].is_loss() {
            continue;
        }
        while vals.is_positive(first, tol) {
            let mut bound = vals.get(first);
            let mut arcs = vec![first];
            let mut current = network[first];
            while !current.is_reflect() {
                let next = network
                    .outgoing(current.end)
                    .iter()
                    .copied()
                    .find(|&id| !network[id].is_loss() && vals.is_positive(id, tol));
                let Some(next) = next else {
                    break;
                };
                bound = bound.min(vals.get(next));
                arcs.push(next);
                current = network[next];
            }
            for &id in &arcs {
                vals.sub(id, bound);
            }
            let half = Partial { value: bound, arcs };
            if current.is_reflect() {
                reflect_halves.push(half);
            } else {
                forward_halves.push(half);
            }
        }
    }

    let mut patterns = Vec::new();
    forward_halves.sort_by_key(|half| half.end(network));
    for Partial { mut value, arcs } in forward_halves {
        let mut end = network[arcs[arcs.len() - 1]].end;
        let mut losses: Vec<ArcId> = Vec::new();
        while tol.is_positive(value) {
            let mut bound = losses
                .iter()
                .fold(value, |bound, &id| bound.min(vals.get(id)));
            if tol.is_zero(bound) {
                return Err(DecodeError::LossChainExhausted { node: end });
            }

            let matched = reflect_halves
                .iter()
                .position(|half| half.end(network) == end);
            match matched {
                Some(position) => {
                    bound = bound.min(reflect_halves[position].value);
                    patterns.push(emit(
                        instance,
                        network,
                        bound,
                        &[&arcs[..], &losses[..], &reflect_halves[position].arcs[..]],
                    ));
                    value -= bound;
                    for &id in &losses {
                        vals.sub(id, bound);
                    }
                    let half = &mut reflect_halves[position];
                    half.value -= bound;
                    if tol.is_zero(half.value) {
                        reflect_halves.remove(position);
                    }
                }
                None => {
                    let loss = network
                        .incoming(end)
                        .iter()
                        .copied()
                        .find(|&id| network[id].is_loss() && vals.is_positive(id, tol))
                        .ok_or_else(|| inconsistent(end))?;
                    end = network[loss].start;
                    losses.push(loss);
                }
            }
        }
    }

    // close every leftover reflected half on T
    let mut closed: Vec<Partial> = Vec::new();
    for Partial { mut value, arcs } in reflect_halves {
        while tol.is_positive(value) {
            let mut end = network[arcs[arcs.len() - 1]].end;
            let mut bound = value;
            let mut path = arcs.clone();
            while end != threshold {
                let loss = network
                    .outgoing(end)
                    .iter()
                    .copied()
                    .find(|&id| network[id].is_loss() && vals.is_positive(id, tol))
                    .ok_or_else(|| inconsistent(end))?;
                bound = bound.min(vals.get(loss));
                end = network[loss].end;
                path.push(loss);
            }
            for &id in &path[arcs.len()..] {
                vals.sub(id, bound);
            }
            closed.push(Partial { value: bound, arcs: path });
            value -= bound;
        }
    }

    // negative slack joins two closed halves into one object
    let mut unpaired = network
        .find(&Arc::reflect(threshold, threshold, None))
        .map_or(0.0, |id| -vals.get(id));
    // whole units of one half pair with themselves first
    for i in 0..closed.len() {
        let amount = (closed[i].value / 2.0 + tol.eps).floor().min(unpaired);
        if tol.is_positive(amount) {
            patterns.push(join(instance, network, &mut closed, (i, i), amount));
            unpaired -= amount;
        }
    }
    for i in 0..closed.len() {
        while tol.is_positive(closed[i].value) && tol.is_positive(unpaired) {
            let partner = (i + 1..closed.len()).find(|&j| tol.is_positive(closed[j].value));
            let amount = match partner {
                Some(j) => closed[i].value.min(closed[j].value).min(unpaired),
                None => (closed[i].value / 2.0).min(unpaired),
            };
            let pair = (i, partner.unwrap_or(i));
            patterns.push(join(instance, network, &mut closed, pair, amount));
            unpaired -= amount;
        }
    }

    for half in closed.iter().filter(|half| tol.is_positive(half.value)) {
        let mut pattern = emit(instance, network, half.value, &[&half.arcs[..]]);
        if pattern.steps.last() != Some(&PathStep::Complete) {
            pattern.steps.push(PathStep::Complete);
        }
        patterns.push(pattern);
    }
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use super::*;
    use ssp_core::merge_patterns;

    fn instance() -> Instance {
        Instance::new(10, vec![6, 5, 4, 3], vec![1, 1, 2, 4]).unwrap()
    }

    fn expected_arcs() -> Vec<Arc> {
        vec![
            Arc::reflect(0, 8, Some(0)),
            Arc::segment(0, 10, 1),
            Arc::segment(0, 8, 2),
            Arc::reflect(8, 4, Some(2)),
            Arc::reflect(8, 6, Some(3)),
            Arc::segment(0, 6, 3),
            Arc::reflect(6, 8, Some(3)),
            Arc::loss(4, 6),
            Arc::loss(6, 8),
            Arc::loss(8, 10),
            Arc::reflect(10, 10, None),
        ]
    }

    #[test]
    fn builds_folded_arcs_and_upward_loss_chain() {
        let network = build_network(&instance());
        let arcs: Vec<Arc> = network.arcs().map(|(_, arc)| *arc).collect();
        assert_eq!(arcs, expected_arcs());
        assert_eq!(network.nodes().iter().collect::<Vec<_>>(), vec![0, 4, 6, 8, 10]);
        assert_eq!(network.min_loss_node(), Some(4));
    }

    #[test]
    fn folded_coordinates_may_be_negative() {
        let inst = Instance::new(10, vec![9, 8], vec![1, 1]).unwrap();
        let network = build_network(&inst);
        assert!(network.find(&Arc::reflect(0, 2, Some(0))).is_some());
        assert!(network.find(&Arc::reflect(0, 4, Some(1))).is_some());

        let deep = Instance::new(10, vec![4, 9], vec![1, 1]).unwrap();
        let network = build_network(&deep);
        // 8 + 18 = 26 folds to -6
        assert!(network.find(&Arc::reflect(8, -6, Some(1))).is_some());
        assert_eq!(network.min_loss_node(), Some(-6));
        assert!(network.find(&Arc::loss(-6, 0)).is_some());
        assert!(network.find(&Arc::loss(0, 2)).is_some());
    }

    #[test]
    fn warm_start_pairs_halves_through_loss_chain() {
        let inst = instance();
        let network = build_network(&inst);
        let start = warm_start(&inst, &network, &[Pattern::from_items([1, 3, 3])]).unwrap();
        let expected = [
            Arc::segment(0, 10, 1),
            Arc::segment(0, 6, 3),
            Arc::reflect(6, 8, Some(3)),
            Arc::loss(8, 10),
        ];
        for arc in expected {
            assert_eq!(start.get(network.find(&arc).unwrap()), 1.0, "{arc}");
        }
        assert_eq!(start.len(), expected.len());
    }

    #[test]
    fn unpaired_halves_use_the_slack() {
        let inst = Instance::new(10, vec![6, 5], vec![2, 2]).unwrap();
        let network = build_network(&inst);
        let slack = network.find(&Arc::reflect(10, 10, None)).unwrap();

        let start = warm_start(&inst, &network, &[Pattern::from_items([1, 1])]).unwrap();
        assert_eq!(start.get(slack), 1.0);

        let start = warm_start(&inst, &network, &[Pattern::from_items([0, 0])]).unwrap();
        assert_eq!(start.get(slack), -1.0);
        assert_eq!(start.get(network.find(&Arc::reflect(0, 8, Some(0))).unwrap()), 2.0);
        assert_eq!(start.get(network.find(&Arc::loss(8, 10)).unwrap()), 2.0);

        let decoded =
            decode(&inst, &network, &start.to_flow(&network), Tolerance::default()).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].pattern(), Pattern::from_items([0, 0]));
        assert_eq!(decoded[0].multiplicity, 1.0);
        assert_eq!(decoded[0].length, 12);
        assert_eq!(
            decoded[0].steps,
            vec![
                PathStep::Item(0),
                PathStep::Loss(1),
                PathStep::Item(0),
                PathStep::Loss(1),
                PathStep::Complete
            ]
        );
    }

    #[test]
    fn two_long_items_join_through_the_slack() {
        let inst = Instance::new(10, vec![7, 6], vec![1, 1]).unwrap();
        let network = build_network(&inst);
        let start = warm_start(&inst, &network, &[Pattern::from_items([0, 1])]).unwrap();
        let decoded =
            decode(&inst, &network, &start.to_flow(&network), Tolerance::default()).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].pattern(), Pattern::from_items([0, 1]));
        assert_eq!(decoded[0].multiplicity, 1.0);
        assert_eq!(decoded[0].length, 13);
        assert_eq!(decoded[0].steps.last(), Some(&PathStep::Complete));
    }

    #[test]
    fn open_forward_chain_is_rejected() {
        let inst = instance();
        let network = build_network(&inst);
        assert_eq!(
            warm_start(&inst, &network, &[Pattern::from_items([2])]),
            Err(WarmStartError::UnclosedPattern { pattern: 0, end: 8 })
        );
    }

    #[test]
    fn decode_joins_halves() {
        let inst = instance();
        let network = build_network(&inst);
        let patterns = [Pattern::from_items([0, 2]), Pattern::from_items([1, 3, 3])];
        let start = warm_start(&inst, &network, &patterns).unwrap();
        let decoded =
            decode(&inst, &network, &start.to_flow(&network), Tolerance::default()).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].steps, vec![PathStep::Item(2), PathStep::Item(0)]);
        assert_eq!(decoded[0].length, 10);
        assert_eq!(decoded[1].render(&inst), vec!["5", "1xL", "3", "3"]);
        assert_eq!(decoded[1].length, 11);

        let merged = merge_patterns(&decoded);
        assert_eq!(merged[&patterns[0]], 1.0);
        assert_eq!(merged[&patterns[1]], 1.0);
    }

    #[test]
    fn forward_halves_on_threshold_join_through_slack() {
        let inst = Instance::new(10, vec![6, 5], vec![2, 2]).unwrap();
        let network = build_network(&inst);
        let start = warm_start(&inst, &network, &[Pattern::from_items([1, 1])]).unwrap();
        let decoded =
            decode(&inst, &network, &start.to_flow(&network), Tolerance::default()).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(
            decoded[0].steps,
            vec![PathStep::Item(1), PathStep::Item(1), PathStep::Complete]
        );
        assert_eq!(decoded[0].multiplicity, 1.0);
    }

    #[test]
    fn fractional_slack_pairs_a_half_with_itself() {
        let inst = instance();
        let network = build_network(&inst);
        let flow = FlowValues::from_arcs(
            &network,
            [
                (Arc::reflect(0, 8, Some(0)), 1.0),
                (Arc::loss(8, 10), 1.0),
                (Arc::reflect(10, 10, None), -0.5),
            ],
        )
        .unwrap();
        let decoded = decode(&inst, &network, &flow, Tolerance::default()).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].multiplicity, 0.5);
        assert_eq!(decoded[0].length, 12);
        assert_eq!(decoded[0].render(&inst), vec!["6", "1xL", "6", "1xL", "R"]);
    }

    #[test]
    fn halves_beyond_the_slack_close_alone() {
        let inst = instance();
        let network = build_network(&inst);
        let flow = FlowValues::from_arcs(
            &network,
            [
                (Arc::reflect(0, 8, Some(0)), 2.0),
                (Arc::loss(8, 10), 2.0),
                (Arc::reflect(10, 10, None), -0.5),
            ],
        )
        .unwrap();
        let decoded = decode(&inst, &network, &flow, Tolerance::default()).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].multiplicity, 0.5);
        assert_eq!(decoded[0].pattern(), Pattern::from_items([0, 0]));
        assert_eq!(decoded[1].multiplicity, 1.0);
        assert_eq!(decoded[1].render(&inst), vec!["6", "1xL", "R"]);
    }

    #[test]
    fn missing_loss_flow_is_reported() {
        let inst = instance();
        let network = build_network(&inst);
        let flow = FlowValues::from_arcs(&network, [(Arc::segment(0, 6, 3), 1.0)]).unwrap();
        assert_eq!(
            decode(&inst, &network, &flow, Tolerance::default()),
            Err(DecodeError::FlowInconsistency {
                node: 6,
                formulation: Formulation::Reflect
            })
        );
    }
}
