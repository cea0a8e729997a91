//! Flow decomposition into object patterns.

use crate::formulation::Formulation;
use ssp_core::{
    Arc, ArcId, ArcKind, DecodedPattern, FlowValues, Instance, Network, Node, PathStep, Tolerance,
};
use std::fmt;

/// A flow that cannot be split into complete paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// No positive continuation leaves `node`.
    FlowInconsistency { node: Node, formulation: Formulation },
    /// A reflect match needs a loss arc into `node` that is already used up.
    LossChainExhausted { node: Node },
}

impl DecodeError {
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::FlowInconsistency { .. } => "DECODE_FLOW_INCONSISTENCY",
            DecodeError::LossChainExhausted { .. } => "DECODE_LOSS_CHAIN_EXHAUSTED",
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::FlowInconsistency { node, formulation } => write!(
                f,
                "[{}] No positive flow leaves node {} ({})",
                self.code(),
                node,
                formulation
            ),
            DecodeError::LossChainExhausted { node } => write!(
                f,
                "[{}] Loss chain into node {} has no flow left",
                self.code(),
                node
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// A path under construction whose bound is already subtracted from every arc
/// on it.
///
/// Appending an arc with less residual flow than the bound hands the
/// difference back to the earlier arcs before lowering the bound.
#[derive(Debug, Clone)]
pub(crate) struct TracedPath {
    arcs: Vec<ArcId>,
    bound: f64,
}

impl TracedPath {
    /// Start at `first`, consuming its whole residual.
    pub(crate) fn start(vals: &mut FlowValues, first: ArcId) -> Self {
        let bound = vals.get(first);
        vals.sub(first, bound);
        Self {
            arcs: vec![first],
            bound,
        }
    }

    pub(crate) fn push(&mut self, vals: &mut FlowValues, arc: ArcId) {
        let available = vals.get(arc);
        if available < self.bound {
            let excess = self.bound - available;
            for &id in &self.arcs {
                vals.add(id, excess);
            }
            self.bound = available;
        }
        vals.sub(arc, self.bound);
        self.arcs.push(arc);
    }

    pub(crate) fn bound(&self) -> f64 {
        self.bound
    }

    pub(crate) fn len(&self) -> usize {
        self.arcs.len()
    }

    pub(crate) fn into_arcs(self) -> Vec<ArcId> {
        self.arcs
    }
}

/// Token emitted for `arc` in a decoded path.
pub(crate) fn arc_step(arc: &Arc) -> Option<PathStep> {
    match (arc.kind, arc.item) {
        (ArcKind::Loss, _) => Some(PathStep::Loss(1)),
        (_, Some(item)) => Some(PathStep::Item(item)),
        (ArcKind::Reflect, None) => Some(PathStep::Complete),
        (ArcKind::Segment, None) => None,
    }
}

/// Decompose `flow` on the network of `formulation`.
///
/// Works on a private copy of `flow`. Values within `tol` of zero are ignored.
pub fn decode(
    instance: &Instance,
    formulation: Formulation,
    network: &Network,
    flow: &FlowValues,
    tol: Tolerance,
) -> Result<Vec<DecodedPattern>, DecodeError> {
    let result = match formulation {
        Formulation::ArcFlow => crate::plain::decode(instance, network, flow, tol),
        Formulation::LossArcFlow => crate::loss::decode(instance, network, flow, tol),
        Formulation::Reflect => crate::reflect::decode(instance, network, flow, tol),
    };
    match &result {
        Ok(patterns) => tracing::debug!(
            component = "arcflow",
            operation = "decode",
            status = "success",
            formulation = formulation.as_str(),
            patterns = patterns.len(),
            "Decoded flow"
        ),
        Err(err) => tracing::error!(
            component = "arcflow",
            operation = "decode",
            status = "error",
            formulation = formulation.as_str(),
            "{err}"
        ),
    }
    result
}
