//! Known patterns replayed as an initial flow.

use crate::formulation::Formulation;
use ssp_core::{Arc, ArcId, FlowValues, Instance, Network, Node, Pattern};
use std::collections::BTreeMap;
use std::fmt;

/// Arc values seeding a solver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarmStart {
    values: BTreeMap<ArcId, f64>,
}

impl WarmStart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ArcId) -> f64 {
        self.values.get(&id).copied().unwrap_or(0.0)
    }

    /// `(id, value)` in arc order.
    pub fn iter(&self) -> impl Iterator<Item = (ArcId, f64)> + '_ {
        self.values.iter().map(|(&id, &value)| (id, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Dense copy for decoding.
    pub fn to_flow(&self, network: &Network) -> FlowValues {
        FlowValues::from_ids(network, self.iter())
    }

    pub(crate) fn add_id(&mut self, id: ArcId, value: f64) {
        *self.values.entry(id).or_insert(0.0) += value;
    }

    /// Add `value` to `arc`, which must belong to `network`.
    pub(crate) fn add(
        &mut self,
        network: &Network,
        arc: Arc,
        value: f64,
    ) -> Result<ArcId, WarmStartError> {
        let id = network
            .find(&arc)
            .ok_or(WarmStartError::ArcNotInNetwork { arc })?;
        self.add_id(id, value);
        Ok(id)
    }

    /// Add `value` to every loss arc linking consecutive active nodes of
    /// `nodes`, taken in the given order.
    pub(crate) fn add_loss_chain(
        &mut self,
        network: &Network,
        nodes: &[Node],
        value: f64,
    ) -> Result<(), WarmStartError> {
        for pair in nodes.windows(2) {
            self.add(network, Arc::loss(pair[0], pair[1]), value)?;
        }
        Ok(())
    }
}

/// Failure to map patterns onto a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarmStartError {
    /// The replay produced an arc the builder never created.
    ArcNotInNetwork { arc: Arc },
    /// A pattern names an item the instance does not have.
    UnknownItem { pattern: usize, item: usize },
    /// A Reflect replay left a forward chain below the threshold with no
    /// reflected partner.
    UnclosedPattern { pattern: usize, end: Node },
}

impl WarmStartError {
    pub fn code(&self) -> &'static str {
        match self {
            WarmStartError::ArcNotInNetwork { .. } => "WARM_START_ARC_NOT_IN_NETWORK",
            WarmStartError::UnknownItem { .. } => "WARM_START_UNKNOWN_ITEM",
            WarmStartError::UnclosedPattern { .. } => "WARM_START_UNCLOSED_PATTERN",
        }
    }
}

impl fmt::Display for WarmStartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarmStartError::ArcNotInNetwork { arc } => {
                write!(f, "[{}] Arc {} is not in the network", self.code(), arc)
            }
            WarmStartError::UnknownItem { pattern, item } => write!(
                f,
                "[{}] Pattern {} uses unknown item {}",
                self.code(),
                pattern,
                item
            ),
            WarmStartError::UnclosedPattern { pattern, end } => write!(
                f,
                "[{}] Pattern {} leaves a forward chain open at node {}",
                self.code(),
                pattern,
                end
            ),
        }
    }
}

impl std::error::Error for WarmStartError {}

/// Reject patterns naming items outside `instance`.
pub(crate) fn check_items(instance: &Instance, patterns: &[Pattern]) -> Result<(), WarmStartError> {
    for (index, pattern) in patterns.iter().enumerate() {
        if let Some(item) = pattern.counts().map(|(item, _)| item).find(|&item| item >= instance.len()) {
            return Err(WarmStartError::UnknownItem {
                pattern: index,
                item,
            });
        }
    }
    Ok(())
}

/// Replay `patterns` on the network of `formulation`.
pub fn warm_start(
    instance: &Instance,
    formulation: Formulation,
    network: &Network,
    patterns: &[Pattern],
) -> Result<WarmStart, WarmStartError> {
    check_items(instance, patterns)?;
    let result = match formulation {
        Formulation::ArcFlow => crate::plain::warm_start(instance, network, patterns),
        Formulation::LossArcFlow => crate::loss::warm_start(instance, network, patterns),
        Formulation::Reflect => crate::reflect::warm_start(instance, network, patterns),
    };
    match &result {
        Ok(start) => tracing::debug!(
            component = "arcflow",
            operation = "warm_start",
            status = "success",
            formulation = formulation.as_str(),
            patterns = patterns.len(),
            arcs = start.len(),
            "Mapped patterns onto network"
        ),
        Err(err) => tracing::warn!(
            component = "arcflow",
            operation = "warm_start",
            status = "error",
            formulation = formulation.as_str(),
            "{err}"
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_item_is_rejected() {
        let instance = Instance::new(10, vec![6, 4], vec![1, 1]).unwrap();
        let patterns = [Pattern::from_items([0, 1]), Pattern::from_items([5])];
        assert_eq!(
            check_items(&instance, &patterns),
            Err(WarmStartError::UnknownItem {
                pattern: 1,
                item: 5
            })
        );
    }

    #[test]
    fn error_display_carries_code() {
        let err = WarmStartError::ArcNotInNetwork {
            arc: Arc::segment(0, 6, 0),
        };
        assert_eq!(
            err.to_string(),
            "[WARM_START_ARC_NOT_IN_NETWORK] Arc x[0,6,0,s] is not in the network"
        );
    }
}
