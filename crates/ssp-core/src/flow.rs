//! Per-arc flow copies and the zero tolerance.

use crate::arc::{Arc, ArcId};
use crate::network::Network;

/// Zero test for flow values. Values `<= eps` count as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { eps: 1e-6 }
    }
}

impl Tolerance {
    pub fn new(eps: f64) -> Self {
        Self { eps }
    }

    pub fn is_zero(&self, value: f64) -> bool {
        value <= self.eps
    }

    pub fn is_positive(&self, value: f64) -> bool {
        value > self.eps
    }
}

/// Dense flow values indexed by [`ArcId`].
///
/// Decoders consume a private copy; the solver's output is never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowValues {
    values: Vec<f64>,
}

impl FlowValues {
    /// All-zero flow for `network`.
    pub fn zeros(network: &Network) -> Self {
        Self {
            values: vec![0.0; network.len()],
        }
    }

    /// Flow from values listed in arc order. Missing trailing values are zero.
    pub fn from_values(network: &Network, values: &[f64]) -> Self {
        let mut flow = Self::zeros(network);
        for (slot, &value) in flow.values.iter_mut().zip(values) {
            *slot = value;
        }
        flow
    }

    /// Flow from `(arc, value)` pairs. Returns the first arc absent from
    /// `network` as the error.
    pub fn from_arcs(
        network: &Network,
        pairs: impl IntoIterator<Item = (Arc, f64)>,
    ) -> Result<Self, Arc> {
        let mut flow = Self::zeros(network);
        for (arc, value) in pairs {
            let id = network.find(&arc).ok_or(arc)?;
            flow.add(id, value);
        }
        Ok(flow)
    }

    /// Flow from `(id, value)` pairs. Ids outside the network are ignored.
    pub fn from_ids(network: &Network, pairs: impl IntoIterator<Item = (ArcId, f64)>) -> Self {
        let mut flow = Self::zeros(network);
        for (id, value) in pairs {
            if id.index() < flow.values.len() {
                flow.add(id, value);
            }
        }
        flow
    }

    pub fn get(&self, id: ArcId) -> f64 {
        self.values.get(id.index()).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, id: ArcId, value: f64) {
        self.values[id.index()] += value;
    }

    pub fn sub(&mut self, id: ArcId, value: f64) {
        self.values[id.index()] -= value;
    }

    pub fn is_positive(&self, id: ArcId, tol: Tolerance) -> bool {
        tol.is_positive(self.get(id))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// `(id, value)` for every arc above tolerance.
    pub fn positive(&self, tol: Tolerance) -> impl Iterator<Item = (ArcId, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(move |(_, value)| tol.is_positive(**value))
            .map(|(index, &value)| (ArcId::new(index as u32), value))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use super::*;
    use crate::arc::ArcNaming;

    fn network() -> Network {
        let mut network = Network::new(10, ArcNaming::Short);
        network.add_arc(Arc::segment(0, 6, 0));
        network.add_arc(Arc::segment(6, 10, 2));
        network
    }

    #[test]
    fn tolerance_boundaries() {
        let tol = Tolerance::default();
        assert!(tol.is_zero(1e-6));
        assert!(tol.is_zero(-0.5));
        assert!(tol.is_positive(2e-6));
    }

    #[test]
    fn from_arcs_accumulates_and_rejects_unknown() {
        let network = network();
        let flow =
            FlowValues::from_arcs(&network, [(Arc::segment(0, 6, 0), 1.0), (Arc::segment(0, 6, 0), 0.5)])
                .unwrap();
        assert_eq!(flow.get(ArcId::new(0)), 1.5);
        assert_eq!(flow.get(ArcId::new(1)), 0.0);

        let missing = Arc::segment(0, 5, 1);
        assert_eq!(FlowValues::from_arcs(&network, [(missing, 1.0)]), Err(missing));
    }

    #[test]
    fn positive_skips_noise() {
        let network = network();
        let flow = FlowValues::from_values(&network, &[1e-9, 2.0]);
        let positive: Vec<_> = flow.positive(Tolerance::default()).collect();
        assert_eq!(positive, vec![(ArcId::new(1), 2.0)]);
        assert!(!flow.is_positive(ArcId::new(0), Tolerance::default()));
    }

    #[test]
    fn mutation_is_local() {
        let network = network();
        let original = FlowValues::from_values(&network, &[1.0, 1.0]);
        let mut copy = original.clone();
        copy.sub(ArcId::new(0), 1.0);
        assert_eq!(original.get(ArcId::new(0)), 1.0);
        assert_eq!(copy.get(ArcId::new(0)), 0.0);
    }
}
