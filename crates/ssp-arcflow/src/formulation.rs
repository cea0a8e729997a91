//! Formulation selector and network dispatch.

use serde::{Deserialize, Serialize};
use ssp_core::{ArcNaming, Instance, Network};
use std::fmt;
use std::str::FromStr;

/// Network variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formulation {
    /// Plain arc-flow with arcs clipped at the threshold.
    #[serde(rename = "arcflow")]
    ArcFlow,
    /// Overshooting placements shifted onto the threshold, slack on loss arcs.
    #[serde(rename = "larcflow")]
    LossArcFlow,
    /// Objects built from both ends in doubled coordinates.
    Reflect,
}

impl Formulation {
    pub const ALL: [Formulation; 3] = [
        Formulation::ArcFlow,
        Formulation::LossArcFlow,
        Formulation::Reflect,
    ];

    /// Command-line name.
    pub fn as_str(self) -> &'static str {
        match self {
            Formulation::ArcFlow => "arcflow",
            Formulation::LossArcFlow => "larcflow",
            Formulation::Reflect => "reflect",
        }
    }

    /// Arc name layout used for model variables.
    pub fn naming(self) -> ArcNaming {
        match self {
            Formulation::ArcFlow => ArcNaming::Short,
            Formulation::LossArcFlow | Formulation::Reflect => ArcNaming::Full,
        }
    }
}

impl fmt::Display for Formulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown formulation name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFormulationError(pub String);

impl fmt::Display for ParseFormulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[FORMULATION_UNKNOWN] '{}' is not one of arcflow, larcflow, reflect",
            self.0
        )
    }
}

impl std::error::Error for ParseFormulationError {}

impl FromStr for Formulation {
    type Err = ParseFormulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arcflow" => Ok(Formulation::ArcFlow),
            "larcflow" => Ok(Formulation::LossArcFlow),
            "reflect" => Ok(Formulation::Reflect),
            other => Err(ParseFormulationError(other.to_string())),
        }
    }
}

/// Build the network of `formulation` for `instance`.
pub fn build_network(instance: &Instance, formulation: Formulation) -> Network {
    let network = match formulation {
        Formulation::ArcFlow => crate::plain::build_network(instance),
        Formulation::LossArcFlow => crate::loss::build_network(instance),
        Formulation::Reflect => crate::reflect::build_network(instance),
    };
    tracing::debug!(
        component = "arcflow",
        operation = "build_network",
        status = "success",
        formulation = formulation.as_str(),
        nodes = network.nodes().len(),
        arcs = network.len(),
        "Built network"
    );
    network
}
