//! Solver oracle interface.
//!
//! The arc-flow crates never talk to a concrete LP/MIP library. They hand a
//! [`Model`] to anything implementing [`Solver`] and read back a [`Solution`].

use crate::Model;
use std::fmt;

/// Outcome class of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// Stopped before proving optimality: time or iteration limit, or a user interrupt.
    Interrupted,
    Unknown,
}

impl SolverStatus {
    pub fn is_optimal(self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }

    pub fn is_interrupted(self) -> bool {
        matches!(self, SolverStatus::Interrupted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "optimal",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::Unbounded => "unbounded",
            SolverStatus::Interrupted => "interrupted",
            SolverStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors a backend raises before or instead of producing a [`Solution`].
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    EmptyModel,
    NoObjective,
    InvalidVariableId(u32),
    /// Backend failure, carrying the backend's own message.
    SolverSpecific(String),
}

impl SolverError {
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::EmptyModel => "SOLVER_EMPTY_MODEL",
            SolverError::NoObjective => "SOLVER_NO_OBJECTIVE",
            SolverError::InvalidVariableId(_) => "SOLVER_INVALID_VARIABLE_ID",
            SolverError::SolverSpecific(_) => "SOLVER_SPECIFIC",
        }
    }
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::EmptyModel => write!(f, "[{}] Nothing to solve: the model has no columns", self.code()),
            SolverError::NoObjective => write!(f, "[{}] Objective sense was never set", self.code()),
            SolverError::InvalidVariableId(id) => {
                write!(f, "[{}] Objective refers to missing column {}", self.code(), id)
            }
            SolverError::SolverSpecific(msg) => {
                write!(f, "[{}] Backend failure: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for SolverError {}

/// Primal point returned by a backend.
///
/// A non-optimal status is not an error at this layer; `primal_values` may be
/// empty when the backend has no point to report.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Indexed by [`crate::VariableId::index`].
    pub primal_values: Vec<f64>,
    pub objective_value: f64,
    pub status: SolverStatus,
    pub solve_time_seconds: f64,
}

impl Solution {
    pub fn get_primal(&self, index: usize) -> Option<f64> {
        self.primal_values.get(index).copied()
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }
}

/// Backend options. Unset fields keep the backend default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverConfig {
    /// Seconds.
    pub time_limit: Option<f64>,
    /// Relative MIP gap.
    pub mip_gap: Option<f64>,
    pub threads: Option<u32>,
    pub log_to_console: Option<bool>,
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    pub fn with_threads(mut self, count: u32) -> Self {
        self.threads = Some(count);
        self
    }

    pub fn with_log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = Some(enabled);
        self
    }
}

/// The oracle every LP/MIP backend implements.
pub trait Solver {
    fn solve(&mut self, model: &Model) -> Result<Solution, SolverError>;
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn interrupted_is_neither_optimal_nor_failed() {
        assert!(SolverStatus::Optimal.is_optimal());
        assert!(!SolverStatus::Interrupted.is_optimal());
        assert!(SolverStatus::Interrupted.is_interrupted());
        assert!(!SolverStatus::Unknown.is_interrupted());
        assert_eq!(SolverStatus::Interrupted.to_string(), "interrupted");
    }

    #[test]
    fn solver_error_display() {
        assert_eq!(
            SolverError::EmptyModel.to_string(),
            "[SOLVER_EMPTY_MODEL] Nothing to solve: the model has no columns"
        );
        assert!(SolverError::InvalidVariableId(42).to_string().contains("42"));
        assert!(SolverError::SolverSpecific("oops".to_string())
            .to_string()
            .starts_with("[SOLVER_SPECIFIC]"));
    }

    #[test]
    fn solution_accessors() {
        let solution = Solution {
            primal_values: vec![1.0, 2.0],
            objective_value: 3.0,
            status: SolverStatus::Optimal,
            solve_time_seconds: 0.1,
        };
        assert_eq!(solution.get_primal(1), Some(2.0));
        assert_eq!(solution.get_primal(2), None);
        assert!(solution.is_optimal());
    }

    #[test]
    fn config_builder_sets_only_requested_fields() {
        let config = SolverConfig::new().with_time_limit(60.0).with_threads(4);
        assert_eq!(config.time_limit, Some(60.0));
        assert_eq!(config.threads, Some(4));
        assert_eq!(config.mip_gap, None);
        assert_eq!(config.log_to_console, None);
        assert_ne!(config, SolverConfig::default());
    }
}
