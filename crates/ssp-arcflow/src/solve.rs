//! Build, assemble, solve and decode in one call.

use crate::assemble::{assemble, AssemblyOptions, ModelStats};
use crate::decode::{decode, DecodeError};
use crate::formulation::{build_network, Formulation};
use crate::warm_start::{warm_start, WarmStartError};
use serde::Serialize;
use ssp_core::{DecodedPattern, Instance, Pattern, Tolerance};
use ssp_model::{ModelError, Solver, SolverError, SolverStatus};
use std::fmt;
use std::time::{Duration, Instant};

/// Options for [`solve`].
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    pub relaxed: bool,
    pub bound: Option<f64>,
    /// Known patterns replayed as a primal start.
    pub warm_start: Option<Vec<Pattern>>,
    pub tolerance: Tolerance,
}

impl SolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relaxed(mut self, relaxed: bool) -> Self {
        self.relaxed = relaxed;
        self
    }

    pub fn with_bound(mut self, bound: f64) -> Self {
        self.bound = Some(bound);
        self
    }

    pub fn with_warm_start(mut self, patterns: Vec<Pattern>) -> Self {
        self.warm_start = Some(patterns);
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// An optimal flow split into patterns.
#[derive(Debug, Clone, Serialize)]
pub struct ArcflowSolution {
    pub formulation: Formulation,
    pub objective_value: f64,
    pub patterns: Vec<DecodedPattern>,
    pub stats: ModelStats,
    /// Network construction and model assembly.
    pub model_time: Duration,
    pub solve_time: Duration,
}

/// Failures of the solve pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ArcflowError {
    WarmStart(WarmStartError),
    Model(ModelError),
    Solver(SolverError),
    /// The oracle stopped before proving optimality. Not retried.
    Interrupted { elapsed: Duration },
    Infeasible,
    /// Any other non-optimal status.
    SolveFailed(SolverStatus),
    Decode(DecodeError),
}

impl ArcflowError {
    pub fn code(&self) -> &'static str {
        match self {
            ArcflowError::WarmStart(err) => err.code(),
            ArcflowError::Model(err) => err.code(),
            ArcflowError::Solver(err) => err.code(),
            ArcflowError::Interrupted { .. } => "ARCFLOW_INTERRUPTED",
            ArcflowError::Infeasible => "ARCFLOW_INFEASIBLE",
            ArcflowError::SolveFailed(_) => "ARCFLOW_SOLVE_FAILED",
            ArcflowError::Decode(err) => err.code(),
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, ArcflowError::Interrupted { .. })
    }
}

impl fmt::Display for ArcflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArcflowError::WarmStart(err) => err.fmt(f),
            ArcflowError::Model(err) => err.fmt(f),
            ArcflowError::Solver(err) => err.fmt(f),
            ArcflowError::Interrupted { elapsed } => write!(
                f,
                "[{}] Solver interrupted after {:.3}s",
                self.code(),
                elapsed.as_secs_f64()
            ),
            ArcflowError::Infeasible => write!(f, "[{}] Model is infeasible", self.code()),
            ArcflowError::SolveFailed(status) => {
                write!(f, "[{}] Solver finished with status {}", self.code(), status)
            }
            ArcflowError::Decode(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ArcflowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArcflowError::WarmStart(err) => Some(err),
            ArcflowError::Model(err) => Some(err),
            ArcflowError::Solver(err) => Some(err),
            ArcflowError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WarmStartError> for ArcflowError {
    fn from(err: WarmStartError) -> Self {
        ArcflowError::WarmStart(err)
    }
}

impl From<ModelError> for ArcflowError {
    fn from(err: ModelError) -> Self {
        ArcflowError::Model(err)
    }
}

impl From<SolverError> for ArcflowError {
    fn from(err: SolverError) -> Self {
        ArcflowError::Solver(err)
    }
}

impl From<DecodeError> for ArcflowError {
    fn from(err: DecodeError) -> Self {
        ArcflowError::Decode(err)
    }
}

/// Solve `instance` with `formulation` on `solver` and decode the optimum.
pub fn solve<S: Solver + ?Sized>(
    instance: &Instance,
    formulation: Formulation,
    solver: &mut S,
    options: &SolveOptions,
) -> Result<ArcflowSolution, ArcflowError> {
    let model_started = Instant::now();
    let network = build_network(instance, formulation);
    let mut assembly = AssemblyOptions::new().with_relaxed(options.relaxed);
    if let Some(bound) = options.bound {
        assembly = assembly.with_bound(bound);
    }
    if let Some(patterns) = &options.warm_start {
        assembly = assembly.with_warm_start(warm_start(instance, formulation, &network, patterns)?);
    }
    let flow_model = assemble(instance, formulation, &network, &assembly)?;
    let model_time = model_started.elapsed();

    let solve_started = Instant::now();
    let solution = solver.solve(flow_model.model())?;
    let solve_time = solve_started.elapsed();

    match solution.status {
        SolverStatus::Optimal => {}
        SolverStatus::Interrupted => {
            tracing::warn!(
                component = "arcflow",
                operation = "solve",
                status = "interrupted",
                formulation = formulation.as_str(),
                solve_time_s = solve_time.as_secs_f64(),
                "Solver interrupted"
            );
            return Err(ArcflowError::Interrupted {
                elapsed: solve_time,
            });
        }
        SolverStatus::Infeasible => return Err(ArcflowError::Infeasible),
        other => return Err(ArcflowError::SolveFailed(other)),
    }

    let flow = flow_model.flow_values(&network, &solution);
    let patterns = decode(instance, formulation, &network, &flow, options.tolerance)?;
    tracing::info!(
        component = "arcflow",
        operation = "solve",
        status = "success",
        formulation = formulation.as_str(),
        objective = solution.objective_value,
        patterns = patterns.len(),
        model_time_s = model_time.as_secs_f64(),
        solve_time_s = solve_time.as_secs_f64(),
        "Solved instance"
    );
    Ok(ArcflowSolution {
        formulation,
        objective_value: solution.objective_value,
        patterns,
        stats: flow_model.stats(),
        model_time,
        solve_time,
    })
}
