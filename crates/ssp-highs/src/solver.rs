//! HiGHS implementation of [`ssp_model::Solver`].

use crate::ffi::{HighsModel, HighsModelError, HighsOption};
use ssp_model::{Model, Sense, Solution, Solver, SolverConfig, SolverError};
use std::time::Instant;
use tracing::{debug, trace, warn};

fn highs_model_error_to_solver_error(err: HighsModelError) -> SolverError {
    SolverError::SolverSpecific(err.to_string())
}

/// HiGHS-backed solver.
///
/// The configuration applies to every subsequent call of [`Solver::solve`].
#[derive(Debug, Clone, Default)]
pub struct HighsSolver {
    config: SolverConfig,
}

impl HighsSolver {
    /// Create a solver with default HiGHS settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver with an explicit configuration.
    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    fn update_config(&mut self, update: impl FnOnce(SolverConfig) -> SolverConfig) {
        self.config = update(std::mem::take(&mut self.config));
    }

    /// Set a time limit in seconds.
    pub fn set_time_limit(&mut self, seconds: f64) {
        self.update_config(|config| config.with_time_limit(seconds));
    }

    /// Set a relative MIP gap.
    pub fn set_mip_gap(&mut self, gap: f64) {
        self.update_config(|config| config.with_mip_gap(gap));
    }

    /// Set the thread count.
    pub fn set_threads(&mut self, threads: u32) {
        self.update_config(|config| config.with_threads(threads));
    }

    /// Enable or disable HiGHS logging to console.
    pub fn set_log_to_console(&mut self, enabled: bool) {
        self.update_config(|config| config.with_log_to_console(enabled));
    }

    /// Current configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

impl Solver for HighsSolver {
    fn solve(&mut self, model: &Model) -> Result<Solution, SolverError> {
        solve_model(model, &self.config)
    }
}

fn validate_model(model: &Model) -> Result<Sense, SolverError> {
    if model.num_variables() == 0 {
        return Err(SolverError::EmptyModel);
    }
    model.objective().sense.ok_or(SolverError::NoObjective)
}

fn apply_solver_config(highs_model: &mut HighsModel, config: &SolverConfig) {
    highs_model.set_log_to_console(config.log_to_console.unwrap_or(false));

    if let Some(limit) = config.time_limit {
        highs_model.set_option("time_limit", HighsOption::Float(limit));
    }
    if let Some(gap) = config.mip_gap {
        highs_model.set_option("mip_rel_gap", HighsOption::Float(gap));
    }
    if let Some(threads) = config.threads {
        let threads = i32::try_from(threads).unwrap_or(i32::MAX);
        highs_model.set_option("threads", HighsOption::Int(threads));
    }
}

fn objective_coefficients(model: &Model) -> Result<Vec<f64>, SolverError> {
    let mut coeffs = vec![0.0; model.num_variables()];
    for (var_id, coeff) in &model.objective().terms {
        let slot = coeffs
            .get_mut(var_id.index())
            .ok_or(SolverError::InvalidVariableId(var_id.inner()))?;
        *slot += *coeff;
    }
    Ok(coeffs)
}

fn warm_start_columns(model: &Model) -> Option<Vec<f64>> {
    let hints = model.primal_start()?;
    let mut cols: Vec<f64> = model
        .variables()
        .map(|(_, var)| default_primal_value(var.bounds.lower, var.bounds.upper))
        .collect();
    for (var_id, value) in hints {
        if let Some(slot) = cols.get_mut(var_id.index()) {
            *slot = *value;
        }
    }
    debug!(
        component = "solver",
        operation = "prepare_warm_start",
        status = "success",
        num_hints = hints.len(),
        "Prepared warm-start solution"
    );
    Some(cols)
}

fn solve_model(model: &Model, config: &SolverConfig) -> Result<Solution, SolverError> {
    let sense = validate_model(model)?;
    let solve_started = Instant::now();

    debug!(
        component = "solver",
        operation = "solve",
        status = "success",
        solver = "highs",
        variables = model.num_variables() as u64,
        constraints = model.num_constraints() as u64,
        nnz = model.num_coefficients() as u64,
        "Starting solve process"
    );

    let mut highs_model = HighsModel::new();
    apply_solver_config(&mut highs_model, config);

    let objective = objective_coefficients(model)?;
    for ((var_id, var), obj_coeff) in model.variables().zip(objective) {
        let col_idx = if var.is_integer {
            highs_model.add_integer_col(var.bounds.lower, var.bounds.upper, obj_coeff)
        } else {
            highs_model.add_col(var.bounds.lower, var.bounds.upper, obj_coeff)
        };
        trace!(
            component = "solver",
            operation = "add_variable",
            status = "success",
            var_id = var_id.inner(),
            col_idx,
            is_integer = var.is_integer,
            "Added variable to HiGHS"
        );
    }

    for (constraint_id, constraint, terms) in model.rows() {
        let (columns, coefficients): (Vec<usize>, Vec<f64>) = terms
            .iter()
            .map(|&(var_id, coeff)| (var_id.index(), coeff))
            .unzip();
        highs_model
            .add_row(
                constraint.bounds.lower,
                constraint.bounds.upper,
                &columns,
                &coefficients,
            )
            .map_err(highs_model_error_to_solver_error)?;
        trace!(
            component = "solver",
            operation = "add_constraint",
            status = "success",
            constraint_id = constraint_id.inner(),
            num_coeffs = columns.len(),
            "Added constraint to HiGHS"
        );
    }

    if let Some(cols) = warm_start_columns(model) {
        highs_model
            .set_primal_start(cols)
            .map_err(highs_model_error_to_solver_error)?;
    }

    let outcome = highs_model.solve(sense);
    let status = outcome.status();
    let solve_time_seconds = solve_started.elapsed().as_secs_f64();

    if status.is_optimal() {
        debug!(
            component = "solver",
            operation = "solve",
            status = "success",
            solver = "highs",
            solver_status = %status,
            objective_value = outcome.objective_value,
            duration_ms = solve_time_seconds * 1000.0,
            "HiGHS solve completed"
        );
    } else {
        warn!(
            component = "solver",
            operation = "solve",
            status = "warn",
            solver = "highs",
            solver_status = %status,
            highs_status = ?outcome.highs_status,
            duration_ms = solve_time_seconds * 1000.0,
            "Solver did not find optimal solution"
        );
    }

    Ok(Solution {
        primal_values: outcome.columns,
        objective_value: outcome.objective_value,
        status,
        solve_time_seconds,
    })
}

fn default_primal_value(lower: f64, upper: f64) -> f64 {
    if lower > 0.0 {
        lower
    } else if upper < 0.0 {
        upper
    } else {
        0.0
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use ssp_model::{Bounds, Expr, Variable};

    #[test]
    fn empty_model_is_rejected() {
        let mut solver = HighsSolver::new();
        let err = solver.solve(&Model::new()).unwrap_err();
        assert_eq!(err, SolverError::EmptyModel);
    }

    #[test]
    fn missing_objective_is_rejected() {
        let mut model = Model::new();
        model
            .add_variable(Variable::continuous(Bounds::non_negative()))
            .unwrap();
        let err = HighsSolver::new().solve(&model).unwrap_err();
        assert_eq!(err.code(), "SOLVER_NO_OBJECTIVE");
    }

    #[test]
    fn default_primal_value_stays_within_bounds() {
        assert_eq!(default_primal_value(0.0, 4.0), 0.0);
        assert_eq!(default_primal_value(2.0, 4.0), 2.0);
        assert_eq!(default_primal_value(f64::NEG_INFINITY, -1.0), -1.0);
        assert_eq!(default_primal_value(f64::NEG_INFINITY, f64::INFINITY), 0.0);
    }

    #[test]
    fn warm_start_columns_fill_unhinted_variables() {
        let mut model = Model::new();
        let x = model
            .add_variable(Variable::integer(Bounds::new(1.0, 5.0)))
            .unwrap();
        let y = model
            .add_variable(Variable::integer(Bounds::new(0.0, 5.0)))
            .unwrap();
        model.maximize(Expr::sum([x, y])).unwrap();
        assert!(warm_start_columns(&model).is_none());

        model.set_primal_start(y, 3.0).unwrap();
        assert_eq!(warm_start_columns(&model), Some(vec![1.0, 3.0]));
    }

    #[test]
    fn setters_update_config() {
        let mut solver = HighsSolver::new();
        solver.set_time_limit(2.5);
        solver.set_threads(1);
        assert_eq!(
            solver.config(),
            &SolverConfig::new().with_time_limit(2.5).with_threads(1)
        );
    }
}
