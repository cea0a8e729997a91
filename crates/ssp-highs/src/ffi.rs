//! Thin safe layer over the `highs` crate.
//!
//! Columns and rows are addressed by position so the solver bridge can work
//! with plain `usize` indices taken from the model's variable ids.

use highs::{Col, HighsModelStatus, RowProblem, Sense as HighsSense};
use ssp_model::{Sense, SolverStatus};
use std::fmt;
use tracing::{debug, trace, warn};

use crate::status::{highs_has_solution, highs_to_status};

/// Typed HiGHS option value.
#[derive(Debug, Clone, PartialEq)]
pub enum HighsOption {
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(String),
}

/// Errors returned by the HiGHS model wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum HighsModelError {
    ColumnCoefficientLengthMismatch {
        columns: usize,
        coefficients: usize,
    },
    ColumnIndexOutOfBounds {
        column_index: usize,
        num_columns: usize,
    },
    PrimalStartLengthMismatch {
        expected: usize,
        got: usize,
    },
}

impl HighsModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            HighsModelError::ColumnCoefficientLengthMismatch { .. } => {
                "HIGHS_COLUMN_COEFFICIENT_MISMATCH"
            }
            HighsModelError::ColumnIndexOutOfBounds { .. } => "HIGHS_COLUMN_OUT_OF_BOUNDS",
            HighsModelError::PrimalStartLengthMismatch { .. } => "HIGHS_PRIMAL_START_MISMATCH",
        }
    }
}

impl fmt::Display for HighsModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighsModelError::ColumnCoefficientLengthMismatch {
                columns,
                coefficients,
            } => write!(
                f,
                "[{}] columns length ({}) must match coefficients length ({})",
                self.code(),
                columns,
                coefficients
            ),
            HighsModelError::ColumnIndexOutOfBounds {
                column_index,
                num_columns,
            } => write!(
                f,
                "[{}] column index {} out of bounds (num_columns = {})",
                self.code(),
                column_index,
                num_columns
            ),
            HighsModelError::PrimalStartLengthMismatch { expected, got } => write!(
                f,
                "[{}] primal start length must match number of columns (expected {}, got {})",
                self.code(),
                expected,
                got
            ),
        }
    }
}

impl std::error::Error for HighsModelError {}

/// Result of a single HiGHS run.
#[derive(Debug, Clone)]
pub struct HighsOutcome {
    /// Raw HiGHS model status.
    pub highs_status: HighsModelStatus,
    /// Column values, empty when HiGHS produced no usable point.
    pub columns: Vec<f64>,
    /// Objective value, `NaN` when no point is available.
    pub objective_value: f64,
}

impl HighsOutcome {
    /// Solver-agnostic status of this run.
    pub fn status(&self) -> SolverStatus {
        highs_to_status(self.highs_status)
    }
}

/// Safe wrapper around a HiGHS row problem.
///
/// The wrapper is consumed by [`HighsModel::solve`]; build a new one per solve.
pub struct HighsModel {
    problem: RowProblem,
    columns: Vec<Col>,
    log_to_console: bool,
    primal_start: Option<Vec<f64>>,
    options: Vec<(String, HighsOption)>,
}

impl Default for HighsModel {
    fn default() -> Self {
        Self::new()
    }
}

impl HighsModel {
    /// Create an empty HiGHS model.
    pub fn new() -> Self {
        HighsModel {
            problem: RowProblem::default(),
            columns: Vec::new(),
            log_to_console: false,
            primal_start: None,
            options: Vec::new(),
        }
    }

    /// Add a continuous column and return its index.
    pub fn add_col(&mut self, lower: f64, upper: f64, objective_coefficient: f64) -> usize {
        self.add_col_with_integrality(lower, upper, objective_coefficient, false)
    }

    /// Add an integer column and return its index.
    pub fn add_integer_col(&mut self, lower: f64, upper: f64, objective_coefficient: f64) -> usize {
        self.add_col_with_integrality(lower, upper, objective_coefficient, true)
    }

    fn add_col_with_integrality(
        &mut self,
        lower: f64,
        upper: f64,
        objective_coefficient: f64,
        is_integer: bool,
    ) -> usize {
        trace!(
            lower,
            upper,
            objective_coefficient,
            is_integer,
            component = "solver",
            operation = "add_column",
            status = "success",
            "Adding column"
        );
        let col = if is_integer {
            self.problem
                .add_integer_column(objective_coefficient, lower..=upper)
        } else {
            self.problem.add_column(objective_coefficient, lower..=upper)
        };
        self.columns.push(col);
        self.columns.len() - 1
    }

    /// Add a row `lower <= sum(coefficients[k] * x[columns[k]]) <= upper`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slices differ in length or a column index is
    /// out of bounds.
    pub fn add_row(
        &mut self,
        lower: f64,
        upper: f64,
        columns: &[usize],
        coefficients: &[f64],
    ) -> Result<(), HighsModelError> {
        if columns.len() != coefficients.len() {
            return Err(HighsModelError::ColumnCoefficientLengthMismatch {
                columns: columns.len(),
                coefficients: coefficients.len(),
            });
        }
        let num_columns = self.columns.len();
        let mut factors = Vec::with_capacity(columns.len());
        for (&column_index, &coeff) in columns.iter().zip(coefficients) {
            let col = *self
                .columns
                .get(column_index)
                .ok_or(HighsModelError::ColumnIndexOutOfBounds {
                    column_index,
                    num_columns,
                })?;
            factors.push((col, coeff));
        }
        self.problem.add_row(lower..=upper, factors);
        Ok(())
    }

    /// Number of columns added so far.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Enable or disable HiGHS console output.
    pub fn set_log_to_console(&mut self, enabled: bool) {
        self.log_to_console = enabled;
    }

    /// Queue a HiGHS option for the solve.
    pub fn set_option(&mut self, option: impl Into<String>, value: HighsOption) {
        self.options.push((option.into(), value));
    }

    /// Set a full primal start vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the vector length differs from the column count.
    pub fn set_primal_start(&mut self, cols: Vec<f64>) -> Result<(), HighsModelError> {
        if cols.len() != self.columns.len() {
            return Err(HighsModelError::PrimalStartLengthMismatch {
                expected: self.columns.len(),
                got: cols.len(),
            });
        }
        self.primal_start = Some(cols);
        Ok(())
    }

    /// Run HiGHS and collect the outcome.
    pub fn solve(self, sense: Sense) -> HighsOutcome {
        debug!(
            component = "solver",
            operation = "solve",
            status = "success",
            num_cols = self.problem.num_cols(),
            num_rows = self.problem.num_rows(),
            ?sense,
            "Solving model"
        );

        let highs_sense = match sense {
            Sense::Minimize => HighsSense::Minimise,
            Sense::Maximize => HighsSense::Maximise,
        };
        let mut model = self.problem.optimise(highs_sense);
        if self.log_to_console {
            model.set_option("output_flag", true);
            model.set_option("log_to_console", true);
        } else {
            model.make_quiet();
        }
        for (option, value) in &self.options {
            match value {
                HighsOption::Bool(val) => model.set_option(option.as_str(), *val),
                HighsOption::Int(val) => model.set_option(option.as_str(), *val),
                HighsOption::Float(val) => model.set_option(option.as_str(), *val),
                HighsOption::Str(val) => model.set_option(option.as_str(), val.as_str()),
            }
        }
        if let Some(cols) = self.primal_start.as_deref() {
            if let Err(err) = model.try_set_solution(Some(cols), None, None, None) {
                warn!(
                    component = "solver",
                    operation = "set_primal_start",
                    status = "warn",
                    ?err,
                    "Failed to set warm-start solution; continuing without hints"
                );
            }
        }

        let solved = model.solve();
        let highs_status = solved.status();
        trace!(
            component = "solver",
            operation = "solve",
            status = "success",
            ?highs_status,
            "Solution status received"
        );

        if highs_has_solution(highs_status) {
            let solution = solved.get_solution();
            HighsOutcome {
                highs_status,
                columns: solution.columns().to_vec(),
                objective_value: solved.objective_value(),
            }
        } else {
            HighsOutcome {
                highs_status,
                columns: Vec::new(),
                objective_value: f64::NAN,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_row_rejects_length_mismatch() {
        let mut model = HighsModel::new();
        let x = model.add_col(0.0, 1.0, 1.0);
        let err = model.add_row(0.0, 1.0, &[x], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err.code(), "HIGHS_COLUMN_COEFFICIENT_MISMATCH");
    }

    #[test]
    fn add_row_rejects_unknown_column() {
        let mut model = HighsModel::new();
        model.add_integer_col(0.0, 3.0, 1.0);
        let err = model.add_row(0.0, 1.0, &[4], &[1.0]).unwrap_err();
        assert_eq!(
            err,
            HighsModelError::ColumnIndexOutOfBounds {
                column_index: 4,
                num_columns: 1
            }
        );
    }

    #[test]
    fn primal_start_must_cover_every_column() {
        let mut model = HighsModel::new();
        model.add_col(0.0, 1.0, 0.0);
        model.add_col(0.0, 1.0, 0.0);
        let err = model.set_primal_start(vec![0.0]).unwrap_err();
        assert!(err.to_string().starts_with("[HIGHS_PRIMAL_START_MISMATCH]"));
        assert!(model.set_primal_start(vec![0.0, 1.0]).is_ok());
    }
}
