//! Model container and solver abstraction for arc-flow formulations.
//!
//! - [`Model`]: variables, named rows, objective and warm-start hints
//! - [`Expr`]: linear expressions and the comparisons that become rows
//! - [`Solver`]: the oracle interface every LP/MIP backend implements

pub mod error;
pub mod expr;
pub mod ids;
pub mod model;
pub mod solver;
pub mod types;

pub use error::ModelError;
pub use expr::{ComparisonSense, ConstraintExpr, Expr};
pub use ids::{ConstraintId, VariableId};
pub use model::Model;
pub use solver::{Solution, Solver, SolverConfig, SolverError, SolverStatus};
pub use types::{Bounds, Constraint, Objective, Sense, Variable};
