//! HiGHS backend for [`ssp_model::Solver`].
//!
//! [`HighsSolver`] copies a [`ssp_model::Model`] into a HiGHS row problem,
//! forwards any primal-start hints, and maps the HiGHS model status onto the
//! solver-agnostic [`ssp_model::SolverStatus`].

pub mod ffi;
pub mod solver;
mod status;

pub use ffi::{HighsModel, HighsModelError, HighsOption, HighsOutcome};
pub use solver::HighsSolver;
