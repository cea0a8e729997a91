//! Status conversions for HiGHS integration.

use highs::HighsModelStatus;
use ssp_model::SolverStatus;

pub(crate) fn highs_to_status(status: HighsModelStatus) -> SolverStatus {
    match status {
        HighsModelStatus::Optimal => SolverStatus::Optimal,
        HighsModelStatus::Infeasible => SolverStatus::Infeasible,
        HighsModelStatus::Unbounded => SolverStatus::Unbounded,
        HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit => {
            SolverStatus::Interrupted
        }
        _ => SolverStatus::Unknown,
    }
}

pub(crate) fn highs_has_solution(status: HighsModelStatus) -> bool {
    matches!(
        status,
        HighsModelStatus::Optimal
            | HighsModelStatus::ReachedTimeLimit
            | HighsModelStatus::ReachedIterationLimit
    )
}
