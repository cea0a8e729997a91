//! Arc-flow formulations of the skiving stock problem.
//!
//! Three network variants share one pipeline: [`build_network`] discovers the
//! reachable coordinates of an [`ssp_core::Instance`], [`assemble`] turns the
//! network into an [`ssp_model::Model`], any [`ssp_model::Solver`] solves it,
//! and [`decode`] splits the resulting flow back into object patterns.
//!
//! ```no_run
//! use ssp_arcflow::{solve, Formulation, SolveOptions};
//! use ssp_core::Instance;
//! # fn run(solver: &mut impl ssp_model::Solver) -> Result<(), Box<dyn std::error::Error>> {
//! let instance = Instance::new(10, vec![6, 5, 4, 3], vec![1, 1, 2, 4])?;
//! let solution = solve(&instance, Formulation::LossArcFlow, solver, &SolveOptions::default())?;
//! for pattern in &solution.patterns {
//!     println!("{}", pattern.describe(&instance));
//! }
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod check;
pub mod decode;
pub mod formulation;
pub mod loss;
pub mod plain;
pub mod reflect;
pub mod solve;
pub mod warm_start;

pub use assemble::{assemble, AssemblyOptions, FlowModel, ModelStats};
pub use check::{check_patterns, CapacityViolation};
pub use decode::{decode, DecodeError};
pub use formulation::{build_network, Formulation, ParseFormulationError};
pub use solve::{solve, ArcflowError, ArcflowSolution, SolveOptions};
pub use warm_start::{warm_start, WarmStart, WarmStartError};
