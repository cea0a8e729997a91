use crate::ids::{ConstraintId, VariableId};
use std::fmt;

/// Errors raised while building a [`crate::Model`].
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    UnknownVariable(VariableId),
    UnknownConstraint(ConstraintId),
    /// Lower bound above upper bound, or a NaN bound.
    InvalidBounds { lower: f64, upper: f64 },
    /// A coefficient or hint that is NaN or infinite.
    NonFiniteValue { value: f64 },
    /// `maximize`/`minimize` called on a model that already has an objective.
    ObjectiveAlreadySet,
}

impl ModelError {
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::UnknownVariable(_) => "MODEL_UNKNOWN_VARIABLE",
            ModelError::UnknownConstraint(_) => "MODEL_UNKNOWN_CONSTRAINT",
            ModelError::InvalidBounds { .. } => "MODEL_INVALID_BOUNDS",
            ModelError::NonFiniteValue { .. } => "MODEL_NON_FINITE_VALUE",
            ModelError::ObjectiveAlreadySet => "MODEL_OBJECTIVE_ALREADY_SET",
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownVariable(id) => {
                write!(f, "[{}] No variable with id {}", self.code(), id.inner())
            }
            ModelError::UnknownConstraint(id) => {
                write!(f, "[{}] No constraint with id {}", self.code(), id.inner())
            }
            ModelError::InvalidBounds { lower, upper } => write!(
                f,
                "[{}] Bounds [{}, {}] are empty or undefined",
                self.code(),
                lower,
                upper
            ),
            ModelError::NonFiniteValue { value } => {
                write!(f, "[{}] Expected a finite value, got {}", self.code(), value)
            }
            ModelError::ObjectiveAlreadySet => {
                write!(f, "[{}] Model already has an objective", self.code())
            }
        }
    }
}

impl std::error::Error for ModelError {}
