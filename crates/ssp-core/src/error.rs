//! Error types for instances and arc names.

use std::fmt;

/// Errors raised while constructing or reading instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    /// Threshold must be positive.
    ZeroThreshold,
    /// `lengths` and `availabilities` differ in size.
    LengthMismatch { lengths: usize, availabilities: usize },
    /// An item has length zero.
    ZeroLength { item: usize },
    /// An item is not shorter than the threshold.
    ItemTooLong {
        item: usize,
        length: u64,
        threshold: u64,
    },
    /// A record in an instance file could not be parsed.
    Parse { line: usize, reason: String },
    /// The header count does not match the number of records.
    CountMismatch { expected: usize, found: usize },
    /// The instance file could not be read.
    Io { path: String, reason: String },
}

impl InstanceError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            InstanceError::ZeroThreshold => "INSTANCE_ZERO_THRESHOLD",
            InstanceError::LengthMismatch { .. } => "INSTANCE_LENGTH_MISMATCH",
            InstanceError::ZeroLength { .. } => "INSTANCE_ZERO_LENGTH",
            InstanceError::ItemTooLong { .. } => "INSTANCE_ITEM_TOO_LONG",
            InstanceError::Parse { .. } => "INSTANCE_PARSE",
            InstanceError::CountMismatch { .. } => "INSTANCE_COUNT_MISMATCH",
            InstanceError::Io { .. } => "INSTANCE_IO",
        }
    }
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceError::ZeroThreshold => {
                write!(f, "[{}] Threshold must be positive", self.code())
            }
            InstanceError::LengthMismatch {
                lengths,
                availabilities,
            } => write!(
                f,
                "[{}] {} lengths but {} availabilities",
                self.code(),
                lengths,
                availabilities
            ),
            InstanceError::ZeroLength { item } => {
                write!(f, "[{}] Item {} has length zero", self.code(), item)
            }
            InstanceError::ItemTooLong {
                item,
                length,
                threshold,
            } => write!(
                f,
                "[{}] Item {} has length {} >= threshold {}",
                self.code(),
                item,
                length,
                threshold
            ),
            InstanceError::Parse { line, reason } => {
                write!(f, "[{}] Line {}: {}", self.code(), line, reason)
            }
            InstanceError::CountMismatch { expected, found } => write!(
                f,
                "[{}] Header announces {} instances, found {}",
                self.code(),
                expected,
                found
            ),
            InstanceError::Io { path, reason } => {
                write!(f, "[{}] Cannot read {}: {}", self.code(), path, reason)
            }
        }
    }
}

impl std::error::Error for InstanceError {}

/// Errors raised when parsing `x[...]` arc names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArcParseError {
    /// Name is not of the form `x[...]`.
    Malformed(String),
    /// A numeric field could not be parsed.
    InvalidField { name: String, field: usize },
    /// The kind field is not one of `s`, `l`, `r`.
    UnknownKind(String),
}

impl ArcParseError {
    pub fn code(&self) -> &'static str {
        match self {
            ArcParseError::Malformed(_) => "ARC_NAME_MALFORMED",
            ArcParseError::InvalidField { .. } => "ARC_NAME_INVALID_FIELD",
            ArcParseError::UnknownKind(_) => "ARC_NAME_UNKNOWN_KIND",
        }
    }
}

impl fmt::Display for ArcParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArcParseError::Malformed(name) => {
                write!(f, "[{}] Not an arc name: '{}'", self.code(), name)
            }
            ArcParseError::InvalidField { name, field } => write!(
                f,
                "[{}] Field {} of '{}' is not an integer",
                self.code(),
                field,
                name
            ),
            ArcParseError::UnknownKind(kind) => {
                write!(f, "[{}] Unknown arc kind '{}'", self.code(), kind)
            }
        }
    }
}

impl std::error::Error for ArcParseError {}
