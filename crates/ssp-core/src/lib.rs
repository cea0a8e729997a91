//! Core data types for skiving stock arc-flow formulations.
//!
//! - [`Instance`]: threshold, item lengths and availabilities
//! - [`NodeSet`]: ordered set of length coordinates with range queries
//! - [`Network`]: arc arena with stable [`ArcId`] handles
//! - [`Pattern`], [`DecodedPattern`]: object compositions produced by decoding
//! - [`FlowValues`], [`Tolerance`]: per-arc flow copies and zero tests

pub mod arc;
pub mod error;
pub mod flow;
pub mod instance;
pub mod network;
pub mod nodes;
pub mod pattern;
pub mod reader;

pub use arc::{Arc, ArcId, ArcKind, ArcNaming, Node};
pub use error::{ArcParseError, InstanceError};
pub use flow::{FlowValues, Tolerance};
pub use instance::Instance;
pub use network::Network;
pub use nodes::NodeSet;
pub use pattern::{merge_patterns, DecodedPattern, PathStep, Pattern};
pub use reader::{read_instance_file, read_instances};
