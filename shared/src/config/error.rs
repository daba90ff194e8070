use thiserror::Error;

use crate::NodeId;

/// Errors found while loading or validating the cluster configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read cluster config {path}: {message}")]
    Io { path: String, message: String },

    /// The configuration file is not valid TOML for a cluster description
    #[error("Failed to parse cluster config: {message}")]
    Parse { message: String },

    /// No render node with this id is configured
    #[error("Render node {id} is not part of the cluster configuration")]
    UnknownNode { id: NodeId },

    /// Two render nodes share an id
    #[error("Render node id {id} is configured more than once")]
    DuplicateNode { id: NodeId },

    /// Node ids are folded into reserved object ids and must stay small
    #[error("Render node id {id} is out of range (maximum {max})")]
    NodeIdOutOfRange { id: NodeId, max: NodeId },

    /// A screen's corners do not describe a usable rectangle
    #[error("Screen of render node {id} is invalid: {reason}")]
    InvalidScreen { id: NodeId, reason: &'static str },

    /// A port is zero or would overflow once channel offsets are applied
    #[error("Invalid port for {endpoint}")]
    InvalidPort { endpoint: String },

    /// A timing value is zero or inconsistent
    #[error("Invalid timing: {field} must be greater than zero")]
    InvalidTiming { field: &'static str },

    /// Projection parameters are unusable
    #[error("Invalid view configuration: {reason}")]
    InvalidView { reason: &'static str },
}
