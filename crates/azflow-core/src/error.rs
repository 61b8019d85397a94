//! Error types for azflow-core

use thiserror::Error;

/// Failures surfaced by graph editing operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("invalid parent '{parent}' for node '{node}': {reason}")]
    InvalidParent {
        node: String,
        parent: String,
        reason: String,
    },

    #[error("edge endpoint not found: {0}")]
    UnknownEndpoint(String),

    #[error("node not found: {0}")]
    UnknownNode(String),

    #[error("duplicate id: {0}")]
    DuplicateId(String),
}

impl GraphError {
    pub fn invalid_parent(
        node: impl Into<String>,
        parent: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParent {
            node: node.into(),
            parent: parent.into(),
            reason: reason.into(),
        }
    }
}

/// Failures reading or writing the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
