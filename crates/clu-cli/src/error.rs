//! CLI error types.

use clu_core::fake::InventoryError;
use clu_core::{CluError, Status};
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Discovery failed.
    #[error(transparent)]
    Discovery(#[from] CluError),

    /// The inventory file could not be loaded.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// The OpenCL status behind a discovery failure.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::Discovery(err) => Some(err.status()),
            _ => None,
        }
    }
}
