//! Error types for clu-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::status::Status;

/// Errors that can occur while discovering platforms and devices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CluError {
    /// A caller-supplied argument was missing or out of range.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// No cached platform matches the request.
    #[error("invalid platform: {0}")]
    InvalidPlatform(String),

    /// No cached device matches the request.
    #[error("invalid device: {0}")]
    InvalidDevice(String),

    /// A host-side buffer could not be allocated.
    #[error("out of host memory: cannot allocate {size} bytes")]
    OutOfHostMemory {
        /// Requested allocation size.
        size: usize,
    },

    /// The platform API reported a failure.
    #[error("{call} failed: {status}")]
    Api {
        /// Name of the failing entry point.
        call: &'static str,
        /// Status code, exactly as returned.
        status: Status,
    },

    /// A program source file could not be read.
    #[error("cannot read program source {}: {message}", path.display())]
    SourceRead {
        /// File that failed.
        path: PathBuf,
        /// I/O error category.
        kind: std::io::ErrorKind,
        /// I/O error message.
        message: String,
    },

    /// No command queue has been made current.
    #[error("no current command queue")]
    NoCurrentQueue,
}

impl CluError {
    /// Wrap a status code returned by `call`.
    #[must_use]
    pub const fn api(call: &'static str, status: Status) -> Self {
        Self::Api { call, status }
    }

    /// The OpenCL status code this error corresponds to.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidValue(_) => Status::INVALID_VALUE,
            Self::InvalidPlatform(_) => Status::INVALID_PLATFORM,
            Self::InvalidDevice(_) => Status::INVALID_DEVICE,
            Self::OutOfHostMemory { .. } => Status::OUT_OF_HOST_MEMORY,
            Self::Api { status, .. } => *status,
            Self::SourceRead { kind, .. } => {
                if *kind == std::io::ErrorKind::OutOfMemory {
                    Status::OUT_OF_HOST_MEMORY
                } else {
                    Status::INVALID_VALUE
                }
            }
            Self::NoCurrentQueue => Status::INVALID_COMMAND_QUEUE,
        }
    }
}

/// Result type for clu operations.
pub type Result<T> = std::result::Result<T, CluError>;
