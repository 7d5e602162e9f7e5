//! Registry error types
//!
//! Error types for stream registry operations.

use crate::allocator::{AllocError, Endpoint};
use crate::relay::WorkerError;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A stream with this name already exists (or is being created)
    DuplicateName(String),
    /// No active stream with this name
    NotFound(String),
    /// The endpoint allocator has no ports left
    EndpointSpaceExhausted(AllocError),
    /// The relay worker failed to start; nothing was registered
    WorkerStartFailed { name: String, cause: WorkerError },
    /// The relay worker failed to stop; the entry was removed anyway
    WorkerStopFailed { name: String, cause: WorkerError },
}

impl RegistryError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::DuplicateName(_) => "duplicate_name",
            RegistryError::NotFound(_) => "not_found",
            RegistryError::EndpointSpaceExhausted(_) => "endpoint_space_exhausted",
            RegistryError::WorkerStartFailed { .. } => "worker_start_failed",
            RegistryError::WorkerStopFailed { .. } => "worker_stop_failed",
        }
    }
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DuplicateName(name) => write!(f, "Stream name already exists: {}", name),
            RegistryError::NotFound(name) => write!(f, "Stream not found: {}", name),
            RegistryError::EndpointSpaceExhausted(err) => write!(f, "{}", err),
            RegistryError::WorkerStartFailed { name, cause } => {
                write!(f, "Failed to start relay for {}: {}", name, cause)
            }
            RegistryError::WorkerStopFailed { name, cause } => {
                write!(f, "Failed to stop relay for {}: {}", name, cause)
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::EndpointSpaceExhausted(err) => Some(err),
            RegistryError::WorkerStartFailed { cause, .. }
            | RegistryError::WorkerStopFailed { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

impl From<AllocError> for RegistryError {
    fn from(err: AllocError) -> Self {
        RegistryError::EndpointSpaceExhausted(err)
    }
}

/// A stream whose relay failed to stop during teardown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopFailure {
    /// Stream name
    pub name: String,
    /// Endpoint the stream held (released regardless)
    pub endpoint: Endpoint,
    /// Worker error
    pub cause: WorkerError,
}

impl std::fmt::Display for StopFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (endpoint {}): {}", self.name, self.endpoint, self.cause)
    }
}
