//! Facade error type and status mapping

use axum::http::StatusCode;

use crate::registry::{RegistryError, StopFailure};

/// Error returned by [`StreamService`](super::StreamService) operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Caller input rejected before touching the registry
    InvalidRequest(String),
    /// Registry operation failed
    Registry(RegistryError),
    /// Destroy-all finished but some relays failed to stop
    PartialTeardown(Vec<StopFailure>),
}

impl ServiceError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidRequest(_) => "invalid_request",
            ServiceError::Registry(err) => err.kind(),
            ServiceError::PartialTeardown(_) => "worker_stop_failed",
        }
    }

    /// Caller-facing status
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Registry(err) => match err {
                RegistryError::DuplicateName(_) => StatusCode::CONFLICT,
                RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
                RegistryError::EndpointSpaceExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
                RegistryError::WorkerStartFailed { .. } | RegistryError::WorkerStopFailed { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ServiceError::PartialTeardown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Per-stream failures of a partial teardown (empty otherwise)
    pub fn failures(&self) -> &[StopFailure] {
        match self {
            ServiceError::PartialTeardown(failures) => failures,
            _ => &[],
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::InvalidRequest(reason) => write!(f, "Invalid request: {}", reason),
            ServiceError::Registry(err) => write!(f, "{}", err),
            ServiceError::PartialTeardown(failures) => {
                write!(f, "{} relay(s) failed to stop", failures.len())?;
                for (i, failure) in failures.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { "; " };
                    write!(f, "{}{}", sep, failure)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Registry(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RegistryError> for ServiceError {
    fn from(err: RegistryError) -> Self {
        ServiceError::Registry(err)
    }
}
