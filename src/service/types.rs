//! Request and response shapes of the facade operations

use serde::{Deserialize, Serialize};

use crate::allocator::Endpoint;
use crate::registry::StopFailure;

/// Body of a create request
///
/// Both fields are optional at the parsing level so that a missing field is
/// reported as an invalid request rather than a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateStreamRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl CreateStreamRequest {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
        }
    }
}

/// Result of a successful create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateStreamResponse {
    pub success: bool,
    pub name: String,
    pub endpoint: Endpoint,
    pub ws_url: String,
}

/// One active stream as shown to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    pub name: String,
    pub endpoint: Endpoint,
    pub ws_url: String,
    pub url: String,
    pub uptime_secs: u64,
}

/// Acknowledgement for destroy operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Per-stream failure detail in an error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureDetail {
    pub name: String,
    pub endpoint: Endpoint,
    pub error: String,
}

impl From<&StopFailure> for FailureDetail {
    fn from(failure: &StopFailure) -> Self {
        Self {
            name: failure.name.clone(),
            endpoint: failure.endpoint,
            error: failure.cause.to_string(),
        }
    }
}

/// Error body returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureDetail>,
}
