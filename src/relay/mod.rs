//! Relay workers
//!
//! A relay worker reads one source stream and re-emits it on a dedicated
//! WebSocket endpoint. The registry only sees the narrow [`RelayWorker`]
//! contract: start with a [`RelaySpec`], get back an opaque handle, stop the
//! handle later.
//!
//! Implementations:
//! - [`FfmpegRelay`]: spawns `ffmpeg` and serves its MPEG-TS output to
//!   jsmpeg-compatible WebSocket clients
//! - [`MemoryRelay`]: in-process fake for exercising the registry

pub mod ffmpeg;
pub mod memory;
pub mod options;
pub mod websocket;

use std::future::Future;

use crate::allocator::Endpoint;

pub use ffmpeg::{FfmpegConfig, FfmpegRelay, RelayHandle};
pub use memory::MemoryRelay;
pub use options::RelayOptions;

/// Everything a worker needs to start one relay
#[derive(Debug, Clone, PartialEq)]
pub struct RelaySpec {
    /// Stream name (for logging)
    pub name: String,
    /// Source stream URL, passed to the worker untouched
    pub source_url: String,
    /// Port the relay must serve on
    pub endpoint: Endpoint,
    /// Transcoding parameters, passed through untouched
    pub options: RelayOptions,
}

/// Error raised by a relay worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerError {
    message: String,
}

impl WorkerError {
    /// Create an error from a human-readable cause
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Underlying cause
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for WorkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WorkerError {}

impl From<std::io::Error> for WorkerError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Lifecycle contract for relay workers
///
/// `start` must either return a running handle or fail without leaving
/// anything running. `stop` consumes the handle; the handle is inert
/// afterwards whether or not `stop` reported an error.
pub trait RelayWorker: Send + Sync + 'static {
    /// Opaque handle to a running relay
    type Handle: Send + 'static;

    /// Start a relay for `spec`
    fn start(
        &self,
        spec: RelaySpec,
    ) -> impl Future<Output = Result<Self::Handle, WorkerError>> + Send;

    /// Stop a running relay
    fn stop(&self, handle: Self::Handle) -> impl Future<Output = Result<(), WorkerError>> + Send;
}
