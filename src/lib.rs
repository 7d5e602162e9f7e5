//! stream-relay: control plane for named stream relays
//!
//! Each stream pulls one source URL through an ffmpeg child process and
//! re-emits the MPEG-TS byte stream to WebSocket clients on a dedicated port.
//! This crate owns the registry of those streams: port allocation, name
//! uniqueness, and start/stop coordination of the relay workers.
//!
//! ```text
//!   HTTP (axum) ──► StreamService ──► StreamRegistry<W: RelayWorker>
//!                    validation        ├─ Mutex<{ name → slot, PortAllocator }>
//!                    status mapping    └─ W::start / W::stop (outside the lock)
//! ```

pub mod allocator;
pub mod config;
pub mod http;
pub mod registry;
pub mod relay;
pub mod service;

pub use allocator::{AllocError, AllocationPolicy, Endpoint, PortAllocator};
pub use config::ServiceConfig;
pub use registry::{RegistryConfig, RegistryError, StreamInfo, StreamRegistry};
pub use relay::{FfmpegRelay, MemoryRelay, RelayOptions, RelaySpec, RelayWorker, WorkerError};
pub use service::{ServiceError, StreamService};
