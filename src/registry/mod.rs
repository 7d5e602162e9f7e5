//! Stream registry
//!
//! The registry is the single owner of the name → stream mapping and of the
//! endpoint allocator. It enforces name uniqueness, allocates one endpoint
//! per stream, and drives the relay worker without ever holding its lock
//! across a worker call.
//!
//! # Architecture
//!
//! ```text
//!                       Arc<StreamRegistry<W>>
//!                 ┌──────────────────────────────┐
//!                 │ Mutex<{                      │
//!                 │   slots: HashMap<Name, Slot>,│
//!                 │   allocator: PortAllocator,  │
//!                 │ }>                           │
//!                 │ worker: W                    │
//!                 └──────────────┬───────────────┘
//!                                │
//!   create:  lock ─ claim name + reserve endpoint ─ unlock
//!            W::start(spec)                        (no lock held)
//!            lock ─ commit Active / roll back ──── unlock
//!
//!   destroy: lock ─ remove entry ─ unlock
//!            W::stop(handle)                       (no lock held)
//!            lock ─ release endpoint ───────────── unlock
//! ```
//!
//! # Per-name lifecycle
//!
//! `absent → starting → active → absent`. `starting` is internal: the name is
//! claimed (a second create gets `DuplicateName`) but the stream is not
//! listed and cannot be destroyed. A failed or cancelled create goes straight
//! back to `absent` with its endpoint released.
//!
//! # Stop failures
//!
//! A stream whose relay fails to stop is still removed and its endpoint
//! released; the failure is reported to the caller. This applies to both
//! `destroy` and `destroy_all`.

pub mod config;
pub mod entry;
pub mod error;
pub mod store;

pub use config::RegistryConfig;
pub use entry::{RegistryStats, StreamEntry, StreamInfo};
pub use error::{RegistryError, StopFailure};
pub use store::StreamRegistry;
