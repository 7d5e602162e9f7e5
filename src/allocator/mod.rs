//! Relay endpoint allocation
//!
//! Every stream gets its own outbound TCP port. Ports are drawn from a
//! configured range `[base, limit]` by a [`PortAllocator`]. Two policies are
//! provided:
//!
//! - [`MonotonicAllocator`]: a counter that only moves forward. A port is never
//!   handed out twice during the process lifetime, so a long-running service
//!   eventually exhausts the range even if streams are destroyed.
//! - [`FreeListAllocator`]: reclaims released ports and reuses the lowest one
//!   first. It is only exhausted when every port in the range is in use.
//!
//! Allocators are not synchronized themselves; the registry owns one behind
//! its lock.

pub mod free_list;
pub mod monotonic;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use free_list::FreeListAllocator;
pub use monotonic::MonotonicAllocator;

/// Outbound port assigned to a stream's relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(u16);

impl Endpoint {
    /// Wrap a port number
    pub const fn new(port: u16) -> Self {
        Self(port)
    }

    /// The port number
    pub const fn port(self) -> u16 {
        self.0
    }
}

impl From<u16> for Endpoint {
    fn from(port: u16) -> Self {
        Self(port)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for endpoint allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// No endpoint left in the configured range
    Exhausted {
        /// First endpoint of the range
        base: u16,
        /// Last endpoint of the range
        limit: u16,
    },
}

impl std::fmt::Display for AllocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocError::Exhausted { base, limit } => {
                write!(f, "Endpoint space exhausted (range {}-{})", base, limit)
            }
        }
    }
}

impl std::error::Error for AllocError {}

/// Hands out unique endpoints from a bounded range
pub trait PortAllocator: Send + Sync {
    /// Reserve a fresh endpoint
    fn reserve(&mut self) -> Result<Endpoint, AllocError>;

    /// Return an endpoint to the allocator
    ///
    /// Releasing an endpoint that is not currently reserved is a no-op.
    fn release(&mut self, endpoint: Endpoint);

    /// Number of endpoints currently reserved
    fn in_use(&self) -> usize;
}

/// Selects the allocation strategy used by the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AllocationPolicy {
    /// Never reuse endpoints
    #[default]
    Monotonic,
    /// Reuse released endpoints, lowest first
    FreeList,
}

impl AllocationPolicy {
    /// Build an allocator for the range `[base, limit]`
    pub fn build(self, base: u16, limit: u16) -> Box<dyn PortAllocator> {
        match self {
            AllocationPolicy::Monotonic => Box::new(MonotonicAllocator::new(base, limit)),
            AllocationPolicy::FreeList => Box::new(FreeListAllocator::new(base, limit)),
        }
    }

    /// Name used in configuration
    pub fn as_str(self) -> &'static str {
        match self {
            AllocationPolicy::Monotonic => "monotonic",
            AllocationPolicy::FreeList => "free-list",
        }
    }
}

impl FromStr for AllocationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monotonic" => Ok(AllocationPolicy::Monotonic),
            "free-list" | "freelist" | "free_list" => Ok(AllocationPolicy::FreeList),
            other => Err(format!("unknown allocation policy: {}", other)),
        }
    }
}

impl std::fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
