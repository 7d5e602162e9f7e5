//! Registry configuration

use std::time::Duration;

use crate::allocator::AllocationPolicy;

/// Configuration for the stream registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// First endpoint handed out
    pub base_port: u16,

    /// Last endpoint that may be handed out
    pub port_limit: u16,

    /// Endpoint allocation strategy
    pub allocation: AllocationPolicy,

    /// Upper bound on a worker start (None = wait indefinitely)
    pub start_timeout: Option<Duration>,

    /// Upper bound on a worker stop (None = wait indefinitely)
    pub stop_timeout: Option<Duration>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_port: 9999,
            port_limit: u16::MAX,
            allocation: AllocationPolicy::Monotonic,
            start_timeout: None,
            stop_timeout: None,
        }
    }
}

impl RegistryConfig {
    /// Set the endpoint range
    pub fn port_range(mut self, base: u16, limit: u16) -> Self {
        self.base_port = base;
        self.port_limit = limit;
        self
    }

    /// Set the allocation strategy
    pub fn allocation(mut self, policy: AllocationPolicy) -> Self {
        self.allocation = policy;
        self
    }

    /// Bound worker starts
    pub fn start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = Some(timeout);
        self
    }

    /// Bound worker stops
    pub fn stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = Some(timeout);
        self
    }
}
