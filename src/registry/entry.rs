//! Stream entry and slot types
//!
//! This module defines the per-stream state stored in the registry.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::allocator::Endpoint;

/// Entry for a single active stream
pub struct StreamEntry<H> {
    /// Stream name
    pub name: String,

    /// Relay endpoint owned by this stream
    pub endpoint: Endpoint,

    /// Source URL the relay reads from
    pub source_url: String,

    /// When the relay finished starting
    pub created_at: Instant,

    /// Worker handle (opaque to the registry)
    pub(super) handle: H,
}

impl<H> StreamEntry<H> {
    pub(super) fn new(name: String, endpoint: Endpoint, source_url: String, handle: H) -> Self {
        Self {
            name,
            endpoint,
            source_url,
            created_at: Instant::now(),
            handle,
        }
    }

    /// Public view of this entry
    pub fn info(&self) -> StreamInfo {
        StreamInfo {
            name: self.name.clone(),
            endpoint: self.endpoint,
            source_url: self.source_url.clone(),
            uptime: self.created_at.elapsed(),
        }
    }
}

/// A name's slot in the registry
pub(super) enum Slot<H> {
    /// Name claimed by an in-flight create; invisible to lookups
    Starting(Endpoint),
    /// Relay running
    Active(StreamEntry<H>),
}

impl<H> Slot<H> {
    pub(super) fn endpoint(&self) -> Endpoint {
        match self {
            Slot::Starting(endpoint) => *endpoint,
            Slot::Active(entry) => entry.endpoint,
        }
    }

    pub(super) fn active(&self) -> Option<&StreamEntry<H>> {
        match self {
            Slot::Active(entry) => Some(entry),
            Slot::Starting(_) => None,
        }
    }
}

/// Point-in-time view of an active stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// Stream name
    pub name: String,
    /// Relay endpoint
    pub endpoint: Endpoint,
    /// Source URL
    pub source_url: String,
    /// Time since the relay started
    pub uptime: Duration,
}

/// Registry counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Streams currently active
    pub active_streams: usize,
    /// Creates currently starting a worker
    pub pending_creates: usize,
    /// Endpoints the allocator considers in use
    pub endpoints_in_use: usize,
    /// Successful creates since startup
    pub streams_created: u64,
    /// Streams removed since startup (including force-removed)
    pub streams_destroyed: u64,
    /// Creates that failed in the worker
    pub start_failures: u64,
    /// Stops that failed in the worker
    pub stop_failures: u64,
}
