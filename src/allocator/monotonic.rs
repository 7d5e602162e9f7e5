//! Forward-only endpoint counter

use std::collections::HashSet;

use super::{AllocError, Endpoint, PortAllocator};

/// Allocator that never reuses an endpoint
///
/// Endpoints are issued from a counter that starts at `base` and only moves
/// forward. Released endpoints are forgotten, not recycled, so after
/// `limit - base + 1` reservations every further `reserve()` fails with
/// [`AllocError::Exhausted`] until the process restarts.
#[derive(Debug)]
pub struct MonotonicAllocator {
    base: u16,
    limit: u16,
    // u32 so the cursor can step past u16::MAX without wrapping
    next: u32,
    reserved: HashSet<u16>,
}

impl MonotonicAllocator {
    /// Create an allocator over `[base, limit]`
    pub fn new(base: u16, limit: u16) -> Self {
        Self {
            base,
            limit,
            next: u32::from(base),
            reserved: HashSet::new(),
        }
    }

    /// The next endpoint that `reserve()` would return, if any
    pub fn peek(&self) -> Option<Endpoint> {
        if self.next > u32::from(self.limit) {
            None
        } else {
            u16::try_from(self.next).ok().map(Endpoint::new)
        }
    }

    /// Number of endpoints this allocator can still issue
    pub fn remaining(&self) -> u32 {
        (u32::from(self.limit) + 1).saturating_sub(self.next)
    }
}

impl PortAllocator for MonotonicAllocator {
    fn reserve(&mut self) -> Result<Endpoint, AllocError> {
        let endpoint = self.peek().ok_or(AllocError::Exhausted {
            base: self.base,
            limit: self.limit,
        })?;

        self.next += 1;
        self.reserved.insert(endpoint.port());
        Ok(endpoint)
    }

    fn release(&mut self, endpoint: Endpoint) {
        self.reserved.remove(&endpoint.port());
    }

    fn in_use(&self) -> usize {
        self.reserved.len()
    }
}
