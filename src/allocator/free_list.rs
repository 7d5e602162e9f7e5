//! Reclaiming endpoint allocator

use std::collections::{BTreeSet, HashSet};

use super::{AllocError, Endpoint, PortAllocator};

/// Allocator that recycles released endpoints
///
/// Released endpoints go into a free set and are handed out again (lowest
/// first) before the cursor advances into untouched territory.
#[derive(Debug)]
pub struct FreeListAllocator {
    base: u16,
    limit: u16,
    next: u32,
    free: BTreeSet<u16>,
    reserved: HashSet<u16>,
}

impl FreeListAllocator {
    /// Create an allocator over `[base, limit]`
    pub fn new(base: u16, limit: u16) -> Self {
        Self {
            base,
            limit,
            next: u32::from(base),
            free: BTreeSet::new(),
            reserved: HashSet::new(),
        }
    }

    /// Number of released endpoints waiting to be reused
    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}

impl PortAllocator for FreeListAllocator {
    fn reserve(&mut self) -> Result<Endpoint, AllocError> {
        let port = if let Some(port) = self.free.pop_first() {
            port
        } else if self.next <= u32::from(self.limit) {
            let port = self.next as u16;
            self.next += 1;
            port
        } else {
            return Err(AllocError::Exhausted {
                base: self.base,
                limit: self.limit,
            });
        };

        self.reserved.insert(port);
        Ok(Endpoint::new(port))
    }

    fn release(&mut self, endpoint: Endpoint) {
        if self.reserved.remove(&endpoint.port()) {
            self.free.insert(endpoint.port());
        }
    }

    fn in_use(&self) -> usize {
        self.reserved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_lowest_released() {
        let mut alloc = FreeListAllocator::new(9000, 9100);

        let a = alloc.reserve().unwrap();
        let b = alloc.reserve().unwrap();
        let c = alloc.reserve().unwrap();
        assert_eq!((a.port(), b.port(), c.port()), (9000, 9001, 9002));

        alloc.release(c);
        alloc.release(a);
        assert_eq!(alloc.free_count(), 2);

        assert_eq!(alloc.reserve().unwrap(), a);
        assert_eq!(alloc.reserve().unwrap(), c);
        assert_eq!(alloc.reserve().unwrap().port(), 9003);
    }

    #[test]
    fn test_never_issues_endpoint_in_use() {
        let mut alloc = FreeListAllocator::new(9000, 9003);
        let mut held = HashSet::new();

        for _ in 0..4 {
            assert!(held.insert(alloc.reserve().unwrap()));
        }
        assert!(alloc.reserve().is_err());

        let victim = Endpoint::new(9002);
        alloc.release(victim);
        held.remove(&victim);

        let again = alloc.reserve().unwrap();
        assert_eq!(again, victim);
        assert!(held.insert(again));
    }

    #[test]
    fn test_release_unreserved_is_noop() {
        let mut alloc = FreeListAllocator::new(9000, 9001);

        // Never issued: must not be put on the free list
        alloc.release(Endpoint::new(9001));
        assert_eq!(alloc.free_count(), 0);

        let a = alloc.reserve().unwrap();
        alloc.release(a);
        alloc.release(a);
        assert_eq!(alloc.free_count(), 1);
        assert_eq!(alloc.in_use(), 0);
    }

    #[test]
    fn test_exhaustion_only_when_all_in_use() {
        let mut alloc = FreeListAllocator::new(u16::MAX - 1, u16::MAX);

        let a = alloc.reserve().unwrap();
        let _b = alloc.reserve().unwrap();
        assert_eq!(
            alloc.reserve(),
            Err(AllocError::Exhausted {
                base: u16::MAX - 1,
                limit: u16::MAX
            })
        );

        alloc.release(a);
        assert_eq!(alloc.reserve().unwrap(), a);
    }
}
