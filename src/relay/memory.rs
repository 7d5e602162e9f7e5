//! In-memory relay worker
//!
//! Runs nothing; it records which relays are "running" and can be told to
//! fail specific starts or stops. Used to drive the registry without ffmpeg.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{RelaySpec, RelayWorker, WorkerError};
use crate::allocator::Endpoint;

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u64,
    running: HashMap<u64, RelaySpec>,
    starts: u64,
    stopped: Vec<String>,
    fail_start_urls: HashSet<String>,
    fail_stop_names: HashSet<String>,
    start_delay: Duration,
    stop_delay: Duration,
}

/// Fake relay worker
#[derive(Debug, Clone, Default)]
pub struct MemoryRelay {
    state: Arc<Mutex<MemoryState>>,
}

/// Handle to a fake relay
#[derive(Debug)]
pub struct MemoryHandle {
    id: u64,
    name: String,
    endpoint: Endpoint,
}

impl MemoryHandle {
    /// Endpoint the relay was started on
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }
}

impl MemoryRelay {
    /// Create a worker with no delays or injected failures
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every `start` by `delay`
    pub fn with_start_delay(self, delay: Duration) -> Self {
        self.set_start_delay(delay);
        self
    }

    /// Change the start delay (shared by all clones)
    pub fn set_start_delay(&self, delay: Duration) {
        self.state.lock().start_delay = delay;
    }

    /// Delay every `stop` by `delay`
    pub fn with_stop_delay(self, delay: Duration) -> Self {
        self.set_stop_delay(delay);
        self
    }

    /// Change the stop delay (shared by all clones)
    pub fn set_stop_delay(&self, delay: Duration) {
        self.state.lock().stop_delay = delay;
    }

    /// Make `start` fail for this source URL
    pub fn fail_start_for(&self, url: impl Into<String>) {
        self.state.lock().fail_start_urls.insert(url.into());
    }

    /// Make `stop` fail for this stream name
    pub fn fail_stop_for(&self, name: impl Into<String>) {
        self.state.lock().fail_stop_names.insert(name.into());
    }

    /// Specs of all running relays, sorted by name
    pub fn running(&self) -> Vec<RelaySpec> {
        let mut running: Vec<RelaySpec> = self.state.lock().running.values().cloned().collect();
        running.sort_by(|a, b| a.name.cmp(&b.name));
        running
    }

    /// Number of running relays
    pub fn running_count(&self) -> usize {
        self.state.lock().running.len()
    }

    /// Number of successful starts so far
    pub fn start_count(&self) -> u64 {
        self.state.lock().starts
    }

    /// Names passed to `stop`, in call order
    pub fn stopped(&self) -> Vec<String> {
        self.state.lock().stopped.clone()
    }
}

impl RelayWorker for MemoryRelay {
    type Handle = MemoryHandle;

    async fn start(&self, spec: RelaySpec) -> Result<MemoryHandle, WorkerError> {
        let delay = self.state.lock().start_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        if state.fail_start_urls.contains(&spec.source_url) {
            return Err(WorkerError::new(format!(
                "cannot open source {}",
                spec.source_url
            )));
        }

        state.next_id += 1;
        state.starts += 1;
        let handle = MemoryHandle {
            id: state.next_id,
            name: spec.name.clone(),
            endpoint: spec.endpoint,
        };
        state.running.insert(handle.id, spec);

        Ok(handle)
    }

    async fn stop(&self, handle: MemoryHandle) -> Result<(), WorkerError> {
        let delay = self.state.lock().stop_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();

        // The handle is inert afterwards either way
        state.running.remove(&handle.id);
        state.stopped.push(handle.name.clone());

        if state.fail_stop_names.contains(&handle.name) {
            return Err(WorkerError::new(format!(
                "relay {} did not terminate",
                handle.name
            )));
        }

        Ok(())
    }
}
