//! Stream registry implementation
//!
//! The central registry that owns every stream's name, endpoint and relay
//! handle, and coordinates worker start/stop around them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::Mutex;

use super::config::RegistryConfig;
use super::entry::{RegistryStats, Slot, StreamEntry, StreamInfo};
use super::error::{RegistryError, StopFailure};
use crate::allocator::{Endpoint, PortAllocator};
use crate::relay::{RelayOptions, RelaySpec, RelayWorker, WorkerError};

/// Everything guarded by the registry lock
struct RegistryState<H> {
    slots: HashMap<String, Slot<H>>,
    allocator: Box<dyn PortAllocator>,
}

impl<H> RegistryState<H> {
    /// Give back an endpoint, dropping the name's unfinished claim if it still holds it
    fn return_reservation(&mut self, claimed: Option<&str>, endpoint: Endpoint) {
        if let Some(name) = claimed {
            if matches!(self.slots.get(name), Some(Slot::Starting(held)) if *held == endpoint) {
                self.slots.remove(name);
            }
        }
        self.allocator.release(endpoint);
    }

    fn take_active(&mut self, name: &str) -> Option<StreamEntry<H>> {
        if !matches!(self.slots.get(name), Some(Slot::Active(_))) {
            return None;
        }
        match self.slots.remove(name) {
            Some(Slot::Active(entry)) => Some(entry),
            _ => None,
        }
    }
}

/// An endpoint held outside the lock while a worker runs
///
/// Dropping it without `commit` returns the endpoint (and the name claim, if
/// any) to the registry, so a create or destroy future that is cancelled
/// midway still leaves the bookkeeping consistent.
struct Reservation<'a, H> {
    state: &'a Mutex<RegistryState<H>>,
    endpoint: Endpoint,
    claimed: Option<&'a str>,
    armed: bool,
}

impl<'a, H> Reservation<'a, H> {
    /// Turn the claim into an active entry
    fn commit(mut self, entry: StreamEntry<H>) {
        self.armed = false;
        self.state
            .lock()
            .slots
            .insert(entry.name.clone(), Slot::Active(entry));
    }

    /// Undo the reservation
    fn release(mut self) {
        self.armed = false;
        self.state
            .lock()
            .return_reservation(self.claimed, self.endpoint);
    }
}

impl<H> Drop for Reservation<'_, H> {
    fn drop(&mut self) {
        if self.armed {
            self.state
                .lock()
                .return_reservation(self.claimed, self.endpoint);
        }
    }
}

#[derive(Default)]
struct Counters {
    created: AtomicU64,
    destroyed: AtomicU64,
    start_failures: AtomicU64,
    stop_failures: AtomicU64,
}

/// Central registry for all streams
///
/// One mutex guards both the name map and the endpoint allocator. It is only
/// held for bookkeeping and never across a worker call: `create` claims the
/// name and reserves an endpoint, releases the lock while the worker starts,
/// then re-locks to commit or roll back.
pub struct StreamRegistry<W: RelayWorker> {
    state: Mutex<RegistryState<W::Handle>>,
    worker: W,
    config: RegistryConfig,
    counters: Counters,
}

impl<W: RelayWorker> StreamRegistry<W> {
    /// Create a new registry with default configuration
    pub fn new(worker: W) -> Self {
        Self::with_config(worker, RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(worker: W, config: RegistryConfig) -> Self {
        let allocator = config.allocation.build(config.base_port, config.port_limit);

        Self {
            state: Mutex::new(RegistryState {
                slots: HashMap::new(),
                allocator,
            }),
            worker,
            config,
            counters: Counters::default(),
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Get the relay worker
    pub fn worker(&self) -> &W {
        &self.worker
    }

    /// Start a relay for `name` and register it
    ///
    /// Fails with `DuplicateName` if the name is active or another create for
    /// it is in flight. On any failure after the endpoint is reserved, the
    /// endpoint is released and the name stays absent.
    pub async fn create(
        &self,
        name: &str,
        source_url: &str,
        options: RelayOptions,
    ) -> Result<Endpoint, RegistryError> {
        let reservation = self.claim(name)?;
        let endpoint = reservation.endpoint;

        tracing::debug!(stream = %name, endpoint = %endpoint, "Starting relay");

        let spec = RelaySpec {
            name: name.to_string(),
            source_url: source_url.to_string(),
            endpoint,
            options,
        };

        match self.start_worker(spec).await {
            Ok(handle) => {
                reservation.commit(StreamEntry::new(
                    name.to_string(),
                    endpoint,
                    source_url.to_string(),
                    handle,
                ));
                self.counters.created.fetch_add(1, Ordering::Relaxed);

                tracing::info!(
                    stream = %name,
                    endpoint = %endpoint,
                    url = %source_url,
                    "Stream created"
                );
                Ok(endpoint)
            }
            Err(cause) => {
                reservation.release();
                self.counters.start_failures.fetch_add(1, Ordering::Relaxed);

                tracing::warn!(
                    stream = %name,
                    endpoint = %endpoint,
                    error = %cause,
                    "Relay failed to start, endpoint released"
                );
                Err(RegistryError::WorkerStartFailed {
                    name: name.to_string(),
                    cause,
                })
            }
        }
    }

    /// Stop a stream's relay and remove it
    ///
    /// The entry disappears from lookups before the worker is stopped. The
    /// endpoint is released whether or not the stop succeeds; a stop failure
    /// is reported as `WorkerStopFailed` but the entry is not restored.
    pub async fn destroy(&self, name: &str) -> Result<(), RegistryError> {
        let entry = self
            .state
            .lock()
            .take_active(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        let StreamEntry {
            endpoint, handle, ..
        } = entry;
        let lease = self.hold(endpoint);
        let result = self.stop_worker(handle).await;
        lease.release();

        self.counters.destroyed.fetch_add(1, Ordering::Relaxed);

        match result {
            Ok(()) => {
                tracing::info!(stream = %name, endpoint = %endpoint, "Stream destroyed");
                Ok(())
            }
            Err(cause) => {
                self.counters.stop_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    stream = %name,
                    endpoint = %endpoint,
                    error = %cause,
                    "Relay failed to stop, stream removed anyway"
                );
                Err(RegistryError::WorkerStopFailed {
                    name: name.to_string(),
                    cause,
                })
            }
        }
    }

    /// Stop and remove every active stream
    ///
    /// All relays are stopped concurrently; one stuck relay does not hold up
    /// the others. Every entry is removed and every endpoint released, and the
    /// streams whose stop failed are returned.
    pub async fn destroy_all(&self) -> Vec<StopFailure> {
        let entries: Vec<StreamEntry<W::Handle>> = {
            let mut state = self.state.lock();
            let names: Vec<String> = state
                .slots
                .iter()
                .filter(|(_, slot)| slot.active().is_some())
                .map(|(name, _)| name.clone())
                .collect();
            names
                .iter()
                .filter_map(|name| state.take_active(name))
                .collect()
        };

        if entries.is_empty() {
            return Vec::new();
        }

        let total = entries.len();
        let stops = entries.into_iter().map(|entry| async move {
            let StreamEntry {
                name,
                endpoint,
                handle,
                ..
            } = entry;
            let lease = self.hold(endpoint);
            let result = self.stop_worker(handle).await;
            lease.release();
            (name, endpoint, result)
        });

        let mut failures = Vec::new();
        for (name, endpoint, result) in join_all(stops).await {
            self.counters.destroyed.fetch_add(1, Ordering::Relaxed);
            if let Err(cause) = result {
                self.counters.stop_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(stream = %name, endpoint = %endpoint, error = %cause, "Relay failed to stop");
                failures.push(StopFailure {
                    name,
                    endpoint,
                    cause,
                });
            }
        }
        failures.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::info!(
            streams = total,
            failed = failures.len(),
            "All streams destroyed"
        );

        failures
    }

    /// Snapshot of all active streams, sorted by name
    pub fn list(&self) -> Vec<StreamInfo> {
        let mut streams: Vec<StreamInfo> = self
            .state
            .lock()
            .slots
            .values()
            .filter_map(Slot::active)
            .map(StreamEntry::info)
            .collect();
        streams.sort_by(|a, b| a.name.cmp(&b.name));
        streams
    }

    /// Look up one active stream
    pub fn get(&self, name: &str) -> Option<StreamInfo> {
        self.state
            .lock()
            .slots
            .get(name)
            .and_then(Slot::active)
            .map(StreamEntry::info)
    }

    /// Check if an active stream with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of active streams
    pub fn stream_count(&self) -> usize {
        self.state
            .lock()
            .slots
            .values()
            .filter(|slot| slot.active().is_some())
            .count()
    }

    /// Registry counters
    pub fn stats(&self) -> RegistryStats {
        let state = self.state.lock();
        let active_streams = state
            .slots
            .values()
            .filter(|slot| slot.active().is_some())
            .count();

        RegistryStats {
            active_streams,
            pending_creates: state.slots.len() - active_streams,
            endpoints_in_use: state.allocator.in_use(),
            streams_created: self.counters.created.load(Ordering::Relaxed),
            streams_destroyed: self.counters.destroyed.load(Ordering::Relaxed),
            start_failures: self.counters.start_failures.load(Ordering::Relaxed),
            stop_failures: self.counters.stop_failures.load(Ordering::Relaxed),
        }
    }

    /// Claim `name` and reserve an endpoint for it in one lock acquisition
    fn claim<'a>(&'a self, name: &'a str) -> Result<Reservation<'a, W::Handle>, RegistryError> {
        let mut state = self.state.lock();

        if state.slots.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }

        let endpoint = state.allocator.reserve().map_err(|err| {
            tracing::error!(stream = %name, error = %err, "No endpoint available");
            RegistryError::from(err)
        })?;
        debug_assert!(
            state.slots.values().all(|slot| slot.endpoint() != endpoint),
            "allocator issued an endpoint that is still held"
        );
        state
            .slots
            .insert(name.to_string(), Slot::Starting(endpoint));

        Ok(Reservation {
            state: &self.state,
            endpoint,
            claimed: Some(name),
            armed: true,
        })
    }

    /// Keep `endpoint` reserved until the returned lease is released or dropped
    fn hold(&self, endpoint: Endpoint) -> Reservation<'_, W::Handle> {
        Reservation {
            state: &self.state,
            endpoint,
            claimed: None,
            armed: true,
        }
    }

    async fn start_worker(&self, spec: RelaySpec) -> Result<W::Handle, WorkerError> {
        match self.config.start_timeout {
            Some(limit) => tokio::time::timeout(limit, self.worker.start(spec))
                .await
                .unwrap_or_else(|_| Err(timed_out("start", limit))),
            None => self.worker.start(spec).await,
        }
    }

    async fn stop_worker(&self, handle: W::Handle) -> Result<(), WorkerError> {
        match self.config.stop_timeout {
            Some(limit) => tokio::time::timeout(limit, self.worker.stop(handle))
                .await
                .unwrap_or_else(|_| Err(timed_out("stop", limit))),
            None => self.worker.stop(handle).await,
        }
    }
}

fn timed_out(what: &str, limit: Duration) -> WorkerError {
    WorkerError::new(format!("relay {} timed out after {:?}", what, limit))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::allocator::AllocationPolicy;
    use crate::relay::MemoryRelay;

    const URL: &str = "rtsp://camera.local/stream1";

    fn registry(relay: &MemoryRelay) -> StreamRegistry<MemoryRelay> {
        StreamRegistry::new(relay.clone())
    }

    fn free_list_registry(relay: &MemoryRelay) -> StreamRegistry<MemoryRelay> {
        StreamRegistry::with_config(
            relay.clone(),
            RegistryConfig::default().allocation(AllocationPolicy::FreeList),
        )
    }

    async fn create(registry: &StreamRegistry<MemoryRelay>, name: &str) -> Endpoint {
        registry
            .create(name, URL, RelayOptions::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_matches_survivors() {
        let relay = MemoryRelay::new();
        let registry = registry(&relay);

        for name in ["a", "b", "c", "d", "e"] {
            create(&registry, name).await;
        }
        registry.destroy("b").await.unwrap();
        registry.destroy("d").await.unwrap();
        create(&registry, "f").await;

        let streams = registry.list();
        let names: Vec<&str> = streams.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "e", "f"]);

        let endpoints: HashSet<Endpoint> = streams.iter().map(|s| s.endpoint).collect();
        assert_eq!(endpoints.len(), 4);
        assert_eq!(relay.running_count(), 4);
        assert_eq!(registry.stats().endpoints_in_use, 4);
    }

    #[tokio::test]
    async fn test_concurrent_create_same_name() {
        let relay = MemoryRelay::new().with_start_delay(Duration::from_millis(50));
        let registry = registry(&relay);

        let (first, second) = tokio::join!(
            registry.create("s1", URL, RelayOptions::default()),
            registry.create("s1", "rtsp://other/stream", RelayOptions::default()),
        );

        let (ok, err) = match (first, second) {
            (Ok(endpoint), Err(err)) | (Err(err), Ok(endpoint)) => (endpoint, err),
            other => panic!("expected exactly one success, got {:?}", other),
        };
        assert_eq!(err, RegistryError::DuplicateName("s1".to_string()));
        assert_eq!(relay.start_count(), 1);
        assert_eq!(registry.stats().endpoints_in_use, 1);
        assert_eq!(registry.get("s1").unwrap().endpoint, ok);

        // Only one endpoint was consumed by the pair of creates
        let next = create(&registry, "s2").await;
        assert_eq!(next.port(), ok.port() + 1);
    }

    #[tokio::test]
    async fn test_concurrent_create_across_tasks() {
        let relay = MemoryRelay::new().with_start_delay(Duration::from_millis(20));
        let registry = Arc::new(registry(&relay));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    registry
                        .create("shared", URL, RelayOptions::default())
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => successes += 1,
                Err(err) => assert_eq!(err, RegistryError::DuplicateName("shared".to_string())),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(relay.start_count(), 1);
        assert_eq!(registry.stats().endpoints_in_use, 1);
    }

    #[tokio::test]
    async fn test_duplicate_keeps_original_entry() {
        let relay = MemoryRelay::new();
        let registry = registry(&relay);

        let original = create(&registry, "s1").await;
        let result = registry
            .create("s1", "rtsp://elsewhere/cam", RelayOptions::default())
            .await;
        assert_eq!(result, Err(RegistryError::DuplicateName("s1".to_string())));

        let streams = registry.list();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].endpoint, original);
        assert_eq!(streams[0].source_url, URL);
    }

    #[tokio::test]
    async fn test_destroy_missing() {
        let registry = registry(&MemoryRelay::new());

        assert_eq!(
            registry.destroy("ghost").await,
            Err(RegistryError::NotFound("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn test_start_failure_rolls_back() {
        let relay = MemoryRelay::new();
        relay.fail_start_for("rtsp://bad");
        let registry = free_list_registry(&relay);

        let result = registry
            .create("s2", "rtsp://bad", RelayOptions::default())
            .await;
        assert!(matches!(
            result,
            Err(RegistryError::WorkerStartFailed { ref name, .. }) if name == "s2"
        ));
        assert!(!registry.contains("s2"));

        let stats = registry.stats();
        assert_eq!(stats.endpoints_in_use, 0);
        assert_eq!(stats.pending_creates, 0);
        assert_eq!(stats.start_failures, 1);

        // The endpoint reserved for the failed attempt is reused
        let endpoint = create(&registry, "s2").await;
        assert_eq!(endpoint.port(), 9999);
    }

    #[tokio::test]
    async fn test_start_failure_monotonic_releases() {
        let relay = MemoryRelay::new();
        relay.fail_start_for("rtsp://bad");
        let registry = registry(&relay);

        assert_err!(
            registry
                .create("s2", "rtsp://bad", RelayOptions::default())
                .await
        );
        assert_eq!(registry.stats().endpoints_in_use, 0);

        // Monotonic policy moves on, but the name is free again
        let endpoint = create(&registry, "s2").await;
        assert_eq!(endpoint.port(), 10000);
    }

    #[tokio::test]
    async fn test_destroy_all_with_stop_failure() {
        let relay = MemoryRelay::new();
        relay.fail_stop_for("b");
        let registry = free_list_registry(&relay);

        for name in ["a", "b", "c"] {
            create(&registry, name).await;
        }
        let b_endpoint = registry.get("b").unwrap().endpoint;

        let failures = registry.destroy_all().await;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "b");
        assert_eq!(failures[0].endpoint, b_endpoint);

        // Failed entries are force-removed along with the rest
        assert_eq!(registry.stream_count(), 0);
        assert!(registry.list().is_empty());

        let stats = registry.stats();
        assert_eq!(stats.endpoints_in_use, 0);
        assert_eq!(stats.streams_destroyed, 3);
        assert_eq!(stats.stop_failures, 1);
        assert_eq!(relay.running_count(), 0);
    }

    #[tokio::test]
    async fn test_destroy_all_empty() {
        let registry = registry(&MemoryRelay::new());
        assert!(registry.destroy_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_destroy_stop_failure_releases_endpoint() {
        let relay = MemoryRelay::new();
        relay.fail_stop_for("stuck");
        let registry = free_list_registry(&relay);

        let endpoint = create(&registry, "stuck").await;
        let result = registry.destroy("stuck").await;
        assert!(matches!(
            result,
            Err(RegistryError::WorkerStopFailed { ref name, .. }) if name == "stuck"
        ));
        assert!(!registry.contains("stuck"));

        let reused = create(&registry, "next").await;
        assert_eq!(reused, endpoint);
    }

    #[tokio::test]
    async fn test_stop_timeout_releases_endpoint() {
        let relay = MemoryRelay::new();
        let registry = StreamRegistry::with_config(
            relay.clone(),
            RegistryConfig::default()
                .allocation(AllocationPolicy::FreeList)
                .stop_timeout(Duration::from_millis(20)),
        );

        let endpoint = create(&registry, "cam").await;
        relay.set_stop_delay(Duration::from_secs(30));

        match registry.destroy("cam").await {
            Err(RegistryError::WorkerStopFailed { name, cause }) => {
                assert_eq!(name, "cam");
                assert!(cause.message().contains("timed out"));
            }
            other => panic!("expected stop failure, got {:?}", other),
        }
        assert!(!registry.contains("cam"));
        assert_eq!(registry.stats().endpoints_in_use, 0);
        assert_eq!(registry.stats().stop_failures, 1);

        relay.set_stop_delay(Duration::ZERO);
        assert_eq!(create(&registry, "next").await, endpoint);
    }

    #[tokio::test]
    async fn test_cancelled_destroy_releases_endpoint() {
        let relay = MemoryRelay::new();
        let registry = free_list_registry(&relay);

        let endpoint = create(&registry, "cam").await;
        relay.set_stop_delay(Duration::from_secs(30));

        let attempt =
            tokio::time::timeout(Duration::from_millis(20), registry.destroy("cam")).await;
        assert!(attempt.is_err());

        assert!(!registry.contains("cam"));
        assert_eq!(registry.stats().endpoints_in_use, 0);

        relay.set_stop_delay(Duration::ZERO);
        assert_eq!(create(&registry, "next").await, endpoint);
    }

    #[tokio::test]
    async fn test_endpoints_strictly_increase() {
        let registry = registry(&MemoryRelay::new());

        let mut last = create(&registry, "s0").await;
        for i in 1..20 {
            let name = format!("s{}", i);
            let endpoint = create(&registry, &name).await;
            assert!(endpoint > last);
            last = endpoint;

            if i % 3 == 0 {
                registry.destroy(&name).await.unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_endpoint_space_exhausted() {
        let relay = MemoryRelay::new();
        let registry = StreamRegistry::with_config(
            relay.clone(),
            RegistryConfig::default().port_range(30000, 30000),
        );

        create(&registry, "only").await;
        let result = registry
            .create("extra", URL, RelayOptions::default())
            .await;
        assert!(matches!(
            result,
            Err(RegistryError::EndpointSpaceExhausted(_))
        ));
        assert!(!registry.contains("extra"));
        assert_eq!(registry.stats().pending_creates, 0);
        assert_eq!(relay.start_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_create_rolls_back() {
        let relay = MemoryRelay::new().with_start_delay(Duration::from_secs(30));
        let registry = registry(&relay);

        let attempt = tokio::time::timeout(
            Duration::from_millis(20),
            registry.create("cam", URL, RelayOptions::default()),
        )
        .await;
        assert!(attempt.is_err());

        let stats = registry.stats();
        assert_eq!(stats.pending_creates, 0);
        assert_eq!(stats.endpoints_in_use, 0);

        relay.set_start_delay(Duration::ZERO);
        assert_ok!(registry.create("cam", URL, RelayOptions::default()).await);
    }

    #[tokio::test]
    async fn test_start_timeout_rolls_back() {
        let relay = MemoryRelay::new().with_start_delay(Duration::from_secs(30));
        let registry = StreamRegistry::with_config(
            relay.clone(),
            RegistryConfig::default().start_timeout(Duration::from_millis(20)),
        );

        let result = registry.create("cam", URL, RelayOptions::default()).await;
        match result {
            Err(RegistryError::WorkerStartFailed { cause, .. }) => {
                assert!(cause.message().contains("timed out"));
            }
            other => panic!("expected start failure, got {:?}", other),
        }
        assert!(!registry.contains("cam"));
        assert_eq!(registry.stats().endpoints_in_use, 0);
    }

    #[tokio::test]
    async fn test_starting_stream_is_invisible() {
        let relay = MemoryRelay::new().with_start_delay(Duration::from_millis(50));
        let registry = registry(&relay);

        let create = registry.create("slow", URL, RelayOptions::default());
        let observe = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(registry.list().is_empty());
            assert_eq!(registry.stats().pending_creates, 1);
            registry.destroy("slow").await
        };

        let (created, destroyed) = tokio::join!(create, observe);
        assert_ok!(created);
        assert_eq!(destroyed, Err(RegistryError::NotFound("slow".to_string())));
        assert!(registry.contains("slow"));
    }

    #[tokio::test]
    async fn test_stats_counters() {
        let relay = MemoryRelay::new();
        relay.fail_start_for("rtsp://bad");
        let registry = registry(&relay);

        create(&registry, "a").await;
        create(&registry, "b").await;
        let _ = registry
            .create("c", "rtsp://bad", RelayOptions::default())
            .await;
        registry.destroy("a").await.unwrap();

        let stats = registry.stats();
        assert_eq!(stats.active_streams, 1);
        assert_eq!(stats.streams_created, 2);
        assert_eq!(stats.streams_destroyed, 1);
        assert_eq!(stats.start_failures, 1);
        assert_eq!(stats.stop_failures, 0);
        assert_eq!(stats.endpoints_in_use, 1);
    }

    #[tokio::test]
    async fn test_options_pass_through() {
        let relay = MemoryRelay::new();
        let registry = registry(&relay);

        let options = RelayOptions::default().frame_rate(15).quality(8);
        registry.create("cam", URL, options.clone()).await.unwrap();

        let running = relay.running();
        assert_eq!(running.len(), 1);
        assert_eq!(running[0].options, options);
        assert_eq!(running[0].source_url, URL);
        assert_eq!(running[0].endpoint.port(), 9999);
    }
}
