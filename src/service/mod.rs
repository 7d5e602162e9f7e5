//! Registry facade
//!
//! The operations the boundary layer calls: create, destroy, destroy-all,
//! list (plus get and stats). Input is validated here before the registry
//! is touched, and every error carries a stable kind and a status.

pub mod error;
pub mod types;

use std::sync::Arc;

pub use error::ServiceError;
pub use types::{
    Ack, CreateStreamRequest, CreateStreamResponse, ErrorBody, FailureDetail, StreamSummary,
};

use crate::allocator::Endpoint;
use crate::registry::{RegistryStats, StreamInfo, StreamRegistry};
use crate::relay::{RelayOptions, RelayWorker};

/// Longest accepted stream name, in bytes
pub const MAX_NAME_LEN: usize = 128;

/// Facade over a [`StreamRegistry`]
pub struct StreamService<W: RelayWorker> {
    registry: Arc<StreamRegistry<W>>,
    public_host: String,
    options: RelayOptions,
}

impl<W: RelayWorker> StreamService<W> {
    pub fn new(registry: Arc<StreamRegistry<W>>) -> Self {
        Self {
            registry,
            public_host: "localhost".to_string(),
            options: RelayOptions::default(),
        }
    }

    /// Host used when building WebSocket URLs for callers
    pub fn public_host(mut self, host: impl Into<String>) -> Self {
        self.public_host = host.into();
        self
    }

    /// Transcoding options applied to every new stream
    pub fn relay_options(mut self, options: RelayOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<StreamRegistry<W>> {
        &self.registry
    }

    /// WebSocket URL clients use to watch a relay
    pub fn ws_url(&self, endpoint: Endpoint) -> String {
        format!("ws://{}:{}", self.public_host, endpoint)
    }

    pub async fn create_stream(
        &self,
        request: CreateStreamRequest,
    ) -> Result<CreateStreamResponse, ServiceError> {
        let name = validate_name(request.name.as_deref())?;
        let url = validate_url(request.url.as_deref())?;

        let endpoint = self
            .registry
            .create(name, url, self.options.clone())
            .await?;

        Ok(CreateStreamResponse {
            success: true,
            name: name.to_string(),
            endpoint,
            ws_url: self.ws_url(endpoint),
        })
    }

    pub async fn destroy_stream(&self, name: &str) -> Result<Ack, ServiceError> {
        let name = validate_name(Some(name))?;
        self.registry.destroy(name).await?;
        Ok(Ack::ok())
    }

    pub fn get_stream(&self, name: &str) -> Result<StreamSummary, ServiceError> {
        self.registry
            .get(name.trim())
            .map(|info| self.summary(info))
            .ok_or_else(|| crate::registry::RegistryError::NotFound(name.to_string()).into())
    }

    pub fn list_streams(&self) -> Vec<StreamSummary> {
        self.registry
            .list()
            .into_iter()
            .map(|info| self.summary(info))
            .collect()
    }

    /// Tear down every stream
    ///
    /// All streams are removed even when some relays fail to stop; those
    /// failures come back as `PartialTeardown`.
    pub async fn destroy_all(&self) -> Result<Ack, ServiceError> {
        let failures = self.registry.destroy_all().await;
        if failures.is_empty() {
            Ok(Ack::ok())
        } else {
            Err(ServiceError::PartialTeardown(failures))
        }
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    fn summary(&self, info: StreamInfo) -> StreamSummary {
        StreamSummary {
            ws_url: self.ws_url(info.endpoint),
            name: info.name,
            endpoint: info.endpoint,
            url: info.source_url,
            uptime_secs: info.uptime.as_secs(),
        }
    }
}

fn validate_name(name: Option<&str>) -> Result<&str, ServiceError> {
    let name = name.unwrap_or_default().trim();

    if name.is_empty() {
        return Err(ServiceError::InvalidRequest("name is required".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ServiceError::InvalidRequest(format!(
            "name is longer than {} bytes",
            MAX_NAME_LEN
        )));
    }
    if name.chars().any(|c| c.is_control() || c == '/') {
        return Err(ServiceError::InvalidRequest(
            "name must not contain '/' or control characters".into(),
        ));
    }

    Ok(name)
}

fn validate_url(url: Option<&str>) -> Result<&str, ServiceError> {
    let url = url.unwrap_or_default().trim();

    if url.is_empty() {
        return Err(ServiceError::InvalidRequest("url is required".into()));
    }

    Ok(url)
}
