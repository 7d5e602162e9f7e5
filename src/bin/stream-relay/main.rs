//! stream-relay — HTTP control plane for ffmpeg WebSocket relays
//!
//! ## Usage
//!
//! ```bash
//! # API on port 3000, relays from port 9999 upwards
//! stream-relay
//!
//! # Custom ports, reclaim relay ports of destroyed streams
//! PORT=8080 RELAY_BASE_PORT=20000 RELAY_ALLOCATOR=free-list stream-relay
//!
//! # Create a relay and watch it with jsmpeg at the returned ws_url
//! curl -X POST localhost:3000/stream -H 'content-type: application/json' \
//!      -d '{"name": "cam1", "url": "rtsp://10.0.0.5/stream1"}'
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use stream_relay::{FfmpegRelay, ServiceConfig, StreamRegistry, StreamService};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = ServiceConfig::from_env();
    info!(
        listen = %config.listen_addr,
        base_port = config.registry.base_port,
        port_limit = config.registry.port_limit,
        allocator = %config.registry.allocation,
        ffmpeg = %config.ffmpeg.ffmpeg_path.display(),
        "Starting stream relay service"
    );

    let registry = Arc::new(StreamRegistry::with_config(
        FfmpegRelay::new(config.ffmpeg.clone()),
        config.registry.clone(),
    ));
    let service = Arc::new(
        StreamService::new(Arc::clone(&registry))
            .public_host(config.public_host.clone())
            .relay_options(config.relay.clone()),
    );

    stream_relay::http::serve(Arc::clone(&service), config.listen_addr, shutdown_signal())
        .await
        .with_context(|| format!("HTTP API failed on {}", config.listen_addr))?;

    info!(streams = registry.stream_count(), "Shutting down, stopping all relays");
    for failure in registry.destroy_all().await {
        warn!(stream = %failure.name, error = %failure.cause, "Relay did not stop cleanly");
    }

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stream_relay=info".parse().expect("static directive")),
        )
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Received shutdown signal");
}
