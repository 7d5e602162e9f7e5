//! HTTP + JSON binding of the facade
//!
//! - `POST /stream` — create `{name, url}`
//! - `GET /stream/{name}` — one stream
//! - `DELETE /stream/{name}` — destroy one stream
//! - `GET /streams` — list active streams
//! - `DELETE /streams` — destroy every stream
//! - `GET /stats` — registry counters

mod error;
mod routes;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::relay::RelayWorker;
use crate::service::StreamService;

/// Build the API router
pub fn router<W: RelayWorker>(service: Arc<StreamService<W>>) -> Router {
    Router::new()
        .route("/stream", post(routes::create_stream::<W>))
        .route(
            "/stream/{name}",
            get(routes::get_stream::<W>).delete(routes::destroy_stream::<W>),
        )
        .route(
            "/streams",
            get(routes::list_streams::<W>).delete(routes::destroy_all::<W>),
        )
        .route("/stats", get(routes::stats::<W>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Serve the API until `shutdown` resolves
pub async fn serve<W, F>(
    service: Arc<StreamService<W>>,
    addr: SocketAddr,
    shutdown: F,
) -> std::io::Result<()>
where
    W: RelayWorker,
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "HTTP API listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}
