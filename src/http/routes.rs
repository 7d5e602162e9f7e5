//! Route handlers

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Json;

use crate::registry::RegistryStats;
use crate::relay::RelayWorker;
use crate::service::{
    Ack, CreateStreamRequest, CreateStreamResponse, ServiceError, StreamService, StreamSummary,
};

type AppState<W> = State<Arc<StreamService<W>>>;

pub(super) async fn create_stream<W: RelayWorker>(
    State(service): AppState<W>,
    body: Result<Json<CreateStreamRequest>, JsonRejection>,
) -> Result<Json<CreateStreamResponse>, ServiceError> {
    let Json(request) = body.map_err(|e| ServiceError::InvalidRequest(e.body_text()))?;
    service.create_stream(request).await.map(Json)
}

pub(super) async fn destroy_stream<W: RelayWorker>(
    State(service): AppState<W>,
    Path(name): Path<String>,
) -> Result<Json<Ack>, ServiceError> {
    service.destroy_stream(&name).await.map(Json)
}

pub(super) async fn get_stream<W: RelayWorker>(
    State(service): AppState<W>,
    Path(name): Path<String>,
) -> Result<Json<StreamSummary>, ServiceError> {
    service.get_stream(&name).map(Json)
}

pub(super) async fn list_streams<W: RelayWorker>(
    State(service): AppState<W>,
) -> Json<Vec<StreamSummary>> {
    Json(service.list_streams())
}

pub(super) async fn destroy_all<W: RelayWorker>(
    State(service): AppState<W>,
) -> Result<Json<Ack>, ServiceError> {
    service.destroy_all().await.map(Json)
}

pub(super) async fn stats<W: RelayWorker>(State(service): AppState<W>) -> Json<RegistryStats> {
    Json(service.stats())
}
