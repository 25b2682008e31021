use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tokio::sync::watch;
use crate::registry_manager::RegistryHandle;
use shared::protocol::API_PREFIX;
use shared::types::{Host, HostInput, OpResponse};

#[derive(Clone)]
pub struct AppState {
    pub registry: RegistryHandle,
    pub hash_rx: watch::Receiver<String>,
}

pub fn router(state: AppState) -> Router {
    let hosts = Router::new()
        .route("/hosts", get(list_hosts).post(add_host))
        .route("/hosts/hash", get(get_hash))
        .route("/hosts/:id", put(update_host).delete(delete_host))
        .route("/hosts/:id/wake", post(wake_host));

    Router::new().nest(API_PREFIX, hosts).with_state(state)
}

/// Registry failures travel inside the 200 body; a 500 means the registry task is gone.
fn unavailable(e: anyhow::Error) -> StatusCode {
    tracing::error!("Registry unavailable: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn list_hosts(State(state): State<AppState>) -> Result<Json<Vec<Host>>, StatusCode> {
    state.registry.list().await.map(Json).map_err(unavailable)
}

async fn get_hash(State(state): State<AppState>) -> String {
    state.hash_rx.borrow().clone()
}

async fn add_host(
    State(state): State<AppState>,
    Json(input): Json<HostInput>,
) -> Result<Json<OpResponse>, StatusCode> {
    state
        .registry
        .add(input.name, input.ip)
        .await
        .map(Json)
        .map_err(unavailable)
}

async fn update_host(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<HostInput>,
) -> Result<Json<OpResponse>, StatusCode> {
    state
        .registry
        .update(id, input.name, input.ip)
        .await
        .map(Json)
        .map_err(unavailable)
}

async fn delete_host(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<OpResponse>, StatusCode> {
    state.registry.delete(id).await.map(Json).map_err(unavailable)
}

async fn wake_host(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<OpResponse>, StatusCode> {
    state.registry.wake(id).await.map(Json).map_err(unavailable)
}
