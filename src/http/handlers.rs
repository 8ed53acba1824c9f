//! Request handlers
//!
//! Each handler runs its storage call on the blocking pool while holding the
//! tree lock.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use bytes::Bytes;

use crate::error::Result;
use crate::tree::Tree;

use super::response::{ApiError, CommandResponse, QueryResponse};
use super::server::AppState;

/// `POST /command/{key}`: store the request body under `key`
pub async fn put_value(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    body: Bytes,
) -> std::result::Result<Json<CommandResponse>, ApiError> {
    let stored_key = key.clone();
    let value = body.clone();
    run_blocking(state, move |tree| tree.put(stored_key.as_bytes(), &value))
        .await?
        .map_err(ApiError::from_write)?;

    Ok(Json(CommandResponse::new(&key, &body)))
}

/// `GET /query/{key}`: fetch the newest value for `key`
pub async fn get_value(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> std::result::Result<Json<QueryResponse>, ApiError> {
    let lookup_key = key.clone();
    let value = run_blocking(state, move |tree| tree.get(lookup_key.as_bytes()))
        .await?
        .map_err(ApiError::from_read)?;

    Ok(Json(QueryResponse::new(&key, &value)))
}

/// `/command/` or `/query/` without a key
pub async fn missing_param() -> ApiError {
    ApiError::MissingParam
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Any path outside the routes above
pub async fn unknown_route() -> ApiError {
    ApiError::UnknownRoute
}

pub async fn health() -> &'static str {
    "ok"
}

/// Run `op` against the tree on the blocking pool
///
/// The outer error covers a closed tree or a panicked task; the inner
/// `Result` is the storage outcome.
async fn run_blocking<T, F>(
    state: Arc<AppState>,
    op: F,
) -> std::result::Result<Result<T>, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut Tree) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || state.with_tree(op))
        .await
        .map_err(|e| ApiError::Internal(format!("storage task failed: {}", e)))?
        .ok_or(ApiError::Closed)
}
