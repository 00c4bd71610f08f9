use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::error::ApiError;
use super::AppState;
use crate::db::models::{NewTrack, Track, TrackUpdate};
use crate::store::{self, TrackStore};

/// Run a store call on the blocking pool; SQLite I/O must stay off the async workers.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn TrackStore) -> store::Result<T> + Send + 'static,
{
    let store: Arc<dyn TrackStore> = Arc::clone(&state.store);
    Ok(tokio::task::spawn_blocking(move || f(store.as_ref())).await??)
}

pub async fn list_tracks(State(state): State<AppState>) -> Result<Json<Vec<Track>>, ApiError> {
    Ok(Json(with_store(&state, |s| s.list()).await?))
}

pub async fn get_track(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Track>, ApiError> {
    with_store(&state, move |s| s.get(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Any id in the body is dropped; the store always assigns a fresh one.
pub async fn create_track(
    State(state): State<AppState>,
    Json(mut track): Json<NewTrack>,
) -> Result<(StatusCode, Json<Track>), ApiError> {
    track.id = None;
    let created = with_store(&state, move |s| s.create(track)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partial update: only the fields present in the body change.
pub async fn update_track(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<TrackUpdate>,
) -> Result<Json<Track>, ApiError> {
    with_store(&state, move |s| s.update(id, update))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn delete_track(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if with_store(&state, move |s| s.delete(id)).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound)
    }
}
