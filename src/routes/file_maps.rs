use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CreateFileMap, FileMap};
use crate::services::file_map_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/file-maps", get(list_file_maps).post(create_file_map))
        .route(
            "/users/:user_id/file-maps/:file_map_id",
            get(get_file_map).delete(delete_file_map),
        )
}

async fn list_file_maps(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<FileMap>>, AppError> {
    info!("GET /users/{}/file-maps - Listing file maps", user_id);
    let file_maps = file_map_service::list(&state.pool, user_id).await?;
    Ok(Json(file_maps))
}

async fn get_file_map(
    State(state): State<AppState>,
    Path((user_id, file_map_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<FileMap>, AppError> {
    info!("GET /users/{}/file-maps/{} - Fetching file map", user_id, file_map_id);
    let file_map = file_map_service::get(&state.pool, user_id, file_map_id).await?;
    Ok(Json(file_map))
}

async fn create_file_map(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(input): Json<CreateFileMap>,
) -> Result<Json<FileMap>, AppError> {
    info!("POST /users/{}/file-maps - Creating file map", user_id);
    let file_map = file_map_service::create(&state.pool, user_id, input).await?;
    Ok(Json(file_map))
}

async fn delete_file_map(
    State(state): State<AppState>,
    Path((user_id, file_map_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /users/{}/file-maps/{} - Deleting file map", user_id, file_map_id);
    file_map_service::delete(&state.pool, user_id, file_map_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
