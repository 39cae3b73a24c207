use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CreateTransactionFile, FileFormat, FileProcessingReport, TransactionFile};
use crate::services::{file_map_service, file_processor_service, file_service};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/files", get(list_files).post(upload_file))
        .route("/users/:user_id/files/:file_id/reprocess", post(reprocess_file))
}

async fn list_files(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<TransactionFile>>, AppError> {
    info!("GET /users/{}/files - Listing files", user_id);
    let files = file_service::list(&state.pool, user_id).await?;
    Ok(Json(files))
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub file_name: String,
    pub file_format: FileFormat,
    pub account_id: Option<Uuid>,
    pub file_map_id: Uuid,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub opening_balance: Option<BigDecimal>,
    #[serde(default)]
    pub ignore_dup: bool,
}

fn default_currency() -> String {
    "USD".to_string()
}

async fn upload_file(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<FileProcessingReport>, AppError> {
    info!(
        "POST /users/{}/files - Uploading {} ({:?})",
        user_id, query.file_name, query.file_format
    );

    let file_map = file_map_service::get(&state.pool, user_id, query.file_map_id).await?;

    let input = CreateTransactionFile {
        account_id: query.account_id,
        file_name: query.file_name,
        file_format: query.file_format,
        file_map_id: Some(query.file_map_id),
        opening_balance: query.opening_balance,
        currency: query.currency,
    };

    let (_file, report) = file_processor_service::ingest(
        &state.pool,
        &state.bus,
        &state.config,
        user_id,
        input,
        &file_map,
        body.to_vec(),
        query.ignore_dup,
    )
    .await?;

    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct ReprocessQuery {
    pub file_map_id: Uuid,
}

async fn reprocess_file(
    State(state): State<AppState>,
    Path((user_id, file_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<ReprocessQuery>,
    body: Bytes,
) -> Result<Json<FileProcessingReport>, AppError> {
    info!("POST /users/{}/files/{}/reprocess", user_id, file_id);

    let file_map = file_map_service::get(&state.pool, user_id, query.file_map_id).await?;
    let report = file_processor_service::reprocess(
        &state.pool,
        &state.bus,
        &state.config,
        user_id,
        file_id,
        &file_map,
        body.to_vec(),
    )
    .await?;

    Ok(Json(report))
}
