use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Category, CreateCategory};
use crate::services::category_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/categories", get(list_categories).post(create_category))
        .route("/users/:user_id/categories/:category_id", axum::routing::delete(delete_category))
        .route(
            "/users/:user_id/categories/reset-and-reapply",
            post(reset_and_reapply),
        )
}

async fn list_categories(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Category>>, AppError> {
    info!("GET /users/{}/categories - Listing categories", user_id);
    let categories = category_service::list(&state.pool, user_id).await?;
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(input): Json<CreateCategory>,
) -> Result<Json<Category>, AppError> {
    info!("POST /users/{}/categories - Creating category", user_id);
    let category = category_service::create(&state.pool, user_id, input).await?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<AppState>,
    Path((user_id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /users/{}/categories/{} - Deleting category", user_id, category_id);
    category_service::delete(&state.pool, user_id, category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ResetAndReapplyRequest {
    pub account_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ResetAndReapplyResponse {
    pub transactions_examined: usize,
    pub transactions_updated: usize,
}

async fn reset_and_reapply(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<ResetAndReapplyRequest>,
) -> Result<Json<ResetAndReapplyResponse>, AppError> {
    info!(
        "POST /users/{}/categories/reset-and-reapply - account {:?}",
        user_id, body.account_id
    );
    let progress =
        category_service::reset_and_reapply(&state.pool, &state.bus, user_id, body.account_id).await?;
    Ok(Json(ResetAndReapplyResponse {
        transactions_examined: progress.transactions_examined,
        transactions_updated: progress.transactions_updated,
    }))
}
