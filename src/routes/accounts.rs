use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Account, CreateAccount};
use crate::services::account_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/accounts", get(list_accounts).post(create_account))
        .route(
            "/users/:user_id/accounts/:account_id",
            get(get_account).delete(delete_account),
        )
}

async fn list_accounts(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Account>>, AppError> {
    info!("GET /users/{}/accounts - Listing accounts", user_id);
    let accounts = account_service::list(&state.pool, user_id).await?;
    Ok(Json(accounts))
}

async fn get_account(
    State(state): State<AppState>,
    Path((user_id, account_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Account>, AppError> {
    info!("GET /users/{}/accounts/{} - Fetching account", user_id, account_id);
    let account = account_service::get(&state.pool, user_id, account_id).await?;
    Ok(Json(account))
}

async fn create_account(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(input): Json<CreateAccount>,
) -> Result<Json<Account>, AppError> {
    info!("POST /users/{}/accounts - Creating account", user_id);
    let account = account_service::create(&state.pool, user_id, input).await?;
    Ok(Json(account))
}

async fn delete_account(
    State(state): State<AppState>,
    Path((user_id, account_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /users/{}/accounts/{} - Deleting account", user_id, account_id);
    account_service::delete(&state.pool, user_id, account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
