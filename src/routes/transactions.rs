use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Transaction;
use crate::services::transaction_service::{self, ListFilter};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users/:user_id/accounts/:account_id/transactions",
            get(list_transactions),
        )
        .route("/users/:user_id/transactions/:transaction_id", get(get_transaction))
        .route(
            "/users/:user_id/transactions/:transaction_id/category",
            put(assign_category),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    pub to: Option<chrono::DateTime<chrono::Utc>>,
    pub category_id: Option<Uuid>,
    pub cursor: Option<i32>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

async fn list_transactions(
    State(state): State<AppState>,
    Path((user_id, account_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    info!(
        "GET /users/{}/accounts/{}/transactions - Listing transactions",
        user_id, account_id
    );
    let transactions = transaction_service::list_for_account(
        &state.pool,
        user_id,
        account_id,
        ListFilter {
            from: query.from,
            to: query.to,
            category_id: query.category_id,
            cursor: query.cursor,
            limit: query.limit,
        },
    )
    .await?;
    Ok(Json(transactions))
}

async fn get_transaction(
    State(state): State<AppState>,
    Path((user_id, transaction_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Transaction>, AppError> {
    info!("GET /users/{}/transactions/{} - Fetching transaction", user_id, transaction_id);
    let transaction = transaction_service::get(&state.pool, user_id, transaction_id).await?;
    Ok(Json(transaction))
}

#[derive(Debug, Deserialize)]
pub struct AssignCategoryRequest {
    pub category_id: Uuid,
}

async fn assign_category(
    State(state): State<AppState>,
    Path((user_id, transaction_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<AssignCategoryRequest>,
) -> Result<Json<Transaction>, AppError> {
    info!(
        "PUT /users/{}/transactions/{}/category - Assigning category {}",
        user_id, transaction_id, body.category_id
    );
    let transaction = transaction_service::assign_category_manually(
        &state.pool,
        user_id,
        transaction_id,
        body.category_id,
    )
    .await?;
    Ok(Json(transaction))
}
