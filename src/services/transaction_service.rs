use sqlx::PgPool;
use uuid::Uuid;

use crate::db::transaction_queries;
use crate::errors::AppError;
use crate::models::Transaction;

pub struct ListFilter {
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    pub to: Option<chrono::DateTime<chrono::Utc>>,
    pub category_id: Option<Uuid>,
    pub cursor: Option<i32>,
    pub limit: i64,
}

pub async fn list_for_account(
    pool: &PgPool,
    user_id: Uuid,
    account_id: Uuid,
    filter: ListFilter,
) -> Result<Vec<Transaction>, AppError> {
    Ok(transaction_queries::fetch_by_account(
        pool,
        user_id,
        account_id,
        filter.from,
        filter.to,
        filter.category_id,
        filter.cursor,
        filter.limit,
    )
    .await?)
}

pub async fn get(pool: &PgPool, user_id: Uuid, transaction_id: Uuid) -> Result<Transaction, AppError> {
    transaction_queries::fetch_one(pool, user_id, transaction_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("transaction {transaction_id} not found")))
}

/// Manual category assignment: bypasses the rule engine entirely and is
/// never touched by later auto-categorization runs.
pub async fn assign_category_manually(
    pool: &PgPool,
    user_id: Uuid,
    transaction_id: Uuid,
    category_id: Uuid,
) -> Result<Transaction, AppError> {
    let transaction = get(pool, user_id, transaction_id).await?;
    let mut categories = transaction.categories.0.clone();
    categories.retain(|a| !a.is_manual || a.category_id != category_id);
    categories.push(crate::models::CategoryAssignment {
        category_id,
        confidence: 1.0,
        status: crate::models::AssignmentStatus::Confirmed,
        is_manual: true,
        assigned_at: chrono::Utc::now(),
        confirmed_at: Some(chrono::Utc::now()),
        rule_id: None,
    });

    transaction_queries::update_categories(
        pool,
        user_id,
        transaction_id,
        sqlx::types::Json(categories),
        Some(category_id),
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("transaction {transaction_id} not found")))
}
