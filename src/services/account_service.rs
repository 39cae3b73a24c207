use sqlx::PgPool;
use uuid::Uuid;

use crate::db::account_queries;
use crate::errors::AppError;
use crate::models::{Account, CreateAccount};

pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<Account>, AppError> {
    Ok(account_queries::fetch_all(pool, user_id).await?)
}

pub async fn get(pool: &PgPool, user_id: Uuid, account_id: Uuid) -> Result<Account, AppError> {
    account_queries::fetch_one(pool, user_id, account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("account {account_id} not found")))
}

pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateAccount) -> Result<Account, AppError> {
    Ok(account_queries::create(pool, user_id, input).await?)
}

pub async fn delete(pool: &PgPool, user_id: Uuid, account_id: Uuid) -> Result<(), AppError> {
    let rows = account_queries::delete(pool, user_id, account_id).await?;
    if rows == 0 {
        return Err(AppError::NotFound(format!("account {account_id} not found")));
    }
    Ok(())
}
