use sqlx::PgPool;
use uuid::Uuid;

use crate::db::file_queries;
use crate::errors::AppError;
use crate::models::TransactionFile;

pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<TransactionFile>, AppError> {
    Ok(file_queries::fetch_all(pool, user_id).await?)
}
