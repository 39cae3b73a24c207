use sqlx::PgPool;
use uuid::Uuid;

use crate::db::transaction_queries;
use crate::models::{CreateTransactionFile, NewTransaction, ProcessingStatus, TransactionFile};

const COLUMNS: &str = "file_id, user_id, account_id, file_name, file_format, file_map_id, \
    opening_balance, currency, start_date, end_date, transaction_count, processing_status, \
    uploaded_at, created_at";

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    input: CreateTransactionFile,
) -> Result<TransactionFile, sqlx::Error> {
    let file = TransactionFile::new(user_id, input);
    sqlx::query_as::<_, TransactionFile>(&format!(
        "INSERT INTO transaction_files ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
         RETURNING {COLUMNS}"
    ))
    .bind(file.file_id)
    .bind(file.user_id)
    .bind(file.account_id)
    .bind(file.file_name)
    .bind(file.file_format)
    .bind(file.file_map_id)
    .bind(file.opening_balance)
    .bind(file.currency)
    .bind(file.start_date)
    .bind(file.end_date)
    .bind(file.transaction_count)
    .bind(file.processing_status)
    .bind(file.uploaded_at)
    .bind(file.created_at)
    .fetch_one(pool)
    .await
}

pub async fn fetch_one(
    pool: &PgPool,
    user_id: Uuid,
    file_id: Uuid,
) -> Result<Option<TransactionFile>, sqlx::Error> {
    sqlx::query_as::<_, TransactionFile>(&format!(
        "SELECT {COLUMNS} FROM transaction_files WHERE user_id = $1 AND file_id = $2"
    ))
    .bind(user_id)
    .bind(file_id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<TransactionFile>, sqlx::Error> {
    sqlx::query_as::<_, TransactionFile>(&format!(
        "SELECT {COLUMNS} FROM transaction_files WHERE user_id = $1 ORDER BY uploaded_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn mark_status(
    pool: &PgPool,
    user_id: Uuid,
    file_id: Uuid,
    status: ProcessingStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE transaction_files SET processing_status = $3 WHERE user_id = $1 AND file_id = $2")
        .bind(user_id)
        .bind(file_id)
        .bind(status)
        .execute(pool)
        .await?;
    Ok(())
}

pub struct ProcessedSummary {
    pub transaction_count: i64,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub opening_balance: Option<bigdecimal::BigDecimal>,
}

pub async fn mark_processed(
    pool: &PgPool,
    user_id: Uuid,
    file_id: Uuid,
    summary: ProcessedSummary,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE transaction_files
         SET processing_status = $3, transaction_count = $4, start_date = $5, end_date = $6,
             opening_balance = COALESCE($7, opening_balance)
         WHERE user_id = $1 AND file_id = $2",
    )
    .bind(user_id)
    .bind(file_id)
    .bind(ProcessingStatus::Processed)
    .bind(summary.transaction_count)
    .bind(summary.start_date)
    .bind(summary.end_date)
    .bind(summary.opening_balance)
    .execute(pool)
    .await?;
    Ok(())
}

/// Atomically replaces every transaction belonging to `file_id`: delete then
/// bulk-insert inside one `sqlx::Transaction`, so a reprocess never leaves the
/// account half-updated if the insert half fails.
pub async fn supersede_transactions(
    pool: &PgPool,
    user_id: Uuid,
    file_id: Uuid,
    replacements: Vec<NewTransaction>,
) -> Result<usize, sqlx::Error> {
    let mut tx = pool.begin().await?;
    transaction_queries::delete_by_file(&mut tx, user_id, file_id).await?;

    let mut inserted = 0usize;
    for new_transaction in replacements {
        if transaction_queries::insert_in_transaction(&mut tx, user_id, file_id, new_transaction)
            .await?
            .is_some()
        {
            inserted += 1;
        }
    }

    tx.commit().await?;
    Ok(inserted)
}
