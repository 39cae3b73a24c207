use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Csv,
    Ofx,
    Qfx,
    Qif,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Uploaded,
    Processing,
    Processed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionFile {
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub account_id: Option<Uuid>,
    pub file_name: String,
    pub file_format: FileFormat,
    pub file_map_id: Option<Uuid>,
    pub opening_balance: Option<BigDecimal>,
    pub currency: String,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub transaction_count: i64,
    pub processing_status: ProcessingStatus,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionFile {
    pub account_id: Option<Uuid>,
    pub file_name: String,
    pub file_format: FileFormat,
    pub file_map_id: Option<Uuid>,
    pub opening_balance: Option<BigDecimal>,
    pub currency: String,
}

impl TransactionFile {
    pub fn new(user_id: Uuid, input: CreateTransactionFile) -> Self {
        let now = chrono::Utc::now();
        Self {
            file_id: Uuid::new_v4(),
            user_id,
            account_id: input.account_id,
            file_name: input.file_name,
            file_format: input.file_format,
            file_map_id: input.file_map_id,
            opening_balance: input.opening_balance,
            currency: input.currency,
            start_date: None,
            end_date: None,
            transaction_count: 0,
            processing_status: ProcessingStatus::Uploaded,
            uploaded_at: now,
            created_at: now,
        }
    }
}

/// Outcome of processing one file end to end: counts the orchestrator
/// (`services::file_processor_service`) folds into the `file.processed` /
/// `file.failed` event payload.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileProcessingReport {
    pub transaction_count: usize,
    pub duplicate_count: usize,
    pub skipped_rows: usize,
    pub warnings: Vec<String>,
}
