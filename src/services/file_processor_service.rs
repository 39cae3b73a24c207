//! Orchestrates one file end to end: parse -> build -> persist -> publish.
//! Teacher precedent for the shape (read input, accumulate per-row outcomes,
//! return a summary struct): `services/csv_import_service.rs::import_csv_file`.

use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::consumers::categorization_consumer::categorize_transaction;
use crate::db::{account_queries, file_queries, transaction_queries};
use crate::errors::AppError;
use crate::events::{EventBus, InProcessEventBus};
use crate::models::{
    CreateTransactionFile, Event, EventType, FileMap, FileProcessingReport, ProcessingStatus,
    TransactionFile,
};
use crate::parser::{self, FileInput};

pub async fn ingest(
    pool: &PgPool,
    bus: &InProcessEventBus,
    config: &Config,
    user_id: Uuid,
    input: CreateTransactionFile,
    file_map: &FileMap,
    bytes: Vec<u8>,
    ignore_dup: bool,
) -> Result<(TransactionFile, FileProcessingReport), AppError> {
    let account_id = input
        .account_id
        .ok_or_else(|| AppError::Validation("account_id is required to ingest a file".to_string()))?;
    let file_format = input.file_format;
    let opening_balance = input.opening_balance.clone();
    let currency = input.currency.clone();

    let file = file_queries::create(pool, user_id, input).await?;
    publish(bus, config, Event::new(
        EventType::FILE_UPLOADED,
        user_id,
        "file_processor_service",
        file.file_id.to_string(),
        serde_json::json!({ "file_id": file.file_id }),
    ))
    .await;

    file_queries::mark_status(pool, user_id, file.file_id, ProcessingStatus::Processing).await?;

    let parse_result = parser::parse(
        &FileInput {
            format: file_format,
            bytes,
            user_id,
            account_id,
            opening_balance,
            currency,
            ignore_dup,
        },
        file_map,
    );

    let outcome = match parse_result {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(file_id = %file.file_id, error = %e, "file processing failed");
            file_queries::mark_status(pool, user_id, file.file_id, ProcessingStatus::Failed).await?;
            publish(
                bus,
                config,
                Event::new(
                    EventType::FILE_FAILED,
                    user_id,
                    "file_processor_service",
                    file.file_id.to_string(),
                    serde_json::json!({ "file_id": file.file_id, "error": e.to_string() }),
                ),
            )
            .await;
            return Err(e);
        }
    };

    let mut inserted_ids = Vec::new();
    let mut duplicate_count = outcome.duplicate_count;
    for new_transaction in outcome.transactions {
        match transaction_queries::insert_if_new(pool, user_id, file.file_id, new_transaction, ignore_dup).await? {
            Some(transaction) => inserted_ids.push(transaction.transaction_id),
            None => duplicate_count += 1,
        }
    }

    if let Some(last_transaction_id) = inserted_ids.last() {
        if let Some(last) = transaction_queries::fetch_one(pool, user_id, *last_transaction_id).await? {
            account_queries::apply_balance_delta(
                pool,
                user_id,
                account_id,
                &last.balance,
                last.date,
            )
            .await?;
        }
    }

    file_queries::mark_processed(
        pool,
        user_id,
        file.file_id,
        file_queries::ProcessedSummary {
            transaction_count: inserted_ids.len() as i64,
            start_date: None,
            end_date: None,
            opening_balance: outcome.opening_balance,
        },
    )
    .await?;

    if !outcome.warnings.is_empty() {
        warn!(file_id = %file.file_id, warnings = ?outcome.warnings, "file processed with warnings");
    }

    let report = FileProcessingReport {
        transaction_count: inserted_ids.len(),
        duplicate_count,
        skipped_rows: outcome.skipped_rows,
        warnings: outcome.warnings,
    };

    publish(
        bus,
        config,
        Event::new(
            EventType::FILE_PROCESSED,
            user_id,
            "file_processor_service",
            file.file_id.to_string(),
            serde_json::to_value(&report).unwrap_or_default(),
        ),
    )
    .await;

    for transaction_id in &inserted_ids {
        publish(
            bus,
            config,
            Event::new(
                EventType::TRANSACTION_CREATED,
                user_id,
                "file_processor_service",
                transaction_id.to_string(),
                serde_json::json!({ "transaction_id": transaction_id }),
            ),
        )
        .await;

        if config.direct_triggers && !config.categorization_disabled {
            if let Err(e) = categorize_transaction(pool, user_id, *transaction_id).await {
                error!(transaction_id = %transaction_id, error = %e, "direct categorization trigger failed");
            }
        }
    }

    let processed_file = file_queries::fetch_one(pool, user_id, file.file_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("file {} not found after processing", file.file_id)))?;

    info!(
        file_id = %processed_file.file_id,
        transactions = report.transaction_count,
        duplicates = report.duplicate_count,
        skipped = report.skipped_rows,
        "file processed"
    );

    Ok((processed_file, report))
}

/// Re-runs a previously uploaded file's parse and atomically replaces its
/// transactions, for when a user re-uploads with a corrected field map.
pub async fn reprocess(
    pool: &PgPool,
    bus: &InProcessEventBus,
    config: &Config,
    user_id: Uuid,
    file_id: Uuid,
    file_map: &FileMap,
    bytes: Vec<u8>,
) -> Result<FileProcessingReport, AppError> {
    let file = file_queries::fetch_one(pool, user_id, file_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("file {file_id} not found")))?;
    let account_id = file
        .account_id
        .ok_or_else(|| AppError::Validation("file has no associated account".to_string()))?;

    let outcome = parser::parse(
        &FileInput {
            format: file.file_format,
            bytes,
            user_id,
            account_id,
            opening_balance: file.opening_balance.clone(),
            currency: file.currency.clone(),
            ignore_dup: false,
        },
        file_map,
    )?;

    let inserted = file_queries::supersede_transactions(pool, user_id, file_id, outcome.transactions).await?;

    file_queries::mark_processed(
        pool,
        user_id,
        file_id,
        file_queries::ProcessedSummary {
            transaction_count: inserted as i64,
            start_date: None,
            end_date: None,
            opening_balance: outcome.opening_balance,
        },
    )
    .await?;

    let report = FileProcessingReport {
        transaction_count: inserted,
        duplicate_count: outcome.duplicate_count,
        skipped_rows: outcome.skipped_rows,
        warnings: outcome.warnings,
    };

    publish(
        bus,
        config,
        Event::new(
            EventType::FILE_PROCESSED,
            user_id,
            "file_processor_service",
            file_id.to_string(),
            serde_json::to_value(&report).unwrap_or_default(),
        ),
    )
    .await;

    Ok(report)
}

/// Gates publication on `Config::publish_events`, matching the
/// events-only/shadow/legacy/disabled modes of spec.md §4.8.
async fn publish(bus: &InProcessEventBus, config: &Config, event: Event) {
    if !config.publish_events {
        return;
    }
    if let Err(e) = bus.publish(event).await {
        error!(error = %e, "failed to publish event");
    }
}
