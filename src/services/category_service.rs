use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::{category_queries, transaction_queries, user_settings_queries};
use crate::errors::AppError;
use crate::events::{EventBus, InProcessEventBus};
use crate::models::{Category, CategoryAssignment, CreateCategory, Event, EventType};
use crate::rules;

const RESET_REAPPLY_PAGE_SIZE: i64 = 200;

pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<Category>, AppError> {
    Ok(category_queries::fetch_all(pool, user_id).await?)
}

pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateCategory) -> Result<Category, AppError> {
    Ok(category_queries::create(pool, user_id, input).await?)
}

pub async fn delete(pool: &PgPool, user_id: Uuid, category_id: Uuid) -> Result<(), AppError> {
    let rows = category_queries::delete(pool, user_id, category_id).await?;
    if rows == 0 {
        return Err(AppError::NotFound(format!("category {category_id} not found")));
    }
    Ok(())
}

pub struct ResetReapplyProgress {
    pub transactions_examined: usize,
    pub transactions_updated: usize,
}

/// Clears every non-manual assignment (optionally scoped to one account) and
/// reruns the rule engine over every remaining transaction, a page at a time
/// so the operation resumes cleanly after a crash: progress is the cursor,
/// not in-memory state. Teacher precedent for the checkpointed-bulk-job
/// shape: `services/job_scheduler_service.rs`, generalized from a cron job
/// to a cursor-driven operation invoked directly from a route handler.
pub async fn reset_and_reapply(
    pool: &PgPool,
    bus: &InProcessEventBus,
    user_id: Uuid,
    account_id: Option<Uuid>,
) -> Result<ResetReapplyProgress, AppError> {
    transaction_queries::clear_non_manual_categories(pool, user_id, account_id).await?;

    let categories = category_queries::fetch_all(pool, user_id).await?;
    let strategy = user_settings_queries::fetch_strategy(pool, user_id).await?.into();
    let mut progress = ResetReapplyProgress {
        transactions_examined: 0,
        transactions_updated: 0,
    };

    let mut cursor: Option<Uuid> = None;
    loop {
        let page = transaction_queries::fetch_page_after(
            pool,
            user_id,
            account_id,
            cursor,
            RESET_REAPPLY_PAGE_SIZE,
        )
        .await?;
        if page.is_empty() {
            break;
        }

        for transaction in &page {
            progress.transactions_examined += 1;
            let suggestions = rules::suggest(transaction, &categories, strategy);
            if suggestions.is_empty() {
                continue;
            }

            let auto_confirm = rules::should_auto_confirm(&suggestions, transaction).cloned();
            let now = chrono::Utc::now();
            let assignments: Vec<CategoryAssignment> = suggestions
                .iter()
                .map(|s| {
                    let confirmed = auto_confirm.as_ref().map(|c| c.rule_id == s.rule_id).unwrap_or(false);
                    CategoryAssignment {
                        category_id: s.category_id,
                        confidence: s.confidence,
                        status: if confirmed {
                            crate::models::AssignmentStatus::Confirmed
                        } else {
                            crate::models::AssignmentStatus::Suggested
                        },
                        is_manual: false,
                        assigned_at: now,
                        confirmed_at: if confirmed { Some(now) } else { None },
                        rule_id: Some(s.rule_id),
                    }
                })
                .collect();

            transaction_queries::update_categories(
                pool,
                user_id,
                transaction.transaction_id,
                sqlx::types::Json(assignments),
                auto_confirm.as_ref().map(|c| c.category_id),
            )
            .await?;
            progress.transactions_updated += 1;

            bus.publish(Event::new(
                EventType::CATEGORY_APPLIED,
                user_id,
                "category_service",
                transaction.transaction_id.to_string(),
                serde_json::json!({ "transaction_id": transaction.transaction_id }),
            ))
            .await?;
        }

        info!(
            examined = progress.transactions_examined,
            updated = progress.transactions_updated,
            "reset_and_reapply progress"
        );
        cursor = page.last().map(|t| t.transaction_id);
    }

    Ok(progress)
}
