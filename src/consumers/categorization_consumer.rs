use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{category_queries, transaction_queries, user_settings_queries};
use crate::errors::AppError;
use crate::events::Consumer;
use crate::models::{AssignmentStatus, CategoryAssignment, Event};
use crate::rules;

/// Runs the rule engine against a newly created (or updated) transaction and
/// persists the resulting suggestions. Idempotent: a suggestion already on
/// record for a given `rule_id` is never appended twice.
pub struct CategorizationConsumer;

#[async_trait]
impl Consumer for CategorizationConsumer {
    fn name(&self) -> &str {
        "categorization"
    }

    async fn handle(&self, pool: &PgPool, event: &Event) -> Result<(), AppError> {
        let Some(transaction_id) = event
            .data
            .get("transaction_id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
        else {
            warn!(event_id = %event.event_id, "categorization: event payload missing transaction_id");
            return Ok(());
        };

        categorize_transaction(pool, event.user_id, transaction_id).await
    }
}

/// The actual categorization work, shared by the event-bus dispatch path
/// (`Consumer::handle` above) and the direct-trigger path in
/// `file_processor_service::ingest` for legacy/shadow operating modes.
pub async fn categorize_transaction(
    pool: &PgPool,
    user_id: Uuid,
    transaction_id: Uuid,
) -> Result<(), AppError> {
    let Some(transaction) = transaction_queries::fetch_one(pool, user_id, transaction_id).await? else {
        return Ok(());
    };

    let categories = category_queries::fetch_all(pool, user_id).await?;
    if categories.is_empty() {
        return Ok(());
    }

    let strategy = user_settings_queries::fetch_strategy(pool, user_id).await?.into();

    let suggestions = rules::suggest(&transaction, &categories, strategy);
    let existing_rule_ids: std::collections::HashSet<Uuid> = transaction
        .categories
        .0
        .iter()
        .filter_map(|a| a.rule_id)
        .collect();

    let fresh: Vec<_> = suggestions
        .iter()
        .filter(|s| !existing_rule_ids.contains(&s.rule_id))
        .collect();
    if fresh.is_empty() {
        return Ok(());
    }

    let auto_confirm = rules::should_auto_confirm(&suggestions, &transaction).cloned();

    let mut categories_out = transaction.categories.0.clone();
    let now = chrono::Utc::now();
    for suggestion in &fresh {
        let is_auto_confirmed = auto_confirm
            .as_ref()
            .map(|c| c.rule_id == suggestion.rule_id)
            .unwrap_or(false);
        categories_out.push(CategoryAssignment {
            category_id: suggestion.category_id,
            confidence: suggestion.confidence,
            status: if is_auto_confirmed {
                AssignmentStatus::Confirmed
            } else {
                AssignmentStatus::Suggested
            },
            is_manual: false,
            assigned_at: now,
            confirmed_at: if is_auto_confirmed { Some(now) } else { None },
            rule_id: Some(suggestion.rule_id),
        });
    }

    let primary_category_id = auto_confirm.as_ref().map(|c| c.category_id);

    transaction_queries::update_categories(
        pool,
        user_id,
        transaction_id,
        sqlx::types::Json(categories_out),
        primary_category_id,
    )
    .await?;

    info!(
        transaction_id = %transaction_id,
        suggestions = fresh.len(),
        "categorization: applied suggestions"
    );
    Ok(())
}
