use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::analytics_queries;
use crate::errors::AppError;
use crate::events::Consumer;
use crate::models::Event;

/// Marks the affected user's analytics as needing recomputation. Analytics
/// computation itself is out of scope; this just drops a dirty marker,
/// idempotently (re-marking an already-dirty row is a no-op in effect).
pub struct AnalyticsConsumer;

#[async_trait]
impl Consumer for AnalyticsConsumer {
    fn name(&self) -> &str {
        "analytics"
    }

    async fn handle(&self, pool: &PgPool, event: &Event) -> Result<(), AppError> {
        let analytic_type = analytic_type_for(&event.event_type);
        analytics_queries::mark_dirty(pool, event.user_id, analytic_type).await?;
        Ok(())
    }
}

fn analytic_type_for(event_type: &str) -> &'static str {
    if event_type.starts_with("transaction") {
        "spending_summary"
    } else if event_type.starts_with("file") {
        "account_balance_history"
    } else {
        "general"
    }
}
