use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::db::event_queries;
use crate::errors::AppError;
use crate::events::Consumer;
use crate::models::{Event, EventRecord};

const CHECKPOINT_TTL_SECONDS: i64 = 60 * 60 * 24 * 30;

/// Writes the append-only audit trail. Idempotent on `event_id`: redelivery
/// is detected via the `consumer_checkpoints` ledger and skipped.
pub struct AuditConsumer;

#[async_trait]
impl Consumer for AuditConsumer {
    fn name(&self) -> &str {
        "audit"
    }

    async fn handle(&self, pool: &PgPool, event: &Event) -> Result<(), AppError> {
        if event_queries::checkpoint_seen(pool, self.name(), event.event_id).await? {
            info!(event_id = %event.event_id, "audit: already recorded, skipping");
            return Ok(());
        }

        let record = EventRecord::from_event(event);
        event_queries::insert(pool, &record).await?;
        event_queries::record_checkpoint(pool, self.name(), event.event_id, CHECKPOINT_TTL_SECONDS)
            .await?;
        Ok(())
    }
}
