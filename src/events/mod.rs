//! In-process event bus facade (spec.md §4.7): a small axum service standing
//! in for the serverless fan-out the original design assumes. `publish`
//! records the event (producer idempotency on `event_id`), then dispatches
//! synchronously to every consumer whose routing pattern matches, retrying
//! each with backoff before dead-lettering.

pub mod routing;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::db::event_queries;
use crate::errors::AppError;
use crate::models::{Event, EventRecord};

use self::routing::RoutingTable;

/// One delivery target. Consumers are idempotent against redelivery, so a
/// failed dispatch can be retried freely.
#[async_trait]
pub trait Consumer: Send + Sync {
    fn name(&self) -> &str;
    async fn handle(&self, pool: &PgPool, event: &Event) -> Result<(), AppError>;
}

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: Event) -> Result<(), AppError>;
}

pub struct InProcessEventBus {
    pool: PgPool,
    routes: RoutingTable,
    consumers: Vec<Arc<dyn Consumer>>,
    max_retries: u32,
    categorization_disabled: bool,
}

impl InProcessEventBus {
    pub fn new(pool: PgPool, max_retries: u32, categorization_disabled: bool) -> Self {
        Self {
            pool,
            routes: RoutingTable::default(),
            consumers: Vec::new(),
            max_retries,
            categorization_disabled,
        }
    }

    pub fn register(mut self, pattern: &str, consumer: Arc<dyn Consumer>) -> Self {
        self.routes.add(pattern, consumer.name().to_string());
        self.consumers.push(consumer);
        self
    }

    async fn dispatch_with_retry(&self, consumer: &dyn Consumer, event: &Event) {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match consumer.handle(&self.pool, event).await {
                Ok(()) => return,
                Err(e) if attempt >= self.max_retries => {
                    error!(
                        event_id = %event.event_id,
                        consumer = consumer.name(),
                        attempts = attempt,
                        error = %e,
                        "exhausted retries, dead-lettering event"
                    );
                    if let Err(dl_err) =
                        event_queries::dead_letter(&self.pool, event.event_id, consumer.name(), &e.to_string())
                            .await
                    {
                        error!(error = %dl_err, "failed to persist dead letter");
                    }
                    return;
                }
                Err(e) => {
                    let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                    warn!(
                        event_id = %event.event_id,
                        consumer = consumer.name(),
                        attempt,
                        error = %e,
                        "consumer failed, retrying after backoff"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[async_trait]
impl EventBus for InProcessEventBus {
    /// Records the event then dispatches to every consumer whose routing
    /// pattern matches `event.event_type`. A second `publish` carrying an
    /// `event_id` already on record is a no-op (producer idempotency).
    async fn publish(&self, event: Event) -> Result<(), AppError> {
        let record = EventRecord::from_event(&event);
        match event_queries::insert(&self.pool, &record).await {
            Ok(true) => {}
            Ok(false) => {
                info!(event_id = %event.event_id, "event already recorded, skipping dispatch");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        let targets = self.routes.match_consumers(&event.event_type);
        for name in targets {
            if self.categorization_disabled && name == "categorization" {
                info!(event_id = %event.event_id, "categorization disabled, skipping dispatch");
                continue;
            }
            let Some(consumer) = self.consumers.iter().find(|c| c.name() == name) else {
                continue;
            };
            self.dispatch_with_retry(consumer.as_ref(), &event).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::routing::RoutingTable;

    #[test]
    fn prefix_pattern_matches_namespaced_events() {
        let mut table = RoutingTable::default();
        table.add("file.*", "audit".to_string());
        table.add("transaction.created", "categorization".to_string());

        assert_eq!(table.match_consumers("file.processed"), vec!["audit"]);
        assert_eq!(
            table.match_consumers("transaction.created"),
            vec!["categorization"]
        );
        assert!(table.match_consumers("account.created").is_empty());
    }
}
