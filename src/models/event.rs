use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Domain event types the bus routes. Kept as a newtype over `String` rather
/// than a closed enum so routing patterns (`file.*`) stay simple prefix
/// matches against the wire value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType(pub String);

impl EventType {
    pub const FILE_UPLOADED: &'static str = "file.uploaded";
    pub const FILE_PROCESSED: &'static str = "file.processed";
    pub const FILE_FAILED: &'static str = "file.failed";
    pub const TRANSACTION_CREATED: &'static str = "transaction.created";
    pub const TRANSACTION_UPDATED: &'static str = "transaction.updated";
    pub const TRANSACTION_DELETED: &'static str = "transaction.deleted";
    pub const TRANSACTIONS_DELETED_BULK: &'static str = "transactions.deleted.bulk";
    pub const ACCOUNT_CREATED: &'static str = "account.created";
    pub const ACCOUNT_UPDATED: &'static str = "account.updated";
    pub const ACCOUNT_DELETED: &'static str = "account.deleted";
    pub const CATEGORY_APPLIED: &'static str = "category.applied";
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The envelope published on the bus and persisted by the audit consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: Uuid,
    pub event_type: String,
    pub user_id: Uuid,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
    pub source: String,
    /// Used by the routing layer as a partition hint; per-entity ordering
    /// relies on the publisher stamping these monotonically for one entity.
    pub partition_key: String,
    pub data: serde_json::Value,
}

impl Event {
    pub fn new(
        event_type: impl Into<String>,
        user_id: Uuid,
        source: impl Into<String>,
        partition_key: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.into(),
            user_id,
            occurred_at: chrono::Utc::now(),
            source: source.into(),
            partition_key: partition_key.into(),
            data,
        }
    }
}

/// The append-only audit record the audit consumer writes for every event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRecord {
    pub event_id: Uuid,
    pub event_type: String,
    pub user_id: Uuid,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
    pub source: String,
    pub detail_hash: Vec<u8>,
    pub payload: serde_json::Value,
}

impl EventRecord {
    pub fn from_event(event: &Event) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(event.event_type.as_bytes());
        hasher.update(event.user_id.as_bytes());
        hasher.update(event.data.to_string().as_bytes());
        Self {
            event_id: event.event_id,
            event_type: event.event_type.clone(),
            user_id: event.user_id,
            occurred_at: event.occurred_at,
            source: event.source.clone(),
            detail_hash: hasher.finalize().to_vec(),
            payload: event.data.clone(),
        }
    }
}
