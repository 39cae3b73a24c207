use sqlx::PgPool;
use uuid::Uuid;

use crate::models::EventRecord;

/// Inserts the audit record for an event. Returns `false` when the
/// `event_id` primary key already existed — producer idempotency, a second
/// `publish` of the same event is a no-op rather than an error.
pub async fn insert(pool: &PgPool, record: &EventRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO event_records (event_id, event_type, user_id, occurred_at, source, detail_hash, payload)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (event_id) DO NOTHING",
    )
    .bind(record.event_id)
    .bind(&record.event_type)
    .bind(record.user_id)
    .bind(record.occurred_at)
    .bind(&record.source)
    .bind(&record.detail_hash)
    .bind(&record.payload)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn dead_letter(
    pool: &PgPool,
    event_id: Uuid,
    consumer_name: &str,
    error: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO dead_letter_events (event_id, consumer_name, error, failed_at)
         VALUES ($1, $2, $3, now())
         ON CONFLICT (event_id, consumer_name) DO UPDATE SET error = EXCLUDED.error, failed_at = EXCLUDED.failed_at",
    )
    .bind(event_id)
    .bind(consumer_name)
    .bind(error)
    .execute(pool)
    .await?;
    Ok(())
}

/// Idempotency ledger for consumer redelivery: a `(consumer_name, event_id)`
/// row means the consumer has already processed the event. Rows carry a TTL
/// and are swept lazily on read rather than by a background job.
pub async fn checkpoint_seen(
    pool: &PgPool,
    consumer_name: &str,
    event_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(
             SELECT 1 FROM consumer_checkpoints
             WHERE consumer_name = $1 AND event_id = $2 AND expires_at > now()
         )",
    )
    .bind(consumer_name)
    .bind(event_id)
    .fetch_one(pool)
    .await
}

pub async fn record_checkpoint(
    pool: &PgPool,
    consumer_name: &str,
    event_id: Uuid,
    ttl_seconds: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO consumer_checkpoints (consumer_name, event_id, expires_at)
         VALUES ($1, $2, now() + ($3 * interval '1 second'))
         ON CONFLICT (consumer_name, event_id) DO UPDATE SET expires_at = EXCLUDED.expires_at",
    )
    .bind(consumer_name)
    .bind(event_id)
    .bind(ttl_seconds)
    .execute(pool)
    .await?;
    Ok(())
}
