use sqlx::PgPool;
use uuid::Uuid;

/// Marks a user's analytic as stale. Analytics computation itself is out of
/// scope; this only records that a recompute is owed.
pub async fn mark_dirty(pool: &PgPool, user_id: Uuid, analytic_type: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO analytics_status (user_id, analytic_type, computation_needed, marked_dirty_at)
         VALUES ($1, $2, true, now())
         ON CONFLICT (user_id, analytic_type)
         DO UPDATE SET computation_needed = true, marked_dirty_at = now()",
    )
    .bind(user_id)
    .bind(analytic_type)
    .execute(pool)
    .await?;
    Ok(())
}
