use sqlx::PgPool;
use uuid::Uuid;

use crate::models::SuggestionStrategyConfig;

/// The suggestion strategy a user has configured for the rule engine, or
/// `AllMatches` if they've never set one.
pub async fn fetch_strategy(pool: &PgPool, user_id: Uuid) -> Result<SuggestionStrategyConfig, sqlx::Error> {
    let row = sqlx::query_scalar::<_, sqlx::types::Json<SuggestionStrategyConfig>>(
        "SELECT suggestion_strategy FROM user_settings WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|json| json.0).unwrap_or_default())
}

pub async fn set_strategy(
    pool: &PgPool,
    user_id: Uuid,
    strategy: SuggestionStrategyConfig,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_settings (user_id, suggestion_strategy)
         VALUES ($1, $2)
         ON CONFLICT (user_id) DO UPDATE SET suggestion_strategy = EXCLUDED.suggestion_strategy",
    )
    .bind(user_id)
    .bind(sqlx::types::Json(strategy))
    .execute(pool)
    .await?;
    Ok(())
}
