use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Account, CreateAccount};

const COLUMNS: &str = "account_id, user_id, account_name, account_type, institution, balance, \
    currency, is_active, default_file_map_id, last_transaction_date, created_at, updated_at";

pub async fn fetch_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(&format!(
        "SELECT {COLUMNS} FROM accounts WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(
    pool: &PgPool,
    user_id: Uuid,
    account_id: Uuid,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(&format!(
        "SELECT {COLUMNS} FROM accounts WHERE user_id = $1 AND account_id = $2"
    ))
    .bind(user_id)
    .bind(account_id)
    .fetch_optional(pool)
    .await
}

pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateAccount) -> Result<Account, sqlx::Error> {
    let account = Account::new(user_id, input);
    sqlx::query_as::<_, Account>(&format!(
        "INSERT INTO accounts ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
         RETURNING {COLUMNS}"
    ))
    .bind(account.account_id)
    .bind(account.user_id)
    .bind(account.account_name)
    .bind(account.account_type)
    .bind(account.institution)
    .bind(account.balance)
    .bind(account.currency)
    .bind(account.is_active)
    .bind(account.default_file_map_id)
    .bind(account.last_transaction_date)
    .bind(account.created_at)
    .bind(account.updated_at)
    .fetch_one(pool)
    .await
}

/// Advances `balance`/`last_transaction_date` after a file is processed;
/// called once per ingested file rather than per transaction.
pub async fn apply_balance_delta(
    pool: &PgPool,
    user_id: Uuid,
    account_id: Uuid,
    new_balance: &bigdecimal::BigDecimal,
    last_transaction_date: chrono::DateTime<chrono::Utc>,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(&format!(
        "UPDATE accounts
         SET balance = $3, last_transaction_date = $4, updated_at = now()
         WHERE user_id = $1 AND account_id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(user_id)
    .bind(account_id)
    .bind(new_balance)
    .bind(last_transaction_date)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, user_id: Uuid, account_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM accounts WHERE user_id = $1 AND account_id = $2")
        .bind(user_id)
        .bind(account_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
