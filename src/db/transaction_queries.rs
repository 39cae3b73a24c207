use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{NewTransaction, Transaction as TransactionModel};

const COLUMNS: &str = "transaction_id, user_id, file_id, account_id, date, description, amount, \
    balance, currency, import_order, transaction_type, payee, memo, check_number, reference, \
    status, debit_or_credit, primary_category_id, categories, dedup_hash, created_at";

/// Conditional insert on `(user_id, account_id, dedup_hash)`. `Ok(None)` means
/// a duplicate already existed and was not inserted, unless `ignore_dup` is
/// set, in which case a fresh row is forced through with a random id suffix
/// folded into the hash so the unique index doesn't reject it.
pub async fn insert_if_new(
    pool: &PgPool,
    user_id: Uuid,
    file_id: Uuid,
    new: NewTransaction,
    ignore_dup: bool,
) -> Result<Option<TransactionModel>, sqlx::Error> {
    let mut transaction = TransactionModel::from_new(user_id, file_id, new);
    if ignore_dup {
        transaction.dedup_hash.extend_from_slice(transaction.transaction_id.as_bytes());
    }

    sqlx::query_as::<_, TransactionModel>(&format!(
        "INSERT INTO transactions ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
         ON CONFLICT (user_id, account_id, dedup_hash) DO NOTHING
         RETURNING {COLUMNS}"
    ))
    .bind(transaction.transaction_id)
    .bind(transaction.user_id)
    .bind(transaction.file_id)
    .bind(transaction.account_id)
    .bind(transaction.date)
    .bind(transaction.description)
    .bind(transaction.amount)
    .bind(transaction.balance)
    .bind(transaction.currency)
    .bind(transaction.import_order)
    .bind(transaction.transaction_type)
    .bind(transaction.payee)
    .bind(transaction.memo)
    .bind(transaction.check_number)
    .bind(transaction.reference)
    .bind(transaction.status)
    .bind(transaction.debit_or_credit)
    .bind(transaction.primary_category_id)
    .bind(transaction.categories)
    .bind(transaction.dedup_hash)
    .bind(transaction.created_at)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_by_account(
    pool: &PgPool,
    user_id: Uuid,
    account_id: Uuid,
    from: Option<chrono::DateTime<chrono::Utc>>,
    to: Option<chrono::DateTime<chrono::Utc>>,
    category_id: Option<Uuid>,
    cursor: Option<i32>,
    limit: i64,
) -> Result<Vec<TransactionModel>, sqlx::Error> {
    sqlx::query_as::<_, TransactionModel>(&format!(
        "SELECT {COLUMNS} FROM transactions
         WHERE user_id = $1 AND account_id = $2
           AND ($3::timestamptz IS NULL OR date >= $3)
           AND ($4::timestamptz IS NULL OR date <= $4)
           AND ($5::uuid IS NULL OR primary_category_id = $5)
           AND ($6::int IS NULL OR import_order > $6)
         ORDER BY import_order ASC
         LIMIT $7"
    ))
    .bind(user_id)
    .bind(account_id)
    .bind(from)
    .bind(to)
    .bind(category_id)
    .bind(cursor)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(
    pool: &PgPool,
    user_id: Uuid,
    transaction_id: Uuid,
) -> Result<Option<TransactionModel>, sqlx::Error> {
    sqlx::query_as::<_, TransactionModel>(&format!(
        "SELECT {COLUMNS} FROM transactions WHERE user_id = $1 AND transaction_id = $2"
    ))
    .bind(user_id)
    .bind(transaction_id)
    .fetch_optional(pool)
    .await
}

pub async fn update_categories(
    pool: &PgPool,
    user_id: Uuid,
    transaction_id: Uuid,
    categories: sqlx::types::Json<Vec<crate::models::CategoryAssignment>>,
    primary_category_id: Option<Uuid>,
) -> Result<Option<TransactionModel>, sqlx::Error> {
    sqlx::query_as::<_, TransactionModel>(&format!(
        "UPDATE transactions
         SET categories = $3, primary_category_id = $4
         WHERE user_id = $1 AND transaction_id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(user_id)
    .bind(transaction_id)
    .bind(categories)
    .bind(primary_category_id)
    .fetch_optional(pool)
    .await
}

/// Clears every non-manual assignment for a user, optionally scoped to one
/// account, so `reset_and_reapply` can rerun the rule engine cleanly. Manual
/// entries in the `categories` array are kept, and `primary_category_id` is
/// only cleared if it pointed at a category that got dropped.
pub async fn clear_non_manual_categories(
    pool: &PgPool,
    user_id: Uuid,
    account_id: Option<Uuid>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE transactions
         SET categories = COALESCE(
                 (SELECT jsonb_agg(elem) FROM jsonb_array_elements(categories) elem
                  WHERE (elem->>'is_manual')::boolean),
                 '[]'::jsonb
             ),
             primary_category_id = CASE
                 WHEN EXISTS (
                     SELECT 1 FROM jsonb_array_elements(categories) elem
                     WHERE (elem->>'is_manual')::boolean
                       AND (elem->>'category_id')::uuid = primary_category_id
                 ) THEN primary_category_id
                 ELSE NULL
             END
         WHERE user_id = $1 AND ($2::uuid IS NULL OR account_id = $2)",
    )
    .bind(user_id)
    .bind(account_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Resumable cursor page for the bulk reset-and-reapply operation.
pub async fn fetch_page_after(
    pool: &PgPool,
    user_id: Uuid,
    account_id: Option<Uuid>,
    after: Option<Uuid>,
    page_size: i64,
) -> Result<Vec<TransactionModel>, sqlx::Error> {
    sqlx::query_as::<_, TransactionModel>(&format!(
        "SELECT {COLUMNS} FROM transactions
         WHERE user_id = $1
           AND ($2::uuid IS NULL OR account_id = $2)
           AND ($3::uuid IS NULL OR transaction_id > $3)
         ORDER BY transaction_id ASC
         LIMIT $4"
    ))
    .bind(user_id)
    .bind(account_id)
    .bind(after)
    .bind(page_size)
    .fetch_all(pool)
    .await
}

pub async fn delete_by_file(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    file_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM transactions WHERE user_id = $1 AND file_id = $2")
        .bind(user_id)
        .bind(file_id)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

pub async fn insert_in_transaction(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    file_id: Uuid,
    new: NewTransaction,
) -> Result<Option<TransactionModel>, sqlx::Error> {
    let transaction = TransactionModel::from_new(user_id, file_id, new);
    sqlx::query_as::<_, TransactionModel>(&format!(
        "INSERT INTO transactions ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
         ON CONFLICT (user_id, account_id, dedup_hash) DO NOTHING
         RETURNING {COLUMNS}"
    ))
    .bind(transaction.transaction_id)
    .bind(transaction.user_id)
    .bind(transaction.file_id)
    .bind(transaction.account_id)
    .bind(transaction.date)
    .bind(transaction.description)
    .bind(transaction.amount)
    .bind(transaction.balance)
    .bind(transaction.currency)
    .bind(transaction.import_order)
    .bind(transaction.transaction_type)
    .bind(transaction.payee)
    .bind(transaction.memo)
    .bind(transaction.check_number)
    .bind(transaction.reference)
    .bind(transaction.status)
    .bind(transaction.debit_or_credit)
    .bind(transaction.primary_category_id)
    .bind(transaction.categories)
    .bind(transaction.dedup_hash)
    .bind(transaction.created_at)
    .fetch_optional(&mut **tx)
    .await
}
