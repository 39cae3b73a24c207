use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Category, CreateCategory};

const COLUMNS: &str = "category_id, user_id, name, category_type, parent_category_id, \
    inherit_parent_rules, rule_inheritance_mode, rules, icon, color, created_at, updated_at";

pub async fn fetch_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories WHERE user_id = $1 ORDER BY name ASC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(
    pool: &PgPool,
    user_id: Uuid,
    category_id: Uuid,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories WHERE user_id = $1 AND category_id = $2"
    ))
    .bind(user_id)
    .bind(category_id)
    .fetch_optional(pool)
    .await
}

pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateCategory) -> Result<Category, sqlx::Error> {
    let category = Category::new(user_id, input);
    sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
         RETURNING {COLUMNS}"
    ))
    .bind(category.category_id)
    .bind(category.user_id)
    .bind(category.name)
    .bind(category.category_type)
    .bind(category.parent_category_id)
    .bind(category.inherit_parent_rules)
    .bind(category.rule_inheritance_mode)
    .bind(category.rules)
    .bind(category.icon)
    .bind(category.color)
    .bind(category.created_at)
    .bind(category.updated_at)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, user_id: Uuid, category_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE user_id = $1 AND category_id = $2")
        .bind(user_id)
        .bind(category_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
