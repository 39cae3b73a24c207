use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateFileMap, FileMap};

const COLUMNS: &str = "file_map_id, user_id, name, mappings, created_at";

pub async fn fetch_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<FileMap>, sqlx::Error> {
    sqlx::query_as::<_, FileMap>(&format!(
        "SELECT {COLUMNS} FROM file_maps WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(
    pool: &PgPool,
    user_id: Uuid,
    file_map_id: Uuid,
) -> Result<Option<FileMap>, sqlx::Error> {
    sqlx::query_as::<_, FileMap>(&format!(
        "SELECT {COLUMNS} FROM file_maps WHERE user_id = $1 AND file_map_id = $2"
    ))
    .bind(user_id)
    .bind(file_map_id)
    .fetch_optional(pool)
    .await
}

pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateFileMap) -> Result<FileMap, sqlx::Error> {
    let file_map = FileMap::new(user_id, input);
    sqlx::query_as::<_, FileMap>(&format!(
        "INSERT INTO file_maps ({COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
    ))
    .bind(file_map.file_map_id)
    .bind(file_map.user_id)
    .bind(file_map.name)
    .bind(file_map.mappings)
    .bind(file_map.created_at)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, user_id: Uuid, file_map_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM file_maps WHERE user_id = $1 AND file_map_id = $2")
        .bind(user_id)
        .bind(file_map_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
