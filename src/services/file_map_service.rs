use sqlx::PgPool;
use uuid::Uuid;

use crate::db::file_map_queries;
use crate::errors::AppError;
use crate::models::{CreateFileMap, FileMap};

pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<FileMap>, AppError> {
    Ok(file_map_queries::fetch_all(pool, user_id).await?)
}

pub async fn get(pool: &PgPool, user_id: Uuid, file_map_id: Uuid) -> Result<FileMap, AppError> {
    file_map_queries::fetch_one(pool, user_id, file_map_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("file map {file_map_id} not found")))
}

pub async fn create(pool: &PgPool, user_id: Uuid, input: CreateFileMap) -> Result<FileMap, AppError> {
    Ok(file_map_queries::create(pool, user_id, input).await?)
}

pub async fn delete(pool: &PgPool, user_id: Uuid, file_map_id: Uuid) -> Result<(), AppError> {
    let rows = file_map_queries::delete(pool, user_id, file_map_id).await?;
    if rows == 0 {
        return Err(AppError::NotFound(format!("file map {file_map_id} not found")));
    }
    Ok(())
}
