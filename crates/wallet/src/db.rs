use crate::state::log::{LogVariant, OperationLogEntry};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, prelude::FromRow};
use tracing::{error, info};
use uuid::Uuid;

pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS operation_log (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            variant TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("[DB] operation_log table ready");
    Ok(())
}

pub async fn insert_log_entry(pool: &PgPool, entry: &OperationLogEntry) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO operation_log (
            id,
            title,
            content,
            variant,
            created_at
        )
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(entry.id)
    .bind(&entry.title)
    .bind(&entry.content)
    .bind(entry.variant.as_str())
    .bind(entry.created_at)
    .execute(pool)
    .await
    .map_err(|e| {
        error!("[DB] insert_log_entry failed: {}", e);
        e
    })?;

    Ok(())
}

#[derive(Debug, FromRow)]
pub struct OperationLogRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub variant: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OperationLogRow> for OperationLogEntry {
    type Error = anyhow::Error;

    fn try_from(row: OperationLogRow) -> Result<Self, Self::Error> {
        Ok(OperationLogEntry {
            id: row.id,
            title: row.title,
            content: row.content,
            variant: row
                .variant
                .parse::<LogVariant>()
                .map_err(|e| anyhow::anyhow!("Failed to parse log variant: {}", e))?,
            created_at: row.created_at,
        })
    }
}

/// Most recent `limit` entries, oldest first.
pub async fn load_recent_log_entries(pool: &PgPool, limit: usize) -> Result<Vec<OperationLogEntry>> {
    let rows = sqlx::query_as::<_, OperationLogRow>(
        r#"
        SELECT *
        FROM (
            SELECT id, title, content, variant, created_at
            FROM operation_log
            ORDER BY created_at DESC
            LIMIT $1
        ) recent
        ORDER BY created_at ASC
        "#,
    )
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    info!("[DB] load_recent_log_entries - found {} entries", rows.len());

    rows.into_iter()
        .map(OperationLogEntry::try_from)
        .collect::<Result<Vec<_>>>()
}
