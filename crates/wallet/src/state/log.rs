//! Append-only operation log shown to the user, newest entries last.

use crate::db;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

pub const MAX_LOG_ITEMS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogVariant {
    Success,
    Error,
    Muted,
}

impl LogVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            LogVariant::Success => "success",
            LogVariant::Error => "error",
            LogVariant::Muted => "muted",
        }
    }
}

impl fmt::Display for LogVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(LogVariant::Success),
            "error" => Ok(LogVariant::Error),
            "muted" => Ok(LogVariant::Muted),
            other => Err(format!("unknown log variant: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationLogEntry {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub variant: LogVariant,
    pub created_at: DateTime<Utc>,
}

impl OperationLogEntry {
    pub fn new(title: impl Into<String>, content: impl Into<String>, variant: LogVariant) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            variant,
            created_at: Utc::now(),
        }
    }
}

/// Bounded in memory, optionally mirrored to Postgres. A failed write to the
/// database is logged and never fails the operation being recorded.
#[derive(Debug, Default)]
pub struct OperationLog {
    entries: RwLock<VecDeque<OperationLogEntry>>,
    db: Option<PgPool>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persisting log, hydrated with the most recent stored entries.
    pub async fn with_database(pool: PgPool) -> anyhow::Result<Self> {
        db::ensure_schema(&pool).await?;
        let recent = db::load_recent_log_entries(&pool, MAX_LOG_ITEMS).await?;
        Ok(Self {
            entries: RwLock::new(recent.into()),
            db: Some(pool),
        })
    }

    pub async fn append(&self, entry: OperationLogEntry) {
        if let Some(pool) = &self.db {
            if let Err(e) = db::insert_log_entry(pool, &entry).await {
                warn!(error = %e, "failed to persist log entry");
            }
        }

        let mut entries = self.entries.write().await;
        entries.push_back(entry);
        while entries.len() > MAX_LOG_ITEMS {
            entries.pop_front();
        }
    }

    pub async fn success(&self, title: impl Into<String>, content: impl Into<String>) {
        self.append(OperationLogEntry::new(title, content, LogVariant::Success))
            .await;
    }

    pub async fn error(&self, title: impl Into<String>, content: impl Into<String>) {
        self.append(OperationLogEntry::new(title, content, LogVariant::Error))
            .await;
    }

    pub async fn muted(&self, title: impl Into<String>, content: impl Into<String>) {
        self.append(OperationLogEntry::new(title, content, LogVariant::Muted))
            .await;
    }

    pub async fn entries(&self) -> Vec<OperationLogEntry> {
        self.entries.read().await.iter().cloned().collect()
    }
}
