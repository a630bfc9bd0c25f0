//! User-facing notifications: one per landed transaction with an explorer
//! link, plus a success or error summary per operation.

use crate::config::Cluster;
use chrono::{DateTime, Utc};
use serde::Serialize;
use solana_signature::Signature;
use std::collections::VecDeque;
use tokio::sync::RwLock;
use uuid::Uuid;

const MAX_NOTIFICATIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Transaction,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub description: Option<String>,
    pub explorer_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct Notifier {
    cluster: Cluster,
    recent: RwLock<VecDeque<Notification>>,
}

impl Notifier {
    pub fn new(cluster: Cluster) -> Self {
        Self {
            cluster,
            recent: RwLock::new(VecDeque::new()),
        }
    }

    pub async fn transaction(&self, signature: &Signature) {
        let signature = signature.to_string();
        let explorer_url = self.cluster.explorer_tx_url(&signature);
        self.push(NotificationKind::Transaction, "Transaction sent", Some(signature), Some(explorer_url))
            .await;
    }

    pub async fn success(&self, title: impl Into<String>, description: Option<String>) {
        self.push(NotificationKind::Success, title, description, None)
            .await;
    }

    pub async fn error(&self, title: impl Into<String>, description: impl Into<String>) {
        self.push(NotificationKind::Error, title, Some(description.into()), None)
            .await;
    }

    pub async fn recent(&self) -> Vec<Notification> {
        self.recent.read().await.iter().cloned().collect()
    }

    async fn push(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        description: Option<String>,
        explorer_url: Option<String>,
    ) {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            description,
            explorer_url,
            created_at: Utc::now(),
        };

        let mut recent = self.recent.write().await;
        recent.push_back(notification);
        while recent.len() > MAX_NOTIFICATIONS {
            recent.pop_front();
        }
    }
}
