//! Shared query cache for on-chain reads.
//!
//! Entries are keyed by query kind, RPC endpoint and account so that
//! switching clusters never serves another cluster's data. Only
//! [`QueryCache::set_value`] and [`QueryCache::invalidate`] mutate the cache.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use solana_pubkey::Pubkey;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryKind {
    Balance,
    Signatures,
    TokenAccounts,
    TokenBalance,
    PendingBalance,
    ConfidentialVisibility,
    ConfidentialBalance,
}

/// Reads that change whenever a confidential operation lands.
pub const BALANCE_QUERIES: [QueryKind; 5] = [
    QueryKind::Balance,
    QueryKind::Signatures,
    QueryKind::TokenAccounts,
    QueryKind::TokenBalance,
    QueryKind::PendingBalance,
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: QueryKind,
    pub endpoint: String,
    pub account: Pubkey,
}

impl CacheKey {
    pub fn new(kind: QueryKind, endpoint: impl Into<String>, account: Pubkey) -> Self {
        Self {
            kind,
            endpoint: endpoint.into(),
            account,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: Value,
    pub stale: bool,
    pub updated_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Usable without a refetch: not invalidated and younger than `stale_time`.
    pub fn is_fresh(&self, stale_time: Duration) -> bool {
        if self.stale {
            return false;
        }
        let age = Utc::now().signed_duration_since(self.updated_at);
        age.to_std().map(|age| age < stale_time).unwrap_or(true)
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn set_value(&self, key: CacheKey, value: Value) {
        debug!(kind = ?key.kind, account = %key.account, "cache set");
        self.entries.write().await.insert(
            key,
            CacheEntry {
                value,
                stale: false,
                updated_at: Utc::now(),
            },
        );
    }

    /// Mark an entry stale so the next read refetches it. The last value
    /// stays readable in the meantime.
    pub async fn invalidate(&self, key: &CacheKey) {
        if let Some(entry) = self.entries.write().await.get_mut(key) {
            debug!(kind = ?key.kind, account = %key.account, "cache invalidated");
            entry.stale = true;
        }
    }

    pub async fn invalidate_kinds(&self, endpoint: &str, account: &Pubkey, kinds: &[QueryKind]) {
        for kind in kinds {
            self.invalidate(&CacheKey::new(*kind, endpoint, *account))
                .await;
        }
    }
}
