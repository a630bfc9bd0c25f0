//! Pending-balance flag per token account.
//!
//! Deposits and incoming transfers land in the pending balance, which must be
//! applied before it can be spent. The flag is read from chain, cached with a
//! short stale time, and refreshed in the background for watched accounts.

use crate::error::WalletError;
use crate::solana::connection::{RpcConnection, read_with_retry, require_account};
use crate::solana::pending::has_pending_balance;
use crate::state::cache::{CacheKey, QueryCache, QueryKind};
use serde_json::Value;
use solana_pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const PENDING_BALANCE_STALE_TIME: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct PendingBalanceTracker {
    cache: Arc<QueryCache>,
    connection: Arc<dyn RpcConnection>,
    stale_time: Duration,
}

impl PendingBalanceTracker {
    pub fn new(cache: Arc<QueryCache>, connection: Arc<dyn RpcConnection>) -> Self {
        Self {
            cache,
            connection,
            stale_time: PENDING_BALANCE_STALE_TIME,
        }
    }

    fn key(&self, token_account: &Pubkey) -> CacheKey {
        CacheKey::new(
            QueryKind::PendingBalance,
            self.connection.rpc_endpoint(),
            *token_account,
        )
    }

    /// Cached flag when fresh, otherwise a chain read.
    pub async fn has_pending_balance(&self, token_account: &Pubkey) -> Result<bool, WalletError> {
        if let Some(entry) = self.cache.get(&self.key(token_account)).await {
            if entry.is_fresh(self.stale_time) {
                if let Some(pending) = entry.value.as_bool() {
                    return Ok(pending);
                }
            }
        }
        self.refresh(token_account).await
    }

    pub async fn refresh(&self, token_account: &Pubkey) -> Result<bool, WalletError> {
        let connection = self.connection.as_ref();
        let account = read_with_retry("token account", || {
            require_account(connection, token_account, "Token")
        })
        .await?;
        let pending = has_pending_balance(&account.data)?;

        debug!(%token_account, pending, "pending balance refreshed");
        self.cache
            .set_value(self.key(token_account), Value::Bool(pending))
            .await;
        Ok(pending)
    }

    /// Apply just landed; assume the pending balance is empty until the next
    /// poll says otherwise.
    pub async fn mark_applied(&self, token_account: &Pubkey) {
        self.cache
            .set_value(self.key(token_account), Value::Bool(false))
            .await;
    }
}

/// Background task keeping the pending flag of watched accounts current.
pub struct PendingBalancePoller {
    tracker: PendingBalanceTracker,
    accounts: Vec<Pubkey>,
    poll_interval: Duration,
}

impl PendingBalancePoller {
    pub fn new(tracker: PendingBalanceTracker, accounts: Vec<Pubkey>) -> Self {
        Self {
            tracker,
            accounts,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run until `shutdown` is cancelled:
    /// ```rust,ignore
    /// tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            accounts = self.accounts.len(),
            "pending balance poller starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("pending balance poller shutting down");
                return;
            }

            self.poll_step().await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("pending balance poller shutting down");
                    return;
                }
            }
        }
    }

    async fn poll_step(&self) {
        for account in &self.accounts {
            match self.tracker.refresh(account).await {
                Ok(true) => info!(token_account = %account, "pending balance waiting to be applied"),
                Ok(false) => {}
                Err(e) => warn!(token_account = %account, error = %e, "pending balance poll failed"),
            }
        }
    }
}
