//! Whether a token account's decrypted confidential balance is on screen.
//!
//! Hidden is the default. Decrypting shows it; an explicit hide, or any
//! apply, withdraw or transfer, hides it again since the shown amount is no
//! longer current.

use crate::state::cache::{CacheKey, QueryCache, QueryKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use solana_pubkey::Pubkey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptedBalance {
    /// Raw base units as returned by the backend.
    pub amount: String,
    pub ui_amount: String,
    pub decimals: u8,
}

fn visibility_key(endpoint: &str, account: &Pubkey) -> CacheKey {
    CacheKey::new(QueryKind::ConfidentialVisibility, endpoint, *account)
}

fn balance_key(endpoint: &str, account: &Pubkey) -> CacheKey {
    CacheKey::new(QueryKind::ConfidentialBalance, endpoint, *account)
}

pub async fn is_visible(cache: &QueryCache, endpoint: &str, account: &Pubkey) -> bool {
    cache
        .get(&visibility_key(endpoint, account))
        .await
        .and_then(|entry| entry.value.as_bool())
        .unwrap_or(false)
}

/// The last decrypted balance, only while it is visible.
pub async fn visible_balance(
    cache: &QueryCache,
    endpoint: &str,
    account: &Pubkey,
) -> Option<DecryptedBalance> {
    if !is_visible(cache, endpoint, account).await {
        return None;
    }
    let entry = cache.get(&balance_key(endpoint, account)).await?;
    serde_json::from_value(entry.value).ok()
}

pub async fn show(cache: &QueryCache, endpoint: &str, account: &Pubkey, balance: &DecryptedBalance) {
    let value = serde_json::to_value(balance).unwrap_or(Value::Null);
    cache.set_value(balance_key(endpoint, account), value).await;
    cache
        .set_value(visibility_key(endpoint, account), Value::Bool(true))
        .await;
}

pub async fn hide(cache: &QueryCache, endpoint: &str, account: &Pubkey) {
    cache
        .set_value(visibility_key(endpoint, account), Value::Bool(false))
        .await;
}
