use solana_pubkey::Pubkey;
use solana_signature::Signature;
use std::fmt;
use thiserror::Error;

/// Largest integer a JavaScript-backed UI can represent without loss (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Wallet does not support message signing")]
    WalletSigningUnavailable,

    #[error("Message signing failed: {0}")]
    MessageSigning(Box<WalletError>),

    #[error("wallet rejected the request: {0}")]
    WalletRejected(String),

    #[error("{label} account not found: {address}")]
    AccountNotFound { label: &'static str, address: Pubkey },

    #[error("backend request to {endpoint} failed: {message}")]
    Backend { endpoint: String, message: String },

    #[error("Transaction simulation failed: {error}")]
    SimulationFailed { error: String, logs: Vec<String> },

    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    #[error(transparent)]
    BundleAborted(#[from] BundleFailure),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl WalletError {
    pub fn backend(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// True when the failure happened while obtaining seed signatures.
    pub fn is_message_signing_failure(&self) -> bool {
        matches!(
            self,
            WalletError::MessageSigning(_) | WalletError::WalletSigningUnavailable
        )
    }

    /// Signatures that landed on-chain before a bundle stopped. Empty for
    /// every other failure.
    pub fn confirmed_signatures(&self) -> &[Signature] {
        match self {
            WalletError::BundleAborted(failure) => &failure.confirmed,
            _ => &[],
        }
    }

    /// Follows `MessageSigning` and `BundleAborted` wrappers down to the error
    /// that actually stopped the operation.
    pub fn root_cause(&self) -> &WalletError {
        match self {
            WalletError::MessageSigning(inner) => inner.root_cause(),
            WalletError::BundleAborted(failure) => failure.cause.root_cause(),
            other => other,
        }
    }
}

impl From<solana_client::client_error::ClientError> for WalletError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        WalletError::Rpc(err.to_string())
    }
}

/// A multi-transaction bundle stopped at `failed_index`.
///
/// Transactions `0..failed_index` are already confirmed on-chain and their
/// signatures are kept in `confirmed`; nothing from `failed_index` onward was
/// submitted. There is no on-chain rollback for the confirmed prefix.
#[derive(Debug, Error)]
pub struct BundleFailure {
    pub label: String,
    pub failed_index: usize,
    pub total: usize,
    pub confirmed: Vec<Signature>,
    #[source]
    pub cause: Box<WalletError>,
}

impl fmt::Display for BundleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} aborted at transaction {} of {} ({} confirmed",
            self.label,
            self.failed_index + 1,
            self.total,
            self.confirmed.len(),
        )?;
        for (i, signature) in self.confirmed.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{sep}{signature}")?;
        }
        write!(f, "): {}", self.cause)
    }
}

/// A raw token amount above [`MAX_SAFE_INTEGER`]. Logged, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecisionWarning {
    pub amount: u64,
}

impl PrecisionWarning {
    pub fn check(amount: u64) -> Option<Self> {
        (amount > MAX_SAFE_INTEGER).then_some(Self { amount })
    }
}

impl fmt::Display for PrecisionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "amount {} exceeds the safe integer range ({}); UI displays may lose precision",
            self.amount, MAX_SAFE_INTEGER
        )
    }
}
