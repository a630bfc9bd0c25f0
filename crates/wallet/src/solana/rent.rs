//! Rent for the ephemeral proof context accounts a withdraw or transfer
//! creates. Sizes come from the backend and can change with protocol
//! updates, so rent is always recomputed per operation.

use crate::error::WalletError;
use crate::solana::connection::RpcConnection;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProofKind {
    Equality,
    CiphertextValidity,
    Range,
}

impl ProofKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProofKind::Equality => "equality",
            ProofKind::CiphertextValidity => "ciphertext_validity",
            ProofKind::Range => "range",
        }
    }
}

impl fmt::Display for ProofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof kind to account size in bytes.
pub type ProofSpaces = BTreeMap<ProofKind, usize>;

/// Proof kind to rent-exempt lamports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RentSchedule(BTreeMap<ProofKind, u64>);

impl RentSchedule {
    pub fn get(&self, kind: ProofKind) -> Option<u64> {
        self.0.get(&kind).copied()
    }

    /// Lamports for `kind` as the decimal string the backend expects.
    pub fn require(&self, kind: ProofKind) -> Result<String, WalletError> {
        self.get(kind).map(|lamports| lamports.to_string()).ok_or_else(|| {
            WalletError::backend(
                "proof space",
                format!("backend did not report a size for the {kind} proof account"),
            )
        })
    }
}

/// One independent rent-exemption query per proof account. Any RPC failure
/// aborts: an unfunded proof account would fail on submission anyway.
pub async fn compute_rent(
    connection: &dyn RpcConnection,
    spaces: &ProofSpaces,
) -> Result<RentSchedule, WalletError> {
    let mut schedule = BTreeMap::new();
    for (kind, space) in spaces {
        let lamports = connection
            .get_minimum_balance_for_rent_exemption(*space)
            .await?;
        info!(proof = %kind, space, lamports, "proof account rent");
        schedule.insert(*kind, lamports);
    }
    Ok(RentSchedule(schedule))
}
