//! Seed signatures for deterministic confidential key derivation.
//!
//! The backend re-derives the same ElGamal keypair and AE key on every call
//! from a wallet signature over a fixed message. The message must never
//! change: a different message yields different keys and strands any balance
//! encrypted under the old ones.

use crate::error::WalletError;
use crate::wallet::{WalletAdapter, require_message_signer};
use base64::{Engine, engine::general_purpose::STANDARD};
use solana_signature::Signature;
use tracing::debug;

pub const ELGAMAL_SEED_MESSAGE: &[u8] = b"ElGamalSecretKey";
pub const AES_SEED_MESSAGE: &[u8] = b"AeKey";

/// The public seed is empty, matching the spl-token CLI key derivation.
const EMPTY_PUBLIC_SEED: &[u8] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPurpose {
    ElGamal,
    Aes,
}

impl SeedPurpose {
    pub fn message(self) -> &'static [u8] {
        match self {
            SeedPurpose::ElGamal => ELGAMAL_SEED_MESSAGE,
            SeedPurpose::Aes => AES_SEED_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSignature {
    pub purpose: SeedPurpose,
    pub signature: Signature,
}

impl SeedSignature {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.signature.as_ref())
    }
}

/// Both seed signatures a confidential operation sends to the backend.
#[derive(Debug, Clone, Copy)]
pub struct SeedSignatures {
    pub elgamal: SeedSignature,
    pub aes: SeedSignature,
}

pub fn seed_signature_message(message: &[u8]) -> Vec<u8> {
    [message, EMPTY_PUBLIC_SEED].concat()
}

pub async fn generate_seed_signature(
    wallet: &dyn WalletAdapter,
    purpose: SeedPurpose,
) -> Result<SeedSignature, WalletError> {
    require_message_signer(wallet)?;

    let message = seed_signature_message(purpose.message());
    debug!(?purpose, message_len = message.len(), "requesting seed signature");

    let signature = wallet.sign_message(&message).await?;
    Ok(SeedSignature { purpose, signature })
}

/// ElGamal first, then AES, as two separate wallet prompts.
pub async fn generate_seed_signatures(
    wallet: &dyn WalletAdapter,
) -> Result<SeedSignatures, WalletError> {
    let elgamal = generate_seed_signature(wallet, SeedPurpose::ElGamal).await?;
    let aes = generate_seed_signature(wallet, SeedPurpose::Aes).await?;
    Ok(SeedSignatures { elgamal, aes })
}
