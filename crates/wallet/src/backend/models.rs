//! Request and response bodies for every proof backend endpoint.
//!
//! Amounts and lamports travel as decimal strings; binary payloads
//! (signatures, account data, transactions) as standard base64.

use crate::error::WalletError;
use crate::solana::rent::{ProofKind, ProofSpaces};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use solana_pubkey::Pubkey;

/// The backend expects some addresses as base64 of the base58 text rather
/// than of the raw key bytes.
pub fn base64_of_base58(pubkey: &Pubkey) -> String {
    STANDARD.encode(pubkey.to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateConfidentialAccountRequest {
    pub mint: String,
    pub ata_authority: String,
    pub elgamal_signature: String,
    pub aes_signature: String,
    pub latest_blockhash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepositRequest {
    pub token_account_data: String,
    pub lamport_amount: String,
    pub mint_decimals: u8,
    pub latest_blockhash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyRequest {
    pub ata_authority: String,
    pub elgamal_signature: String,
    pub aes_signature: String,
    pub token_account_data: String,
    pub latest_blockhash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawRequest {
    pub elgamal_signature: String,
    pub aes_signature: String,
    pub recipient_token_account: String,
    pub mint_account_info: String,
    pub withdraw_amount_lamports: String,
    pub latest_blockhash: String,
    pub equality_proof_rent: String,
    pub range_proof_rent: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferRequest {
    pub elgamal_signature: String,
    pub aes_signature: String,
    pub sender_token_account: String,
    pub recipient_token_account: String,
    pub mint_token_account: String,
    pub amount: String,
    pub priority_fee: String,
    pub latest_blockhash: String,
    pub equality_proof_rent: String,
    pub ciphertext_validity_proof_rent: String,
    pub range_proof_rent: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecryptRequest {
    pub aes_signature: String,
    pub token_account_data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevealElGamalRequest {
    pub elgamal_signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditRequest {
    pub transaction_signature: String,
    pub transaction_data: String,
    pub elgamal_signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTestTokenRequest {
    pub account: String,
    pub mint: String,
}

/// Single transaction built by the backend, base64 encoded. Any other
/// field the backend sends (a status message, a mint address) is kept in
/// `extra` and handed back with the operation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub transaction: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ordered bundle that must be submitted one after another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionBundleResponse {
    pub transactions: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WithdrawProofSpace {
    pub equality_proof_space: usize,
    pub range_proof_space: usize,
}

impl From<WithdrawProofSpace> for ProofSpaces {
    fn from(space: WithdrawProofSpace) -> Self {
        ProofSpaces::from([
            (ProofKind::Equality, space.equality_proof_space),
            (ProofKind::Range, space.range_proof_space),
        ])
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransferProofSpace {
    pub equality_proof_space: usize,
    pub ciphertext_validity_proof_space: usize,
    pub range_proof_space: usize,
}

impl From<TransferProofSpace> for ProofSpaces {
    fn from(space: TransferProofSpace) -> Self {
        ProofSpaces::from([
            (ProofKind::Equality, space.equality_proof_space),
            (
                ProofKind::CiphertextValidity,
                space.ciphertext_validity_proof_space,
            ),
            (ProofKind::Range, space.range_proof_space),
        ])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    /// Raw base units.
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealElGamalResponse {
    pub pubkey: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResponse {
    pub amount: String,
    pub mint: String,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuditResponse {
    pub fn mint_pubkey(&self) -> Result<Pubkey, WalletError> {
        self.mint.parse().map_err(|_| {
            WalletError::backend(
                "/audit-transaction",
                format!("invalid mint address: {}", self.mint),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base64_of_base58_encodes_the_text() {
        let pubkey = Pubkey::new_unique();
        let decoded = STANDARD.decode(base64_of_base58(&pubkey)).unwrap();
        assert_eq!(decoded, pubkey.to_string().into_bytes());
    }

    #[test]
    fn test_transfer_proof_space_covers_three_kinds() {
        let space: TransferProofSpace = serde_json::from_value(json!({
            "equality_proof_space": 100,
            "ciphertext_validity_proof_space": 200,
            "range_proof_space": 300,
        }))
        .unwrap();
        let spaces = ProofSpaces::from(space);
        assert_eq!(spaces.len(), 3);
        assert_eq!(spaces[&ProofKind::CiphertextValidity], 200);
    }

    #[test]
    fn test_audit_response_optional_fields() {
        let response: AuditResponse = serde_json::from_value(json!({
            "amount": "1500",
            "mint": Pubkey::new_unique().to_string(),
        }))
        .unwrap();
        assert!(response.sender.is_none());
        assert!(response.mint_pubkey().is_ok());

        let bad = AuditResponse {
            mint: "not-a-key".to_string(),
            ..response
        };
        assert!(matches!(
            bad.mint_pubkey(),
            Err(WalletError::Backend { .. })
        ));
    }

    #[test]
    fn test_deposit_request_amount_is_a_string() {
        let body = serde_json::to_value(DepositRequest {
            token_account_data: String::new(),
            lamport_amount: "2500000000".to_string(),
            mint_decimals: 9,
            latest_blockhash: String::new(),
        })
        .unwrap();
        assert_eq!(body["lamport_amount"], json!("2500000000"));
        assert_eq!(body["mint_decimals"], json!(9));
    }
}
