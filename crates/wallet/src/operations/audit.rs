use crate::backend::{
    self, Endpoint,
    models::{AuditRequest, AuditResponse},
};
use crate::error::WalletError;
use crate::operations::{OperationContext, recorded};
use crate::solana::amount::calculate_ui_amount;
use crate::solana::mint::fetch_mint_decimals;
use crate::solana::seed::SeedPurpose;
use crate::solana::transaction::encode_transaction;
use crate::wallet::require_connected;
use serde::Serialize;
use solana_signature::Signature;

const TITLE: &str = "Audit";

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub signature: String,
    pub ui_amount: String,
    pub decimals: u8,
    #[serde(flatten)]
    pub response: AuditResponse,
}

/// Have the backend decrypt the confidential amount moved by a confirmed
/// transaction, using the wallet's ElGamal key.
pub async fn audit_transaction(
    ctx: &OperationContext,
    signature: Signature,
) -> Result<AuditReport, WalletError> {
    recorded(
        ctx,
        TITLE,
        || format!("Audit failed\n  Signature: {signature}"),
        async {
            require_connected(ctx.wallet.as_ref())?;
            let elgamal = ctx.seed_signature(SeedPurpose::ElGamal).await?;

            let transaction = ctx.connection.get_transaction(&signature).await?;
            let request = AuditRequest {
                transaction_signature: signature.to_string(),
                transaction_data: encode_transaction(&transaction)?,
                elgamal_signature: elgamal.to_base64(),
            };
            let response: AuditResponse =
                backend::post(ctx.backend.as_ref(), Endpoint::AuditTransaction, &request).await?;

            let mint = response.mint_pubkey()?;
            let decimals = fetch_mint_decimals(ctx.connection.as_ref(), &mint).await?;
            let ui_amount = calculate_ui_amount(&response.amount, decimals)?;

            let mut content = format!("Signature: {signature}\n  Mint: {mint}\n  Amount: {ui_amount}");
            if let Some(sender) = &response.sender {
                content.push_str(&format!("\n  Sender: {sender}"));
            }
            if let Some(receiver) = &response.receiver {
                content.push_str(&format!("\n  Receiver: {receiver}"));
            }
            if let Some(message) = &response.message {
                content.push_str(&format!("\n  {message}"));
            }
            ctx.log
                .success(format!("{TITLE} Operation - COMPLETE"), content)
                .await;

            Ok(AuditReport {
                signature: signature.to_string(),
                ui_amount,
                decimals,
                response,
            })
        },
    )
    .await
}
