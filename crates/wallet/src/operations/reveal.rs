use crate::backend::{
    self, Endpoint,
    models::{RevealElGamalRequest, RevealElGamalResponse},
};
use crate::error::WalletError;
use crate::operations::{OperationContext, recorded};
use crate::solana::seed::SeedPurpose;
use crate::wallet::require_connected;

const TITLE: &str = "ElGamal Key Generation";

/// The ElGamal public key the backend derives from the wallet's seed
/// signature.
pub async fn reveal_elgamal_pubkey(ctx: &OperationContext) -> Result<String, WalletError> {
    recorded(
        ctx,
        TITLE,
        || "ElGamal public key reveal failed".to_string(),
        async {
            let owner = require_connected(ctx.wallet.as_ref())?;
            let elgamal = ctx.seed_signature(SeedPurpose::ElGamal).await?;

            let response: RevealElGamalResponse = backend::post(
                ctx.backend.as_ref(),
                Endpoint::RevealElGamalPubkey,
                &RevealElGamalRequest {
                    elgamal_signature: elgamal.to_base64(),
                },
            )
            .await?;

            ctx.log
                .success(
                    format!("{TITLE} - COMPLETE"),
                    format!("Wallet: {owner}\n  ElGamal pubkey: {}", response.pubkey),
                )
                .await;
            Ok(response.pubkey)
        },
    )
    .await
}
