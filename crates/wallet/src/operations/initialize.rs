use crate::backend::{
    self, Endpoint,
    models::{CreateConfidentialAccountRequest, TransactionResponse, base64_of_base58},
};
use crate::error::WalletError;
use crate::operations::{OperationContext, OperationResult, recorded};
use crate::wallet::require_connected;
use solana_pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address_with_program_id;

const TITLE: &str = "Initialize";

/// Create the wallet's associated token account for `mint`, configured for
/// confidential transfers with keys derived from the seed signatures.
pub async fn initialize_account(
    ctx: &OperationContext,
    mint: Pubkey,
) -> Result<OperationResult, WalletError> {
    recorded(
        ctx,
        TITLE,
        || format!("Account initialization failed\n  Mint: {mint}"),
        async {
            let owner = require_connected(ctx.wallet.as_ref())?;
            let seeds = ctx.seed_signatures().await?;
            let latest = ctx.connection.get_latest_blockhash().await?;

            let request = CreateConfidentialAccountRequest {
                mint: base64_of_base58(&mint),
                ata_authority: base64_of_base58(&owner),
                elgamal_signature: seeds.elgamal.to_base64(),
                aes_signature: seeds.aes.to_base64(),
                latest_blockhash: latest.blockhash.to_string(),
            };
            let response: TransactionResponse = backend::post(
                ctx.backend.as_ref(),
                Endpoint::CreateConfidentialAccount,
                &request,
            )
            .await?;

            let signature = ctx.send_single(&response.transaction, TITLE, &[]).await?;
            let token_account =
                get_associated_token_address_with_program_id(&owner, &mint, &spl_token_2022::id());

            ctx.record_success(
                TITLE,
                "Account initialize txn created",
                format!(
                    "Confidential token account created\n  Owner: {owner}\n  Mint: {mint}\n  Token account: {token_account}\n  Signature: {signature}"
                ),
                &[signature],
            )
            .await;
            ctx.invalidate_balances(&owner).await;

            let mut result = OperationResult::new(
                vec![signature],
                serde_json::to_value(&response).unwrap_or_default(),
            );
            result.token_account = Some(token_account);
            result.mint = Some(mint);
            Ok(result)
        },
    )
    .await
}
