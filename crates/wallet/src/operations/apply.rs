use crate::backend::{
    self, Endpoint,
    models::{ApplyRequest, TransactionResponse, base64_of_base58},
};
use crate::error::WalletError;
use crate::operations::{OperationContext, OperationResult, recorded};
use crate::solana::connection::require_account;
use crate::state::visibility;
use crate::wallet::require_connected;
use base64::{Engine, engine::general_purpose::STANDARD};
use solana_pubkey::Pubkey;

const TITLE: &str = "Apply";

/// Fold the pending balance of `token_account` into its available balance.
pub async fn apply(
    ctx: &OperationContext,
    token_account: Pubkey,
) -> Result<OperationResult, WalletError> {
    recorded(
        ctx,
        TITLE,
        || format!("Apply pending balance failed\n  Token account: {token_account}"),
        async {
            let owner = require_connected(ctx.wallet.as_ref())?;
            let seeds = ctx.seed_signatures().await?;

            let account = require_account(ctx.connection.as_ref(), &token_account, "Token").await?;
            let latest = ctx.connection.get_latest_blockhash().await?;

            let request = ApplyRequest {
                ata_authority: base64_of_base58(&owner),
                elgamal_signature: seeds.elgamal.to_base64(),
                aes_signature: seeds.aes.to_base64(),
                token_account_data: STANDARD.encode(&account.data),
                latest_blockhash: latest.blockhash.to_string(),
            };
            let response: TransactionResponse =
                backend::post(ctx.backend.as_ref(), Endpoint::Apply, &request).await?;

            let signature = ctx.send_single(&response.transaction, TITLE, &[]).await?;

            ctx.record_success(
                TITLE,
                "Apply transaction successful",
                format!(
                    "Pending balance applied\n  Token account: {token_account}\n  Signature: {signature}"
                ),
                &[signature],
            )
            .await;

            let endpoint = ctx.rpc_endpoint();
            visibility::hide(&ctx.cache, &endpoint, &token_account).await;
            ctx.invalidate_balances(&token_account).await;
            ctx.pending.mark_applied(&token_account).await;

            let mut result = OperationResult::new(
                vec![signature],
                serde_json::to_value(&response).unwrap_or_default(),
            );
            result.token_account = Some(token_account);
            Ok(result)
        },
    )
    .await
}
