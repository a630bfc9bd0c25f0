use crate::backend::{
    self, Endpoint,
    models::{DecryptRequest, DecryptResponse},
};
use crate::error::WalletError;
use crate::operations::{OperationContext, recorded};
use crate::solana::amount::calculate_ui_amount;
use crate::solana::connection::require_account;
use crate::solana::mint::{fetch_mint_decimals, token_account_mint};
use crate::solana::seed::SeedPurpose;
use crate::state::visibility::{self, DecryptedBalance};
use crate::wallet::require_connected;
use base64::{Engine, engine::general_purpose::STANDARD};
use solana_pubkey::Pubkey;

const TITLE: &str = "Decrypt";

/// Decrypt the available confidential balance of `token_account` and make
/// it visible. Only the AES seed signature is needed.
pub async fn decrypt_balance(
    ctx: &OperationContext,
    token_account: Pubkey,
) -> Result<DecryptedBalance, WalletError> {
    recorded(
        ctx,
        TITLE,
        || format!("Decrypt balance failed\n  Token account: {token_account}"),
        async {
            require_connected(ctx.wallet.as_ref())?;
            let aes = ctx.seed_signature(SeedPurpose::Aes).await?;

            let connection = ctx.connection.as_ref();
            let account = require_account(connection, &token_account, "Token").await?;
            let request = DecryptRequest {
                aes_signature: aes.to_base64(),
                token_account_data: STANDARD.encode(&account.data),
            };
            let response: DecryptResponse =
                backend::post(ctx.backend.as_ref(), Endpoint::Decrypt, &request).await?;

            let mint = token_account_mint(&account.data)?;
            let decimals = fetch_mint_decimals(connection, &mint).await?;
            let balance = DecryptedBalance {
                ui_amount: calculate_ui_amount(&response.amount, decimals)?,
                amount: response.amount,
                decimals,
            };

            visibility::show(&ctx.cache, &ctx.rpc_endpoint(), &token_account, &balance).await;
            ctx.log
                .success(
                    format!("{TITLE} Operation - COMPLETE"),
                    format!(
                        "Confidential balance decrypted\n  Token account: {token_account}\n  Amount: {}",
                        balance.ui_amount
                    ),
                )
                .await;
            Ok(balance)
        },
    )
    .await
}

/// Hide a previously decrypted balance.
pub async fn hide_balance(ctx: &OperationContext, token_account: Pubkey) {
    visibility::hide(&ctx.cache, &ctx.rpc_endpoint(), &token_account).await;
}
