use crate::backend::{
    self, Endpoint,
    models::{DepositRequest, TransactionResponse},
};
use crate::error::WalletError;
use crate::operations::{OperationContext, OperationResult, recorded};
use crate::solana::amount::parse_ui_amount;
use crate::solana::connection::require_account;
use crate::solana::mint::{fetch_mint_decimals, token_account_mint};
use crate::wallet::require_connected;
use base64::{Engine, engine::general_purpose::STANDARD};
use solana_pubkey::Pubkey;
use tracing::info;

const TITLE: &str = "Deposit";

/// Move `ui_amount` tokens from the public balance of `token_account` into
/// its confidential pending balance. Needs no seed signatures.
pub async fn deposit(
    ctx: &OperationContext,
    token_account: Pubkey,
    ui_amount: &str,
) -> Result<OperationResult, WalletError> {
    recorded(
        ctx,
        TITLE,
        || format!("Deposit transaction failed\n  Token account: {token_account}"),
        async {
            require_connected(ctx.wallet.as_ref())?;

            let account = require_account(ctx.connection.as_ref(), &token_account, "Token").await?;
            let mint = token_account_mint(&account.data)?;
            let decimals = fetch_mint_decimals(ctx.connection.as_ref(), &mint).await?;
            let lamport_amount = parse_ui_amount(ui_amount, decimals)?.to_string();

            let latest = ctx.connection.get_latest_blockhash().await?;
            let request = DepositRequest {
                token_account_data: STANDARD.encode(&account.data),
                lamport_amount: lamport_amount.clone(),
                mint_decimals: decimals,
                latest_blockhash: latest.blockhash.to_string(),
            };
            info!(%token_account, %lamport_amount, decimals, "requesting deposit transaction");
            let response: TransactionResponse =
                backend::post(ctx.backend.as_ref(), Endpoint::Deposit, &request).await?;

            let signature = ctx.send_single(&response.transaction, TITLE, &[]).await?;

            ctx.record_success(
                TITLE,
                "Deposit transaction successful",
                format!(
                    "Deposit transaction successful\n  Token account: {token_account}\n  Lamport amount: {lamport_amount}\n  Signature: {signature}"
                ),
                &[signature],
            )
            .await;
            ctx.invalidate_balances(&token_account).await;

            let mut result = OperationResult::new(vec![signature], serde_json::to_value(&response).unwrap_or_default());
            result.token_account = Some(token_account);
            Ok(result)
        },
    )
    .await
}
