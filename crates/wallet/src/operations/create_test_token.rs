use crate::backend::{
    self, Endpoint,
    models::{CreateTestTokenRequest, TransactionResponse},
};
use crate::error::WalletError;
use crate::operations::{OperationContext, OperationResult, recorded};
use crate::solana::amount::native_to_ui_amount;
use crate::solana::mint::test_mint_rent;
use crate::wallet::require_connected;
use solana_keypair::Keypair;
use solana_signer::Signer;
use tracing::info;

const TITLE: &str = "Create Test Token";

/// Have the backend mint a fresh Token-2022 test token to the wallet. The
/// new mint's keypair is generated here and co-signs the transaction.
pub async fn create_test_token(ctx: &OperationContext) -> Result<OperationResult, WalletError> {
    let mint = Keypair::new();
    let mint_address = mint.pubkey();
    recorded(
        ctx,
        TITLE,
        || format!("Test token creation failed\n  Mint: {mint_address}"),
        async {
            let owner = require_connected(ctx.wallet.as_ref())?;
            let rent = test_mint_rent(ctx.connection.as_ref()).await?;
            info!(mint = %mint_address, rent, "creating test token");

            let request = CreateTestTokenRequest {
                account: owner.to_string(),
                mint: mint_address.to_string(),
            };
            let response: TransactionResponse =
                backend::post(ctx.backend.as_ref(), Endpoint::CreateTestToken, &request).await?;

            let signature = ctx
                .send_single(&response.transaction, TITLE, &[&mint])
                .await?;

            let rent_sol = native_to_ui_amount(rent).ui_amount_string;
            ctx.record_success(
                TITLE,
                "Test token created",
                format!(
                    "Test token minted\n  Mint: {mint_address}\n  Owner: {owner}\n  Mint rent: {rent_sol} SOL\n  Signature: {signature}"
                ),
                &[signature],
            )
            .await;
            ctx.invalidate_balances(&owner).await;

            let mut result = OperationResult::new(
                vec![signature],
                serde_json::to_value(&response).unwrap_or_default(),
            );
            result.mint = Some(mint_address);
            Ok(result)
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solana::mint::test_mint_space;
    use crate::solana::transaction::encode_transaction;
    use crate::testing::{FakeBackend, FakeConnection, FakeWallet, TestHarness, cosigned_transaction};
    use reqwest::Method;
    use serde_json::json;
    use solana_hash::Hash;
    use solana_pubkey::Pubkey;
    use solana_signature::Signature;

    fn backend() -> FakeBackend {
        FakeBackend::new().with_handler(Endpoint::CreateTestToken, Method::POST, |body| {
            let body = body.unwrap();
            let account: Pubkey = body["account"].as_str().unwrap().parse().unwrap();
            let mint: Pubkey = body["mint"].as_str().unwrap().parse().unwrap();
            let tx = cosigned_transaction(&account, &mint, Hash::new_unique());
            Ok(json!({ "transaction": encode_transaction(&tx)? }))
        })
    }

    #[tokio::test]
    async fn test_mint_keypair_cosigns() {
        let harness = TestHarness::new(FakeWallet::connected(), FakeConnection::new(), backend());

        let result = create_test_token(&harness.ctx).await.unwrap();

        let mint = result.mint.unwrap();
        let sent = harness.connection.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].signatures.iter().all(|sig| *sig != Signature::default()));
        assert!(sent[0].message.static_account_keys().contains(&mint));
        assert_eq!(
            harness.connection.rent_queries(),
            vec![test_mint_space().unwrap()]
        );
    }

    #[tokio::test]
    async fn test_rent_failure_stops_before_backend() {
        let harness = TestHarness::new(
            FakeWallet::connected(),
            FakeConnection::new().failing_rent("rpc down"),
            backend(),
        );
        let err = create_test_token(&harness.ctx).await.unwrap_err();
        assert!(matches!(err, WalletError::Rpc(_)));
        assert!(harness.backend.requests().is_empty());
    }
}
