use crate::backend::{
    self, Endpoint,
    models::{TransactionBundleResponse, WithdrawProofSpace, WithdrawRequest},
};
use crate::error::WalletError;
use crate::operations::{OperationContext, OperationResult, recorded_touching};
use crate::solana::amount::parse_ui_amount;
use crate::solana::connection::require_account;
use crate::solana::mint::{mint_decimals, token_account_mint};
use crate::solana::rent::{ProofKind, compute_rent};
use crate::state::visibility;
use crate::wallet::require_connected;
use base64::{Engine, engine::general_purpose::STANDARD};
use solana_pubkey::Pubkey;
use tracing::info;

const TITLE: &str = "Withdraw";

/// Move `ui_amount` from the confidential available balance of
/// `token_account` back to its public balance.
pub async fn withdraw(
    ctx: &OperationContext,
    token_account: Pubkey,
    ui_amount: &str,
) -> Result<OperationResult, WalletError> {
    recorded_touching(
        ctx,
        TITLE,
        &[token_account],
        || format!("Withdraw transaction failed\n  Token account: {token_account}"),
        async {
            require_connected(ctx.wallet.as_ref())?;
            let seeds = ctx.seed_signatures().await?;

            let connection = ctx.connection.as_ref();
            let account = require_account(connection, &token_account, "Token").await?;
            let mint = token_account_mint(&account.data)?;
            let mint_account = require_account(connection, &mint, "Mint").await?;
            let decimals = mint_decimals(&mint_account.data)?;
            let amount = parse_ui_amount(ui_amount, decimals)?.to_string();

            let latest = connection.get_latest_blockhash().await?;

            let space: WithdrawProofSpace =
                backend::get(ctx.backend.as_ref(), Endpoint::Withdraw).await?;
            let rent = compute_rent(connection, &space.into()).await?;

            let request = WithdrawRequest {
                elgamal_signature: seeds.elgamal.to_base64(),
                aes_signature: seeds.aes.to_base64(),
                recipient_token_account: STANDARD.encode(&account.data),
                mint_account_info: STANDARD.encode(&mint_account.data),
                withdraw_amount_lamports: amount.clone(),
                latest_blockhash: latest.blockhash.to_string(),
                equality_proof_rent: rent.require(ProofKind::Equality)?,
                range_proof_rent: rent.require(ProofKind::Range)?,
            };
            info!(%token_account, %amount, "requesting withdraw bundle");
            let response: TransactionBundleResponse =
                backend::post(ctx.backend.as_ref(), Endpoint::Withdraw, &request).await?;

            let outcome = ctx.send_bundle(&response.transactions, TITLE, &latest).await?;

            let count = outcome.signatures.len();
            let signatures = outcome
                .signatures
                .iter()
                .map(|sig| sig.to_string())
                .collect::<Vec<_>>()
                .join("\n    ");
            ctx.record_success(
                TITLE,
                "Withdraw transaction successful",
                format!(
                    "Withdraw complete in {count} transaction(s)\n  Token account: {token_account}\n  Amount: {amount}\n  Signatures:\n    {signatures}"
                ),
                &outcome.signatures,
            )
            .await;

            visibility::hide(&ctx.cache, &ctx.rpc_endpoint(), &token_account).await;
            ctx.invalidate_balances(&token_account).await;

            let mut result = OperationResult::new(
                outcome.signatures,
                serde_json::to_value(&response).unwrap_or_default(),
            );
            result.token_account = Some(token_account);
            Ok(result)
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solana::mint::tests::mint_data;
    use crate::solana::pending::tests::token_account_data_for_mint;
    use crate::solana::transaction::encode_transaction;
    use crate::state::cache::{CacheKey, QueryKind};
    use crate::state::notify::NotificationKind;
    use crate::state::visibility::DecryptedBalance;
    use crate::testing::{
        FAKE_RPC_ENDPOINT, FakeBackend, FakeConnection, FakeWallet, TestHarness, payer_transaction,
    };
    use reqwest::Method;
    use serde_json::json;
    use solana_hash::Hash;
    use solana_signer::Signer;

    fn harness(connection: impl FnOnce(FakeConnection) -> FakeConnection) -> (TestHarness, Pubkey) {
        let wallet = FakeWallet::connected();
        let payer = wallet.keypair().pubkey();
        let mint = Pubkey::new_unique();
        let token_account = Pubkey::new_unique();
        let connection = connection(
            FakeConnection::new()
                .with_account_data(token_account, token_account_data_for_mint(mint, Some(0)))
                .with_account_data(mint, mint_data(6)),
        );
        let transactions: Vec<_> = (1..=3)
            .map(|i| encode_transaction(&payer_transaction(&payer, i, Hash::new_unique())).unwrap())
            .collect();
        let backend = FakeBackend::new()
            .with_response(
                Endpoint::Withdraw,
                Method::GET,
                json!({ "equality_proof_space": 264, "range_proof_space": 1_200 }),
            )
            .with_response(
                Endpoint::Withdraw,
                Method::POST,
                json!({ "transactions": transactions }),
            );
        (TestHarness::new(wallet, connection, backend), token_account)
    }

    #[tokio::test]
    async fn test_withdraw_submits_bundle_and_hides_balance() {
        let (harness, token_account) = harness(|c| c);
        let ctx = &harness.ctx;
        visibility::show(
            &ctx.cache,
            FAKE_RPC_ENDPOINT,
            &token_account,
            &DecryptedBalance {
                amount: "5000000".to_string(),
                ui_amount: "5".to_string(),
                decimals: 6,
            },
        )
        .await;

        let result = withdraw(ctx, token_account, "1.5").await.unwrap();

        assert_eq!(result.signatures.len(), 3);
        assert_eq!(harness.wallet.sign_all_calls(), vec![3]);
        assert!(!visibility::is_visible(&ctx.cache, FAKE_RPC_ENDPOINT, &token_account).await);

        let body = harness.backend.last_body(Endpoint::Withdraw, Method::POST).unwrap();
        assert_eq!(body["withdraw_amount_lamports"], json!("1500000"));
        assert_eq!(
            body["equality_proof_rent"],
            json!(FakeConnection::rent_for(264).to_string())
        );
        assert_eq!(
            body["range_proof_rent"],
            json!(FakeConnection::rent_for(1_200).to_string())
        );
    }

    #[tokio::test]
    async fn test_partial_bundle_keeps_balance_visible() {
        let (harness, token_account) = harness(|c| c.failing_simulation_at(2));
        let ctx = &harness.ctx;
        visibility::show(
            &ctx.cache,
            FAKE_RPC_ENDPOINT,
            &token_account,
            &DecryptedBalance {
                amount: "1".to_string(),
                ui_amount: "0.000001".to_string(),
                decimals: 6,
            },
        )
        .await;

        let balance_key = CacheKey::new(QueryKind::Balance, FAKE_RPC_ENDPOINT, token_account);
        ctx.cache.set_value(balance_key.clone(), json!(10)).await;

        let err = withdraw(ctx, token_account, "1").await.unwrap_err();

        let confirmed = match &err {
            WalletError::BundleAborted(failure) => failure.confirmed.clone(),
            other => panic!("unexpected error: {other:?}"),
        };
        assert_eq!(confirmed.len(), 2);
        assert_eq!(harness.connection.sent()[..2], confirmed[..]);
        assert!(visibility::is_visible(&ctx.cache, FAKE_RPC_ENDPOINT, &token_account).await);
        assert!(ctx.cache.get(&balance_key).await.unwrap().stale);

        let entries = ctx.log.entries().await;
        assert_eq!(entries[0].title, "Withdraw Operation - FAILED");
        assert!(entries[0].content.contains("aborted at transaction 3 of 3"));
        assert_eq!(entries[1].title, "Withdraw Simulation Logs");
        assert!(entries[1].content.contains("insufficient funds"));

        let notifications = ctx.notifier.recent().await;
        for signature in &confirmed {
            let signature = signature.to_string();
            assert!(entries[0].content.contains(&format!("\n    {signature}")));
            assert!(notifications.iter().any(|n| {
                n.kind == NotificationKind::Transaction
                    && n.description.as_deref() == Some(signature.as_str())
                    && n.explorer_url.as_deref().is_some_and(|url| url.contains(&signature))
            }));
        }
        assert_eq!(notifications.last().unwrap().kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_rent_failure_stops_before_post() {
        let (harness, token_account) = harness(|c| c.failing_rent("rpc unavailable"));

        let err = withdraw(&harness.ctx, token_account, "1").await.unwrap_err();

        assert!(matches!(err, WalletError::Rpc(_)));
        assert!(harness.backend.last_body(Endpoint::Withdraw, Method::POST).is_none());
    }
}
