use crate::backend::{
    self, Endpoint,
    models::{TransactionBundleResponse, TransferProofSpace, TransferRequest},
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

const TITLE: &str = "Transfer";

/// Confidential transfer of `ui_amount` from `sender` to the `recipient`
/// token account of the same mint.
pub async fn transfer(
    ctx: &OperationContext,
    sender: Pubkey,
    recipient: Pubkey,
    ui_amount: &str,
) -> Result<OperationResult, WalletError> {
    recorded_touching(
        ctx,
        TITLE,
        &[sender, recipient],
        || format!("Transfer failed\n  Sender: {sender}\n  Recipient: {recipient}"),
        async {
            require_connected(ctx.wallet.as_ref())?;
            let seeds = ctx.seed_signatures().await?;

            let connection = ctx.connection.as_ref();
            let sender_account = require_account(connection, &sender, "Sender token").await?;
            let recipient_account =
                require_account(connection, &recipient, "Recipient token").await?;
            let mint = token_account_mint(&sender_account.data)?;
            if token_account_mint(&recipient_account.data)? != mint {
                return Err(WalletError::InvalidInput(format!(
                    "recipient {recipient} does not hold mint {mint}"
                )));
            }
            let mint_account = require_account(connection, &mint, "Mint").await?;
            let decimals = mint_decimals(&mint_account.data)?;
            let amount = parse_ui_amount(ui_amount, decimals)?.to_string();

            let latest = connection.get_latest_blockhash().await?;

            let space: TransferProofSpace =
                backend::get(ctx.backend.as_ref(), Endpoint::Transfer).await?;
            let rent = compute_rent(connection, &space.into()).await?;

            let request = TransferRequest {
                elgamal_signature: seeds.elgamal.to_base64(),
                aes_signature: seeds.aes.to_base64(),
                sender_token_account: STANDARD.encode(&sender_account.data),
                recipient_token_account: STANDARD.encode(&recipient_account.data),
                mint_token_account: STANDARD.encode(&mint_account.data),
                amount: amount.clone(),
                priority_fee: ctx.priority_fee_lamports.to_string(),
                latest_blockhash: latest.blockhash.to_string(),
                equality_proof_rent: rent.require(ProofKind::Equality)?,
                ciphertext_validity_proof_rent: rent.require(ProofKind::CiphertextValidity)?,
                range_proof_rent: rent.require(ProofKind::Range)?,
            };
            info!(%sender, %recipient, %amount, "requesting transfer bundle");
            let response: TransactionBundleResponse =
                backend::post(ctx.backend.as_ref(), Endpoint::Transfer, &request).await?;

            let outcome = ctx.send_bundle(&response.transactions, TITLE, &latest).await?;

            ctx.record_success(
                TITLE,
                "Transfer transaction successful",
                format!(
                    "Transfer complete\n  Sender: {sender}\n  Recipient: {recipient}\n  Amount: {amount}\n  Transactions: {}",
                    outcome.signatures.len()
                ),
                &outcome.signatures,
            )
            .await;

            visibility::hide(&ctx.cache, &ctx.rpc_endpoint(), &sender).await;
            ctx.invalidate_balances(&sender).await;
            ctx.invalidate_balances(&recipient).await;

            let mut result = OperationResult::new(
                outcome.signatures,
                serde_json::to_value(&response).unwrap_or_default(),
            );
            result.token_account = Some(sender);
            result.mint = Some(mint);
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
    use crate::state::visibility::DecryptedBalance;
    use crate::testing::{
        FAKE_RPC_ENDPOINT, FakeBackend, FakeConnection, FakeWallet, TestHarness, payer_transaction,
    };
    use reqwest::Method;
    use serde_json::json;
    use solana_hash::Hash;
    use solana_signer::Signer;

    struct Accounts {
        sender: Pubkey,
        recipient: Pubkey,
        mint: Pubkey,
    }

    fn harness() -> (TestHarness, Accounts) {
        let wallet = FakeWallet::connected();
        let payer = wallet.keypair().pubkey();
        let accounts = Accounts {
            sender: Pubkey::new_unique(),
            recipient: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
        };
        let connection = FakeConnection::new()
            .with_account_data(
                accounts.sender,
                token_account_data_for_mint(accounts.mint, Some(0)),
            )
            .with_account_data(
                accounts.recipient,
                token_account_data_for_mint(accounts.mint, Some(1)),
            )
            .with_account_data(accounts.mint, mint_data(2));
        let transactions: Vec<_> = (1..=3)
            .map(|i| encode_transaction(&payer_transaction(&payer, i, Hash::new_unique())).unwrap())
            .collect();
        let backend = FakeBackend::new()
            .with_response(
                Endpoint::Transfer,
                Method::GET,
                json!({
                    "equality_proof_space": 264,
                    "ciphertext_validity_proof_space": 400,
                    "range_proof_space": 1_200,
                }),
            )
            .with_response(
                Endpoint::Transfer,
                Method::POST,
                json!({ "transactions": transactions }),
            );
        (TestHarness::new(wallet, connection, backend), accounts)
    }

    #[tokio::test]
    async fn test_transfer_posts_rent_for_three_proofs() {
        let (harness, accounts) = harness();

        let result = transfer(&harness.ctx, accounts.sender, accounts.recipient, "12.34")
            .await
            .unwrap();

        assert_eq!(result.signatures.len(), 3);
        assert_eq!(result.mint, Some(accounts.mint));
        let mut queried = harness.connection.rent_queries();
        queried.sort();
        assert_eq!(queried, vec![264, 400, 1_200]);

        let body = harness.backend.last_body(Endpoint::Transfer, Method::POST).unwrap();
        assert_eq!(body["amount"], json!("1234"));
        assert_eq!(body["priority_fee"], json!("100000000"));
        assert_eq!(
            body["ciphertext_validity_proof_rent"],
            json!(FakeConnection::rent_for(400).to_string())
        );
    }

    #[tokio::test]
    async fn test_transfer_hides_sender_balance() {
        let (harness, accounts) = harness();
        let ctx = &harness.ctx;
        visibility::show(
            &ctx.cache,
            FAKE_RPC_ENDPOINT,
            &accounts.sender,
            &DecryptedBalance {
                amount: "10000".to_string(),
                ui_amount: "100".to_string(),
                decimals: 2,
            },
        )
        .await;

        transfer(ctx, accounts.sender, accounts.recipient, "1").await.unwrap();

        assert!(!visibility::is_visible(&ctx.cache, FAKE_RPC_ENDPOINT, &accounts.sender).await);
    }

    #[tokio::test]
    async fn test_missing_recipient_account() {
        let (harness, accounts) = harness();

        let err = transfer(&harness.ctx, accounts.sender, Pubkey::new_unique(), "1")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WalletError::AccountNotFound {
                label: "Recipient token",
                ..
            }
        ));
        assert!(harness.wallet.sign_all_calls().is_empty());
    }
}
