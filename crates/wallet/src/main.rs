mod backend;
mod config;
mod db;
mod error;
mod handlers;
mod operations;
mod routes;
mod solana;
mod state;
#[cfg(test)]
mod testing;
mod wallet;

use crate::backend::ServerClient;
use crate::config::AppConfig;
use crate::operations::OperationContext;
use crate::solana::connection::{RpcConnection, SolanaConnection};
use crate::state::{
    Notifier, OperationLog, PendingBalancePoller, PendingBalanceTracker, QueryCache,
};
use crate::wallet::{KeypairWallet, WalletAdapter};
use anyhow::Result;
use solana_client::{nonblocking::rpc_client::RpcClient, rpc_config::CommitmentConfig};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub struct AppState {
    pub ctx: OperationContext,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    info!("RPC client created for URL: {:?}", &config.cluster.endpoint);
    let rpc_client = Arc::new(RpcClient::new_with_commitment(
        config.cluster.endpoint.clone(),
        CommitmentConfig::confirmed(),
    ));
    let connection: Arc<dyn RpcConnection> = Arc::new(SolanaConnection::new(rpc_client));

    let wallet: Arc<dyn WalletAdapter> = match &config.wallet_keypair {
        Some(encoded) => Arc::new(KeypairWallet::from_base58_string(encoded)?),
        None => {
            warn!("WALLET_KEYPAIR not set, wallet is disconnected");
            Arc::new(KeypairWallet::disconnected())
        }
    };
    if let Some(pubkey) = wallet.public_key() {
        info!(%pubkey, "wallet connected");
    }

    let backend = Arc::new(ServerClient::from_url(config.backend_url.clone()));
    info!("proof backend at {}", backend.base_url());

    let log = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            OperationLog::with_database(pool).await?
        }
        None => OperationLog::new(),
    };

    let cache = Arc::new(QueryCache::new());
    let shutdown = CancellationToken::new();
    let ctx = OperationContext {
        wallet,
        connection: connection.clone(),
        backend,
        cache: cache.clone(),
        pending: PendingBalanceTracker::new(cache, connection),
        log: Arc::new(log),
        notifier: Arc::new(Notifier::new(config.cluster.clone())),
        priority_fee_lamports: config.priority_fee_lamports,
        shutdown: shutdown.clone(),
    };

    let poller = PendingBalancePoller::new(ctx.pending.clone(), config.watched_token_accounts.clone())
        .with_interval(config.pending_balance_poll_interval);
    let poller_handle = tokio::spawn(poller.run(shutdown.clone()));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    let state = Arc::new(AppState { ctx });
    let app = routes::create_router(state);

    tracing::info!("Server listening on {}", listener.local_addr()?);

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutting down");
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    poller_handle.await?;

    Ok(())
}
