use crate::error::WalletError;
use crate::solana::connection::{RpcConnection, read_with_retry, require_account};
use solana_pubkey::Pubkey;
use spl_token_2022::{
    extension::{ExtensionType, StateWithExtensionsOwned},
    state::{Account, Mint},
};
use tracing::info;

pub fn mint_decimals(data: &[u8]) -> Result<u8, WalletError> {
    let mint = StateWithExtensionsOwned::<Mint>::unpack(data.to_vec())
        .map_err(|e| WalletError::Encoding(format!("not a mint account: {e}")))?;
    Ok(mint.base.decimals)
}

/// Mint a Token-2022 token account belongs to.
pub fn token_account_mint(data: &[u8]) -> Result<Pubkey, WalletError> {
    let account = StateWithExtensionsOwned::<Account>::unpack(data.to_vec())
        .map_err(|e| WalletError::Encoding(format!("not a token account: {e}")))?;
    Ok(account.base.mint)
}

/// Decimals of `mint`, read with retries.
pub async fn fetch_mint_decimals(
    connection: &dyn RpcConnection,
    mint: &Pubkey,
) -> Result<u8, WalletError> {
    let account = read_with_retry("mint account", || require_account(connection, mint, "Mint")).await?;
    mint_decimals(&account.data)
}

/// Size of the test mint the backend creates: Token-2022 with the
/// mint close authority extension.
pub fn test_mint_space() -> Result<usize, WalletError> {
    ExtensionType::try_calculate_account_len::<Mint>(&[ExtensionType::MintCloseAuthority])
        .map_err(|e| WalletError::Encoding(format!("failed to size mint account: {e}")))
}

pub async fn test_mint_rent(connection: &dyn RpcConnection) -> Result<u64, WalletError> {
    let space = test_mint_space()?;
    let lamports = connection
        .get_minimum_balance_for_rent_exemption(space)
        .await?;
    info!(space, lamports, "test mint rent");
    Ok(lamports)
}
