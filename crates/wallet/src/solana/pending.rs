//! Pending-balance detection from raw Token-2022 account data.

use crate::error::WalletError;
use spl_token_2022::{
    extension::{BaseStateWithExtensions, StateWithExtensionsOwned},
    state::Account,
};
use spl_token_2022_interface::extension::confidential_transfer::ConfidentialTransferAccount;

/// Number of credits waiting in the pending balance, or `None` when the
/// account has no confidential transfer extension.
pub fn pending_balance_credit_counter(data: &[u8]) -> Result<Option<u64>, WalletError> {
    let account = StateWithExtensionsOwned::<Account>::unpack(data.to_vec())
        .map_err(|e| WalletError::Encoding(format!("not a token account: {e}")))?;

    match account.get_extension::<ConfidentialTransferAccount>() {
        Ok(extension) => Ok(Some(u64::from(extension.pending_balance_credit_counter))),
        Err(_) => Ok(None),
    }
}

/// True once at least one deposit or incoming transfer has been credited
/// and not yet applied.
pub fn has_pending_balance(data: &[u8]) -> Result<bool, WalletError> {
    Ok(pending_balance_credit_counter(data)?.is_some_and(|counter| counter > 0))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use solana_pubkey::Pubkey;
    use spl_token_2022::{
        extension::{BaseStateWithExtensionsMut, ExtensionType, StateWithExtensionsMut},
        state::AccountState,
    };

    /// A Token-2022 account, optionally carrying the confidential transfer
    /// extension with the given credit counter.
    pub(crate) fn token_account_data(pending_credits: Option<u64>) -> Vec<u8> {
        token_account_data_for_mint(Pubkey::new_unique(), pending_credits)
    }

    pub(crate) fn token_account_data_for_mint(mint: Pubkey, pending_credits: Option<u64>) -> Vec<u8> {
        let extensions: &[ExtensionType] = if pending_credits.is_some() {
            &[ExtensionType::ConfidentialTransferAccount]
        } else {
            &[]
        };
        let len = ExtensionType::try_calculate_account_len::<Account>(extensions).unwrap();
        let mut data = vec![0u8; len];

        let mut state = StateWithExtensionsMut::<Account>::unpack_uninitialized(&mut data).unwrap();
        state.base = Account {
            mint,
            owner: Pubkey::new_unique(),
            state: AccountState::Initialized,
            ..Account::default()
        };
        state.pack_base();
        state.init_account_type().unwrap();

        if let Some(credits) = pending_credits {
            let extension = state
                .init_extension::<ConfidentialTransferAccount>(true)
                .unwrap();
            extension.pending_balance_credit_counter = credits.into();
        }
        data
    }

    #[test]
    fn test_counter_above_zero_is_pending() {
        let data = token_account_data(Some(3));
        assert_eq!(pending_balance_credit_counter(&data).unwrap(), Some(3));
        assert!(has_pending_balance(&data).unwrap());
    }

    #[test]
    fn test_zero_counter_is_not_pending() {
        let data = token_account_data(Some(0));
        assert!(!has_pending_balance(&data).unwrap());
    }

    #[test]
    fn test_missing_extension_is_not_pending() {
        let data = token_account_data(None);
        assert_eq!(pending_balance_credit_counter(&data).unwrap(), None);
        assert!(!has_pending_balance(&data).unwrap());
    }

    #[test]
    fn test_garbage_data_is_an_error() {
        assert!(matches!(
            has_pending_balance(&[1, 2, 3]),
            Err(WalletError::Encoding(_))
        ));
    }
}
