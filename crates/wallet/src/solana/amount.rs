//! Exact conversions between raw token base units and UI decimal strings.
//! Amounts never pass through floating point.

use crate::error::{PrecisionWarning, WalletError};
use tracing::warn;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
const SOL_DECIMALS: u8 = 9;
pub const MAX_DECIMALS: u8 = 18;

/// Render `amount` base units as a UI string with `decimals` places,
/// dropping trailing fractional zeros: `("123450000", 6)` gives `"123.45"`.
pub fn calculate_ui_amount(amount: &str, decimals: u8) -> Result<String, WalletError> {
    let raw = amount.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WalletError::InvalidInput(format!(
            "amount must be a non-negative integer, got {amount:?}"
        )));
    }
    if let Ok(value) = raw.parse::<u64>() {
        if let Some(warning) = PrecisionWarning::check(value) {
            warn!(%warning, "PrecisionWarning");
        }
    }

    let digits = raw.trim_start_matches('0');
    let decimals = decimals as usize;
    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        Ok(whole.to_string())
    } else {
        Ok(format!("{whole}.{fraction}"))
    }
}

/// Parse a UI amount such as `"2.5"` into base units for a mint with
/// `decimals` places. More fractional digits than the mint supports is an
/// error rather than a silent truncation.
pub fn parse_ui_amount(ui_amount: &str, decimals: u8) -> Result<u64, WalletError> {
    if decimals > MAX_DECIMALS {
        return Err(WalletError::InvalidInput(format!(
            "unsupported mint decimals: {decimals}"
        )));
    }

    let trimmed = ui_amount.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    let well_formed = !(whole.is_empty() && fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(WalletError::InvalidInput(format!(
            "invalid token amount: {ui_amount:?}"
        )));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(WalletError::InvalidInput(format!(
            "{ui_amount} has more than {decimals} decimal places"
        )));
    }

    let digits = format!(
        "{}{:0<width$}",
        whole,
        fraction,
        width = decimals as usize
    );
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0);
    }

    let amount = digits
        .parse::<u64>()
        .map_err(|_| WalletError::InvalidInput(format!("{ui_amount} is too large")))?;
    if let Some(warning) = PrecisionWarning::check(amount) {
        warn!(%warning, "PrecisionWarning");
    }
    Ok(amount)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeUiAmount {
    pub lamports: u64,
    pub ui_amount_string: String,
}

/// SOL balance with all nine decimal places kept, e.g. `"1.500000000"`.
pub fn native_to_ui_amount(lamports: u64) -> NativeUiAmount {
    let whole = lamports / LAMPORTS_PER_SOL;
    let fraction = lamports % LAMPORTS_PER_SOL;
    NativeUiAmount {
        lamports,
        ui_amount_string: format!(
            "{whole}.{fraction:0width$}",
            width = SOL_DECIMALS as usize
        ),
    }
}
