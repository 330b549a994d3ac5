//! Slippage Calculator
//!
//! Minimum-output bounds in exact integer arithmetic.

use num_bigint::BigUint;

use stableswap_core::{Amount, Slippage};

/// Apply a slippage tolerance to a simulated amount.
///
/// Formula: min_out = floor(amount * (denominator - numerator) / denominator)
///
/// Always rounds down so the bound never exceeds what `(1 - tolerance) * amount`
/// allows. Uses BigUint because `amount * denominator` can overflow u128.
pub fn min_out(amount: Amount, tolerance: &Slippage) -> Amount {
    if tolerance.is_zero() || amount == 0 {
        return amount;
    }

    let keep = tolerance.denominator() - tolerance.numerator();
    let result =
        BigUint::from(amount) * BigUint::from(keep) / BigUint::from(tolerance.denominator());

    // result <= amount, so it always fits
    result.try_into().unwrap_or(amount)
}

/// Apply a tolerance independently to every hop quantity.
pub fn min_outs(amounts: &[Amount], tolerance: &Slippage) -> Vec<Amount> {
    amounts.iter().map(|a| min_out(*a, tolerance)).collect()
}
