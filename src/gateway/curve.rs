//! Constant-product curve arithmetic.
//!
//! Reserves of 18-decimal assets reach `1e24` and beyond, so every
//! product of two amounts is formed in 256 bits before it is divided
//! back down. Fees are `hydra-amm` [`FeeTier`]s charged on the input and
//! rounded up, outputs and shares are rounded down.

use hydra_amm::domain::{Amount, FeeTier, Rounding};

use super::AmmGatewayError;

/// `amount * numerator / denominator`, rounded down, with a 256-bit
/// intermediate product.
///
/// # Errors
///
/// [`AmmGatewayError::InsufficientLiquidity`] on a zero denominator,
/// [`AmmGatewayError::Overflow`] if the quotient exceeds `u128`.
pub fn mul_div(amount: u128, numerator: u128, denominator: u128) -> Result<u128, AmmGatewayError> {
    if denominator == 0 {
        return Err(AmmGatewayError::InsufficientLiquidity);
    }
    let (hi, lo) = mul_wide(amount, numerator);
    if hi == 0 {
        return Ok(lo / denominator);
    }
    if hi >= denominator {
        return Err(AmmGatewayError::Overflow);
    }
    // Restoring long division of (hi, lo) by denominator; hi < denominator
    // keeps the quotient within 128 bits.
    let mut rem = hi;
    let mut quot: u128 = 0;
    for bit in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> bit) & 1);
        quot <<= 1;
        if carry == 1 || rem >= denominator {
            rem = rem.wrapping_sub(denominator);
            quot |= 1;
        }
    }
    Ok(quot)
}

/// Full 256-bit product as `(high, low)` words.
#[must_use]
pub fn mul_wide(a: u128, b: u128) -> (u128, u128) {
    let mask = u128::from(u64::MAX);
    let (a_hi, a_lo) = (a >> 64, a & mask);
    let (b_hi, b_lo) = (b >> 64, b & mask);
    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;
    let mid = (ll >> 64) + (lh & mask) + (hl & mask);
    let lo = (ll & mask) | (mid << 64);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}

/// `floor(sqrt(a * b))` over the 256-bit product.
#[must_use]
pub fn sqrt_product(a: u128, b: u128) -> u128 {
    let target = mul_wide(a, b);
    let (mut low, mut high) = (0u128, u128::MAX);
    while low < high {
        let mid = low + (high - low) / 2 + 1;
        if mul_wide(mid, mid) <= target {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    low
}

/// Shares minted for a deposit of `(amount0, amount1)` into a pool with
/// `total_shares` outstanding.
///
/// An empty pool mints the geometric mean of the deposit. Later deposits
/// mint in proportion to the smaller of the two contributions.
///
/// # Errors
///
/// [`AmmGatewayError::InsufficientLiquidity`] if nothing would be minted.
pub fn shares_for_deposit(
    amount0: u128,
    amount1: u128,
    reserve0: u128,
    reserve1: u128,
    total_shares: u128,
) -> Result<u128, AmmGatewayError> {
    let minted = if total_shares == 0 {
        sqrt_product(amount0, amount1)
    } else {
        let by0 = mul_div(amount0, total_shares, reserve0)?;
        let by1 = mul_div(amount1, total_shares, reserve1)?;
        by0.min(by1)
    };
    if minted == 0 {
        return Err(AmmGatewayError::InsufficientLiquidity);
    }
    Ok(minted)
}

/// Output of selling `amount_in` into a pool holding
/// `(reserve_in, reserve_out)`.
///
/// # Errors
///
/// [`AmmGatewayError::InsufficientLiquidity`] on an empty side,
/// [`AmmGatewayError::Engine`] if the fee cannot be computed.
pub fn amount_out(
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
    fee: FeeTier,
) -> Result<u128, AmmGatewayError> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(AmmGatewayError::InsufficientLiquidity);
    }
    let charged = fee.apply_to_amount(Amount::new(amount_in), Rounding::Up)?.get();
    let net_in = amount_in.saturating_sub(charged);
    let new_reserve_in = reserve_in
        .checked_add(net_in)
        .ok_or(AmmGatewayError::Overflow)?;
    mul_div(net_in, reserve_out, new_reserve_in)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use hydra_amm::domain::BasisPoints;

    const E18: u128 = 1_000_000_000_000_000_000;

    fn fee(bps: u32) -> FeeTier {
        FeeTier::new(BasisPoints::new(bps))
    }

    #[test]
    fn mul_div_handles_wide_products() {
        assert!(matches!(mul_div(100 * E18, 100 * E18, 200 * E18), Ok(v) if v == 50 * E18));
        assert!(matches!(mul_div(u128::MAX, u128::MAX, u128::MAX), Ok(u128::MAX)));
        assert!(matches!(mul_div(7, 3, 2), Ok(10)));
        assert!(matches!(
            mul_div(u128::MAX, 2, 1),
            Err(AmmGatewayError::Overflow)
        ));
        assert!(matches!(
            mul_div(1, 1, 0),
            Err(AmmGatewayError::InsufficientLiquidity)
        ));
    }

    #[test]
    fn sqrt_product_is_floor_of_geometric_mean() {
        assert_eq!(sqrt_product(0, 5), 0);
        assert_eq!(sqrt_product(4, 9), 6);
        assert_eq!(sqrt_product(2, 5), 3);
        assert_eq!(sqrt_product(100 * E18, 100 * E18), 100 * E18);
        assert_eq!(sqrt_product(1_000_000 * E18, 4_000_000 * E18), 2_000_000 * E18);
        assert_eq!(sqrt_product(u128::MAX, u128::MAX), u128::MAX);
    }

    #[test]
    fn shares_follow_the_smaller_contribution() {
        assert!(matches!(shares_for_deposit(100 * E18, 100 * E18, 0, 0, 0), Ok(v) if v == 100 * E18));
        let later = shares_for_deposit(10 * E18, 30 * E18, 100 * E18, 200 * E18, 100 * E18);
        assert!(matches!(later, Ok(v) if v == 10 * E18));
        assert!(matches!(
            shares_for_deposit(0, 10, 0, 0, 0),
            Err(AmmGatewayError::InsufficientLiquidity)
        ));
    }

    #[test]
    fn amount_out_at_eighteen_decimals() {
        // 20 into 100:100 at 30 bps: 19.94 * 100 / 119.94
        let Ok(out) = amount_out(20 * E18, 100 * E18, 100 * E18, fee(30)) else {
            panic!("quote failed");
        };
        assert!(out > 16 * E18 && out < 17 * E18);
        assert!(out < 20 * E18);
    }

    #[test]
    fn amount_out_without_fee_keeps_product() {
        let Ok(out) = amount_out(1_000, 10_000, 10_000, fee(0)) else {
            panic!("quote failed");
        };
        assert_eq!(out, 909);
        assert!((10_000 + 1_000) * (10_000 - out) >= 10_000 * 10_000);
    }

    #[test]
    fn amount_out_needs_both_reserves() {
        assert!(matches!(
            amount_out(10, 0, 100, fee(30)),
            Err(AmmGatewayError::InsufficientLiquidity)
        ));
    }
}
