//! Fixed-point decimal amounts for token balances, prices and fees
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).

use rust_decimal::Decimal;

/// Token quantity. Balances and transfer amounts are never negative.
pub type TokenAmount = Decimal;

/// Quoted fiat price per unit of the traded asset.
pub type Price = Decimal;

/// Basis-point denominator (1 bps = 0.01%).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Portion of `amount` corresponding to `bps` basis points.
///
/// Returns `None` on arithmetic overflow.
pub fn bps_of(amount: Decimal, bps: u32) -> Option<Decimal> {
    amount
        .checked_mul(Decimal::from(bps))?
        .checked_div(Decimal::from(BPS_DENOMINATOR))
}
