//! Pool and swap types exchanged with the swap execution engine
//!
//! These mirror what the pool manager hands to hooks around a swap: the pool
//! pair key, the requested swap parameters, and the resulting balance delta.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::Address;

/// Identifies a pool: an ordered currency pair plus its fee tier and hook.
///
/// `currency0 < currency1` always holds for keys built with [`PoolKey::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub currency0: Address,
    pub currency1: Address,
    /// LP fee in basis points.
    pub fee_bps: u32,
    pub tick_spacing: i32,
    /// Hook contract installed on the pool.
    pub hooks: Address,
}

impl PoolKey {
    /// Build a key, sorting the two currencies.
    pub fn new(a: Address, b: Address, fee_bps: u32, tick_spacing: i32, hooks: Address) -> Self {
        let (currency0, currency1) = if a <= b { (a, b) } else { (b, a) };
        Self {
            currency0,
            currency1,
            fee_bps,
            tick_spacing,
            hooks,
        }
    }

    /// True if either side of the pair is `currency`.
    pub fn involves(&self, currency: &Address) -> bool {
        self.currency0 == *currency || self.currency1 == *currency
    }

    /// The currency paid in for a swap in the given direction.
    pub fn input_currency(&self, zero_for_one: bool) -> Address {
        if zero_for_one {
            self.currency0
        } else {
            self.currency1
        }
    }
}

/// Requested swap.
///
/// A negative `amount_specified` is an exact-input swap, a positive one is
/// exact-output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    pub zero_for_one: bool,
    pub amount_specified: Decimal,
    /// Recipient of the output leg. `None` means the sender.
    pub recipient: Option<Address>,
}

impl SwapParams {
    pub fn exact_input(zero_for_one: bool, amount_in: Decimal) -> Self {
        Self {
            zero_for_one,
            amount_specified: -amount_in.abs(),
            recipient: None,
        }
    }

    pub fn exact_output(zero_for_one: bool, amount_out: Decimal) -> Self {
        Self {
            zero_for_one,
            amount_specified: amount_out.abs(),
            recipient: None,
        }
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn is_exact_input(&self) -> bool {
        self.amount_specified.is_sign_negative()
    }

    /// Magnitude of the specified amount.
    pub fn magnitude(&self) -> Decimal {
        self.amount_specified.abs()
    }
}

/// Net balance change of the swapper, per pool currency.
///
/// Negative values are owed by the swapper, positive values are owed to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub amount0: Decimal,
    pub amount1: Decimal,
}

impl BalanceDelta {
    pub fn new(amount0: Decimal, amount1: Decimal) -> Self {
        Self { amount0, amount1 }
    }

    /// Amount paid in on the input side of a swap in the given direction.
    pub fn amount_in(&self, zero_for_one: bool) -> Decimal {
        let leg = if zero_for_one { self.amount0 } else { self.amount1 };
        if leg.is_sign_negative() {
            -leg
        } else {
            Decimal::ZERO
        }
    }
}
