//! Contract events
//!
//! Events are immutable records emitted by contract operations and appended
//! to each contract's event log.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::{Address, TradeId};
use types::swap::{BalanceDelta, PoolKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountVerified {
    pub account: Address,
    pub data_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRevoked {
    pub account: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistUpdated {
    pub account: Address,
    pub blacklisted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawyerAdded {
    pub lawyer: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawyerRemoved {
    pub lawyer: Address,
}

/// A lawyer changed their activity flag or schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawyerUpdated {
    pub lawyer: Address,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiatCreated {
    pub token: Address,
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeCreated {
    pub trade_id: TradeId,
    pub buyer: Address,
    pub seller: Address,
    pub amount: Decimal,
    pub price: Decimal,
    pub fiat_token: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeConfirmed {
    pub trade_id: TradeId,
    pub confirmed_by: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeCancelled {
    pub trade_id: TradeId,
    pub cancelled_by: Address,
}

/// Emitted by a hook's after-swap entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapAudited {
    pub hook: String,
    pub sender: Address,
    pub pool: PoolKey,
    pub delta: BalanceDelta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesAccrued {
    pub pool: PoolKey,
    pub currency: Address,
    pub amount: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesSwept {
    pub treasury: Address,
    pub currency: Address,
    pub amount: Decimal,
    pub delta: BalanceDelta,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    AccountVerified(AccountVerified),
    VerificationRevoked(VerificationRevoked),
    BlacklistUpdated(BlacklistUpdated),
    LawyerAdded(LawyerAdded),
    LawyerRemoved(LawyerRemoved),
    LawyerUpdated(LawyerUpdated),
    FiatCreated(FiatCreated),
    TradeCreated(TradeCreated),
    TradeConfirmed(TradeConfirmed),
    TradeCancelled(TradeCancelled),
    SwapAudited(SwapAudited),
    FeesAccrued(FeesAccrued),
    FeesSwept(FeesSwept),
}
