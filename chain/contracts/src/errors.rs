//! Contract-specific error types
//!
//! One error enum per contract. Failures from a downstream call (token
//! transfer, swap execution) are wrapped unmodified so the callee's reason
//! reaches the original caller.

use thiserror::Error;
use types::ids::{Address, TradeId};

/// Access-control failures shared by every administrable contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessError {
    #[error("Unauthorized: {caller} lacks the required role")]
    Unauthorized { caller: Address },

    #[error("Zero address cannot hold a role")]
    ZeroAddress,
}

/// Identity registry errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdentityError {
    #[error("Unauthorized: {caller} may not modify identity records")]
    Unauthorized { caller: Address },

    #[error("Verification data must not be empty")]
    EmptyData,

    #[error("Access control: {0}")]
    Access(#[from] AccessError),
}

/// Arbitration scheduler errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArbitrationError {
    #[error("Lawyer already registered: {0}")]
    AlreadyPresent(Address),

    #[error("Lawyer not registered: {0}")]
    NotPresent(Address),

    #[error("Schedule slot out of range: weekday {weekday}, hour {hour}")]
    SlotOutOfRange { weekday: usize, hour: usize },

    #[error("Access control: {0}")]
    Access(#[from] AccessError),
}

/// Fungible token errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    #[error("Insufficient balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: Address,
        required: String,
        available: String,
    },

    #[error("Insufficient allowance for {spender} on {owner}: required {required}, available {available}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        required: String,
        available: String,
    },

    #[error("Amount must not be negative")]
    InvalidAmount,

    #[error("Zero address not allowed")]
    ZeroAddress,

    #[error("Only the minter may call this")]
    NotMinter,

    #[error("Arithmetic overflow in token accounting")]
    Overflow,
}

/// Fiat token factory errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactoryError {
    #[error("Unauthorized: {caller} is neither owner nor router")]
    Unauthorized { caller: Address },

    #[error("Symbol already registered: {symbol}")]
    SymbolTaken { symbol: String },

    #[error("Token name and symbol must not be empty")]
    EmptyMetadata,

    #[error("Unknown fiat token: {0}")]
    UnknownToken(Address),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Access control: {0}")]
    Access(#[from] AccessError),
}

/// Failure reported by the swap execution engine.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Swap failed: {reason}")]
pub struct SwapFailure {
    /// Machine-readable reason supplied by the engine.
    pub reason: String,
}

impl SwapFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Swap hook errors. Any of these aborts the whole swap.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HookError {
    #[error("Sender cannot trade: {0}")]
    NotTradeable(Address),

    #[error("Pool has no registered fiat token: {currency0} / {currency1}")]
    NoFiatToken { currency0: Address, currency1: Address },

    #[error("Sender is not an active lawyer: {0}")]
    LawyerInactive(Address),

    #[error("Hook {hook} returned an unexpected acknowledgement")]
    InvalidAck { hook: &'static str },

    #[error("Fee error: {0}")]
    Fee(#[from] FeeError),

    #[error("{0}")]
    Swap(#[from] SwapFailure),
}

/// Trade lifecycle errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("Trade not found: {0}")]
    NotFound(TradeId),

    #[error("Trade {id} is {status}, expected Created")]
    NotPending { id: TradeId, status: String },

    #[error("Unauthorized: {caller} is not a party to trade {id}")]
    NotParty { id: TradeId, caller: Address },

    #[error("Counterparty not verified or blacklisted: {0}")]
    Unverified(Address),

    #[error("Unsupported fiat token: {0}")]
    UnsupportedToken(Address),

    #[error("Buyer and seller must differ")]
    SelfTrade,

    #[error("Trade amount must be positive")]
    InvalidAmount,

    #[error("Reentrancy detected")]
    Reentrancy,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

/// Pool fee accumulator errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeeError {
    #[error("No fees to sweep")]
    NoFees,

    #[error("Arithmetic overflow in fee accrual")]
    Overflow,

    #[error("Currency {currency} is not traded on the pool")]
    ForeignCurrency { currency: Address },

    #[error("Reentrancy detected")]
    Reentrancy,

    #[error("Access control: {0}")]
    Access(#[from] AccessError),

    #[error("{0}")]
    Swap(#[from] SwapFailure),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
