//! Deployment configuration shared by the contracts
//!
//! There is no global owner: a `ContractConfig` is built (or parsed from JSON)
//! once and each contract takes the parts it needs at construction.

use serde::{Deserialize, Serialize};
use tracing::info;
use types::ids::Address;
use types::numeric::BPS_DENOMINATOR;

use crate::errors::ConfigError;

/// Weekday of the unix epoch (1970-01-01, a Thursday) counting Sunday as 0.
pub const EPOCH_WEEKDAY_OFFSET: u8 = 4;

/// Default swap fee retained by the fee hook, in basis points.
pub const DEFAULT_SWAP_FEE_BPS: u32 = 30;

/// Contract deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Owner of every contract.
    pub owner: Address,
    /// Identity writer allowed to store KYC data.
    pub writer: Option<Address>,
    /// Router allowed to create and mint fiat tokens.
    pub router: Option<Address>,
    /// Destination of swept pool fees.
    pub treasury: Address,
    /// Added to days-since-epoch before reducing mod 7 to get the weekday.
    pub weekday_epoch_offset: u8,
    /// Fee retained on every hooked swap, in basis points.
    pub swap_fee_bps: u32,
    /// Whether `create_fiat` may replace a registered symbol.
    pub allow_symbol_overwrite: bool,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            owner: Address::ZERO,
            writer: None,
            router: None,
            treasury: Address::ZERO,
            weekday_epoch_offset: EPOCH_WEEKDAY_OFFSET,
            swap_fee_bps: DEFAULT_SWAP_FEE_BPS,
            allow_symbol_overwrite: false,
        }
    }
}

impl ContractConfig {
    /// Config owned by `owner`, with fees swept to the owner.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            treasury: owner,
            ..Self::default()
        }
    }

    pub fn with_writer(mut self, writer: Address) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn with_router(mut self, router: Address) -> Self {
        self.router = Some(router);
        self
    }

    pub fn with_treasury(mut self, treasury: Address) -> Self {
        self.treasury = treasury;
        self
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        info!(
            owner = %config.owner,
            treasury = %config.treasury,
            swap_fee_bps = config.swap_fee_bps,
            "Contract config loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.is_zero() {
            return Err(ConfigError::Invalid("owner must be set".into()));
        }
        if self.treasury.is_zero() {
            return Err(ConfigError::Invalid("treasury must be set".into()));
        }
        if self.weekday_epoch_offset > 6 {
            return Err(ConfigError::Invalid(format!(
                "weekday_epoch_offset {} out of range 0..=6",
                self.weekday_epoch_offset
            )));
        }
        if self.swap_fee_bps > BPS_DENOMINATOR {
            return Err(ConfigError::Invalid(format!(
                "swap_fee_bps {} exceeds {}",
                self.swap_fee_bps, BPS_DENOMINATOR
            )));
        }
        Ok(())
    }
}
