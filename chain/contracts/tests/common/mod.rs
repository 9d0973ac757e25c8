//! Shared fixtures for integration tests

#![allow(dead_code)]

use contracts::arbitration::ArbitrationScheduler;
use contracts::config::ContractConfig;
use contracts::env::BlockEnv;
use contracts::errors::SwapFailure;
use contracts::fiat::FiatTokenFactory;
use contracts::hooks::HookContext;
use contracts::identity::IdentityRegistry;
use contracts::pool::SwapExecutor;
use contracts::trade::{TradeManager, TradeTerms};
use rust_decimal::Decimal;
use types::ids::Address;
use types::swap::{BalanceDelta, PoolKey, SwapParams};

pub fn owner() -> Address {
    Address::from_low_u64(0x01)
}

pub fn writer() -> Address {
    Address::from_low_u64(0x02)
}

pub fn router() -> Address {
    Address::from_low_u64(0x03)
}

pub fn treasury() -> Address {
    Address::from_low_u64(0x04)
}

pub fn attacker() -> Address {
    Address::from_low_u64(0xbad)
}

pub fn buyer() -> Address {
    Address::from_low_u64(0xb1)
}

pub fn seller() -> Address {
    Address::from_low_u64(0x5e)
}

pub fn weth() -> Address {
    Address::from_low_u64(0xe7)
}

pub fn hooks() -> Address {
    Address::from_low_u64(0x40)
}

pub const FACTORY: u64 = 0xfac;
pub const TRADE_MANAGER: u64 = 0x7a;

pub fn config() -> ContractConfig {
    ContractConfig::new(owner())
        .with_writer(writer())
        .with_router(router())
        .with_treasury(treasury())
}

/// Every contract of one deployment.
pub struct Deployment {
    pub config: ContractConfig,
    pub identity: IdentityRegistry,
    pub arbitration: ArbitrationScheduler,
    pub fiat: FiatTokenFactory,
    pub trades: TradeManager,
    pub fusd: Address,
}

impl Deployment {
    pub fn new(config: ContractConfig) -> Self {
        let mut fiat = FiatTokenFactory::new(&config, Address::from_low_u64(FACTORY));
        let fusd = fiat.create_fiat(&config.owner, "Fiat Dollar", "fUSD").unwrap();
        Self {
            identity: IdentityRegistry::new(&config),
            arbitration: ArbitrationScheduler::new(&config),
            fiat,
            trades: TradeManager::new(Address::from_low_u64(TRADE_MANAGER)),
            fusd,
            config,
        }
    }

    /// Verify, enable and whitelist `account` for swaps.
    pub fn onboard(&mut self, account: Address) {
        self.identity
            .verify(&writer(), account, b"kyc:passport".to_vec())
            .unwrap();
        self.identity
            .set_verificator(&self.config.owner, account, true)
            .unwrap();
    }

    pub fn fund(&mut self, account: Address, amount: i64, approve: i64) {
        self.fiat
            .mint(&router(), self.fusd, account, Decimal::from(amount))
            .unwrap();
        let spender = self.trades.address();
        self.fiat
            .token_mut(&self.fusd)
            .unwrap()
            .approve(&account, spender, Decimal::from(approve))
            .unwrap();
    }

    pub fn balance(&self, account: Address) -> Decimal {
        self.fiat.token(&self.fusd).unwrap().balance_of(&account)
    }

    pub fn terms(&self, amount: i64) -> TradeTerms {
        TradeTerms {
            buyer: buyer(),
            seller: seller(),
            amount: Decimal::from(amount),
            price: Decimal::new(101, 2),
            fiat_token: self.fusd,
        }
    }

    pub fn ctx<'a>(&'a self, env: &'a BlockEnv) -> HookContext<'a> {
        HookContext::new(&self.identity, &self.fiat, &self.arbitration, env)
    }

    pub fn fiat_pool(&self) -> PoolKey {
        PoolKey::new(self.fusd, weth(), 30, 60, hooks())
    }
}

/// Constant-rate engine: `rate` units out per unit in.
pub struct FixedRateEngine {
    pub rate: Decimal,
    pub settled: Vec<(Address, SwapParams)>,
    pub fail_reason: Option<&'static str>,
}

impl FixedRateEngine {
    pub fn new(rate: Decimal) -> Self {
        Self {
            rate,
            settled: Vec::new(),
            fail_reason: None,
        }
    }
}

impl SwapExecutor for FixedRateEngine {
    fn simulate(&self, _key: &PoolKey, params: &SwapParams) -> Result<BalanceDelta, SwapFailure> {
        if let Some(reason) = self.fail_reason {
            return Err(SwapFailure::new(reason));
        }
        let amount_in = params.magnitude();
        let amount_out = amount_in * self.rate;
        Ok(if params.zero_for_one {
            BalanceDelta::new(-amount_in, amount_out)
        } else {
            BalanceDelta::new(amount_out, -amount_in)
        })
    }

    fn settle(
        &mut self,
        sender: &Address,
        _key: &PoolKey,
        params: &SwapParams,
        _delta: &BalanceDelta,
    ) -> Result<(), SwapFailure> {
        self.settled.push((*sender, *params));
        Ok(())
    }
}
