//! Pool Fee Accumulator: accrued swap fees and the sweep to the treasury
//!
//! Fees are held by the hook contract, one balance per currency, and only
//! grow between sweeps. A sweep swaps one currency's whole balance with the
//! treasury as recipient and clears it once the swap settles.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{info, warn};
use types::ids::Address;
use types::numeric::TokenAmount;
use types::swap::{PoolKey, SwapParams};

use crate::config::ContractConfig;
use crate::errors::FeeError;
use crate::events::{ContractEvent, FeesAccrued, FeesSwept};
use crate::pool::SwapExecutor;
use crate::security::{AccessControl, Administrable, ReentrancyGuard};

#[derive(Debug)]
pub struct FeeAccumulator {
    /// Account holding the collected fees; the sweep swaps from here.
    address: Address,
    accrued: HashMap<Address, TokenAmount>,
    treasury: Address,
    reentrancy_guard: ReentrancyGuard,
    access_control: AccessControl,
    events: Vec<ContractEvent>,
}

impl FeeAccumulator {
    pub fn new(config: &ContractConfig, address: Address) -> Self {
        Self {
            address,
            accrued: HashMap::new(),
            treasury: config.treasury,
            reentrancy_guard: ReentrancyGuard::new(),
            access_control: AccessControl::new(config.owner),
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Fees held in `currency`.
    pub fn accrued(&self, currency: &Address) -> TokenAmount {
        self.accrued.get(currency).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    /// Balance of `currency` after adding `amount`, without recording it.
    pub fn preview(
        &self,
        pool: &PoolKey,
        currency: &Address,
        amount: TokenAmount,
    ) -> Result<TokenAmount, FeeError> {
        if !pool.involves(currency) {
            return Err(FeeError::ForeignCurrency { currency: *currency });
        }
        self.accrued(currency)
            .checked_add(amount)
            .ok_or(FeeError::Overflow)
    }

    /// Add `amount` of `currency` collected on `pool`.
    pub fn accrue(
        &mut self,
        pool: &PoolKey,
        currency: Address,
        amount: TokenAmount,
    ) -> Result<ContractEvent, FeeError> {
        let total = self.preview(pool, &currency, amount)?;
        self.accrued.insert(currency, total);

        let event = ContractEvent::FeesAccrued(FeesAccrued {
            pool: *pool,
            currency,
            amount,
            total,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    /// Swap all fees held in the input currency of (`pool`, `zero_for_one`)
    /// to the treasury. Owner-only.
    ///
    /// Fails with [`FeeError::NoFees`] rather than sending an empty swap. The
    /// balance is only cleared after the swap settles.
    pub fn send_fee_to_master_chef<E: SwapExecutor + ?Sized>(
        &mut self,
        caller: &Address,
        executor: &mut E,
        pool: &PoolKey,
        zero_for_one: bool,
    ) -> Result<ContractEvent, FeeError> {
        self.access_control.require_owner(caller)?;
        if !self.reentrancy_guard.acquire() {
            return Err(FeeError::Reentrancy);
        }
        let result = self.sweep(executor, pool, zero_for_one);
        self.reentrancy_guard.release();
        result
    }

    fn sweep<E: SwapExecutor + ?Sized>(
        &mut self,
        executor: &mut E,
        pool: &PoolKey,
        zero_for_one: bool,
    ) -> Result<ContractEvent, FeeError> {
        let currency = pool.input_currency(zero_for_one);
        let amount = self.accrued(&currency);
        if amount <= Decimal::ZERO {
            return Err(FeeError::NoFees);
        }

        let params = SwapParams::exact_input(zero_for_one, amount).with_recipient(self.treasury);
        let delta = executor.simulate(pool, &params).map_err(|e| {
            warn!(reason = %e.reason, %currency, "Fee sweep quote failed");
            e
        })?;
        executor.settle(&self.address, pool, &params, &delta)?;

        self.accrued.remove(&currency);
        info!(treasury = %self.treasury, %currency, %amount, "Fees swept to treasury");

        let event = ContractEvent::FeesSwept(FeesSwept {
            treasury: self.treasury,
            currency,
            amount,
            delta,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Administrable for FeeAccumulator {
    fn access_control(&self) -> &AccessControl {
        &self.access_control
    }

    fn access_control_mut(&mut self) -> &mut AccessControl {
        &mut self.access_control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SwapFailure;
    use types::swap::BalanceDelta;

    fn owner() -> Address {
        Address::from_low_u64(0x01)
    }

    fn treasury() -> Address {
        Address::from_low_u64(0x7e)
    }

    fn hooks() -> Address {
        Address::from_low_u64(0x40)
    }

    fn token0() -> Address {
        Address::from_low_u64(0x10)
    }

    fn token1() -> Address {
        Address::from_low_u64(0x20)
    }

    fn pool() -> PoolKey {
        PoolKey::new(token0(), token1(), 30, 60, hooks())
    }

    /// Records settled swaps; optionally refuses to quote.
    #[derive(Default)]
    struct RecordingEngine {
        fail_with: Option<&'static str>,
        settled: Vec<(Address, SwapParams)>,
    }

    impl SwapExecutor for RecordingEngine {
        fn simulate(&self, _key: &PoolKey, params: &SwapParams) -> Result<BalanceDelta, SwapFailure> {
            if let Some(reason) = self.fail_with {
                return Err(SwapFailure::new(reason));
            }
            Ok(BalanceDelta::new(params.amount_specified, params.magnitude()))
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

    fn setup() -> FeeAccumulator {
        FeeAccumulator::new(&ContractConfig::new(owner()).with_treasury(treasury()), hooks())
    }

    #[test]
    fn test_accrue_is_cumulative_per_currency() {
        let mut fees = setup();
        fees.accrue(&pool(), token0(), Decimal::from(3)).unwrap();
        fees.accrue(&pool(), token0(), Decimal::new(25, 1)).unwrap();
        fees.accrue(&pool(), token1(), Decimal::from(7)).unwrap();
        assert_eq!(fees.accrued(&token0()), Decimal::new(55, 1));
        assert_eq!(fees.accrued(&token1()), Decimal::from(7));
    }

    #[test]
    fn test_accrue_rejects_foreign_currency() {
        let mut fees = setup();
        let other = Address::from_low_u64(0x99);
        assert_eq!(
            fees.accrue(&pool(), other, Decimal::ONE),
            Err(FeeError::ForeignCurrency { currency: other })
        );
        assert_eq!(fees.accrued(&other), Decimal::ZERO);
        assert!(fees.events().is_empty());
    }

    #[test]
    fn test_accrue_overflow() {
        let mut fees = setup();
        fees.accrue(&pool(), token0(), Decimal::MAX).unwrap();
        assert_eq!(
            fees.accrue(&pool(), token0(), Decimal::ONE),
            Err(FeeError::Overflow)
        );
        assert_eq!(fees.accrued(&token0()), Decimal::MAX);
    }

    #[test]
    fn test_sweep_settles_from_hook_to_treasury() {
        let mut fees = setup();
        let mut engine = RecordingEngine::default();
        fees.accrue(&pool(), token0(), Decimal::from(12)).unwrap();

        let event = fees
            .send_fee_to_master_chef(&owner(), &mut engine, &pool(), true)
            .unwrap();
        assert!(matches!(
            event,
            ContractEvent::FeesSwept(FeesSwept { currency, .. }) if currency == token0()
        ));
        assert_eq!(fees.accrued(&token0()), Decimal::ZERO);
        assert_eq!(engine.settled.len(), 1);

        let (sender, params) = engine.settled[0];
        assert_eq!(sender, hooks());
        assert_ne!(sender, owner());
        assert_eq!(params.recipient, Some(treasury()));
        assert_eq!(params.magnitude(), Decimal::from(12));
    }

    #[test]
    fn test_sweep_takes_only_the_input_currency() {
        let mut fees = setup();
        let mut engine = RecordingEngine::default();
        fees.accrue(&pool(), token0(), Decimal::from(10)).unwrap();
        fees.accrue(&pool(), token1(), Decimal::from(4)).unwrap();

        fees.send_fee_to_master_chef(&owner(), &mut engine, &pool(), false)
            .unwrap();
        let (_, params) = engine.settled[0];
        assert!(!params.zero_for_one);
        assert_eq!(params.magnitude(), Decimal::from(4));
        assert_eq!(fees.accrued(&token0()), Decimal::from(10));
        assert_eq!(fees.accrued(&token1()), Decimal::ZERO);
    }

    #[test]
    fn test_second_sweep_reports_no_fees() {
        let mut fees = setup();
        let mut engine = RecordingEngine::default();
        fees.accrue(&pool(), token0(), Decimal::from(1)).unwrap();
        fees.send_fee_to_master_chef(&owner(), &mut engine, &pool(), true)
            .unwrap();

        assert_eq!(
            fees.send_fee_to_master_chef(&owner(), &mut engine, &pool(), true),
            Err(FeeError::NoFees)
        );
        assert_eq!(engine.settled.len(), 1, "No zero-value swap may be sent");
    }

    #[test]
    fn test_failed_swap_keeps_fees() {
        let mut fees = setup();
        let mut engine = RecordingEngine {
            fail_with: Some("INSUFFICIENT_LIQUIDITY"),
            ..Default::default()
        };
        fees.accrue(&pool(), token1(), Decimal::from(9)).unwrap();

        assert_eq!(
            fees.send_fee_to_master_chef(&owner(), &mut engine, &pool(), false),
            Err(FeeError::Swap(SwapFailure::new("INSUFFICIENT_LIQUIDITY")))
        );
        assert_eq!(fees.accrued(&token1()), Decimal::from(9));

        // Guard released after the failure
        engine.fail_with = None;
        assert!(fees
            .send_fee_to_master_chef(&owner(), &mut engine, &pool(), false)
            .is_ok());
    }

    #[test]
    fn test_sweep_owner_only() {
        let mut fees = setup();
        let mut engine = RecordingEngine::default();
        fees.accrue(&pool(), token0(), Decimal::from(1)).unwrap();
        let stranger = Address::from_low_u64(0x99);
        assert!(matches!(
            fees.send_fee_to_master_chef(&stranger, &mut engine, &pool(), true),
            Err(FeeError::Access(_))
        ));
        assert_eq!(fees.accrued(&token0()), Decimal::from(1));
    }
}
