//! Swap Authorization Hook Chain
//!
//! Hooks are installed on a [`HookChain`] in the order the pool wants them
//! evaluated. Around every swap the chain:
//! 1. Runs each before-swap check; the first rejection aborts the swap
//! 2. Quotes the swap on the engine
//! 3. Runs each after-swap hook, which stage audit events and fee accruals
//! 4. Settles the swap on the engine
//! 5. Commits the staged effects
//!
//! Nothing from steps 3–5 is visible unless every step succeeds.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use types::ids::Address;
use types::numeric::{bps_of, TokenAmount};
use types::swap::{BalanceDelta, PoolKey, SwapParams};

use crate::arbitration::ArbitrationScheduler;
use crate::config::ContractConfig;
use crate::env::BlockEnv;
use crate::errors::{FeeError, HookError};
use crate::events::{ContractEvent, SwapAudited};
use crate::fees::FeeAccumulator;
use crate::fiat::FiatTokenFactory;
use crate::identity::IdentityRegistry;
use crate::pool::{HookAck, HookPermissions, SwapExecutor};

/// Read-only view of the contracts a hook may consult.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    pub identity: &'a IdentityRegistry,
    pub fiat: &'a FiatTokenFactory,
    pub arbitration: &'a ArbitrationScheduler,
    pub env: &'a BlockEnv,
}

impl<'a> HookContext<'a> {
    pub fn new(
        identity: &'a IdentityRegistry,
        fiat: &'a FiatTokenFactory,
        arbitration: &'a ArbitrationScheduler,
        env: &'a BlockEnv,
    ) -> Self {
        Self {
            identity,
            fiat,
            arbitration,
            env,
        }
    }
}

/// Effects staged by after-swap hooks, committed only if the swap settles.
#[derive(Debug, Default)]
pub struct SwapJournal {
    events: Vec<ContractEvent>,
    fees: BTreeMap<Address, TokenAmount>,
}

impl SwapJournal {
    pub fn emit(&mut self, event: ContractEvent) {
        self.events.push(event);
    }

    pub fn accrue_fee(&mut self, currency: Address, amount: TokenAmount) -> Result<(), FeeError> {
        let staged = self.fees.entry(currency).or_insert(Decimal::ZERO);
        *staged = staged.checked_add(amount).ok_or(FeeError::Overflow)?;
        Ok(())
    }

    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Fees staged in `currency`.
    pub fn fees(&self, currency: &Address) -> TokenAmount {
        self.fees.get(currency).copied().unwrap_or(Decimal::ZERO)
    }
}

/// A pluggable swap participant.
pub trait SwapHook {
    /// Short identifier used in audit events and logs.
    fn name(&self) -> &'static str;

    fn permissions(&self) -> HookPermissions;

    fn before_swap(
        &self,
        _ctx: &HookContext<'_>,
        _sender: &Address,
        _key: &PoolKey,
        _params: &SwapParams,
    ) -> Result<HookAck, HookError> {
        Ok(HookAck::BeforeSwap)
    }

    /// Default behaviour stages a [`SwapAudited`] event.
    fn after_swap(
        &self,
        _ctx: &HookContext<'_>,
        sender: &Address,
        key: &PoolKey,
        _params: &SwapParams,
        delta: &BalanceDelta,
        journal: &mut SwapJournal,
    ) -> Result<HookAck, HookError> {
        journal.emit(audit_event(self.name(), sender, key, delta));
        Ok(HookAck::AfterSwap)
    }
}

fn audit_event(hook: &str, sender: &Address, key: &PoolKey, delta: &BalanceDelta) -> ContractEvent {
    ContractEvent::SwapAudited(SwapAudited {
        hook: hook.to_string(),
        sender: *sender,
        pool: *key,
        delta: *delta,
    })
}

/// Rejects senders that fail [`IdentityRegistry::can_trade`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHook;

impl SwapHook for IdentityHook {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn permissions(&self) -> HookPermissions {
        HookPermissions::BOTH
    }

    fn before_swap(
        &self,
        ctx: &HookContext<'_>,
        sender: &Address,
        _key: &PoolKey,
        _params: &SwapParams,
    ) -> Result<HookAck, HookError> {
        if !ctx.identity.can_trade(sender) {
            return Err(HookError::NotTradeable(*sender));
        }
        Ok(HookAck::BeforeSwap)
    }
}

/// Rejects pools where neither currency is a registered fiat token.
#[derive(Debug, Clone, Copy, Default)]
pub struct FiatEligibilityHook;

impl SwapHook for FiatEligibilityHook {
    fn name(&self) -> &'static str {
        "fiat"
    }

    fn permissions(&self) -> HookPermissions {
        HookPermissions::BOTH
    }

    fn before_swap(
        &self,
        ctx: &HookContext<'_>,
        _sender: &Address,
        key: &PoolKey,
        _params: &SwapParams,
    ) -> Result<HookAck, HookError> {
        if !ctx.fiat.is_fiat(&key.currency0) && !ctx.fiat.is_fiat(&key.currency1) {
            return Err(HookError::NoFiatToken {
                currency0: key.currency0,
                currency1: key.currency1,
            });
        }
        Ok(HookAck::BeforeSwap)
    }
}

/// Rejects senders that are not lawyers active at the current block.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArbitrationHook;

impl SwapHook for ArbitrationHook {
    fn name(&self) -> &'static str {
        "arbitration"
    }

    fn permissions(&self) -> HookPermissions {
        HookPermissions::BOTH
    }

    fn before_swap(
        &self,
        ctx: &HookContext<'_>,
        sender: &Address,
        _key: &PoolKey,
        _params: &SwapParams,
    ) -> Result<HookAck, HookError> {
        if !ctx.arbitration.get_is_active(sender, ctx.env) {
            return Err(HookError::LawyerInactive(*sender));
        }
        Ok(HookAck::BeforeSwap)
    }
}

/// Retains `fee_bps` of the swap input into the pool fee accumulator.
#[derive(Debug, Clone, Copy)]
pub struct FeeHook {
    fee_bps: u32,
}

impl FeeHook {
    pub fn new(fee_bps: u32) -> Self {
        Self { fee_bps }
    }

    pub fn from_config(config: &ContractConfig) -> Self {
        Self::new(config.swap_fee_bps)
    }
}

impl SwapHook for FeeHook {
    fn name(&self) -> &'static str {
        "fee"
    }

    fn permissions(&self) -> HookPermissions {
        HookPermissions::AFTER_ONLY
    }

    fn after_swap(
        &self,
        _ctx: &HookContext<'_>,
        sender: &Address,
        key: &PoolKey,
        params: &SwapParams,
        delta: &BalanceDelta,
        journal: &mut SwapJournal,
    ) -> Result<HookAck, HookError> {
        let amount_in = delta.amount_in(params.zero_for_one);
        let fee = bps_of(amount_in, self.fee_bps).ok_or(FeeError::Overflow)?;
        if fee > Decimal::ZERO {
            journal.accrue_fee(key.input_currency(params.zero_for_one), fee)?;
        }
        journal.emit(audit_event(self.name(), sender, key, delta));
        Ok(HookAck::AfterSwap)
    }
}

/// Ordered set of hooks installed at one hook address, plus the fees that
/// address holds.
pub struct HookChain {
    address: Address,
    hooks: Vec<Box<dyn SwapHook>>,
    fees: FeeAccumulator,
    events: Vec<ContractEvent>,
}

impl HookChain {
    pub fn new(config: &ContractConfig, address: Address) -> Self {
        Self {
            address,
            hooks: Vec::new(),
            fees: FeeAccumulator::new(config, address),
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Append a hook; hooks run in installation order.
    pub fn with_hook(mut self, hook: impl SwapHook + 'static) -> Self {
        self.install(hook);
        self
    }

    pub fn install(&mut self, hook: impl SwapHook + 'static) {
        debug!(hook = hook.name(), position = self.hooks.len(), "Hook installed");
        self.hooks.push(Box::new(hook));
    }

    pub fn hook_names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    /// Run `sender`'s swap through every installed hook and the engine.
    pub fn swap<E: SwapExecutor + ?Sized>(
        &mut self,
        ctx: &HookContext<'_>,
        executor: &mut E,
        sender: &Address,
        key: &PoolKey,
        params: &SwapParams,
    ) -> Result<BalanceDelta, HookError> {
        for hook in self.hooks.iter().filter(|h| h.permissions().before_swap) {
            let ack = hook.before_swap(ctx, sender, key, params).map_err(|e| {
                warn!(hook = hook.name(), %sender, error = %e, "Swap rejected before execution");
                e
            })?;
            if ack != HookAck::BeforeSwap {
                return Err(HookError::InvalidAck { hook: hook.name() });
            }
        }

        let delta = executor.simulate(key, params)?;

        let mut journal = SwapJournal::default();
        for hook in self.hooks.iter().filter(|h| h.permissions().after_swap) {
            let ack = hook.after_swap(ctx, sender, key, params, &delta, &mut journal)?;
            if ack != HookAck::AfterSwap {
                return Err(HookError::InvalidAck { hook: hook.name() });
            }
        }

        // Check the fee commit before the engine settles so nothing can fail after it
        for (currency, amount) in &journal.fees {
            self.fees.preview(key, currency, *amount)?;
        }

        executor.settle(sender, key, params, &delta)?;

        for (currency, amount) in std::mem::take(&mut journal.fees) {
            self.fees.accrue(key, currency, amount)?;
        }
        self.events.append(&mut journal.events);
        info!(
            %sender,
            amount_specified = %params.amount_specified,
            "Hooked swap settled"
        );
        Ok(delta)
    }

    pub fn fees(&self) -> &FeeAccumulator {
        &self.fees
    }

    pub fn fees_mut(&mut self) -> &mut FeeAccumulator {
        &mut self.fees
    }

    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }
}
