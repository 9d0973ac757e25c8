//! Boundary with the swap execution engine
//!
//! The engine quotes a swap without side effects, then settles it. Hooks run
//! between the two, so a rejected after-swap check leaves the engine
//! untouched.

use types::ids::Address;
use types::swap::{BalanceDelta, PoolKey, SwapParams};

use crate::errors::SwapFailure;

/// Pool manager the hooks plug into.
pub trait SwapExecutor {
    /// Compute the balance delta a swap would produce. Must not mutate state.
    fn simulate(&self, key: &PoolKey, params: &SwapParams) -> Result<BalanceDelta, SwapFailure>;

    /// Apply a previously simulated swap for `sender`.
    fn settle(
        &mut self,
        sender: &Address,
        key: &PoolKey,
        params: &SwapParams,
        delta: &BalanceDelta,
    ) -> Result<(), SwapFailure>;
}

/// Value a hook entry point returns to acknowledge the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAck {
    BeforeSwap,
    AfterSwap,
}

/// Which entry points a hook wants the engine to call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookPermissions {
    pub before_swap: bool,
    pub after_swap: bool,
}

impl HookPermissions {
    pub const BOTH: HookPermissions = HookPermissions {
        before_swap: true,
        after_swap: true,
    };

    pub const AFTER_ONLY: HookPermissions = HookPermissions {
        before_swap: false,
        after_swap: true,
    };
}
