//! Shared security primitives for contract modules
//!
//! Provides the reentrancy guard and the ownership/role access control used by
//! the identity registry, arbitration scheduler, fiat factory, trade manager
//! and fee accumulator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use types::ids::Address;

use crate::errors::AccessError;

/// Reentrancy guard preventing nested calls into protected functions.
///
/// A contract function acquires the guard before executing state-changing
/// logic and releases it on completion. Any nested call attempt fails.
#[derive(Debug, Clone)]
pub struct ReentrancyGuard {
    locked: bool,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self { locked: false }
    }

    /// Acquire the guard. Returns `true` if successfully acquired.
    /// Returns `false` if already locked (reentrancy attempt).
    pub fn acquire(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    /// Release the guard.
    pub fn release(&mut self) {
        self.locked = false;
    }

    /// Check if currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Default for ReentrancyGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Delegated roles. Each role has at most one holder; the owner is tracked
/// separately and implicitly passes every owner-or-role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Writes KYC verification data
    Writer,
    /// Creates fiat tokens and mints on behalf of the platform
    Router,
}

/// Ownership plus single-holder role assignments.
#[derive(Debug, Clone)]
pub struct AccessControl {
    owner: Address,
    holders: HashMap<Role, Address>,
}

impl AccessControl {
    /// Create access control owned by `owner`.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            holders: HashMap::new(),
        }
    }

    /// Seed a role holder at construction time.
    pub fn with_role(mut self, role: Role, holder: Option<Address>) -> Self {
        if let Some(holder) = holder.filter(|h| !h.is_zero()) {
            self.holders.insert(role, holder);
        }
        self
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        self.owner == *caller
    }

    /// Check if a caller currently holds the role.
    pub fn has_role(&self, caller: &Address, role: Role) -> bool {
        self.holders.get(&role) == Some(caller)
    }

    /// Owner, or the holder of `role`.
    pub fn is_owner_or(&self, caller: &Address, role: Role) -> bool {
        self.is_owner(caller) || self.has_role(caller, role)
    }

    pub fn holder(&self, role: Role) -> Option<Address> {
        self.holders.get(&role).copied()
    }

    pub fn require_owner(&self, caller: &Address) -> Result<(), AccessError> {
        if !self.is_owner(caller) {
            return Err(AccessError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Assign a role, replacing any previous holder. Owner-only.
    pub fn grant_role(
        &mut self,
        caller: &Address,
        role: Role,
        holder: Address,
    ) -> Result<(), AccessError> {
        self.require_owner(caller)?;
        if holder.is_zero() {
            return Err(AccessError::ZeroAddress);
        }
        self.holders.insert(role, holder);
        Ok(())
    }

    /// Clear a role. Owner-only.
    pub fn revoke_role(&mut self, caller: &Address, role: Role) -> Result<(), AccessError> {
        self.require_owner(caller)?;
        self.holders.remove(&role);
        Ok(())
    }

    /// Hand ownership to a new address.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), AccessError> {
        self.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(AccessError::ZeroAddress);
        }
        self.owner = new_owner;
        Ok(())
    }
}

/// Capability of contracts with an owner and delegated roles.
pub trait Administrable {
    fn access_control(&self) -> &AccessControl;

    fn access_control_mut(&mut self) -> &mut AccessControl;

    fn owner(&self) -> Address {
        self.access_control().owner()
    }

    fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), AccessError> {
        self.access_control_mut().transfer_ownership(caller, new_owner)
    }
}
