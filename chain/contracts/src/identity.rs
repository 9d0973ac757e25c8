//! Identity Registry: KYC verification data, verificator flags, blacklist
//!
//! - Only the designated writer stores verification data
//! - Owner or writer may revoke verification and toggle the blacklist
//! - `can_trade` is the swap-time predicate; `is_eligible_counterparty` is the
//!   trade-creation predicate and does not look at the verificator flag

use std::collections::HashMap;
use tracing::{debug, info};
use types::ids::Address;

use crate::config::ContractConfig;
use crate::errors::IdentityError;
use crate::events::{AccountVerified, BlacklistUpdated, ContractEvent, VerificationRevoked};
use crate::security::{AccessControl, Administrable, Role};

/// Per-account identity state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityRecord {
    /// Opaque KYC payload. Non-empty means verified.
    pub data: Vec<u8>,
    pub verificator: bool,
    pub blacklisted: bool,
}

impl IdentityRecord {
    pub fn is_verified(&self) -> bool {
        !self.data.is_empty()
    }
}

#[derive(Debug)]
pub struct IdentityRegistry {
    records: HashMap<Address, IdentityRecord>,
    access_control: AccessControl,
    events: Vec<ContractEvent>,
}

impl IdentityRegistry {
    pub fn new(config: &ContractConfig) -> Self {
        Self {
            records: HashMap::new(),
            access_control: AccessControl::new(config.owner).with_role(Role::Writer, config.writer),
            events: Vec::new(),
        }
    }

    // ───────────────────────── Verification ─────────────────────────

    /// Store verification data for `account`. Writer-only; overwrites.
    pub fn verify(
        &mut self,
        caller: &Address,
        account: Address,
        data: Vec<u8>,
    ) -> Result<ContractEvent, IdentityError> {
        if !self.access_control.has_role(caller, Role::Writer) {
            return Err(IdentityError::Unauthorized { caller: *caller });
        }
        if data.is_empty() {
            return Err(IdentityError::EmptyData);
        }

        let data_len = data.len();
        self.records.entry(account).or_default().data = data;
        info!(%account, data_len, "Account verified");

        let event = ContractEvent::AccountVerified(AccountVerified { account, data_len });
        self.events.push(event.clone());
        Ok(event)
    }

    /// Clear verification data. Owner or writer.
    pub fn revoke_verification(
        &mut self,
        caller: &Address,
        account: Address,
    ) -> Result<ContractEvent, IdentityError> {
        self.require_owner_or_writer(caller)?;

        if let Some(record) = self.records.get_mut(&account) {
            record.data.clear();
        }
        info!(%account, "Verification revoked");

        let event = ContractEvent::VerificationRevoked(VerificationRevoked { account });
        self.events.push(event.clone());
        Ok(event)
    }

    pub fn is_verified(&self, account: &Address) -> bool {
        self.records.get(account).map_or(false, IdentityRecord::is_verified)
    }

    pub fn verification_data(&self, account: &Address) -> Option<&[u8]> {
        self.records
            .get(account)
            .filter(|r| r.is_verified())
            .map(|r| r.data.as_slice())
    }

    // ───────────────────────── Blacklist ─────────────────────────

    pub fn set_blacklisted(
        &mut self,
        caller: &Address,
        account: Address,
        blacklisted: bool,
    ) -> Result<ContractEvent, IdentityError> {
        self.require_owner_or_writer(caller)?;

        self.records.entry(account).or_default().blacklisted = blacklisted;
        info!(%account, blacklisted, "Blacklist updated");

        let event = ContractEvent::BlacklistUpdated(BlacklistUpdated {
            account,
            blacklisted,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    pub fn is_blacklisted(&self, account: &Address) -> bool {
        self.records.get(account).map_or(false, |r| r.blacklisted)
    }

    // ───────────────────────── Roles ─────────────────────────

    /// Grant or clear the verificator flag. Owner-only.
    pub fn set_verificator(
        &mut self,
        caller: &Address,
        account: Address,
        verificator: bool,
    ) -> Result<(), IdentityError> {
        self.access_control.require_owner(caller)?;
        self.records.entry(account).or_default().verificator = verificator;
        debug!(%account, verificator, "Verificator flag updated");
        Ok(())
    }

    pub fn is_verificator(&self, account: &Address) -> bool {
        self.records.get(account).map_or(false, |r| r.verificator)
    }

    /// Replace the identity writer. Owner-only.
    pub fn set_writer(&mut self, caller: &Address, writer: Address) -> Result<(), IdentityError> {
        self.access_control.grant_role(caller, Role::Writer, writer)?;
        info!(%writer, "Identity writer changed");
        Ok(())
    }

    pub fn writer(&self) -> Option<Address> {
        self.access_control.holder(Role::Writer)
    }

    // ───────────────────────── Predicates ─────────────────────────

    /// Verificator, not blacklisted, and verified.
    pub fn can_trade(&self, account: &Address) -> bool {
        self.records
            .get(account)
            .map_or(false, |r| r.verificator && !r.blacklisted && r.is_verified())
    }

    /// Verified and not blacklisted.
    pub fn is_eligible_counterparty(&self, account: &Address) -> bool {
        self.records
            .get(account)
            .map_or(false, |r| !r.blacklisted && r.is_verified())
    }

    pub fn record(&self, account: &Address) -> Option<&IdentityRecord> {
        self.records.get(account)
    }

    // ───────────────────────── Events ─────────────────────────

    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }

    fn require_owner_or_writer(&self, caller: &Address) -> Result<(), IdentityError> {
        if !self.access_control.is_owner_or(caller, Role::Writer) {
            return Err(IdentityError::Unauthorized { caller: *caller });
        }
        Ok(())
    }
}

impl Administrable for IdentityRegistry {
    fn access_control(&self) -> &AccessControl {
        &self.access_control
    }

    fn access_control_mut(&mut self) -> &mut AccessControl {
        &mut self.access_control
    }
}
