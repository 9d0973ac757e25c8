//! Arbitration Scheduler: lawyer roster, weekly availability, selection
//!
//! Lawyers are added and removed by the owner. Each lawyer manages their own
//! activity flag and 7×24 availability grid. A lawyer is active at a block if
//! registered, flagged active, and the `[weekday][hour]` slot is open.
//!
//! The roster keeps insertion order: entries are keyed by a monotonically
//! increasing sequence number, with an address → sequence index for removal.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};
use types::ids::Address;

use crate::config::ContractConfig;
use crate::env::BlockEnv;
use crate::errors::ArbitrationError;
use crate::events::{ContractEvent, LawyerAdded, LawyerRemoved, LawyerUpdated};
use crate::security::{AccessControl, Administrable};

pub const DAYS_PER_WEEK: usize = 7;
pub const HOURS_PER_DAY: usize = 24;

/// Availability grid indexed `[weekday][hour]`, weekday 0 = Sunday.
pub type WeeklySchedule = [[bool; HOURS_PER_DAY]; DAYS_PER_WEEK];

/// Every slot available.
pub const FULLY_OPEN: WeeklySchedule = [[true; HOURS_PER_DAY]; DAYS_PER_WEEK];

/// Source of selection indices for [`ArbitrationScheduler::pick_available`].
pub trait RandomSource {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick_index(&mut self, env: &BlockEnv, len: usize) -> usize;
}

/// Derives the index from a hash of block timestamp and base fee.
///
/// Predictable by anyone who can see the block; only suitable where
/// selection is not worth manipulating within one block.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainEntropy;

impl RandomSource for ChainEntropy {
    fn pick_index(&mut self, env: &BlockEnv, len: usize) -> usize {
        let mut hasher = Sha256::new();
        hasher.update(env.timestamp.to_be_bytes());
        hasher.update(env.base_fee.to_be_bytes());
        let digest = hasher.finalize();
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        (u64::from_be_bytes(word) % len as u64) as usize
    }
}

/// Seeded ChaCha stream, independent of the block.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&mut self, _env: &BlockEnv, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lawyer {
    pub is_active: bool,
    pub schedule: WeeklySchedule,
    seq: u64,
}

#[derive(Debug)]
pub struct ArbitrationScheduler {
    lawyers: HashMap<Address, Lawyer>,
    roster: BTreeMap<u64, Address>,
    next_seq: u64,
    weekday_epoch_offset: u8,
    access_control: AccessControl,
    events: Vec<ContractEvent>,
}

impl ArbitrationScheduler {
    pub fn new(config: &ContractConfig) -> Self {
        Self {
            lawyers: HashMap::new(),
            roster: BTreeMap::new(),
            next_seq: 0,
            weekday_epoch_offset: config.weekday_epoch_offset,
            access_control: AccessControl::new(config.owner),
            events: Vec::new(),
        }
    }

    // ───────────────────────── Roster ─────────────────────────

    /// Register a lawyer, active and fully available. Owner-only.
    pub fn add(&mut self, caller: &Address, lawyer: Address) -> Result<ContractEvent, ArbitrationError> {
        self.access_control.require_owner(caller)?;
        if self.lawyers.contains_key(&lawyer) {
            return Err(ArbitrationError::AlreadyPresent(lawyer));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.roster.insert(seq, lawyer);
        self.lawyers.insert(
            lawyer,
            Lawyer {
                is_active: true,
                schedule: FULLY_OPEN,
                seq,
            },
        );
        info!(%lawyer, roster_len = self.roster.len(), "Lawyer added");

        let event = ContractEvent::LawyerAdded(LawyerAdded { lawyer });
        self.events.push(event.clone());
        Ok(event)
    }

    /// Deregister a lawyer. Owner-only; survivors keep their order.
    pub fn remove(&mut self, caller: &Address, lawyer: Address) -> Result<ContractEvent, ArbitrationError> {
        self.access_control.require_owner(caller)?;
        let record = self
            .lawyers
            .remove(&lawyer)
            .ok_or(ArbitrationError::NotPresent(lawyer))?;
        self.roster.remove(&record.seq);
        info!(%lawyer, roster_len = self.roster.len(), "Lawyer removed");

        let event = ContractEvent::LawyerRemoved(LawyerRemoved { lawyer });
        self.events.push(event.clone());
        Ok(event)
    }

    /// Lawyers in insertion order.
    pub fn roster(&self) -> Vec<Address> {
        self.roster.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn contains(&self, lawyer: &Address) -> bool {
        self.lawyers.contains_key(lawyer)
    }

    pub fn lawyer(&self, lawyer: &Address) -> Option<&Lawyer> {
        self.lawyers.get(lawyer)
    }

    // ───────────────────────── Self-service ─────────────────────────

    /// Replace the caller's own weekly schedule.
    pub fn set_schedule(
        &mut self,
        caller: &Address,
        schedule: WeeklySchedule,
    ) -> Result<ContractEvent, ArbitrationError> {
        let record = self.self_record(caller)?;
        record.schedule = schedule;
        let is_active = record.is_active;
        debug!(lawyer = %caller, "Schedule replaced");
        Ok(self.push_updated(*caller, is_active))
    }

    /// Open or close a single slot of the caller's schedule.
    pub fn set_slot(
        &mut self,
        caller: &Address,
        weekday: usize,
        hour: usize,
        available: bool,
    ) -> Result<ContractEvent, ArbitrationError> {
        if weekday >= DAYS_PER_WEEK || hour >= HOURS_PER_DAY {
            return Err(ArbitrationError::SlotOutOfRange { weekday, hour });
        }
        let record = self.self_record(caller)?;
        record.schedule[weekday][hour] = available;
        let is_active = record.is_active;
        debug!(lawyer = %caller, weekday, hour, available, "Schedule slot updated");
        Ok(self.push_updated(*caller, is_active))
    }

    pub fn set_is_active(
        &mut self,
        caller: &Address,
        is_active: bool,
    ) -> Result<ContractEvent, ArbitrationError> {
        let record = self.self_record(caller)?;
        record.is_active = is_active;
        info!(lawyer = %caller, is_active, "Lawyer activity changed");
        Ok(self.push_updated(*caller, is_active))
    }

    pub fn schedule_of(&self, lawyer: &Address) -> Option<&WeeklySchedule> {
        self.lawyers.get(lawyer).map(|l| &l.schedule)
    }

    // ───────────────────────── Availability ─────────────────────────

    /// Registered, flagged active, and available at the block's weekday/hour.
    pub fn get_is_active(&self, lawyer: &Address, env: &BlockEnv) -> bool {
        let weekday = env.weekday(self.weekday_epoch_offset);
        let hour = env.hour();
        self.lawyers
            .get(lawyer)
            .map_or(false, |l| l.is_active && l.schedule[weekday][hour])
    }

    /// Currently active lawyers, in roster order.
    pub fn active_lawyers(&self, env: &BlockEnv) -> Vec<Address> {
        self.roster
            .values()
            .filter(|lawyer| self.get_is_active(lawyer, env))
            .copied()
            .collect()
    }

    /// Pick one active lawyer, or `None` if nobody is available.
    pub fn pick_available<R: RandomSource + ?Sized>(
        &self,
        env: &BlockEnv,
        rng: &mut R,
    ) -> Option<Address> {
        let active = self.active_lawyers(env);
        if active.is_empty() {
            debug!(timestamp = env.timestamp, "No lawyer available");
            return None;
        }
        let index = rng.pick_index(env, active.len()) % active.len();
        Some(active[index])
    }

    // ───────────────────────── Events ─────────────────────────

    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }

    fn self_record(&mut self, caller: &Address) -> Result<&mut Lawyer, ArbitrationError> {
        self.lawyers
            .get_mut(caller)
            .ok_or(ArbitrationError::NotPresent(*caller))
    }

    fn push_updated(&mut self, lawyer: Address, is_active: bool) -> ContractEvent {
        let event = ContractEvent::LawyerUpdated(LawyerUpdated { lawyer, is_active });
        self.events.push(event.clone());
        event
    }
}

impl Administrable for ArbitrationScheduler {
    fn access_control(&self) -> &AccessControl {
        &self.access_control
    }

    fn access_control_mut(&mut self) -> &mut AccessControl {
        &mut self.access_control
    }
}
