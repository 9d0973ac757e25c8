//! Trade Lifecycle Manager: bilateral fiat trades and their settlement
//!
//! Lifecycle: `Created → Confirmed` (fiat moves buyer → seller) or
//! `Created → Cancelled` (nothing moves). Both outcomes are terminal.
//!
//! Trade ids are the SHA-256 of the block timestamp and the trade terms, so
//! identical terms in the same block map to the same record and the later
//! call replaces a still-pending earlier one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};
use types::ids::{Address, TradeId};
use types::numeric::{Price, TokenAmount};

use crate::env::BlockEnv;
use crate::errors::TradeError;
use crate::events::{ContractEvent, TradeCancelled, TradeConfirmed, TradeCreated};
use crate::fiat::FiatTokenFactory;
use crate::identity::IdentityRegistry;
use crate::security::ReentrancyGuard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeStatus {
    Created,
    Confirmed,
    Cancelled,
}

impl TradeStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TradeStatus::Created)
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeStatus::Created => "Created",
            TradeStatus::Confirmed => "Confirmed",
            TradeStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

/// What the two parties agreed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeTerms {
    pub buyer: Address,
    pub seller: Address,
    /// Fiat token units the buyer pays on confirmation.
    pub amount: TokenAmount,
    pub price: Price,
    pub fiat_token: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub terms: TradeTerms,
    pub status: TradeStatus,
    pub created_at: i64,
}

impl Trade {
    pub fn is_party(&self, account: &Address) -> bool {
        self.terms.buyer == *account || self.terms.seller == *account
    }
}

/// Deterministic id over the creation timestamp and terms.
pub fn compute_trade_id(timestamp: i64, terms: &TradeTerms) -> TradeId {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.to_be_bytes());
    hasher.update(terms.buyer.as_bytes());
    hasher.update(terms.seller.as_bytes());
    hasher.update(terms.amount.normalize().serialize());
    hasher.update(terms.price.normalize().serialize());
    hasher.update(terms.fiat_token.as_bytes());
    TradeId::from_bytes(hasher.finalize().into())
}

#[derive(Debug)]
pub struct TradeManager {
    /// Spender identity used for settlement transfers
    address: Address,
    trades: HashMap<TradeId, Trade>,
    reentrancy_guard: ReentrancyGuard,
    events: Vec<ContractEvent>,
}

impl TradeManager {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            trades: HashMap::new(),
            reentrancy_guard: ReentrancyGuard::new(),
            events: Vec::new(),
        }
    }

    /// Address buyers must approve before a trade can be confirmed.
    pub fn address(&self) -> Address {
        self.address
    }

    // ───────────────────────── Create ─────────────────────────

    /// Record a new trade in `Created` state.
    ///
    /// Both parties must be verified and not blacklisted, and the fiat token
    /// must be registered with the factory.
    pub fn create_trade(
        &mut self,
        env: &BlockEnv,
        identity: &IdentityRegistry,
        fiat: &FiatTokenFactory,
        terms: TradeTerms,
    ) -> Result<TradeId, TradeError> {
        if terms.buyer == terms.seller {
            return Err(TradeError::SelfTrade);
        }
        if terms.amount <= Decimal::ZERO {
            return Err(TradeError::InvalidAmount);
        }
        for party in [terms.buyer, terms.seller] {
            if !identity.is_eligible_counterparty(&party) {
                warn!(%party, "Trade rejected: counterparty not eligible");
                return Err(TradeError::Unverified(party));
            }
        }
        if !fiat.is_fiat(&terms.fiat_token) {
            return Err(TradeError::UnsupportedToken(terms.fiat_token));
        }

        let id = compute_trade_id(env.timestamp, &terms);
        if let Some(existing) = self.trades.get(&id) {
            if existing.status.is_terminal() {
                return Err(TradeError::NotPending {
                    id,
                    status: existing.status.to_string(),
                });
            }
            warn!(trade_id = %id, "Pending trade with identical terms replaced");
        }

        self.trades.insert(
            id,
            Trade {
                id,
                terms,
                status: TradeStatus::Created,
                created_at: env.timestamp,
            },
        );
        info!(
            trade_id = %id,
            buyer = %terms.buyer,
            seller = %terms.seller,
            amount = %terms.amount,
            "Trade created"
        );

        self.events.push(ContractEvent::TradeCreated(TradeCreated {
            trade_id: id,
            buyer: terms.buyer,
            seller: terms.seller,
            amount: terms.amount,
            price: terms.price,
            fiat_token: terms.fiat_token,
        }));
        Ok(id)
    }

    // ───────────────────────── Confirm / Cancel ─────────────────────────

    /// Settle a pending trade: move `amount` fiat from buyer to seller.
    ///
    /// The transfer runs before the status change; if it fails the trade
    /// stays `Created` and no balance moves.
    pub fn confirm_trade(
        &mut self,
        caller: &Address,
        id: TradeId,
        fiat: &mut FiatTokenFactory,
    ) -> Result<ContractEvent, TradeError> {
        if !self.reentrancy_guard.acquire() {
            return Err(TradeError::Reentrancy);
        }
        let result = self.settle(caller, id, fiat);
        self.reentrancy_guard.release();
        result
    }

    fn settle(
        &mut self,
        caller: &Address,
        id: TradeId,
        fiat: &mut FiatTokenFactory,
    ) -> Result<ContractEvent, TradeError> {
        let spender = self.address;
        let trade = self.pending_trade_mut(caller, id)?;
        let terms = trade.terms;
        if !fiat.is_fiat(&terms.fiat_token) {
            warn!(trade_id = %id, token = %terms.fiat_token, "Trade token no longer registered");
            return Err(TradeError::UnsupportedToken(terms.fiat_token));
        }

        let token = fiat
            .token_mut(&terms.fiat_token)
            .map_err(|_| TradeError::UnsupportedToken(terms.fiat_token))?;
        token
            .transfer_from(&spender, terms.buyer, terms.seller, terms.amount)
            .map_err(|e| {
                warn!(trade_id = %id, error = %e, "Trade settlement transfer failed");
                e
            })?;

        trade.status = TradeStatus::Confirmed;
        info!(trade_id = %id, confirmed_by = %caller, amount = %terms.amount, "Trade confirmed");

        let event = ContractEvent::TradeConfirmed(TradeConfirmed {
            trade_id: id,
            confirmed_by: *caller,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    /// Cancel a pending trade. No funds move.
    pub fn cancel_trade(&mut self, caller: &Address, id: TradeId) -> Result<ContractEvent, TradeError> {
        let trade = self.pending_trade_mut(caller, id)?;
        trade.status = TradeStatus::Cancelled;
        info!(trade_id = %id, cancelled_by = %caller, "Trade cancelled");

        let event = ContractEvent::TradeCancelled(TradeCancelled {
            trade_id: id,
            cancelled_by: *caller,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    fn pending_trade_mut(&mut self, caller: &Address, id: TradeId) -> Result<&mut Trade, TradeError> {
        let trade = self.trades.get_mut(&id).ok_or(TradeError::NotFound(id))?;
        if trade.status != TradeStatus::Created {
            return Err(TradeError::NotPending {
                id,
                status: trade.status.to_string(),
            });
        }
        if !trade.is_party(caller) {
            return Err(TradeError::NotParty { id, caller: *caller });
        }
        Ok(trade)
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn trade(&self, id: &TradeId) -> Option<&Trade> {
        self.trades.get(id)
    }

    pub fn status(&self, id: &TradeId) -> Option<TradeStatus> {
        self.trades.get(id).map(|t| t.status)
    }

    /// Trades where `account` is buyer or seller, oldest first.
    pub fn trades_of(&self, account: &Address) -> Vec<&Trade> {
        let mut trades: Vec<&Trade> = self
            .trades
            .values()
            .filter(|t| t.is_party(account))
            .collect();
        trades.sort_by_key(|t| (t.created_at, t.id));
        trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }
}
