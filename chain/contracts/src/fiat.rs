//! Fiat Token Factory: creation, registry, and minting of fiat-pegged tokens
//!
//! The factory deploys minimal fungible tokens with itself as the sole
//! minter, registers them by symbol, and keeps an enumerable creation list.
//! Owner or router may create tokens and mint/burn supply.

use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{info, warn};
use types::ids::Address;
use types::numeric::TokenAmount;

use crate::config::ContractConfig;
use crate::errors::{FactoryError, TokenError};
use crate::events::{ContractEvent, FiatCreated};
use crate::security::{AccessControl, Administrable, Role};

/// Minimal fungible token with a single trusted minter.
#[derive(Debug, Clone)]
pub struct FiatToken {
    address: Address,
    name: String,
    symbol: String,
    minter: Address,
    total_supply: TokenAmount,
    balances: HashMap<Address, TokenAmount>,
    /// (owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address), TokenAmount>,
}

impl FiatToken {
    pub fn new(address: Address, name: String, symbol: String, minter: Address) -> Self {
        Self {
            address,
            name,
            symbol,
            minter,
            total_supply: Decimal::ZERO,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn minter(&self) -> Address {
        self.minter
    }

    pub fn total_supply(&self) -> TokenAmount {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Address) -> TokenAmount {
        self.balances.get(account).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> TokenAmount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn approve(
        &mut self,
        caller: &Address,
        spender: Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        check_amount(amount)?;
        if spender.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.allowances.insert((*caller, spender), amount);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        caller: &Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        check_amount(amount)?;
        self.check_balance(caller, amount)?;
        self.move_balance(*caller, to, amount)
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`.
    ///
    /// Balance and allowance are both checked before anything changes.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        check_amount(amount)?;
        let allowed = self.allowance(&from, spender);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: from,
                spender: *spender,
                required: amount.to_string(),
                available: allowed.to_string(),
            });
        }
        self.check_balance(&from, amount)?;

        self.move_balance(from, to, amount)?;
        self.allowances.insert((from, *spender), allowed - amount);
        Ok(())
    }

    pub fn mint(&mut self, caller: &Address, to: Address, amount: TokenAmount) -> Result<(), TokenError> {
        self.check_minter(caller)?;
        check_amount(amount)?;
        if to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.total_supply = supply;
        self.balances.insert(to, balance);
        Ok(())
    }

    pub fn burn(&mut self, caller: &Address, from: Address, amount: TokenAmount) -> Result<(), TokenError> {
        self.check_minter(caller)?;
        check_amount(amount)?;
        self.check_balance(&from, amount)?;
        let remaining = self.balance_of(&from) - amount;
        self.balances.insert(from, remaining);
        self.total_supply -= amount;
        Ok(())
    }

    fn check_minter(&self, caller: &Address) -> Result<(), TokenError> {
        if *caller != self.minter {
            return Err(TokenError::NotMinter);
        }
        Ok(())
    }

    fn check_balance(&self, account: &Address, amount: TokenAmount) -> Result<(), TokenError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                account: *account,
                required: amount.to_string(),
                available: available.to_string(),
            });
        }
        Ok(())
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: TokenAmount) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let debited = self.balance_of(&from) - amount;
        self.balances.insert(from, debited);
        self.balances.insert(to, credited);
        Ok(())
    }
}

fn check_amount(amount: TokenAmount) -> Result<(), TokenError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(TokenError::InvalidAmount);
    }
    Ok(())
}

/// Registry and minter of the platform's fiat tokens.
#[derive(Debug)]
pub struct FiatTokenFactory {
    address: Address,
    tokens: HashMap<Address, FiatToken>,
    by_symbol: HashMap<String, Address>,
    /// Creation order, including tokens whose symbol was later taken over
    created: Vec<Address>,
    nonce: u64,
    allow_symbol_overwrite: bool,
    access_control: AccessControl,
    events: Vec<ContractEvent>,
}

impl FiatTokenFactory {
    pub fn new(config: &ContractConfig, address: Address) -> Self {
        Self {
            address,
            tokens: HashMap::new(),
            by_symbol: HashMap::new(),
            created: Vec::new(),
            nonce: 0,
            allow_symbol_overwrite: config.allow_symbol_overwrite,
            access_control: AccessControl::new(config.owner).with_role(Role::Router, config.router),
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    // ───────────────────────── Creation ─────────────────────────

    /// Deploy and register a new fiat token. Owner or router.
    pub fn create_fiat(
        &mut self,
        caller: &Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Result<Address, FactoryError> {
        self.require_owner_or_router(caller)?;
        let name = name.into();
        let symbol = symbol.into();
        if name.is_empty() || symbol.is_empty() {
            return Err(FactoryError::EmptyMetadata);
        }
        if let Some(existing) = self.by_symbol.get(&symbol) {
            if !self.allow_symbol_overwrite {
                return Err(FactoryError::SymbolTaken { symbol });
            }
            warn!(%symbol, previous = %existing, "Fiat symbol registration overwritten");
        }

        let token_address = self.derive_address();
        self.nonce += 1;
        self.tokens.insert(
            token_address,
            FiatToken::new(token_address, name.clone(), symbol.clone(), self.address),
        );
        self.by_symbol.insert(symbol.clone(), token_address);
        self.created.push(token_address);
        info!(token = %token_address, %name, %symbol, "Fiat token created");

        self.events.push(ContractEvent::FiatCreated(FiatCreated {
            token: token_address,
            name,
            symbol,
        }));
        Ok(token_address)
    }

    fn derive_address(&self) -> Address {
        let mut hasher = Sha256::new();
        hasher.update(b"fiat-token");
        hasher.update(self.address.as_bytes());
        hasher.update(self.nonce.to_be_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        Address::from_digest(&digest)
    }

    // ───────────────────────── Supply ─────────────────────────

    pub fn mint(
        &mut self,
        caller: &Address,
        token: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<(), FactoryError> {
        self.require_owner_or_router(caller)?;
        let minter = self.address;
        self.token_mut(&token)?.mint(&minter, to, amount)?;
        info!(%token, %to, %amount, "Fiat minted");
        Ok(())
    }

    pub fn burn(
        &mut self,
        caller: &Address,
        token: Address,
        from: Address,
        amount: TokenAmount,
    ) -> Result<(), FactoryError> {
        self.require_owner_or_router(caller)?;
        let minter = self.address;
        self.token_mut(&token)?.burn(&minter, from, amount)?;
        info!(%token, %from, %amount, "Fiat burned");
        Ok(())
    }

    // ───────────────────────── Registry ─────────────────────────

    /// Address currently registered for `symbol`.
    pub fn address_of(&self, symbol: &str) -> Option<Address> {
        self.by_symbol.get(symbol).copied()
    }

    /// True if `token` is the registered token for its symbol.
    pub fn is_fiat(&self, token: &Address) -> bool {
        self.tokens
            .get(token)
            .map_or(false, |t| self.by_symbol.get(&t.symbol) == Some(token))
    }

    /// Every token ever created, in creation order.
    pub fn all_tokens(&self) -> &[Address] {
        &self.created
    }

    pub fn token(&self, token: &Address) -> Option<&FiatToken> {
        self.tokens.get(token)
    }

    pub fn token_mut(&mut self, token: &Address) -> Result<&mut FiatToken, FactoryError> {
        self.tokens
            .get_mut(token)
            .ok_or(FactoryError::UnknownToken(*token))
    }

    /// Replace the router. Owner-only.
    pub fn set_router(&mut self, caller: &Address, router: Address) -> Result<(), FactoryError> {
        self.access_control.grant_role(caller, Role::Router, router)?;
        info!(%router, "Fiat router changed");
        Ok(())
    }

    pub fn router(&self) -> Option<Address> {
        self.access_control.holder(Role::Router)
    }

    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }

    fn require_owner_or_router(&self, caller: &Address) -> Result<(), FactoryError> {
        if !self.access_control.is_owner_or(caller, Role::Router) {
            return Err(FactoryError::Unauthorized { caller: *caller });
        }
        Ok(())
    }
}

impl Administrable for FiatTokenFactory {
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

    fn owner() -> Address {
        Address::from_low_u64(0x01)
    }

    fn router() -> Address {
        Address::from_low_u64(0x02)
    }

    fn factory_address() -> Address {
        Address::from_low_u64(0xfac)
    }

    fn alice() -> Address {
        Address::from_low_u64(0xa1)
    }

    fn bob() -> Address {
        Address::from_low_u64(0xb0)
    }

    fn setup() -> FiatTokenFactory {
        FiatTokenFactory::new(
            &ContractConfig::new(owner()).with_router(router()),
            factory_address(),
        )
    }

    // ─── Factory tests ───

    #[test]
    fn test_create_fiat_registers_symbol() {
        let mut factory = setup();
        let token = factory.create_fiat(&owner(), "Euro Fiat", "fEUR").unwrap();
        assert_eq!(factory.address_of("fEUR"), Some(token));
        assert!(factory.is_fiat(&token));
        assert_eq!(factory.all_tokens(), &[token]);

        let t = factory.token(&token).unwrap();
        assert_eq!(t.name(), "Euro Fiat");
        assert_eq!(t.minter(), factory_address());
        assert_eq!(t.total_supply(), Decimal::ZERO);
    }

    #[test]
    fn test_router_may_create() {
        let mut factory = setup();
        assert!(factory.create_fiat(&router(), "Dollar", "fUSD").is_ok());
    }

    #[test]
    fn test_create_fiat_unauthorized() {
        let mut factory = setup();
        assert_eq!(
            factory.create_fiat(&alice(), "Dollar", "fUSD"),
            Err(FactoryError::Unauthorized { caller: alice() })
        );
        assert!(factory.all_tokens().is_empty());
    }

    #[test]
    fn test_create_fiat_empty_metadata() {
        let mut factory = setup();
        assert_eq!(
            factory.create_fiat(&owner(), "", "fUSD"),
            Err(FactoryError::EmptyMetadata)
        );
    }

    #[test]
    fn test_duplicate_symbol_rejected_by_default() {
        let mut factory = setup();
        let first = factory.create_fiat(&owner(), "Dollar", "fUSD").unwrap();
        assert_eq!(
            factory.create_fiat(&owner(), "Dollar 2", "fUSD"),
            Err(FactoryError::SymbolTaken {
                symbol: "fUSD".to_string()
            })
        );
        assert_eq!(factory.address_of("fUSD"), Some(first));
        assert_eq!(factory.all_tokens().len(), 1);
    }

    #[test]
    fn test_duplicate_symbol_overwrites_when_allowed() {
        let mut config = ContractConfig::new(owner());
        config.allow_symbol_overwrite = true;
        let mut factory = FiatTokenFactory::new(&config, factory_address());

        let first = factory.create_fiat(&owner(), "Dollar", "fUSD").unwrap();
        let second = factory.create_fiat(&owner(), "Dollar 2", "fUSD").unwrap();
        assert_ne!(first, second);
        assert_eq!(factory.address_of("fUSD"), Some(second));
        assert!(!factory.is_fiat(&first));
        assert!(factory.is_fiat(&second));
        assert_eq!(factory.all_tokens(), &[first, second]);
    }

    #[test]
    fn test_token_addresses_are_distinct() {
        let mut factory = setup();
        let a = factory.create_fiat(&owner(), "Dollar", "fUSD").unwrap();
        let b = factory.create_fiat(&owner(), "Euro", "fEUR").unwrap();
        assert_ne!(a, b);
        assert!(!a.is_zero());
    }

    #[test]
    fn test_mint_and_burn() {
        let mut factory = setup();
        let token = factory.create_fiat(&owner(), "Dollar", "fUSD").unwrap();
        factory.mint(&router(), token, alice(), Decimal::from(500)).unwrap();
        factory.burn(&owner(), token, alice(), Decimal::from(200)).unwrap();

        let t = factory.token(&token).unwrap();
        assert_eq!(t.balance_of(&alice()), Decimal::from(300));
        assert_eq!(t.total_supply(), Decimal::from(300));
    }

    #[test]
    fn test_mint_unauthorized() {
        let mut factory = setup();
        let token = factory.create_fiat(&owner(), "Dollar", "fUSD").unwrap();
        assert!(factory.mint(&alice(), token, alice(), Decimal::from(1)).is_err());
    }

    #[test]
    fn test_mint_unknown_token() {
        let mut factory = setup();
        let bogus = Address::from_low_u64(0xdead);
        assert_eq!(
            factory.mint(&owner(), bogus, alice(), Decimal::from(1)),
            Err(FactoryError::UnknownToken(bogus))
        );
    }

    #[test]
    fn test_only_factory_is_minter() {
        let mut factory = setup();
        let token = factory.create_fiat(&owner(), "Dollar", "fUSD").unwrap();
        let t = factory.token_mut(&token).unwrap();
        assert_eq!(
            t.mint(&owner(), alice(), Decimal::from(1)),
            Err(TokenError::NotMinter)
        );
    }

    #[test]
    fn test_burn_more_than_balance() {
        let mut factory = setup();
        let token = factory.create_fiat(&owner(), "Dollar", "fUSD").unwrap();
        factory.mint(&owner(), token, alice(), Decimal::from(5)).unwrap();
        let result = factory.burn(&owner(), token, alice(), Decimal::from(6));
        assert!(matches!(
            result,
            Err(FactoryError::Token(TokenError::InsufficientBalance { .. }))
        ));
    }

    #[test]
    fn test_set_router() {
        let mut factory = setup();
        factory.set_router(&owner(), alice()).unwrap();
        assert_eq!(factory.router(), Some(alice()));
        assert!(factory.create_fiat(&router(), "Dollar", "fUSD").is_err());
        assert!(factory.create_fiat(&alice(), "Dollar", "fUSD").is_ok());
    }

    // ─── Token tests ───

    fn funded_token() -> FiatToken {
        let mut token = FiatToken::new(
            Address::from_low_u64(0x70),
            "Dollar".into(),
            "fUSD".into(),
            factory_address(),
        );
        token.mint(&factory_address(), alice(), Decimal::from(100)).unwrap();
        token
    }

    #[test]
    fn test_transfer() {
        let mut token = funded_token();
        token.transfer(&alice(), bob(), Decimal::from(40)).unwrap();
        assert_eq!(token.balance_of(&alice()), Decimal::from(60));
        assert_eq!(token.balance_of(&bob()), Decimal::from(40));
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut token = funded_token();
        let result = token.transfer(&bob(), alice(), Decimal::from(1));
        assert!(matches!(result, Err(TokenError::InsufficientBalance { .. })));
    }

    #[test]
    fn test_transfer_to_zero_rejected() {
        let mut token = funded_token();
        assert_eq!(
            token.transfer(&alice(), Address::ZERO, Decimal::from(1)),
            Err(TokenError::ZeroAddress)
        );
        assert_eq!(token.balance_of(&alice()), Decimal::from(100));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut token = funded_token();
        assert_eq!(
            token.transfer(&alice(), bob(), Decimal::from(-1)),
            Err(TokenError::InvalidAmount)
        );
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut token = funded_token();
        let spender = Address::from_low_u64(0x5e);
        token.approve(&alice(), spender, Decimal::from(70)).unwrap();
        token
            .transfer_from(&spender, alice(), bob(), Decimal::from(50))
            .unwrap();
        assert_eq!(token.allowance(&alice(), &spender), Decimal::from(20));
        assert_eq!(token.balance_of(&bob()), Decimal::from(50));
    }

    #[test]
    fn test_transfer_from_without_allowance_changes_nothing() {
        let mut token = funded_token();
        let spender = Address::from_low_u64(0x5e);
        let result = token.transfer_from(&spender, alice(), bob(), Decimal::from(10));
        assert!(matches!(result, Err(TokenError::InsufficientAllowance { .. })));
        assert_eq!(token.balance_of(&alice()), Decimal::from(100));
        assert_eq!(token.balance_of(&bob()), Decimal::ZERO);
    }

    #[test]
    fn test_transfer_from_insufficient_balance_keeps_allowance() {
        let mut token = funded_token();
        let spender = Address::from_low_u64(0x5e);
        token.approve(&alice(), spender, Decimal::from(500)).unwrap();
        let result = token.transfer_from(&spender, alice(), bob(), Decimal::from(200));
        assert!(matches!(result, Err(TokenError::InsufficientBalance { .. })));
        assert_eq!(token.allowance(&alice(), &spender), Decimal::from(500));
    }
}
