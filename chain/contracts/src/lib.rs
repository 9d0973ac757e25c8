//! Contract logic for the P2P fiat exchange
//!
//! This crate implements the contract layer that gates swaps on the exchange's
//! hooked pools and settles peer-to-peer fiat trades.
//!
//! # Modules
//! - `config`: Deployment configuration (owner, roles, treasury, fees)
//! - `env`: Block metadata passed to every call
//! - `events`: Contract events
//! - `errors`: Contract-specific error types
//! - `security`: Reentrancy guard, ownership and role access control
//! - `identity`: KYC verification, verificator flags, blacklist
//! - `arbitration`: Lawyer roster, weekly schedules, selection
//! - `fiat`: Fiat token factory and the minimal token it deploys
//! - `pool`: Swap engine boundary and hook acknowledgements
//! - `hooks`: Identity, fiat, arbitration and fee hooks and the hook chain
//! - `fees`: Pool fee accumulator and treasury sweep
//! - `trade`: Trade creation, confirmation and cancellation

pub mod config;
pub mod env;
pub mod errors;
pub mod events;
pub mod security;
pub mod identity;
pub mod arbitration;
pub mod fiat;
pub mod pool;
pub mod hooks;
pub mod fees;
pub mod trade;

/// Contract ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
