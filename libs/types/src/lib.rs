//! Types library for the P2P fiat exchange contracts
//!
//! Value types shared by every contract module and by the swap execution
//! engine the hooks plug into.
//!
//! # Modules
//! - `ids`: Addresses and trade identifiers
//! - `numeric`: Decimal token amounts, prices and basis-point helpers
//! - `swap`: Pool keys, swap parameters and balance deltas

pub mod ids;
pub mod numeric;
pub mod swap;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::swap::*;
}
