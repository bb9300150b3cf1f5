//! Types for CoreDAO staking data carried inside Bitcoin transactions.
//!
//! This crate knows the byte layouts (staking payload, redeem script, lock
//! scriptPubKey) and the small value types shared by the classifier and the
//! signing gate. It does no hashing and holds no keys.

mod bitmap;
mod chain;
pub mod constants;
mod errors;
mod kind;
mod payload;
mod redeem;

pub use bitmap::*;
pub use chain::*;
pub use errors::*;
pub use kind::*;
pub use payload::*;
pub use redeem::*;

#[cfg(test)]
use proptest as _;
