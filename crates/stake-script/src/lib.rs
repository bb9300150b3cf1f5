//! Redeem script construction and verification for CoreDAO staking.
//!
//! Every lock output must commit to a redeem script built from a single
//! template and this device's protocol key at `m/84'/1'/0'/0/0`. The
//! [`RedeemScriptEngine`] rebuilds that script and compares byte for byte.

mod engine;
mod errors;
mod keys;
mod template;

pub use engine::RedeemScriptEngine;
pub use errors::{KeyError, ScriptError};
#[cfg(any(test, feature = "test-utils"))]
pub use keys::MockDeviceKeys;
pub use keys::{protocol_derivation_path, DeviceKeys, XprivKeys, ZeroizableXpriv};
pub use template::{build_redeem_script, lock_script_pubkey};
