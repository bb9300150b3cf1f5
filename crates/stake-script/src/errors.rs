use bitcoin::bip32::{self, DerivationPath};
use thiserror::Error;

/// Errors from the device key collaborator.
#[derive(Debug, Error)]
pub enum KeyError {
    /// BIP32 derivation failed.
    #[error("bip32 derivation failed: {0}")]
    Derivation(#[from] bip32::Error),

    /// The digest could not be signed.
    #[error("ecdsa signing failed: {0}")]
    Signing(#[from] secp256k1::Error),

    /// The device refused to produce a key at the path.
    #[error("no key available at {0}")]
    Unavailable(DerivationPath),
}

/// Mismatches between an observed script and the canonical one.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ScriptError {
    /// The redeem script differs from the canonical script for its own locktime.
    #[error("redeem script is not canonical for locktime {locktime}")]
    RedeemMismatch { locktime: u32 },

    /// The scriptPubKey does not commit to the canonical redeem script.
    #[error("lock scriptPubKey does not commit to the canonical redeem script")]
    LockScriptMismatch,
}
