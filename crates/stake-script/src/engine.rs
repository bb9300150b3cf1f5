use bitcoin::hashes::{hash160, Hash};
use coredao_stake_types::{constants::PUBKEY_HASH_LEN, RedeemScript};
use secp256k1::PublicKey;
use tracing::debug;

use crate::{
    keys::{protocol_derivation_path, DeviceKeys},
    template::{build_redeem_script, lock_script_pubkey},
    KeyError, ScriptError,
};

/// Builds and checks redeem scripts bound to this device's protocol key.
///
/// The public key hash is derived once, when the engine is created, and reused
/// for every script in the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemScriptEngine {
    pubkey_hash: [u8; PUBKEY_HASH_LEN],
}

impl RedeemScriptEngine {
    /// Derives the protocol key from `keys` and caches its hash160.
    pub fn new<K: DeviceKeys + ?Sized>(keys: &K) -> Result<Self, KeyError> {
        let pubkey = keys.derive_pubkey(&protocol_derivation_path())?;
        Ok(Self::from_pubkey(&pubkey))
    }

    pub fn from_pubkey(pubkey: &PublicKey) -> Self {
        let hash = hash160::Hash::hash(&pubkey.serialize());
        Self {
            pubkey_hash: hash.to_byte_array(),
        }
    }

    pub fn pubkey_hash(&self) -> &[u8; PUBKEY_HASH_LEN] {
        &self.pubkey_hash
    }

    /// The canonical redeem script for `locktime`.
    pub fn build(&self, locktime: u32) -> RedeemScript {
        build_redeem_script(locktime, &self.pubkey_hash)
    }

    /// Accepts `script` only if it equals the canonical script for its own locktime.
    pub fn validate(&self, script: &RedeemScript) -> Result<(), ScriptError> {
        let locktime = script.locktime();
        if self.build(locktime) != *script {
            debug!(%locktime, "redeem script differs from canonical template");
            return Err(ScriptError::RedeemMismatch { locktime });
        }
        Ok(())
    }

    /// Accepts `spk` only if it is the P2WSH output of the canonical script
    /// for `script`'s locktime.
    pub fn validate_lock_script_pubkey(
        &self,
        spk: &[u8],
        script: &RedeemScript,
    ) -> Result<(), ScriptError> {
        let canonical = self.build(script.locktime());
        if spk != lock_script_pubkey(&canonical).as_slice() {
            return Err(ScriptError::LockScriptMismatch);
        }
        Ok(())
    }
}
