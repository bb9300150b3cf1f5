use std::fmt;

use bitcoin::ScriptBuf;
use zeroize::Zeroize;

use crate::{
    constants::{REDEEM_LOCKTIME_OFFSET, REDEEM_SCRIPT_LEN},
    RedeemScriptLenError,
};

/// Raw bytes of a 32-byte CoreDAO redeem script.
///
/// Holding a `RedeemScript` says nothing about whether it is canonical for
/// this device; that check belongs to the script engine.
#[derive(Clone, PartialEq, Eq, Hash, Zeroize)]
pub struct RedeemScript([u8; REDEEM_SCRIPT_LEN]);

impl RedeemScript {
    pub const fn new(bytes: [u8; REDEEM_SCRIPT_LEN]) -> Self {
        Self(bytes)
    }

    /// Reads a redeem script from a slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RedeemScriptLenError> {
        let raw: [u8; REDEEM_SCRIPT_LEN] = bytes
            .try_into()
            .map_err(|_| RedeemScriptLenError(bytes.len()))?;
        Ok(Self(raw))
    }

    /// The absolute locktime embedded at offset 1, little-endian.
    ///
    /// This is read without checking the surrounding opcodes.
    pub fn locktime(&self) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.0[REDEEM_LOCKTIME_OFFSET..REDEEM_LOCKTIME_OFFSET + 4]);
        u32::from_le_bytes(raw)
    }

    pub fn as_bytes(&self) -> &[u8; REDEEM_SCRIPT_LEN] {
        &self.0
    }

    pub fn to_script_buf(&self) -> ScriptBuf {
        ScriptBuf::from_bytes(self.0.to_vec())
    }
}

impl AsRef<[u8]> for RedeemScript {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; REDEEM_SCRIPT_LEN]> for RedeemScript {
    fn from(value: [u8; REDEEM_SCRIPT_LEN]) -> Self {
        Self(value)
    }
}

impl fmt::Debug for RedeemScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RedeemScript({})", hex::encode(self.0))
    }
}
