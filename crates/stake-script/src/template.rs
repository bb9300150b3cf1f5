//! The fixed time-locked redeem script template and its P2WSH commitment.
//!
//! ```text
//! PUSH4 <locktime LE> OP_CLTV OP_DROP OP_DUP OP_HASH160 PUSH20 <pkh> OP_EQUALVERIFY OP_CHECKSIG
//! ```

use bitcoin::{
    hashes::{sha256, Hash},
    opcodes::all::{
        OP_CHECKSIG, OP_CLTV, OP_DROP, OP_DUP, OP_EQUALVERIFY, OP_HASH160, OP_PUSHBYTES_0,
        OP_PUSHBYTES_20, OP_PUSHBYTES_32, OP_PUSHBYTES_4,
    },
};
use coredao_stake_types::{
    constants::{LOCK_SCRIPT_LEN, PUBKEY_HASH_LEN, REDEEM_SCRIPT_LEN},
    RedeemScript,
};

/// Assembles the redeem script for `locktime` paying to `pubkey_hash`.
pub fn build_redeem_script(locktime: u32, pubkey_hash: &[u8; PUBKEY_HASH_LEN]) -> RedeemScript {
    let mut out = [0u8; REDEEM_SCRIPT_LEN];
    out[0] = OP_PUSHBYTES_4.to_u8();
    out[1..5].copy_from_slice(&locktime.to_le_bytes());
    out[5] = OP_CLTV.to_u8();
    out[6] = OP_DROP.to_u8();
    out[7] = OP_DUP.to_u8();
    out[8] = OP_HASH160.to_u8();
    out[9] = OP_PUSHBYTES_20.to_u8();
    out[10..30].copy_from_slice(pubkey_hash);
    out[30] = OP_EQUALVERIFY.to_u8();
    out[31] = OP_CHECKSIG.to_u8();
    RedeemScript::new(out)
}

/// The witness v0 script hash output committing to `script`.
pub fn lock_script_pubkey(script: &RedeemScript) -> [u8; LOCK_SCRIPT_LEN] {
    let hash = sha256::Hash::hash(script.as_bytes());
    let mut out = [0u8; LOCK_SCRIPT_LEN];
    out[0] = OP_PUSHBYTES_0.to_u8();
    out[1] = OP_PUSHBYTES_32.to_u8();
    out[2..].copy_from_slice(hash.as_byte_array());
    out
}
