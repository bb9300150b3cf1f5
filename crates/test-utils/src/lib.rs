//! Shared fixtures for CoreDAO staking tests.
//!
//! Everything here is deterministic: one fixed master key, fixed staking
//! identities, and byte builders for the scripts the classifier inspects.

use bitcoin::{
    bip32::Xpriv, consensus, script::PushBytesBuf, Amount, NetworkKind, ScriptBuf, TxOut,
};
use coredao_stake_script::{lock_script_pubkey, RedeemScriptEngine, XprivKeys};
use coredao_stake_types::{constants::LOCK_SCRIPT_LEN, ChainId, RedeemScript, StakingPayload};

mod psbt;

pub use psbt::{wallet_path, PsbtBuilder, FOREIGN_FINGERPRINT};

/// Seed of the test master key.
pub const TEST_SEED: [u8; 32] = [0x42; 32];

pub const TEST_DELEGATOR: [u8; 20] = [0xd1; 20];
pub const TEST_VALIDATOR: [u8; 20] = [0x7a; 20];
pub const TEST_FEE: u8 = 3;

pub fn test_xpriv() -> Xpriv {
    Xpriv::new_master(NetworkKind::Test, &TEST_SEED).expect("valid seed")
}

pub fn test_keys() -> XprivKeys {
    XprivKeys::new(test_xpriv())
}

/// Engine bound to [`test_keys`].
pub fn test_engine() -> RedeemScriptEngine {
    RedeemScriptEngine::new(&test_keys()).expect("protocol key derives")
}

/// A payload carrying this device's canonical script for `locktime`.
pub fn sample_payload(
    engine: &RedeemScriptEngine,
    chain: ChainId,
    locktime: u32,
) -> StakingPayload {
    payload_with_script(chain, engine.build(locktime))
}

pub fn payload_with_script(chain: ChainId, script: RedeemScript) -> StakingPayload {
    StakingPayload::new(chain, TEST_DELEGATOR, TEST_VALIDATOR, TEST_FEE, script)
}

/// `OP_RETURN OP_PUSHDATA1 80 <payload>`.
pub fn op_return_script(payload: &StakingPayload) -> Vec<u8> {
    let data = PushBytesBuf::try_from(payload.encode().to_vec()).expect("payload fits a push");
    ScriptBuf::new_op_return(data).into_bytes()
}

/// Data output scriptPubKey for a stake with the canonical script.
pub fn data_output(engine: &RedeemScriptEngine, chain: ChainId, locktime: u32) -> Vec<u8> {
    op_return_script(&sample_payload(engine, chain, locktime))
}

/// Lock output scriptPubKey committing to the canonical script.
pub fn lock_output_script(engine: &RedeemScriptEngine, locktime: u32) -> [u8; LOCK_SCRIPT_LEN] {
    lock_script_pubkey(&engine.build(locktime))
}

/// Consensus encoding of a witness UTXO: `amount(8 LE) | len | script_pubkey`.
pub fn witness_utxo(amount: u64, script_pubkey: &[u8]) -> Vec<u8> {
    consensus::serialize(&TxOut {
        value: Amount::from_sat(amount),
        script_pubkey: ScriptBuf::from_bytes(script_pubkey.to_vec()),
    })
}
