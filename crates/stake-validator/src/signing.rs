//! Signing gate: produces protocol-key signatures only for inputs the
//! classifier accepted as lock spends.

use bitcoin::EcdsaSighashType;
use coredao_stake_script::{protocol_derivation_path, DeviceKeys};
use secp256k1::{ecdsa, PublicKey};
use tracing::debug;

use crate::{
    inputs::LockedPrevout, SighashProvider, SignError, TxClassification, TxView,
};

/// Sighash type used for every protocol signature.
pub const PROTOCOL_SIGHASH_TYPE: EcdsaSighashType = EcdsaSighashType::All;

/// A signature over one protocol input, made with the protocol key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolSignature {
    pub input: usize,
    pub pubkey: PublicKey,
    pub signature: ecdsa::Signature,
    pub sighash_type: EcdsaSighashType,
}

/// Signs input `idx` if, and only if, the classification marks it as a
/// protocol input. Other inputs are a no-op.
pub fn sign_input<H, K>(
    host: &H,
    keys: &K,
    class: &TxClassification,
    idx: usize,
) -> Result<Option<ProtocolSignature>, SignError>
where
    H: TxView + SighashProvider + ?Sized,
    K: DeviceKeys + ?Sized,
{
    if !class.is_acceptable() {
        return Err(SignError::NotAccepted);
    }
    if !class.protocol_inputs().get(idx)? {
        return Ok(None);
    }

    let raw_utxo = host
        .input_witness_utxo(idx)?
        .ok_or(SignError::WitnessUtxo { input: idx })?;
    let prevout =
        LockedPrevout::from_witness_utxo(&raw_utxo).ok_or(SignError::WitnessUtxo { input: idx })?;

    let script_code = prevout.script_pubkey();
    let sighash =
        host.segwit_v0_sighash(idx, &script_code, prevout.amount, PROTOCOL_SIGHASH_TYPE)?;

    let path = protocol_derivation_path();
    let signature = keys.sign_ecdsa(&path, sighash)?;
    let pubkey = keys.derive_pubkey(&path)?;
    debug!(input = %idx, "signed protocol input");

    Ok(Some(ProtocolSignature {
        input: idx,
        pubkey,
        signature,
        sighash_type: PROTOCOL_SIGHASH_TYPE,
    }))
}

/// Runs [`sign_input`] over every input in ascending order.
///
/// Returns nothing unless every protocol input was signed.
pub fn sign_all<H, K>(
    host: &H,
    keys: &K,
    class: &TxClassification,
) -> Result<Vec<ProtocolSignature>, SignError>
where
    H: TxView + SighashProvider + ?Sized,
    K: DeviceKeys + ?Sized,
{
    let mut sigs = Vec::with_capacity(class.protocol_input_count());
    for idx in 0..host.input_count() {
        if let Some(sig) = sign_input(host, keys, class, idx)? {
            sigs.push(sig);
        }
    }
    Ok(sigs)
}
