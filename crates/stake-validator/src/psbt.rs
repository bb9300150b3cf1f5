//! Host adapter and orchestrator over a [`Psbt`].

use std::collections::BTreeMap;

use bitcoin::{
    bip32::KeySource,
    consensus,
    ecdsa,
    hashes::Hash,
    psbt::Psbt,
    sighash::SighashCache,
    Amount, CompressedPublicKey, EcdsaSighashType, PublicKey, Script, ScriptBuf, TxOut,
};
use coredao_stake_script::DeviceKeys;
use tracing::{debug, info};

use crate::{
    CoreDaoExtension, HostError, InternalMasks, Rejection, Reviewer, SighashProvider,
    SigningExtension, TransactionReview, TxTotals, TxView,
};

/// Serves host fetches from a PSBT.
///
/// Ownership of inputs and outputs is decided once, up front: an entry is
/// internal when it pays to the P2WPKH of a key that this device derives at
/// the BIP32 path recorded under its own fingerprint.
#[derive(Debug)]
pub struct PsbtHost<'a> {
    psbt: &'a Psbt,
    masks: InternalMasks,
    totals: TxTotals,
}

impl<'a> PsbtHost<'a> {
    pub fn new<K: DeviceKeys + ?Sized>(psbt: &'a Psbt, keys: &K) -> Result<Self, HostError> {
        let mut masks = InternalMasks::default();
        let mut totals = TxTotals::default();

        for (idx, input) in psbt.inputs.iter().enumerate() {
            let prevout = spent_output(psbt, idx)?;
            let value = prevout.value.to_sat();
            totals.inputs_total = checked_add(totals.inputs_total, value)?;

            if owns_script(keys, &input.bip32_derivation, &prevout.script_pubkey) {
                debug!(input = %idx, %value, "wallet input");
                masks.inputs.set(idx, true)?;
                totals.internal_inputs_total = checked_add(totals.internal_inputs_total, value)?;
            }
        }

        for (idx, (txout, output)) in psbt
            .unsigned_tx
            .output
            .iter()
            .zip(psbt.outputs.iter())
            .enumerate()
        {
            let value = txout.value.to_sat();
            totals.outputs_total = checked_add(totals.outputs_total, value)?;

            if owns_script(keys, &output.bip32_derivation, &txout.script_pubkey) {
                debug!(output = %idx, %value, "wallet output");
                masks.outputs.set(idx, true)?;
                totals.change_total = checked_add(totals.change_total, value)?;
            }
        }

        Ok(Self {
            psbt,
            masks,
            totals,
        })
    }

    pub fn masks(&self) -> &InternalMasks {
        &self.masks
    }

    fn output(&self, idx: usize) -> Result<&TxOut, HostError> {
        self.psbt
            .unsigned_tx
            .output
            .get(idx)
            .ok_or(HostError::OutputOutOfRange(idx))
    }
}

impl TxView for PsbtHost<'_> {
    fn input_count(&self) -> usize {
        self.psbt.inputs.len()
    }

    fn output_count(&self) -> usize {
        self.psbt.unsigned_tx.output.len()
    }

    fn output_amount(&self, idx: usize) -> Result<u64, HostError> {
        Ok(self.output(idx)?.value.to_sat())
    }

    fn output_script_pubkey(&self, idx: usize) -> Result<Vec<u8>, HostError> {
        Ok(self.output(idx)?.script_pubkey.to_bytes())
    }

    fn input_witness_utxo(&self, idx: usize) -> Result<Option<Vec<u8>>, HostError> {
        let input = self
            .psbt
            .inputs
            .get(idx)
            .ok_or(HostError::InputOutOfRange(idx))?;
        Ok(input.witness_utxo.as_ref().map(consensus::serialize))
    }

    fn input_witness_script(&self, idx: usize) -> Result<Option<Vec<u8>>, HostError> {
        let input = self
            .psbt
            .inputs
            .get(idx)
            .ok_or(HostError::InputOutOfRange(idx))?;
        Ok(input.witness_script.as_ref().map(|s| s.to_bytes()))
    }

    fn totals(&self) -> TxTotals {
        self.totals
    }
}

impl SighashProvider for PsbtHost<'_> {
    fn segwit_v0_sighash(
        &self,
        idx: usize,
        script_code: &[u8],
        value: u64,
        sighash_type: EcdsaSighashType,
    ) -> Result<[u8; 32], HostError> {
        let mut cache = SighashCache::new(&self.psbt.unsigned_tx);
        let sighash = cache
            .p2wsh_signature_hash(
                idx,
                Script::from_bytes(script_code),
                Amount::from_sat(value),
                sighash_type,
            )
            .map_err(|source| HostError::Sighash { input: idx, source })?;
        Ok(sighash.to_byte_array())
    }
}

fn spent_output(psbt: &Psbt, idx: usize) -> Result<&TxOut, HostError> {
    let input = psbt.inputs.get(idx).ok_or(HostError::InputOutOfRange(idx))?;
    if let Some(utxo) = &input.witness_utxo {
        return Ok(utxo);
    }

    let txin = psbt
        .unsigned_tx
        .input
        .get(idx)
        .ok_or(HostError::InputOutOfRange(idx))?;
    input
        .non_witness_utxo
        .as_ref()
        .and_then(|tx| tx.output.get(txin.previous_output.vout as usize))
        .ok_or(HostError::MissingPrevout(idx))
}

fn owns_script<K: DeviceKeys + ?Sized>(
    keys: &K,
    derivations: &BTreeMap<secp256k1::PublicKey, KeySource>,
    script_pubkey: &ScriptBuf,
) -> bool {
    let fingerprint = keys.master_fingerprint();
    derivations
        .iter()
        .filter(|(_, (fp, _))| *fp == fingerprint)
        .any(|(pubkey, (_, path))| {
            let p2wpkh = ScriptBuf::new_p2wpkh(&CompressedPublicKey(*pubkey).wpubkey_hash());
            if p2wpkh != *script_pubkey {
                return false;
            }
            match keys.derive_pubkey(path) {
                Ok(derived) => derived == *pubkey,
                Err(e) => {
                    debug!(%path, err = %e, "cannot derive recorded wallet key");
                    false
                }
            }
        })
}

fn checked_add(total: u64, value: u64) -> Result<u64, HostError> {
    total.checked_add(value).ok_or(HostError::AmountOverflow)
}

/// Result of a successful signing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOutcome {
    pub review: TransactionReview,
    /// Inputs that received a protocol signature, ascending.
    pub signed_inputs: Vec<usize>,
}

/// Drives the extension over a PSBT the way a signing host would.
#[derive(Debug)]
pub struct PsbtSigner<'k, K: ?Sized> {
    keys: &'k K,
}

impl<'k, K: DeviceKeys + ?Sized> PsbtSigner<'k, K> {
    pub fn new(keys: &'k K) -> Self {
        Self { keys }
    }

    /// Validates, reviews and signs `psbt`.
    ///
    /// Signatures are written into the PSBT's partial signatures only after
    /// every protocol input has been signed.
    pub fn sign<R: Reviewer + ?Sized>(
        &self,
        psbt: &mut Psbt,
        reviewer: &mut R,
    ) -> Result<SignOutcome, Rejection> {
        let (review, sigs) = {
            let host = PsbtHost::new(psbt, self.keys)?;
            let mut ext = CoreDaoExtension::new(self.keys);
            let review = ext.validate_and_review(&host, host.masks(), reviewer)?;

            let mut sigs = Vec::new();
            for idx in 0..host.input_count() {
                if let Some(sig) = ext.sign_input(&host, idx)? {
                    sigs.push(sig);
                }
            }
            ext.finish();
            (review, sigs)
        };

        let mut signed_inputs = Vec::with_capacity(sigs.len());
        for sig in sigs {
            let input = psbt
                .inputs
                .get_mut(sig.input)
                .ok_or(Rejection::IncorrectData)?;
            input.partial_sigs.insert(
                PublicKey::new(sig.pubkey),
                ecdsa::Signature {
                    signature: sig.signature,
                    sighash_type: sig.sighash_type,
                },
            );
            signed_inputs.push(sig.input);
        }

        info!(signed = signed_inputs.len(), "psbt signed");
        Ok(SignOutcome {
            review,
            signed_inputs,
        })
    }
}
