//! In-memory host for exercising the classifier without a PSBT.

use bitcoin::{
    hashes::{sha256, Hash, HashEngine},
    EcdsaSighashType,
};
use coredao_stake_types::IndexBitmap;

use crate::{HostError, InternalMasks, SighashProvider, TxTotals, TxView};

/// One input of a [`MemoryTx`].
#[derive(Debug, Clone, Default)]
pub struct MemoryInput {
    pub amount: u64,
    pub witness_utxo: Option<Vec<u8>>,
    pub witness_script: Option<Vec<u8>>,
}

impl MemoryInput {
    /// A wallet-owned input; its witness data is never fetched.
    pub fn internal(amount: u64) -> Self {
        Self {
            amount,
            ..Default::default()
        }
    }

    pub fn external(
        amount: u64,
        witness_utxo: Option<Vec<u8>>,
        witness_script: Option<Vec<u8>>,
    ) -> Self {
        Self {
            amount,
            witness_utxo,
            witness_script,
        }
    }
}

/// A transaction snapshot held in plain vectors.
///
/// Sighashes are a tagged sha256 over the request, so tests can predict them.
#[derive(Debug, Clone, Default)]
pub struct MemoryTx {
    inputs: Vec<MemoryInput>,
    outputs: Vec<(u64, Vec<u8>)>,
    masks: InternalMasks,
    totals_override: Option<TxTotals>,
}

impl MemoryTx {
    pub fn push_input(&mut self, input: MemoryInput) -> usize {
        self.inputs.push(input);
        self.inputs.len() - 1
    }

    pub fn push_internal_input(&mut self, input: MemoryInput) -> usize {
        let idx = self.push_input(input);
        self.masks
            .inputs
            .set(idx, true)
            .expect("index within capacity");
        idx
    }

    pub fn push_output(&mut self, amount: u64, script_pubkey: Vec<u8>) -> usize {
        self.outputs.push((amount, script_pubkey));
        self.outputs.len() - 1
    }

    pub fn push_internal_output(&mut self, amount: u64, script_pubkey: Vec<u8>) -> usize {
        let idx = self.push_output(amount, script_pubkey);
        self.masks
            .outputs
            .set(idx, true)
            .expect("index within capacity");
        idx
    }

    pub fn output_script(&self, idx: usize) -> &[u8] {
        &self.outputs[idx].1
    }

    pub fn replace_output_script(&mut self, idx: usize, script_pubkey: Vec<u8>) {
        self.outputs[idx].1 = script_pubkey;
    }

    pub fn replace_output_amount(&mut self, idx: usize, amount: u64) {
        self.outputs[idx].0 = amount;
    }

    pub fn input_mut(&mut self, idx: usize) -> &mut MemoryInput {
        &mut self.inputs[idx]
    }

    /// Reports `totals` instead of the sums over the vectors.
    pub fn set_totals_override(&mut self, totals: TxTotals) {
        self.totals_override = Some(totals);
    }

    pub fn masks(&self) -> &InternalMasks {
        &self.masks
    }

    /// The digest [`SighashProvider::segwit_v0_sighash`] returns for these arguments.
    pub fn expected_sighash(
        idx: usize,
        script_code: &[u8],
        value: u64,
        sighash_type: EcdsaSighashType,
    ) -> [u8; 32] {
        let mut engine = sha256::Hash::engine();
        engine.input(b"memory-tx-sighash");
        engine.input(&(idx as u64).to_le_bytes());
        engine.input(script_code);
        engine.input(&value.to_le_bytes());
        engine.input(&sighash_type.to_u32().to_le_bytes());
        sha256::Hash::from_engine(engine).to_byte_array()
    }

    fn is_internal(bitmap: &IndexBitmap, idx: usize) -> bool {
        bitmap.get(idx).unwrap_or(false)
    }
}

impl TxView for MemoryTx {
    fn input_count(&self) -> usize {
        self.inputs.len()
    }

    fn output_count(&self) -> usize {
        self.outputs.len()
    }

    fn output_amount(&self, idx: usize) -> Result<u64, HostError> {
        self.outputs
            .get(idx)
            .map(|(amount, _)| *amount)
            .ok_or(HostError::OutputOutOfRange(idx))
    }

    fn output_script_pubkey(&self, idx: usize) -> Result<Vec<u8>, HostError> {
        self.outputs
            .get(idx)
            .map(|(_, spk)| spk.clone())
            .ok_or(HostError::OutputOutOfRange(idx))
    }

    fn input_witness_utxo(&self, idx: usize) -> Result<Option<Vec<u8>>, HostError> {
        self.inputs
            .get(idx)
            .map(|input| input.witness_utxo.clone())
            .ok_or(HostError::InputOutOfRange(idx))
    }

    fn input_witness_script(&self, idx: usize) -> Result<Option<Vec<u8>>, HostError> {
        self.inputs
            .get(idx)
            .map(|input| input.witness_script.clone())
            .ok_or(HostError::InputOutOfRange(idx))
    }

    fn totals(&self) -> TxTotals {
        if let Some(totals) = self.totals_override {
            return totals;
        }

        let mut totals = TxTotals::default();
        for (idx, input) in self.inputs.iter().enumerate() {
            totals.inputs_total += input.amount;
            if Self::is_internal(&self.masks.inputs, idx) {
                totals.internal_inputs_total += input.amount;
            }
        }
        for (idx, (amount, _)) in self.outputs.iter().enumerate() {
            totals.outputs_total += amount;
            if Self::is_internal(&self.masks.outputs, idx) {
                totals.change_total += amount;
            }
        }
        totals
    }
}

impl SighashProvider for MemoryTx {
    fn segwit_v0_sighash(
        &self,
        idx: usize,
        script_code: &[u8],
        value: u64,
        sighash_type: EcdsaSighashType,
    ) -> Result<[u8; 32], HostError> {
        if idx >= self.inputs.len() {
            return Err(HostError::InputOutOfRange(idx));
        }
        Ok(Self::expected_sighash(idx, script_code, value, sighash_type))
    }
}
