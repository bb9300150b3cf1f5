//! What the classifier needs from the surrounding signing host.

use bitcoin::EcdsaSighashType;
use coredao_stake_types::{BitmapError, IndexBitmap};

use crate::HostError;

/// Aggregates the host computes while walking the transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxTotals {
    /// Sum of every input's value.
    pub inputs_total: u64,
    /// Sum of every output's value.
    pub outputs_total: u64,
    /// Sum of the values of inputs owned by the wallet.
    pub internal_inputs_total: u64,
    /// Sum of the values of outputs paying back to the wallet.
    pub change_total: u64,
}

/// Which inputs and outputs belong to the wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InternalMasks {
    pub inputs: IndexBitmap,
    pub outputs: IndexBitmap,
}

impl InternalMasks {
    pub fn is_internal_input(&self, idx: usize) -> Result<bool, BitmapError> {
        self.inputs.get(idx)
    }

    pub fn is_internal_output(&self, idx: usize) -> Result<bool, BitmapError> {
        self.outputs.get(idx)
    }
}

/// Read access to the candidate transaction.
///
/// Absent optional fields are `Ok(None)`; an `Err` means the host itself
/// failed and the transaction must be rejected.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait TxView {
    fn input_count(&self) -> usize;

    fn output_count(&self) -> usize;

    fn output_amount(&self, idx: usize) -> Result<u64, HostError>;

    fn output_script_pubkey(&self, idx: usize) -> Result<Vec<u8>, HostError>;

    /// The consensus-encoded witness UTXO of an input.
    fn input_witness_utxo(&self, idx: usize) -> Result<Option<Vec<u8>>, HostError>;

    fn input_witness_script(&self, idx: usize) -> Result<Option<Vec<u8>>, HostError>;

    fn totals(&self) -> TxTotals;
}

/// Segwit v0 signature hashing over the candidate transaction.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait SighashProvider {
    /// BIP143 digest for input `idx` with the given script code and spent value.
    fn segwit_v0_sighash(
        &self,
        idx: usize,
        script_code: &[u8],
        value: u64,
        sighash_type: EcdsaSighashType,
    ) -> Result<[u8; 32], HostError>;
}
