//! Error types for classification, signing and the host boundary.

use bitcoin::transaction::InputsIndexError;
use coredao_stake_script::{KeyError, ScriptError};
use coredao_stake_types::{BitmapError, PayloadError};
use thiserror::Error;

/// Failures of the host collaborator while serving a fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("input index {0} out of range")]
    InputOutOfRange(usize),

    #[error("output index {0} out of range")]
    OutputOutOfRange(usize),

    /// The host cannot tell the value of an input.
    #[error("input {0} has no spent output")]
    MissingPrevout(usize),

    #[error("amount total overflows")]
    AmountOverflow,

    #[error("sighash for input {input} failed: {source}")]
    Sighash {
        input: usize,
        #[source]
        source: InputsIndexError,
    },

    #[error("internal mask: {0}")]
    Mask(#[from] BitmapError),
}

/// Why a transaction was classified as invalid.
///
/// Carried in the classification for diagnostics only; every variant is
/// reported to the host as the same generic rejection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidReason {
    #[error("{count} inputs exceed the signable capacity")]
    TooManyInputs { count: usize },

    #[error("{count} outputs exceed the trackable capacity")]
    TooManyOutputs { count: usize },

    #[error("input {input} has no witness utxo")]
    MissingWitnessUtxo { input: usize },

    #[error("input {input} witness utxo is not a lock output")]
    MalformedWitnessUtxo { input: usize },

    #[error("input {input} has no witness script")]
    MissingWitnessScript { input: usize },

    #[error("input {input} witness script has length {len}")]
    WitnessScriptLength { input: usize, len: usize },

    #[error("input {input}: {source}")]
    InputScript { input: usize, source: ScriptError },

    #[error("unlocked amount overflows")]
    UnlockAmountOverflow,

    #[error("output {output} scriptPubKey of {len} bytes is too long")]
    ScriptPubKeyTooLong { output: usize, len: usize },

    #[error("output {output} is not a single-push data output")]
    MalformedDataOutput { output: usize },

    #[error("output {output}: {source}")]
    Payload { output: usize, source: PayloadError },

    #[error("output {output} carries staking data with non-zero amount {amount}")]
    NonZeroDataAmount { output: usize, amount: u64 },

    #[error("output {output} is a second staking data output")]
    DuplicateDataOutput { output: usize },

    #[error("output {output} scriptPubKey has length {len}, expected a lock output")]
    LockOutputLength { output: usize, len: usize },

    #[error("{count} candidate lock outputs, expected one")]
    MultipleLockOutputs { count: usize },

    #[error("stake transaction has {count} outputs")]
    OutputCount { count: usize },

    #[error("staking data redeem script: {0}")]
    RedeemScript(ScriptError),

    #[error("lock output: {0}")]
    LockScript(ScriptError),
}

/// Failures of the signing gate. Any of these aborts the whole transaction.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("transaction was not accepted by validation")]
    NotAccepted,

    #[error("input {input} witness utxo no longer describes a lock output")]
    WitnessUtxo { input: usize },

    #[error("host: {0}")]
    Host(#[from] HostError),

    #[error("device key: {0}")]
    Key(#[from] KeyError),

    #[error("protocol input bitmap: {0}")]
    Bitmap(#[from] BitmapError),
}

/// Rejections surfaced to the host, each with a fixed status word.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("incorrect data")]
    IncorrectData,

    #[error("denied by user")]
    UserDenied,
}

impl Rejection {
    pub const SW_INCORRECT_DATA: u16 = 0x6a80;
    pub const SW_DENY: u16 = 0x6985;

    pub fn status_word(&self) -> u16 {
        match self {
            Rejection::IncorrectData => Self::SW_INCORRECT_DATA,
            Rejection::UserDenied => Self::SW_DENY,
        }
    }
}

impl From<HostError> for Rejection {
    fn from(_: HostError) -> Self {
        Rejection::IncorrectData
    }
}

impl From<SignError> for Rejection {
    fn from(_: SignError) -> Self {
        Rejection::IncorrectData
    }
}

impl From<KeyError> for Rejection {
    fn from(_: KeyError) -> Self {
        Rejection::IncorrectData
    }
}
