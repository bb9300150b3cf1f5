use coredao_stake_types::{IndexBitmap, StakingPayload, TxKind, TxKindSet};
use zeroize::Zeroize;

use crate::InvalidReason;

/// Result of one validation pass over a transaction.
///
/// Built fresh for every transaction, filled by the input scan then the
/// output scan, and read-only afterwards. Everything it holds is scrubbed
/// when it is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxClassification {
    kinds: TxKindSet,
    stake: Option<StakingPayload>,
    lock_amount: u64,
    unlock_amount: u64,
    protocol_inputs: IndexBitmap,
    invalid: Option<InvalidReason>,
}

impl TxClassification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> TxKindSet {
        self.kinds
    }

    pub fn is_acceptable(&self) -> bool {
        self.kinds.is_acceptable()
    }

    /// The first structural failure found, if any.
    pub fn invalid_reason(&self) -> Option<&InvalidReason> {
        self.invalid.as_ref()
    }

    /// Staking parameters of a lock transaction.
    pub fn stake(&self) -> Option<&StakingPayload> {
        self.stake.as_ref()
    }

    pub fn lock_amount(&self) -> u64 {
        self.lock_amount
    }

    pub fn unlock_amount(&self) -> u64 {
        self.unlock_amount
    }

    /// Number of accepted protocol inputs.
    pub fn protocol_input_count(&self) -> usize {
        self.protocol_inputs.count()
    }

    pub fn protocol_inputs(&self) -> &IndexBitmap {
        &self.protocol_inputs
    }

    pub(crate) fn insert_kind(&mut self, kind: TxKind) {
        self.kinds.insert(kind);
    }

    /// Marks the transaction invalid, keeping the first reason recorded.
    pub(crate) fn reject(&mut self, reason: InvalidReason) {
        self.kinds.insert(TxKind::Invalid);
        if self.invalid.is_none() {
            self.invalid = Some(reason);
        }
    }

    pub(crate) fn set_stake(&mut self, payload: StakingPayload, lock_amount: u64) {
        self.stake = Some(payload);
        self.lock_amount = lock_amount;
    }

    pub(crate) fn set_unlocked(&mut self, inputs: IndexBitmap, unlock_amount: u64) {
        self.protocol_inputs = inputs;
        self.unlock_amount = unlock_amount;
    }
}

impl Zeroize for TxClassification {
    fn zeroize(&mut self) {
        self.kinds = TxKindSet::EMPTY;
        self.stake.zeroize();
        self.lock_amount.zeroize();
        self.unlock_amount.zeroize();
        self.protocol_inputs.zeroize();
        self.invalid = None;
    }
}

impl Drop for TxClassification {
    fn drop(&mut self) {
        self.zeroize();
    }
}
