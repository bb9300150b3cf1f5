//! What the user is shown before anything is signed.

use coredao_stake_types::{ChainId, TxKind};
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Rejection, TxClassification, TxTotals};

/// The staking operation a transaction performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Stake,
    Unstake,
    Restake,
    /// Neither locks nor unlocks: an ordinary wallet spend.
    Transfer,
}

/// Staking parameters shown for lock transactions.
///
/// Scrubbed on drop, since a review outlives the signing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct StakeSummary {
    #[zeroize(skip)]
    pub network: ChainId,
    #[serde(with = "hex::serde")]
    pub delegator: [u8; 20],
    #[serde(with = "hex::serde")]
    pub validator: [u8; 20],
    pub locktime: u32,
    pub coredao_fee: u8,
    pub lock_amount_sat: u64,
}

/// Everything the review collaborator needs to approve or deny.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionReview {
    pub operation: Operation,
    /// Net value leaving the wallet; negative when it receives more than it spends.
    pub value_spent_sat: i64,
    pub network_fee_sat: u64,
    pub unlock_amount_sat: u64,
    pub protocol_inputs: usize,
    pub stake: Option<StakeSummary>,
}

impl TransactionReview {
    /// Builds the review for an accepted classification.
    ///
    /// Fails if the classification is not acceptable or the host totals are
    /// inconsistent.
    pub fn new(class: &TxClassification, totals: &TxTotals) -> Result<Self, Rejection> {
        if !class.is_acceptable() {
            return Err(Rejection::IncorrectData);
        }

        let kinds = class.kinds();
        let operation = match (kinds.contains(TxKind::Lock), kinds.contains(TxKind::Unlock)) {
            (true, true) => Operation::Restake,
            (true, false) => Operation::Stake,
            (false, true) => Operation::Unstake,
            (false, false) => Operation::Transfer,
        };

        let spent = i128::from(totals.internal_inputs_total) + i128::from(class.unlock_amount())
            - i128::from(totals.change_total);
        let value_spent_sat = i64::try_from(spent).map_err(|_| Rejection::IncorrectData)?;
        let network_fee_sat = totals
            .inputs_total
            .checked_sub(totals.outputs_total)
            .ok_or(Rejection::IncorrectData)?;

        let stake = match (operation, class.stake()) {
            (Operation::Stake | Operation::Restake, Some(payload)) => Some(StakeSummary {
                network: payload.chain_id(),
                delegator: *payload.delegator(),
                validator: *payload.validator(),
                locktime: payload.locktime(),
                coredao_fee: payload.fee(),
                lock_amount_sat: class.lock_amount(),
            }),
            (Operation::Stake | Operation::Restake, None) => return Err(Rejection::IncorrectData),
            _ => None,
        };

        Ok(Self {
            operation,
            value_spent_sat,
            network_fee_sat,
            unlock_amount_sat: class.unlock_amount(),
            protocol_inputs: class.protocol_input_count(),
            stake,
        })
    }
}

/// Approves or denies a transaction after seeing its review.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait Reviewer {
    fn approve(&mut self, review: &TransactionReview) -> bool;
}
