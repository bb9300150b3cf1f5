//! Full signing sessions: review, sign and verify the produced signatures.

#![allow(
    unused_crate_dependencies,
    reason = "test dependencies shared across test suite"
)]

use bitcoin::EcdsaSighashType;
use coredao_stake_types::ChainId;
use coredao_stake_validator::{Operation, Rejection, PROTOCOL_SIGHASH_TYPE};
use coredao_test_utils::{test_keys, PsbtBuilder};
use integration_tests::harness::{protocol_pubkey, sign, verify_partial_sigs, FixedReviewer};

const LOCKTIME: u32 = 1_735_689_600;

// ============================================================================
// Approved sessions
// ============================================================================

/// Verifies a stake is reviewed but needs no protocol signature.
#[test]
fn test_stake_session_signs_nothing() {
    let mut psbt = PsbtBuilder::new()
        .wallet_input(200_000, 0)
        .data_output(ChainId::Mainnet, LOCKTIME)
        .lock_output(150_000, LOCKTIME)
        .change_output(49_000, 1)
        .build();
    let mut reviewer = FixedReviewer::approving();

    let outcome = sign(&mut psbt, &mut reviewer).unwrap();
    assert!(outcome.signed_inputs.is_empty());
    assert_eq!(outcome.review.operation, Operation::Stake);
    assert_eq!(outcome.review.value_spent_sat, 151_000);
    assert_eq!(outcome.review.network_fee_sat, 1_000);
    assert_eq!(reviewer.seen, vec![outcome.review]);
    assert!(verify_partial_sigs(&psbt).is_empty());
}

/// Verifies every lock input of an unstake gets a valid protocol signature.
#[test]
fn test_unstake_session_signatures_verify() {
    let keys = test_keys();
    let mut psbt = PsbtBuilder::new()
        .lock_input(100_000, 1_600_000_000)
        .wallet_input(5_000, 0)
        .lock_input(200_000, 1_700_000_000)
        .change_output(304_000, 0)
        .build();
    let mut reviewer = FixedReviewer::approving();

    let outcome = sign(&mut psbt, &mut reviewer).unwrap();
    assert_eq!(outcome.review.operation, Operation::Unstake);
    assert_eq!(outcome.review.unlock_amount_sat, 300_000);
    assert_eq!(outcome.review.value_spent_sat, 5_000 + 300_000 - 304_000);
    assert_eq!(outcome.signed_inputs, vec![0, 2]);
    assert_eq!(verify_partial_sigs(&psbt), vec![0, 2]);

    let expected = protocol_pubkey(&keys);
    for idx in [0, 2] {
        let (pk, sig) = psbt.inputs[idx]
            .partial_sigs
            .iter()
            .next()
            .expect("one signature");
        assert_eq!(pk.inner, expected);
        assert_eq!(sig.sighash_type, PROTOCOL_SIGHASH_TYPE);
        assert_eq!(sig.sighash_type, EcdsaSighashType::All);
    }
}

/// Verifies a restake signs the old lock and shows the new stake.
#[test]
fn test_restake_session() {
    let mut psbt = PsbtBuilder::new()
        .lock_input(300_000, 1_600_000_000)
        .wallet_input(20_000, 0)
        .data_output(ChainId::Testnet2, LOCKTIME)
        .lock_output(300_000, LOCKTIME)
        .change_output(19_000, 1)
        .build();
    let mut reviewer = FixedReviewer::approving();

    let outcome = sign(&mut psbt, &mut reviewer).unwrap();
    assert_eq!(outcome.review.operation, Operation::Restake);
    let stake = outcome.review.stake.as_ref().expect("stake summary");
    assert_eq!(stake.network, ChainId::Testnet2);
    assert_eq!(stake.locktime, LOCKTIME);
    assert_eq!(verify_partial_sigs(&psbt), vec![0]);
}

/// Verifies a restake paying change from the unlocked value is signed and
/// reviewed with the net value leaving the wallet.
#[test]
fn test_restake_with_change_session() {
    let mut psbt = PsbtBuilder::new()
        .lock_input(500_000, 1_600_000_000)
        .data_output(ChainId::Mainnet, LOCKTIME)
        .lock_output(300_000, LOCKTIME)
        .change_output(199_000, 0)
        .build();
    let mut reviewer = FixedReviewer::approving();

    let outcome = sign(&mut psbt, &mut reviewer).unwrap();
    assert_eq!(outcome.review.operation, Operation::Restake);
    assert_eq!(outcome.review.value_spent_sat, 500_000 - 199_000);
    assert_eq!(outcome.review.unlock_amount_sat, 500_000);
    assert_eq!(outcome.review.network_fee_sat, 1_000);
    let stake = outcome.review.stake.as_ref().expect("stake summary");
    assert_eq!(stake.lock_amount_sat, 0);
    assert_eq!(verify_partial_sigs(&psbt), vec![0]);
}

/// Verifies signing the same PSBT twice yields the same PSBT.
#[test]
fn test_resigning_is_deterministic() {
    let mut psbt = PsbtBuilder::new()
        .lock_input(75_000, 1_600_000_000)
        .change_output(74_000, 0)
        .build();

    sign(&mut psbt, &mut FixedReviewer::approving()).unwrap();
    let once = psbt.clone();
    sign(&mut psbt, &mut FixedReviewer::approving()).unwrap();
    assert_eq!(psbt, once);
}

// ============================================================================
// Refused sessions
// ============================================================================

/// Verifies a denied review leaves the PSBT untouched.
#[test]
fn test_denied_session_leaves_psbt_untouched() {
    let mut psbt = PsbtBuilder::new()
        .lock_input(75_000, 1_600_000_000)
        .change_output(74_000, 0)
        .build();
    let before = psbt.clone();
    let mut reviewer = FixedReviewer::denying();

    let err = sign(&mut psbt, &mut reviewer).unwrap_err();
    assert_eq!(err, Rejection::UserDenied);
    assert_eq!(err.status_word(), 0x6985);
    assert_eq!(reviewer.seen.len(), 1);
    assert_eq!(psbt, before);
}

/// Verifies an invalid transaction is refused before review.
#[test]
fn test_invalid_session_never_reviews() {
    let mut psbt = PsbtBuilder::new()
        .wallet_input(200_000, 0)
        .data_output(ChainId::Mainnet, LOCKTIME)
        .lock_output(150_000, LOCKTIME + 1)
        .change_output(49_000, 1)
        .build();
    let before = psbt.clone();
    let mut reviewer = FixedReviewer::approving();

    let err = sign(&mut psbt, &mut reviewer).unwrap_err();
    assert_eq!(err, Rejection::IncorrectData);
    assert_eq!(err.status_word(), 0x6a80);
    assert!(reviewer.seen.is_empty());
    assert_eq!(psbt, before);
}

/// Verifies a transfer between wallet addresses is reviewed as such.
#[test]
fn test_wallet_transfer_is_reviewed() {
    let mut psbt = PsbtBuilder::new()
        .wallet_input(50_000, 0)
        .change_output(49_500, 3)
        .build();
    let mut reviewer = FixedReviewer::approving();

    let outcome = sign(&mut psbt, &mut reviewer).unwrap();
    assert_eq!(outcome.review.operation, Operation::Transfer);
    assert_eq!(outcome.review.value_spent_sat, 500);
    assert!(outcome.signed_inputs.is_empty());
}
