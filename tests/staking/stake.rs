//! Stake transactions built as PSBTs and classified end to end.

#![allow(
    unused_crate_dependencies,
    reason = "test dependencies shared across test suite"
)]

use bitcoin::{hashes::Hash, ScriptBuf, WScriptHash};
use coredao_stake_script::build_redeem_script;
use coredao_stake_types::{ChainId, TxKind};
use coredao_stake_validator::InvalidReason;
use coredao_test_utils::{
    data_output, op_return_script, payload_with_script, test_engine, PsbtBuilder, TEST_DELEGATOR,
    TEST_VALIDATOR,
};
use integration_tests::harness::classify;

const LOCKTIME: u32 = 1_735_689_600;

fn p2wsh(script: &ScriptBuf) -> ScriptBuf {
    ScriptBuf::new_p2wsh(&WScriptHash::hash(script.as_bytes()))
}

/// Verifies a well-formed stake is accepted on every CoreDAO chain.
#[test]
fn test_stake_on_every_chain() {
    for chain in [ChainId::Mainnet, ChainId::Testnet, ChainId::Testnet2] {
        let psbt = PsbtBuilder::new()
            .wallet_input(200_000, 0)
            .data_output(chain, LOCKTIME)
            .lock_output(150_000, LOCKTIME)
            .change_output(49_000, 1)
            .build();

        let class = classify(&psbt);
        assert!(class.is_acceptable(), "{chain}: {:?}", class.invalid_reason());
        assert!(class.kinds().contains(TxKind::Lock));
        assert!(!class.kinds().contains(TxKind::Unlock));

        let stake = class.stake().expect("stake payload");
        assert_eq!(stake.chain_id(), chain);
        assert_eq!(stake.delegator(), &TEST_DELEGATOR);
        assert_eq!(stake.validator(), &TEST_VALIDATOR);
        assert_eq!(stake.locktime(), LOCKTIME);
        assert_eq!(class.lock_amount(), 151_000);
    }
}

/// Verifies a stake with no change output is accepted.
#[test]
fn test_stake_without_change() {
    let psbt = PsbtBuilder::new()
        .wallet_input(151_000, 0)
        .data_output(ChainId::Mainnet, LOCKTIME)
        .lock_output(150_000, LOCKTIME)
        .build();

    let class = classify(&psbt);
    assert!(class.is_acceptable());
    assert_eq!(class.lock_amount(), 151_000);
}

/// Verifies a stake locking to another key's redeem script is rejected.
#[test]
fn test_lock_to_foreign_script_is_invalid() {
    let foreign = build_redeem_script(LOCKTIME, &[0xee; 20]);
    let data = op_return_script(&payload_with_script(ChainId::Mainnet, foreign.clone()));

    let psbt = PsbtBuilder::new()
        .wallet_input(200_000, 0)
        .raw_output(0, ScriptBuf::from_bytes(data))
        .raw_output(150_000, p2wsh(&foreign.to_script_buf()))
        .change_output(49_000, 1)
        .build();

    let class = classify(&psbt);
    assert!(!class.is_acceptable());
    assert!(matches!(
        class.invalid_reason(),
        Some(InvalidReason::RedeemScript(_))
    ));
}

/// Verifies a lock output committing to a different locktime is rejected.
#[test]
fn test_lock_output_not_matching_payload_is_invalid() {
    let psbt = PsbtBuilder::new()
        .wallet_input(200_000, 0)
        .data_output(ChainId::Mainnet, LOCKTIME)
        .lock_output(150_000, LOCKTIME + 1)
        .change_output(49_000, 1)
        .build();

    let class = classify(&psbt);
    assert!(matches!(
        class.invalid_reason(),
        Some(InvalidReason::LockScript(_))
    ));
}

/// Verifies the data output must carry no value.
#[test]
fn test_data_output_with_value_is_invalid() {
    let data = data_output(&test_engine(), ChainId::Mainnet, LOCKTIME);
    let psbt = PsbtBuilder::new()
        .wallet_input(200_000, 0)
        .raw_output(546, ScriptBuf::from_bytes(data))
        .lock_output(150_000, LOCKTIME)
        .change_output(48_454, 1)
        .build();

    let class = classify(&psbt);
    assert_eq!(
        class.invalid_reason(),
        Some(&InvalidReason::NonZeroDataAmount {
            output: 0,
            amount: 546
        })
    );
}

/// Verifies a second external output alongside the lock is rejected.
#[test]
fn test_second_lock_output_is_invalid() {
    let psbt = PsbtBuilder::new()
        .wallet_input(300_000, 0)
        .data_output(ChainId::Mainnet, LOCKTIME)
        .lock_output(150_000, LOCKTIME)
        .lock_output(149_000, LOCKTIME)
        .build();

    let class = classify(&psbt);
    assert_eq!(
        class.invalid_reason(),
        Some(&InvalidReason::MultipleLockOutputs { count: 2 })
    );
}

/// Verifies a stake may have at most one change output.
#[test]
fn test_four_outputs_is_invalid() {
    let psbt = PsbtBuilder::new()
        .wallet_input(300_000, 0)
        .data_output(ChainId::Mainnet, LOCKTIME)
        .lock_output(150_000, LOCKTIME)
        .change_output(70_000, 1)
        .change_output(79_000, 2)
        .build();

    let class = classify(&psbt);
    assert_eq!(
        class.invalid_reason(),
        Some(&InvalidReason::OutputCount { count: 4 })
    );
}

/// Verifies an input from another wallet cannot fund a stake.
#[test]
fn test_foreign_wallet_input_is_invalid() {
    let psbt = PsbtBuilder::new()
        .foreign_wallet_input(200_000)
        .data_output(ChainId::Mainnet, LOCKTIME)
        .lock_output(150_000, LOCKTIME)
        .change_output(49_000, 1)
        .build();

    let class = classify(&psbt);
    assert_eq!(
        class.invalid_reason(),
        Some(&InvalidReason::MalformedWitnessUtxo { input: 0 })
    );
    assert!(!class.kinds().contains(TxKind::Lock));
}

/// Verifies a restake returning part of the unlocked value as change is
/// accepted even though no wallet input funds it.
#[test]
fn test_restake_with_change_is_accepted() {
    let psbt = PsbtBuilder::new()
        .lock_input(500_000, 1_600_000_000)
        .data_output(ChainId::Mainnet, LOCKTIME)
        .lock_output(300_000, LOCKTIME)
        .change_output(199_000, 0)
        .build();

    let class = classify(&psbt);
    assert!(class.is_acceptable(), "{:?}", class.invalid_reason());
    assert!(class.kinds().contains(TxKind::Lock));
    assert!(class.kinds().contains(TxKind::Unlock));
    assert_eq!(class.unlock_amount(), 500_000);
    assert_eq!(class.lock_amount(), 0);
}
