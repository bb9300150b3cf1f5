//! Unstake transactions: spending CoreDAO lock outputs back to the wallet.

#![allow(
    unused_crate_dependencies,
    reason = "test dependencies shared across test suite"
)]

use bitcoin::{hashes::Hash, ScriptBuf, WScriptHash};
use coredao_stake_script::{build_redeem_script, ScriptError};
use coredao_stake_types::TxKind;
use coredao_stake_validator::InvalidReason;
use coredao_test_utils::{test_engine, PsbtBuilder};
use integration_tests::harness::classify;

fn p2wsh(script: &ScriptBuf) -> ScriptBuf {
    ScriptBuf::new_p2wsh(&WScriptHash::hash(script.as_bytes()))
}

/// Verifies a single lock input spent to change is an unstake.
#[test]
fn test_single_input_unstake() {
    let psbt = PsbtBuilder::new()
        .lock_input(75_000, 1_600_000_000)
        .change_output(74_000, 0)
        .build();

    let class = classify(&psbt);
    assert!(class.is_acceptable());
    assert!(class.kinds().contains(TxKind::Unlock));
    assert!(!class.kinds().contains(TxKind::Lock));
    assert_eq!(class.unlock_amount(), 75_000);
    assert_eq!(class.protocol_inputs().iter_ones().collect::<Vec<_>>(), [0]);
}

/// Verifies lock inputs with different locktimes are summed and wallet
/// inputs are left out of the protocol set.
#[test]
fn test_multi_input_unstake_with_wallet_input() {
    let psbt = PsbtBuilder::new()
        .lock_input(100_000, 1_600_000_000)
        .wallet_input(5_000, 0)
        .lock_input(200_000, 1_700_000_000)
        .lock_input(300_000, 840_000)
        .change_output(604_000, 0)
        .build();

    let class = classify(&psbt);
    assert!(class.is_acceptable(), "{:?}", class.invalid_reason());
    assert_eq!(class.unlock_amount(), 600_000);
    assert_eq!(class.protocol_input_count(), 3);
    assert_eq!(
        class.protocol_inputs().iter_ones().collect::<Vec<_>>(),
        [0, 2, 3]
    );
}

/// Verifies a lock input whose witness script belongs to another key is
/// rejected.
#[test]
fn test_foreign_witness_script_is_invalid() {
    let foreign = build_redeem_script(1_600_000_000, &[0xee; 20]).to_script_buf();
    let psbt = PsbtBuilder::new()
        .raw_lock_input(75_000, p2wsh(&foreign), Some(foreign))
        .change_output(74_000, 0)
        .build();

    let class = classify(&psbt);
    assert_eq!(
        class.invalid_reason(),
        Some(&InvalidReason::InputScript {
            input: 0,
            source: ScriptError::RedeemMismatch {
                locktime: 1_600_000_000
            },
        })
    );
}

/// Verifies a lock input must carry its witness script.
#[test]
fn test_missing_witness_script_is_invalid() {
    let script = test_engine().build(1_600_000_000).to_script_buf();
    let psbt = PsbtBuilder::new()
        .raw_lock_input(75_000, p2wsh(&script), None)
        .change_output(74_000, 0)
        .build();

    let class = classify(&psbt);
    assert_eq!(
        class.invalid_reason(),
        Some(&InvalidReason::MissingWitnessScript { input: 0 })
    );
}

/// Verifies witness scripts of the wrong size are rejected before parsing.
#[test]
fn test_oversized_witness_script_is_invalid() {
    let script = ScriptBuf::from_bytes(vec![0x51; 33]);
    let psbt = PsbtBuilder::new()
        .raw_lock_input(75_000, p2wsh(&script), Some(script))
        .change_output(74_000, 0)
        .build();

    let class = classify(&psbt);
    assert_eq!(
        class.invalid_reason(),
        Some(&InvalidReason::WitnessScriptLength { input: 0, len: 33 })
    );
}

/// Verifies one bad input discards the inputs accepted before it.
#[test]
fn test_bad_input_after_good_one_discards_unlock() {
    let foreign = build_redeem_script(1_600_000_000, &[0xee; 20]).to_script_buf();
    let psbt = PsbtBuilder::new()
        .lock_input(100_000, 1_600_000_000)
        .raw_lock_input(75_000, p2wsh(&foreign), Some(foreign))
        .change_output(174_000, 0)
        .build();

    let class = classify(&psbt);
    assert!(!class.is_acceptable());
    assert!(!class.kinds().contains(TxKind::Unlock));
    assert_eq!(class.protocol_input_count(), 0);
    assert_eq!(class.unlock_amount(), 0);
}

/// Verifies an unstake may not pay to an address outside the wallet.
#[test]
fn test_unstake_to_external_p2wpkh_is_invalid() {
    let external = ScriptBuf::from_bytes([0x00, 0x14].into_iter().chain([0x33; 20]).collect());
    let psbt = PsbtBuilder::new()
        .lock_input(75_000, 1_600_000_000)
        .raw_output(74_000, external)
        .build();

    let class = classify(&psbt);
    assert_eq!(
        class.invalid_reason(),
        Some(&InvalidReason::LockOutputLength { output: 0, len: 22 })
    );
}
