//! Input scan: finds inputs spending CoreDAO lock outputs.

use bitcoin::opcodes::all::{OP_PUSHBYTES_0, OP_PUSHBYTES_32};
use coredao_stake_script::RedeemScriptEngine;
use coredao_stake_types::{
    constants::{LOCK_SCRIPT_LEN, SCRIPT_HASH_LEN, WITNESS_UTXO_LEN},
    IndexBitmap, RedeemScript, TxKind,
};
use tracing::{debug, warn};

use crate::{HostError, InternalMasks, InvalidReason, TxClassification, TxView};

/// A previous output paying to a witness v0 script hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedPrevout {
    pub amount: u64,
    pub script_hash: [u8; SCRIPT_HASH_LEN],
}

impl LockedPrevout {
    /// Parses `amount(8 LE) | 34 | OP_0 | PUSH32 | hash(32)`.
    pub fn from_witness_utxo(raw: &[u8]) -> Option<Self> {
        if raw.len() != WITNESS_UTXO_LEN {
            return None;
        }
        if raw[8] as usize != LOCK_SCRIPT_LEN
            || raw[9] != OP_PUSHBYTES_0.to_u8()
            || raw[10] != OP_PUSHBYTES_32.to_u8()
        {
            return None;
        }

        let mut amount = [0u8; 8];
        amount.copy_from_slice(&raw[..8]);
        let mut script_hash = [0u8; SCRIPT_HASH_LEN];
        script_hash.copy_from_slice(&raw[11..]);
        Some(Self {
            amount: u64::from_le_bytes(amount),
            script_hash,
        })
    }

    /// The scriptPubKey being spent, rebuilt from the hash.
    pub fn script_pubkey(&self) -> [u8; LOCK_SCRIPT_LEN] {
        let mut out = [0u8; LOCK_SCRIPT_LEN];
        out[0] = OP_PUSHBYTES_0.to_u8();
        out[1] = OP_PUSHBYTES_32.to_u8();
        out[2..].copy_from_slice(&self.script_hash);
        out
    }
}

/// Checks every non-internal input and records the accepted ones.
///
/// Stops at the first malformed input; nothing found before it is kept.
pub(crate) fn classify_inputs<V: TxView + ?Sized>(
    view: &V,
    masks: &InternalMasks,
    engine: &RedeemScriptEngine,
    class: &mut TxClassification,
) -> Result<(), HostError> {
    let count = view.input_count();
    if count > IndexBitmap::CAPACITY {
        warn!(%count, "too many inputs");
        class.reject(InvalidReason::TooManyInputs { count });
        return Ok(());
    }

    let mut unlocked = IndexBitmap::new();
    let mut unlock_amount = 0u64;

    for idx in 0..count {
        if masks.is_internal_input(idx)? {
            debug!(input = %idx, "internal input");
            continue;
        }

        let amount = match check_protocol_input(view, idx, engine)? {
            Ok(amount) => amount,
            Err(reason) => {
                warn!(input = %idx, %reason, "rejecting non-protocol external input");
                class.reject(reason);
                return Ok(());
            }
        };

        unlock_amount = match unlock_amount.checked_add(amount) {
            Some(total) => total,
            None => {
                class.reject(InvalidReason::UnlockAmountOverflow);
                return Ok(());
            }
        };
        unlocked.set(idx, true)?;
        debug!(input = %idx, %amount, "protocol input");
    }

    if !unlocked.is_empty() {
        class.insert_kind(TxKind::Unlock);
    }
    class.set_unlocked(unlocked, unlock_amount);
    Ok(())
}

fn check_protocol_input<V: TxView + ?Sized>(
    view: &V,
    idx: usize,
    engine: &RedeemScriptEngine,
) -> Result<Result<u64, InvalidReason>, HostError> {
    let Some(raw_utxo) = view.input_witness_utxo(idx)? else {
        return Ok(Err(InvalidReason::MissingWitnessUtxo { input: idx }));
    };
    let Some(prevout) = LockedPrevout::from_witness_utxo(&raw_utxo) else {
        return Ok(Err(InvalidReason::MalformedWitnessUtxo { input: idx }));
    };

    let Some(raw_script) = view.input_witness_script(idx)? else {
        return Ok(Err(InvalidReason::MissingWitnessScript { input: idx }));
    };
    let script = match RedeemScript::from_slice(&raw_script) {
        Ok(script) => script,
        Err(e) => {
            return Ok(Err(InvalidReason::WitnessScriptLength {
                input: idx,
                len: e.0,
            }))
        }
    };

    if let Err(source) = engine.validate(&script) {
        return Ok(Err(InvalidReason::InputScript { input: idx, source }));
    }

    Ok(Ok(prevout.amount))
}

#[cfg(test)]
mod tests {
    use coredao_test_utils::{test_engine, witness_utxo};

    use super::*;

    #[test]
    fn test_parse_witness_utxo() {
        let spk = [0u8, 0x20]
            .into_iter()
            .chain([0xcd; 32])
            .collect::<Vec<_>>();
        let raw = witness_utxo(150_000, &spk);
        let prevout = LockedPrevout::from_witness_utxo(&raw).unwrap();
        assert_eq!(prevout.amount, 150_000);
        assert_eq!(prevout.script_hash, [0xcd; 32]);
        assert_eq!(prevout.script_pubkey().as_slice(), spk.as_slice());
    }

    #[test]
    fn test_parse_witness_utxo_rejects_other_scripts() {
        // P2WPKH has the wrong length.
        let p2wpkh = [0u8, 0x14].into_iter().chain([1; 20]).collect::<Vec<_>>();
        assert!(LockedPrevout::from_witness_utxo(&witness_utxo(1, &p2wpkh)).is_none());

        // P2TR has the right length but witness version 1.
        let p2tr = [0x51u8, 0x20].into_iter().chain([1; 32]).collect::<Vec<_>>();
        assert!(LockedPrevout::from_witness_utxo(&witness_utxo(1, &p2tr)).is_none());

        let mut raw = witness_utxo(1, &[0u8; 34]);
        raw[8] = 33;
        assert!(LockedPrevout::from_witness_utxo(&raw).is_none());
        assert!(LockedPrevout::from_witness_utxo(&raw[..42]).is_none());
    }

    #[test]
    fn test_unlock_skips_internal_inputs() {
        let engine = test_engine();
        let script = engine.build(1_650_000_000);
        let spk = coredao_stake_script::lock_script_pubkey(&script);

        let mut view = crate::host::MockTxView::new();
        view.expect_input_count().return_const(2usize);
        view.expect_input_witness_utxo()
            .withf(|idx| *idx == 1)
            .returning(move |_| Ok(Some(witness_utxo(40_000, &spk))));
        view.expect_input_witness_script()
            .withf(|idx| *idx == 1)
            .returning(move |_| Ok(Some(script.as_bytes().to_vec())));

        let masks = InternalMasks {
            inputs: IndexBitmap::from_indices([0]).unwrap(),
            outputs: IndexBitmap::new(),
        };
        let mut class = TxClassification::new();
        classify_inputs(&view, &masks, &engine, &mut class).unwrap();

        assert!(class.kinds().contains(TxKind::Unlock));
        assert_eq!(class.unlock_amount(), 40_000);
        assert_eq!(
            class.protocol_inputs().iter_ones().collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[test]
    fn test_missing_witness_script_is_invalid() {
        let spk = [0u8, 0x20].into_iter().chain([9; 32]).collect::<Vec<_>>();
        let mut view = crate::host::MockTxView::new();
        view.expect_input_count().return_const(1usize);
        view.expect_input_witness_utxo()
            .returning(move |_| Ok(Some(witness_utxo(10, &spk))));
        view.expect_input_witness_script().returning(|_| Ok(None));

        let mut class = TxClassification::new();
        classify_inputs(&view, &InternalMasks::default(), &test_engine(), &mut class).unwrap();
        assert_eq!(
            class.invalid_reason(),
            Some(&InvalidReason::MissingWitnessScript { input: 0 })
        );
        assert_eq!(class.unlock_amount(), 0);
    }

    #[test]
    fn test_host_failure_propagates() {
        let mut view = crate::host::MockTxView::new();
        view.expect_input_count().return_const(1usize);
        view.expect_input_witness_utxo()
            .returning(|idx| Err(HostError::InputOutOfRange(idx)));

        let mut class = TxClassification::new();
        let res = classify_inputs(&view, &InternalMasks::default(), &test_engine(), &mut class);
        assert_eq!(res, Err(HostError::InputOutOfRange(0)));
    }
}
