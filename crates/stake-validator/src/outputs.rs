//! Output scan: finds the staking data output, the lock output and change.

use bitcoin::opcodes::all::{OP_PUSHDATA1, OP_RETURN};
use coredao_stake_script::RedeemScriptEngine;
use coredao_stake_types::{
    constants::{DATA_OUTPUT_HEADER_LEN, LOCK_SCRIPT_LEN, MAX_SCRIPT_PUBKEY_LEN, PAYLOAD_LEN},
    IndexBitmap, StakingPayload, TxKind,
};
use tracing::{debug, info, warn};

use crate::{HostError, InternalMasks, InvalidReason, TxClassification, TxView};

/// Output counts a stake transaction may have: data, lock and optional change.
const STAKE_OUTPUT_COUNTS: [usize; 2] = [2, 3];

#[derive(Debug, Default)]
struct OutputScan {
    payload: Option<StakingPayload>,
    lock_spk: Option<Vec<u8>>,
    lock_candidates: usize,
    change_found: bool,
}

/// Scans every output and, if the transaction stakes, checks the lock.
pub(crate) fn classify_outputs<V: TxView + ?Sized>(
    view: &V,
    masks: &InternalMasks,
    engine: &RedeemScriptEngine,
    class: &mut TxClassification,
) -> Result<(), HostError> {
    let count = view.output_count();
    if count > IndexBitmap::CAPACITY {
        class.reject(InvalidReason::TooManyOutputs { count });
        return Ok(());
    }

    let scan = match scan_outputs(view, masks, count)? {
        Ok(scan) => scan,
        Err(reason) => {
            warn!(%reason, "rejecting outputs");
            class.reject(reason);
            return Ok(());
        }
    };

    let (Some(payload), Some(lock_spk)) = (scan.payload, scan.lock_spk) else {
        debug!(change = scan.change_found, "not a stake transaction");
        return Ok(());
    };
    class.insert_kind(TxKind::Lock);

    if let Err(reason) = check_lock(engine, count, scan.lock_candidates, &payload, &lock_spk) {
        warn!(%reason, "rejecting stake");
        class.reject(reason);
        return Ok(());
    }

    // A restake may return unlocked funds as change, so change can exceed
    // the wallet's own inputs.
    let totals = view.totals();
    let lock_amount = totals
        .internal_inputs_total
        .saturating_sub(totals.change_total);

    info!(
        chain = %payload.chain_id(),
        locktime = payload.locktime(),
        fee = payload.fee(),
        %lock_amount,
        "stake transaction"
    );
    class.set_stake(payload, lock_amount);
    Ok(())
}

fn scan_outputs<V: TxView + ?Sized>(
    view: &V,
    masks: &InternalMasks,
    count: usize,
) -> Result<Result<OutputScan, InvalidReason>, HostError> {
    let mut scan = OutputScan::default();

    for idx in 0..count {
        let amount = view.output_amount(idx)?;
        let spk = view.output_script_pubkey(idx)?;
        if spk.len() > MAX_SCRIPT_PUBKEY_LEN {
            return Ok(Err(InvalidReason::ScriptPubKeyTooLong {
                output: idx,
                len: spk.len(),
            }));
        }

        if spk.first() == Some(&OP_RETURN.to_u8()) {
            if scan.payload.is_some() {
                return Ok(Err(InvalidReason::DuplicateDataOutput { output: idx }));
            }
            let payload = match decode_data_output(&spk, idx) {
                Ok(payload) => payload,
                Err(reason) => return Ok(Err(reason)),
            };
            if amount != 0 {
                return Ok(Err(InvalidReason::NonZeroDataAmount {
                    output: idx,
                    amount,
                }));
            }
            debug!(output = %idx, "staking data output");
            scan.payload = Some(payload);
        } else if masks.is_internal_output(idx)? {
            debug!(output = %idx, %amount, "change output");
            scan.change_found = true;
        } else {
            if spk.len() != LOCK_SCRIPT_LEN {
                return Ok(Err(InvalidReason::LockOutputLength {
                    output: idx,
                    len: spk.len(),
                }));
            }
            debug!(output = %idx, %amount, "candidate lock output");
            scan.lock_candidates += 1;
            scan.lock_spk = Some(spk);
        }
    }

    Ok(Ok(scan))
}

/// Strips the `OP_RETURN OP_PUSHDATA1 80` header and decodes the rest.
fn decode_data_output(spk: &[u8], idx: usize) -> Result<StakingPayload, InvalidReason> {
    let data = spk.get(DATA_OUTPUT_HEADER_LEN..).unwrap_or_default();
    let header = &spk[..spk.len().min(DATA_OUTPUT_HEADER_LEN)];

    let payload = StakingPayload::decode(data).map_err(|source| InvalidReason::Payload {
        output: idx,
        source,
    })?;

    if header != [OP_RETURN.to_u8(), OP_PUSHDATA1.to_u8(), PAYLOAD_LEN as u8] {
        return Err(InvalidReason::MalformedDataOutput { output: idx });
    }
    Ok(payload)
}

fn check_lock(
    engine: &RedeemScriptEngine,
    count: usize,
    lock_candidates: usize,
    payload: &StakingPayload,
    lock_spk: &[u8],
) -> Result<(), InvalidReason> {
    if lock_candidates != 1 {
        return Err(InvalidReason::MultipleLockOutputs {
            count: lock_candidates,
        });
    }
    if !STAKE_OUTPUT_COUNTS.contains(&count) {
        return Err(InvalidReason::OutputCount { count });
    }
    engine
        .validate(payload.redeem_script())
        .map_err(InvalidReason::RedeemScript)?;
    engine
        .validate_lock_script_pubkey(lock_spk, payload.redeem_script())
        .map_err(InvalidReason::LockScript)?;
    Ok(())
}
