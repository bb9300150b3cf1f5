use coredao_stake_script::RedeemScriptEngine;
use tracing::{debug, info};

use crate::{
    inputs::classify_inputs, outputs::classify_outputs, HostError, InternalMasks,
    TxClassification, TxView,
};

/// Classifies a transaction as lock, unlock, both, ordinary or invalid.
///
/// Inputs are scanned first; outputs only if the inputs were acceptable.
/// Structural problems end up as `Invalid` in the returned classification,
/// while an `Err` means the host failed to answer a fetch.
pub fn validate_transaction<V: TxView + ?Sized>(
    view: &V,
    masks: &InternalMasks,
    engine: &RedeemScriptEngine,
) -> Result<TxClassification, HostError> {
    let mut class = TxClassification::new();

    classify_inputs(view, masks, engine, &mut class)?;
    if class.is_acceptable() {
        classify_outputs(view, masks, engine, &mut class)?;
    }

    if class.is_acceptable() {
        info!(
            kinds = ?class.kinds(),
            protocol_inputs = class.protocol_input_count(),
            unlock_amount = class.unlock_amount(),
            lock_amount = class.lock_amount(),
            "transaction classified"
        );
    } else {
        debug!(reason = ?class.invalid_reason(), "transaction invalid");
    }
    Ok(class)
}
