//! `classify` subcommand: dry-runs validation on a PSBT without signing.

use bitcoin::psbt::Psbt;
use coredao_stake_script::{DeviceKeys, RedeemScriptEngine};
use coredao_stake_validator::{validate_transaction, PsbtHost, TransactionReview, TxView};
use serde::Serialize;
use tracing::debug;

use crate::{
    args::{CmdContext, SubcClassify},
    util::read_psbt,
};

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub(crate) enum ClassifyReport {
    Valid(TransactionReview),
    Invalid { reason: String },
}

/// Classifies `psbt` as the signing session would, without asking anyone.
pub(crate) fn classify<K: DeviceKeys + ?Sized>(
    psbt: &Psbt,
    keys: &K,
) -> anyhow::Result<ClassifyReport> {
    let host = PsbtHost::new(psbt, keys)?;
    let engine = RedeemScriptEngine::new(keys)?;
    let class = validate_transaction(&host, host.masks(), &engine)?;

    if let Some(reason) = class.invalid_reason() {
        debug!(%reason, "classified invalid");
        return Ok(ClassifyReport::Invalid {
            reason: reason.to_string(),
        });
    }

    let review = TransactionReview::new(&class, &host.totals())?;
    Ok(ClassifyReport::Valid(review))
}

pub(super) fn exec(cmd: SubcClassify, ctx: &mut CmdContext) -> anyhow::Result<()> {
    let psbt = read_psbt(&cmd.psbt)?;
    let report = classify(&psbt, &ctx.keys)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
