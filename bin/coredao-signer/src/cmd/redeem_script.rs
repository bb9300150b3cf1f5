//! `redeem-script` subcommand: prints the canonical lock for a locktime.

use bitcoin::Address;
use coredao_stake_script::{lock_script_pubkey, RedeemScriptEngine};
use serde::Serialize;

use crate::{
    args::{CmdContext, SubcRedeemScript},
    util::format_locktime,
};

#[derive(Debug, Serialize)]
struct RedeemScriptInfo {
    locktime: u32,
    unlocks_at: String,
    redeem_script: String,
    lock_script_pubkey: String,
    lock_address: String,
}

pub(super) fn exec(cmd: SubcRedeemScript, ctx: &mut CmdContext) -> anyhow::Result<()> {
    let engine = RedeemScriptEngine::new(&ctx.keys)?;
    let script = engine.build(cmd.locktime);
    let lock_address = Address::p2wsh(&script.to_script_buf(), ctx.config.network);

    let info = RedeemScriptInfo {
        locktime: cmd.locktime,
        unlocks_at: format_locktime(cmd.locktime),
        redeem_script: hex::encode(script.as_bytes()),
        lock_script_pubkey: hex::encode(lock_script_pubkey(&script)),
        lock_address: lock_address.to_string(),
    };

    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
