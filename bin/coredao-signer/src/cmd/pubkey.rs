//! `pubkey` subcommand: prints the protocol key the redeem scripts commit to.

use bitcoin::{Address, CompressedPublicKey};
use coredao_stake_script::{protocol_derivation_path, DeviceKeys, RedeemScriptEngine};
use serde::Serialize;

use crate::args::{CmdContext, SubcPubkey};

#[derive(Debug, Serialize)]
struct PubkeyInfo {
    fingerprint: String,
    path: String,
    pubkey: String,
    pubkey_hash: String,
    /// P2WPKH address of the protocol key on the configured network.
    address: String,
}

pub(super) fn exec(_cmd: SubcPubkey, ctx: &mut CmdContext) -> anyhow::Result<()> {
    let path = protocol_derivation_path();
    let pubkey = ctx.keys.derive_pubkey(&path)?;
    let engine = RedeemScriptEngine::from_pubkey(&pubkey);

    let info = PubkeyInfo {
        fingerprint: ctx.keys.master_fingerprint().to_string(),
        path: path.to_string(),
        pubkey: pubkey.to_string(),
        pubkey_hash: hex::encode(engine.pubkey_hash()),
        address: Address::p2wpkh(&CompressedPublicKey(pubkey), ctx.config.network).to_string(),
    };

    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
