//! Subcommand implementations.

mod classify;
mod pubkey;
mod redeem_script;
mod sign;

use crate::args::{CmdContext, Subcommand};

/// Executes a subcommand.
pub(crate) fn exec_subc(cmd: Subcommand, ctx: &mut CmdContext) -> anyhow::Result<()> {
    match cmd {
        Subcommand::Pubkey(subc) => pubkey::exec(subc, ctx),
        Subcommand::RedeemScript(subc) => redeem_script::exec(subc, ctx),
        Subcommand::Classify(subc) => classify::exec(subc, ctx),
        Subcommand::Sign(subc) => sign::exec(subc, ctx),
    }
}
