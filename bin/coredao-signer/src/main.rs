//! Command line signer for CoreDAO BTC staking transactions.
//!
//! # Warning
//!
//! Keys are read from a file or the environment in plain text. This tool is
//! meant for development and for driving the signing flow outside a device.

mod args;
mod cmd;
mod util;

use std::process;

use args::resolve_context_and_subcommand;
use cmd::exec_subc;

fn main() {
    let args: args::Args = argh::from_env();
    let inner = || -> anyhow::Result<()> {
        let (mut ctx, subc) = resolve_context_and_subcommand(args)?;
        exec_subc(subc, &mut ctx)?;
        Ok(())
    };
    if let Err(e) = inner() {
        eprintln!("ERROR\n{e:?}");
        process::exit(1);
    }
}
