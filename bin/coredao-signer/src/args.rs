//! Command line arguments for the `coredao-signer` binary.

use std::path::PathBuf;

use argh::FromArgs;
use coredao_common::logging::{self, LoggingInitConfig};
use coredao_config::SignerConfig;
use coredao_stake_script::XprivKeys;

use crate::util::resolve_xpriv;

/// Signing key environment variable.
pub(crate) const SIGNER_KEY_ENVVAR: &str = "COREDAO_SIGNER_KEY";

/// Default config path, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "coredao-signer.toml";

/// Args.
#[derive(FromArgs)]
pub(crate) struct Args {
    #[argh(
        option,
        description = "config file path (default ./coredao-signer.toml)",
        short = 'c'
    )]
    pub(crate) config: Option<PathBuf>,

    #[argh(option, description = "reads master xpriv from specified file", short = 'f')]
    pub(crate) key_file: Option<PathBuf>,

    #[argh(
        switch,
        description = "reads master xpriv from envvar COREDAO_SIGNER_KEY",
        short = 'E'
    )]
    pub(crate) key_from_env: bool,

    #[argh(switch, description = "log at debug level", short = 'v')]
    pub(crate) verbose: bool,

    #[argh(subcommand)]
    pub(crate) subc: Subcommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
pub(crate) enum Subcommand {
    Pubkey(SubcPubkey),
    RedeemScript(SubcRedeemScript),
    Classify(SubcClassify),
    Sign(SubcSign),
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "pubkey",
    description = "prints the protocol public key and its hash160"
)]
pub(crate) struct SubcPubkey {}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "redeem-script",
    description = "prints the canonical redeem script and lock scriptPubKey"
)]
pub(crate) struct SubcRedeemScript {
    #[argh(
        option,
        description = "CLTV locktime, block height or unix timestamp",
        short = 'l'
    )]
    pub(crate) locktime: u32,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "classify",
    description = "classifies a base64 PSBT and prints the review as JSON"
)]
pub(crate) struct SubcClassify {
    #[argh(positional, description = "base64 PSBT file")]
    pub(crate) psbt: PathBuf,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "sign",
    description = "reviews a base64 PSBT and adds protocol signatures"
)]
pub(crate) struct SubcSign {
    #[argh(positional, description = "base64 PSBT file")]
    pub(crate) psbt: PathBuf,

    #[argh(
        option,
        description = "output file path (default stdout)",
        short = 'o'
    )]
    pub(crate) output: Option<PathBuf>,

    #[argh(switch, description = "approve without prompting", short = 'y')]
    pub(crate) yes: bool,
}

/// Shared state for every subcommand.
#[derive(Debug)]
pub(crate) struct CmdContext {
    pub(crate) config: SignerConfig,

    /// Device keys backed by the master xpriv, scrubbed on drop.
    pub(crate) keys: XprivKeys,
}

/// Resolves the command context and subcommand from the parsed command line arguments.
///
/// Loads the config, installs logging and reads the master key.
pub(crate) fn resolve_context_and_subcommand(
    args: Args,
) -> anyhow::Result<(CmdContext, Subcommand)> {
    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = coredao_config::load(&config_path)?;

    logging::init_from_config(LoggingInitConfig {
        service_name: "coredao-signer",
        log_dir: config.logging.log_dir.as_ref(),
        log_file_prefix: config.logging.log_file_prefix.as_deref(),
        json_format: config.logging.json_format.unwrap_or(false),
        verbose: args.verbose,
    });

    let Some(xpriv) = resolve_xpriv(&args.key_file, args.key_from_env, SIGNER_KEY_ENVVAR)? else {
        anyhow::bail!("privkey unset, pass --key-file or --key-from-env");
    };

    let ctx = CmdContext {
        config,
        keys: XprivKeys::new(xpriv),
    };

    Ok((ctx, args.subc))
}
