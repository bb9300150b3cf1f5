//! Utility functions for the `coredao-signer` binary.
//!
//! Key loading, PSBT file encoding and display helpers shared by the
//! subcommands.

use std::{
    env, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use base64::{engine::general_purpose::STANDARD, Engine};
use bitcoin::{absolute::LOCK_TIME_THRESHOLD, bip32::Xpriv, psbt::Psbt, Amount};
use chrono::{DateTime, Utc};
use coredao_stake_script::ZeroizableXpriv;
use zeroize::Zeroize;

/// Reads an [`Xpriv`] from file as a string and verifies the checksum.
fn read_xpriv(path: &Path) -> anyhow::Result<ZeroizableXpriv> {
    let mut raw = fs::read_to_string(path)?;
    let parsed = Xpriv::from_str(raw.trim());
    raw.zeroize();
    Ok(parsed?.into())
}

/// Parses an [`Xpriv`] from environment variable.
fn parse_xpriv_from_env(env: &'static str) -> anyhow::Result<ZeroizableXpriv> {
    let mut env_val = match env::var(env) {
        Ok(v) => v,
        Err(_) => anyhow::bail!("got --key-from-env but {env} not set or invalid"),
    };

    let parsed = Xpriv::from_str(env_val.trim());
    env_val.zeroize();

    match parsed {
        Ok(xpriv) => Ok(xpriv.into()),
        Err(_) => anyhow::bail!("got --key-from-env but invalid xpriv"),
    }
}

/// Resolves an [`Xpriv`] from the file path (if provided) or environment variable (if
/// `--key-from-env` set). Only one source should be specified.
///
/// # Notes
///
/// The returned key will [`Zeroize`](zeroize) on [`Drop`].
pub(crate) fn resolve_xpriv(
    path: &Option<PathBuf>,
    from_env: bool,
    env: &'static str,
) -> anyhow::Result<Option<ZeroizableXpriv>> {
    match (path, from_env) {
        (Some(_), true) => anyhow::bail!("got key path and --key-from-env, pick a lane"),
        (Some(path), false) => Ok(Some(read_xpriv(path)?)),
        (None, true) => parse_xpriv_from_env(env).map(Some),
        _ => Ok(None),
    }
}

/// Decodes a base64 PSBT, tolerating surrounding whitespace.
pub(crate) fn decode_psbt(encoded: &str) -> anyhow::Result<Psbt> {
    let raw = STANDARD.decode(encoded.trim())?;
    Ok(Psbt::deserialize(&raw)?)
}

pub(crate) fn encode_psbt(psbt: &Psbt) -> String {
    STANDARD.encode(psbt.serialize())
}

/// Reads a base64 PSBT file.
pub(crate) fn read_psbt(path: &Path) -> anyhow::Result<Psbt> {
    let encoded = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => anyhow::bail!("failed to read psbt {path:?}: {e}"),
    };
    decode_psbt(&encoded)
}

/// Renders a CLTV locktime: a block height below the BIP65 threshold, a UTC
/// time otherwise.
pub(crate) fn format_locktime(locktime: u32) -> String {
    if locktime < LOCK_TIME_THRESHOLD {
        return format!("block {locktime}");
    }
    match DateTime::<Utc>::from_timestamp(i64::from(locktime), 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => locktime.to_string(),
    }
}

/// Renders a signed satoshi amount in BTC.
pub(crate) fn format_signed_sats(sats: i64) -> String {
    let abs = Amount::from_sat(sats.unsigned_abs());
    if sats < 0 {
        format!("-{abs}")
    } else {
        abs.to_string()
    }
}
