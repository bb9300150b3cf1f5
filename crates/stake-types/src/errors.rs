//! Errors raised while decoding staking data.

use thiserror::Error;

use crate::constants::{PAYLOAD_LEN, REDEEM_SCRIPT_LEN};

/// Reasons a staking payload fails to decode.
///
/// Decoding is all-or-nothing: any of these means no part of the payload is used.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// The payload is not exactly [`PAYLOAD_LEN`] bytes.
    #[error("expected payload of {PAYLOAD_LEN} bytes, got {0}")]
    LengthMismatch(usize),

    /// The payload does not start with `SAT+`.
    #[error("invalid payload magic {0:02x?}")]
    BadMagic([u8; 4]),

    /// The payload version is not supported.
    #[error("unsupported payload version {0}")]
    UnsupportedVersion(u8),

    /// The chain id is not one of the known CoreDAO chains.
    #[error("unknown chain id {0}")]
    UnknownChain(u16),
}

/// Raw bytes could not be read as a redeem script.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("expected redeem script of {REDEEM_SCRIPT_LEN} bytes, got {0}")]
pub struct RedeemScriptLenError(pub usize);

/// Errors from [`IndexBitmap`](crate::IndexBitmap) accesses.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BitmapError {
    /// The index does not fit in the bitmap.
    #[error("index {index} exceeds bitmap capacity {capacity}")]
    IndexOutOfRange { index: usize, capacity: usize },
}
