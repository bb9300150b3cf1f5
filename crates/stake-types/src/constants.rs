//! Byte layout constants for the staking protocol.

/// Tag at the start of every staking payload.
pub const PAYLOAD_MAGIC: [u8; 4] = *b"SAT+";

/// The only payload version this crate understands.
pub const SUPPORTED_VERSION: u8 = 1;

/// Length of the 20-byte delegator and validator identifiers.
pub const IDENTITY_LEN: usize = 20;

/// Length of a hash160 public key hash.
pub const PUBKEY_HASH_LEN: usize = 20;

/// Length of the canonical redeem script.
pub const REDEEM_SCRIPT_LEN: usize = 32;

/// Length of the sha256 script hash committed to by a lock output.
pub const SCRIPT_HASH_LEN: usize = 32;

/// Length of a lock scriptPubKey (`OP_0 | PUSH32 | hash`).
pub const LOCK_SCRIPT_LEN: usize = 2 + SCRIPT_HASH_LEN;

/// Offset of the little-endian locktime inside the redeem script.
pub const REDEEM_LOCKTIME_OFFSET: usize = 1;

pub(crate) const MAGIC_OFFSET: usize = 0;
pub(crate) const VERSION_OFFSET: usize = MAGIC_OFFSET + PAYLOAD_MAGIC.len();
pub(crate) const CHAIN_ID_OFFSET: usize = VERSION_OFFSET + 1;
pub(crate) const DELEGATOR_OFFSET: usize = CHAIN_ID_OFFSET + 2;
pub(crate) const VALIDATOR_OFFSET: usize = DELEGATOR_OFFSET + IDENTITY_LEN;
pub(crate) const FEE_OFFSET: usize = VALIDATOR_OFFSET + IDENTITY_LEN;
pub(crate) const REDEEM_SCRIPT_OFFSET: usize = FEE_OFFSET + 1;

/// Total length of an encoded staking payload.
pub const PAYLOAD_LEN: usize = REDEEM_SCRIPT_OFFSET + REDEEM_SCRIPT_LEN;

/// Bytes in front of the payload in a metadata output: `OP_RETURN OP_PUSHDATA1 <len>`.
pub const DATA_OUTPUT_HEADER_LEN: usize = 3;

/// Longest scriptPubKey the output scan accepts from the host.
pub const MAX_SCRIPT_PUBKEY_LEN: usize = DATA_OUTPUT_HEADER_LEN + PAYLOAD_LEN;

/// Length of a witness UTXO spending a lock output: `amount(8) | len(1) | spk(34)`.
pub const WITNESS_UTXO_LEN: usize = 8 + 1 + LOCK_SCRIPT_LEN;

/// Maximum number of inputs (and outputs) tracked in an [`IndexBitmap`](crate::IndexBitmap).
pub const MAX_SIGNABLE_INPUTS: usize = 512;
