//! The 80-byte staking payload carried in a transaction's OP_RETURN output.
//!
//! Layout (multi-byte integers big-endian unless noted):
//!
//! | offset | len | field                               |
//! |--------|-----|-------------------------------------|
//! | 0      | 4   | magic, `SAT+`                       |
//! | 4      | 1   | version, must be 1                  |
//! | 5      | 2   | chain id                            |
//! | 7      | 20  | delegator                           |
//! | 27     | 20  | validator                           |
//! | 47     | 1   | fee                                 |
//! | 48     | 32  | redeem script (locktime LE at +1)   |
//!
//! The locktime has no field of its own; it is always read back out of the
//! redeem script.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    constants::{
        CHAIN_ID_OFFSET, DELEGATOR_OFFSET, FEE_OFFSET, IDENTITY_LEN, PAYLOAD_LEN, PAYLOAD_MAGIC,
        REDEEM_SCRIPT_LEN, REDEEM_SCRIPT_OFFSET, SUPPORTED_VERSION, VALIDATOR_OFFSET,
        VERSION_OFFSET,
    },
    ChainId, PayloadError, RedeemScript,
};

/// Decoded staking parameters.
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct StakingPayload {
    version: u8,
    #[zeroize(skip)]
    chain_id: ChainId,
    delegator: [u8; IDENTITY_LEN],
    validator: [u8; IDENTITY_LEN],
    fee: u8,
    redeem_script: RedeemScript,
}

impl StakingPayload {
    /// Builds a version 1 payload.
    pub fn new(
        chain_id: ChainId,
        delegator: [u8; IDENTITY_LEN],
        validator: [u8; IDENTITY_LEN],
        fee: u8,
        redeem_script: RedeemScript,
    ) -> Self {
        Self {
            version: SUPPORTED_VERSION,
            chain_id,
            delegator,
            validator,
            fee,
            redeem_script,
        }
    }

    /// Decodes a payload from exactly [`PAYLOAD_LEN`] bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        let raw: &[u8; PAYLOAD_LEN] = bytes
            .try_into()
            .map_err(|_| PayloadError::LengthMismatch(bytes.len()))?;

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&raw[..VERSION_OFFSET]);
        if magic != PAYLOAD_MAGIC {
            return Err(PayloadError::BadMagic(magic));
        }

        let version = raw[VERSION_OFFSET];
        if version != SUPPORTED_VERSION {
            return Err(PayloadError::UnsupportedVersion(version));
        }

        let raw_chain_id = u16::from_be_bytes([raw[CHAIN_ID_OFFSET], raw[CHAIN_ID_OFFSET + 1]]);
        let chain_id =
            ChainId::try_from(raw_chain_id).map_err(|e| PayloadError::UnknownChain(e.number))?;

        let mut delegator = [0u8; IDENTITY_LEN];
        delegator.copy_from_slice(&raw[DELEGATOR_OFFSET..VALIDATOR_OFFSET]);

        let mut validator = [0u8; IDENTITY_LEN];
        validator.copy_from_slice(&raw[VALIDATOR_OFFSET..FEE_OFFSET]);

        let fee = raw[FEE_OFFSET];

        let mut script = [0u8; REDEEM_SCRIPT_LEN];
        script.copy_from_slice(&raw[REDEEM_SCRIPT_OFFSET..]);

        Ok(Self {
            version,
            chain_id,
            delegator,
            validator,
            fee,
            redeem_script: RedeemScript::new(script),
        })
    }

    /// Encodes the payload back into its 80-byte wire form.
    pub fn encode(&self) -> [u8; PAYLOAD_LEN] {
        let mut out = [0u8; PAYLOAD_LEN];
        out[..VERSION_OFFSET].copy_from_slice(&PAYLOAD_MAGIC);
        out[VERSION_OFFSET] = self.version;
        out[CHAIN_ID_OFFSET..DELEGATOR_OFFSET]
            .copy_from_slice(&u16::from(self.chain_id).to_be_bytes());
        out[DELEGATOR_OFFSET..VALIDATOR_OFFSET].copy_from_slice(&self.delegator);
        out[VALIDATOR_OFFSET..FEE_OFFSET].copy_from_slice(&self.validator);
        out[FEE_OFFSET] = self.fee;
        out[REDEEM_SCRIPT_OFFSET..].copy_from_slice(self.redeem_script.as_bytes());
        out
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn delegator(&self) -> &[u8; IDENTITY_LEN] {
        &self.delegator
    }

    pub fn validator(&self) -> &[u8; IDENTITY_LEN] {
        &self.validator
    }

    pub fn fee(&self) -> u8 {
        self.fee
    }

    pub fn redeem_script(&self) -> &RedeemScript {
        &self.redeem_script
    }

    /// Locktime read out of the bundled redeem script.
    pub fn locktime(&self) -> u32 {
        self.redeem_script.locktime()
    }
}
