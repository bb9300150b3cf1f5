use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// CoreDAO chains a staking payload may target.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    Mainnet = 1116,
    Testnet = 1115,
    Testnet2 = 1114,
}

impl ChainId {
    /// Human-readable network name.
    pub fn name(&self) -> &'static str {
        match self {
            ChainId::Mainnet => "Mainnet",
            ChainId::Testnet => "Testnet",
            ChainId::Testnet2 => "Testnet2",
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
