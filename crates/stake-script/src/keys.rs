//! Device key access at the fixed protocol derivation path.

use std::{fmt, ops::Deref};

use bitcoin::bip32::{ChainCode, ChildNumber, DerivationPath, Fingerprint, Xpriv};
use secp256k1::{ecdsa, Message, PublicKey, SECP256K1};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::KeyError;

/// Purpose, coin type, account, change and index of the protocol key.
const PROTOCOL_PATH: [ChildNumber; 5] = [
    ChildNumber::Hardened { index: 84 },
    ChildNumber::Hardened { index: 1 },
    ChildNumber::Hardened { index: 0 },
    ChildNumber::Normal { index: 0 },
    ChildNumber::Normal { index: 0 },
];

/// The path of the key that owns every redeem script: `m/84'/1'/0'/0/0`.
pub fn protocol_derivation_path() -> DerivationPath {
    DerivationPath::from(PROTOCOL_PATH.as_slice())
}

/// Key operations the signing device exposes.
///
/// Private keys never leave the implementor; callers only see public keys
/// and signatures.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait DeviceKeys {
    /// Fingerprint of the master key, used to match PSBT derivation records.
    fn master_fingerprint(&self) -> Fingerprint;

    /// Derives the public key at `path`.
    fn derive_pubkey(&self, path: &DerivationPath) -> Result<PublicKey, KeyError>;

    /// Signs a 32-byte digest with the key at `path`.
    fn sign_ecdsa(
        &self,
        path: &DerivationPath,
        digest: [u8; 32],
    ) -> Result<ecdsa::Signature, KeyError>;
}

/// An [`Xpriv`] that is scrubbed when dropped.
pub struct ZeroizableXpriv(Xpriv);

impl ZeroizableXpriv {
    pub fn new(xpriv: Xpriv) -> Self {
        Self(xpriv)
    }
}

impl From<Xpriv> for ZeroizableXpriv {
    fn from(value: Xpriv) -> Self {
        Self(value)
    }
}

impl Deref for ZeroizableXpriv {
    type Target = Xpriv;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Zeroize for ZeroizableXpriv {
    fn zeroize(&mut self) {
        self.0.private_key.non_secure_erase();
        self.0.chain_code = ChainCode::from([0u8; 32]);
    }
}

impl Drop for ZeroizableXpriv {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for ZeroizableXpriv {}

impl fmt::Debug for ZeroizableXpriv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ZeroizableXpriv(<redacted>)")
    }
}

/// [`DeviceKeys`] backed by a BIP32 master key held in memory.
pub struct XprivKeys {
    master: ZeroizableXpriv,
}

impl XprivKeys {
    pub fn new(master: impl Into<ZeroizableXpriv>) -> Self {
        Self {
            master: master.into(),
        }
    }

    fn derive_child(&self, path: &DerivationPath) -> Result<ZeroizableXpriv, KeyError> {
        Ok(self.master.derive_priv(SECP256K1, path)?.into())
    }
}

impl DeviceKeys for XprivKeys {
    fn master_fingerprint(&self) -> Fingerprint {
        self.master.fingerprint(SECP256K1)
    }

    fn derive_pubkey(&self, path: &DerivationPath) -> Result<PublicKey, KeyError> {
        let child = self.derive_child(path)?;
        Ok(child.private_key.public_key(SECP256K1))
    }

    fn sign_ecdsa(
        &self,
        path: &DerivationPath,
        digest: [u8; 32],
    ) -> Result<ecdsa::Signature, KeyError> {
        let child = self.derive_child(path)?;
        let msg = Message::from_digest(digest);
        Ok(SECP256K1.sign_ecdsa(&msg, &child.private_key))
    }
}

impl fmt::Debug for XprivKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XprivKeys")
            .field("fingerprint", &self.master_fingerprint())
            .finish_non_exhaustive()
    }
}
