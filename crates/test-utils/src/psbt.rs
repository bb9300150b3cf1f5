use std::str::FromStr;

use bitcoin::{
    absolute::LockTime,
    bip32::{DerivationPath, Fingerprint},
    hashes::Hash,
    psbt::{Input, Output, Psbt},
    transaction::Version,
    Amount, CompressedPublicKey, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid,
    WScriptHash, Witness,
};
use coredao_stake_script::{DeviceKeys, RedeemScriptEngine, XprivKeys};
use coredao_stake_types::ChainId;
use secp256k1::PublicKey;

use crate::{data_output, test_keys};

/// Fingerprint no test key has.
pub const FOREIGN_FINGERPRINT: [u8; 4] = [0xde, 0xad, 0xbe, 0xef];

/// BIP84 wallet path `m/84'/1'/0'/{change}/{index}`.
pub fn wallet_path(change: u32, index: u32) -> DerivationPath {
    DerivationPath::from_str(&format!("m/84'/1'/0'/{change}/{index}")).expect("valid path")
}

/// Assembles PSBTs spending and creating wallet, lock and data outputs.
///
/// Wallet entries carry BIP32 derivations for the test key, so a host built
/// with [`test_keys`] recognises them as internal.
#[derive(Debug)]
pub struct PsbtBuilder {
    keys: XprivKeys,
    engine: RedeemScriptEngine,
    tx_inputs: Vec<TxIn>,
    inputs: Vec<Input>,
    tx_outputs: Vec<TxOut>,
    outputs: Vec<Output>,
}

impl Default for PsbtBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PsbtBuilder {
    pub fn new() -> Self {
        let keys = test_keys();
        let engine = RedeemScriptEngine::new(&keys).expect("protocol key derives");
        Self {
            keys,
            engine,
            tx_inputs: Vec::new(),
            inputs: Vec::new(),
            tx_outputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn engine(&self) -> &RedeemScriptEngine {
        &self.engine
    }

    fn wallet_key(&self, change: u32, index: u32) -> (PublicKey, DerivationPath) {
        let path = wallet_path(change, index);
        let pubkey = self.keys.derive_pubkey(&path).expect("wallet key derives");
        (pubkey, path)
    }

    fn push_input(mut self, input: Input) -> Self {
        let n = self.tx_inputs.len() as u8;
        self.tx_inputs.push(TxIn {
            previous_output: OutPoint::new(Txid::from_byte_array([n.wrapping_add(1); 32]), 0),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::ENABLE_LOCKTIME_NO_RBF,
            witness: Witness::new(),
        });
        self.inputs.push(input);
        self
    }

    fn push_output(mut self, txout: TxOut, output: Output) -> Self {
        self.tx_outputs.push(txout);
        self.outputs.push(output);
        self
    }

    fn wallet_input_with_fingerprint(self, value: u64, index: u32, fp: Fingerprint) -> Self {
        let (pubkey, path) = self.wallet_key(0, index);
        let mut input = Input {
            witness_utxo: Some(TxOut {
                value: Amount::from_sat(value),
                script_pubkey: ScriptBuf::new_p2wpkh(&CompressedPublicKey(pubkey).wpubkey_hash()),
            }),
            ..Default::default()
        };
        input.bip32_derivation.insert(pubkey, (fp, path));
        self.push_input(input)
    }

    /// A P2WPKH input owned by the test wallet.
    pub fn wallet_input(self, value: u64, index: u32) -> Self {
        let fp = self.keys.master_fingerprint();
        self.wallet_input_with_fingerprint(value, index, fp)
    }

    /// A P2WPKH input whose derivation names another wallet's fingerprint.
    pub fn foreign_wallet_input(self, value: u64) -> Self {
        self.wallet_input_with_fingerprint(value, 0, Fingerprint::from(FOREIGN_FINGERPRINT))
    }

    /// An input spending a lock output created with the canonical script.
    pub fn lock_input(self, value: u64, locktime: u32) -> Self {
        let script = self.engine.build(locktime).to_script_buf();
        let spk = ScriptBuf::new_p2wsh(&WScriptHash::hash(script.as_bytes()));
        self.raw_lock_input(value, spk, Some(script))
    }

    /// An external input with arbitrary spent script and witness script.
    pub fn raw_lock_input(
        self,
        value: u64,
        script_pubkey: ScriptBuf,
        witness_script: Option<ScriptBuf>,
    ) -> Self {
        let input = Input {
            witness_utxo: Some(TxOut {
                value: Amount::from_sat(value),
                script_pubkey,
            }),
            witness_script,
            ..Default::default()
        };
        self.push_input(input)
    }

    /// The zero-value staking data output.
    pub fn data_output(self, chain: ChainId, locktime: u32) -> Self {
        let spk = data_output(&self.engine, chain, locktime);
        self.raw_output(0, ScriptBuf::from_bytes(spk))
    }

    /// The P2WSH output committing to the canonical script.
    pub fn lock_output(self, value: u64, locktime: u32) -> Self {
        let script = self.engine.build(locktime).to_script_buf();
        let spk = ScriptBuf::new_p2wsh(&WScriptHash::hash(script.as_bytes()));
        self.raw_output(value, spk)
    }

    /// A P2WPKH change output back to the test wallet.
    pub fn change_output(self, value: u64, index: u32) -> Self {
        let (pubkey, path) = self.wallet_key(1, index);
        let fp = self.keys.master_fingerprint();
        let txout = TxOut {
            value: Amount::from_sat(value),
            script_pubkey: ScriptBuf::new_p2wpkh(&CompressedPublicKey(pubkey).wpubkey_hash()),
        };
        let mut output = Output::default();
        output.bip32_derivation.insert(pubkey, (fp, path));
        self.push_output(txout, output)
    }

    /// An output with no wallet metadata.
    pub fn raw_output(self, value: u64, script_pubkey: ScriptBuf) -> Self {
        let txout = TxOut {
            value: Amount::from_sat(value),
            script_pubkey,
        };
        self.push_output(txout, Output::default())
    }

    pub fn build(self) -> Psbt {
        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: self.tx_inputs,
            output: self.tx_outputs,
        };
        let mut psbt = Psbt::from_unsigned_tx(tx).expect("unsigned transaction");
        psbt.inputs = self.inputs;
        psbt.outputs = self.outputs;
        psbt
    }
}
