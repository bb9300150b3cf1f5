//! The extension hooks the host signing flow calls into.

use coredao_stake_script::{DeviceKeys, RedeemScriptEngine};
use tracing::{info, warn};
use zeroize::Zeroize;

use crate::{
    sign_input, validate_transaction, InternalMasks, ProtocolSignature, Rejection, Reviewer,
    SighashProvider, TransactionReview, TxClassification, TxView,
};

/// Hooks a host signing flow invokes for one transaction.
///
/// The host calls [`validate_and_review`](Self::validate_and_review) once,
/// then [`sign_input`](Self::sign_input) for every input in ascending order.
pub trait SigningExtension {
    /// Classifies the transaction and asks the reviewer to approve it.
    fn validate_and_review<H, R>(
        &mut self,
        host: &H,
        masks: &InternalMasks,
        reviewer: &mut R,
    ) -> Result<TransactionReview, Rejection>
    where
        H: TxView + ?Sized,
        R: Reviewer + ?Sized;

    /// Signs input `idx` with the protocol key if it is a protocol input.
    fn sign_input<H>(&mut self, host: &H, idx: usize) -> Result<Option<ProtocolSignature>, Rejection>
    where
        H: TxView + SighashProvider + ?Sized;
}

/// CoreDAO staking extension holding one transaction's session state.
#[derive(Debug)]
pub struct CoreDaoExtension<'k, K: ?Sized> {
    keys: &'k K,
    class: Option<TxClassification>,
}

impl<'k, K: DeviceKeys + ?Sized> CoreDaoExtension<'k, K> {
    pub fn new(keys: &'k K) -> Self {
        Self { keys, class: None }
    }

    /// The classification of the approved transaction, if any.
    pub fn classification(&self) -> Option<&TxClassification> {
        self.class.as_ref()
    }

    /// Scrubs the session state; the extension can be reused afterwards.
    pub fn finish(&mut self) {
        self.class.zeroize();
    }
}

impl<K: DeviceKeys + ?Sized> SigningExtension for CoreDaoExtension<'_, K> {
    fn validate_and_review<H, R>(
        &mut self,
        host: &H,
        masks: &InternalMasks,
        reviewer: &mut R,
    ) -> Result<TransactionReview, Rejection>
    where
        H: TxView + ?Sized,
        R: Reviewer + ?Sized,
    {
        self.finish();

        let engine = RedeemScriptEngine::new(self.keys)?;
        let class = validate_transaction(host, masks, &engine)?;
        if let Some(reason) = class.invalid_reason() {
            warn!(%reason, "transaction rejected");
            return Err(Rejection::IncorrectData);
        }

        let review = TransactionReview::new(&class, &host.totals())?;
        if !reviewer.approve(&review) {
            warn!("transaction denied on review");
            return Err(Rejection::UserDenied);
        }

        info!(operation = ?review.operation, "transaction approved");
        self.class = Some(class);
        Ok(review)
    }

    fn sign_input<H>(&mut self, host: &H, idx: usize) -> Result<Option<ProtocolSignature>, Rejection>
    where
        H: TxView + SighashProvider + ?Sized,
    {
        let class = self.class.as_ref().ok_or(Rejection::IncorrectData)?;
        match sign_input(host, self.keys, class, idx) {
            Ok(sig) => Ok(sig),
            Err(e) => {
                warn!(input = %idx, err = %e, "signing aborted");
                self.finish();
                Err(e.into())
            }
        }
    }
}

impl<K: ?Sized> Drop for CoreDaoExtension<'_, K> {
    fn drop(&mut self) {
        self.class.zeroize();
    }
}
