//! Classification and signing gate for CoreDAO staking transactions.
//!
//! A candidate transaction is scanned input-first, then output-first, into a
//! [`TxClassification`]. The classification decides what the user reviews
//! and which inputs receive a signature from the protocol key.

mod classification;
mod errors;
mod host;
mod inputs;
mod outputs;
mod psbt;
mod review;
mod session;
mod signing;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
mod validator;

pub use classification::TxClassification;
pub use errors::{HostError, InvalidReason, Rejection, SignError};
#[cfg(any(test, feature = "test-utils"))]
pub use host::{MockSighashProvider, MockTxView};
pub use host::{InternalMasks, SighashProvider, TxTotals, TxView};
pub use inputs::LockedPrevout;
pub use psbt::{PsbtHost, PsbtSigner, SignOutcome};
#[cfg(any(test, feature = "test-utils"))]
pub use review::MockReviewer;
pub use review::{Operation, Reviewer, StakeSummary, TransactionReview};
pub use session::{CoreDaoExtension, SigningExtension};
pub use signing::{sign_all, sign_input, ProtocolSignature, PROTOCOL_SIGHASH_TYPE};
pub use validator::validate_transaction;
