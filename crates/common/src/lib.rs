//! Process-level plumbing shared by the CoreDAO signer binaries.

pub mod logging;
