//! Off-chain side of the bounty escrow: signs win decisions for the
//! program's `execute_payout` and pre-checks them with the same rules the
//! program applies.

pub mod audit;
pub mod cli;
pub mod config;
pub mod decision;
pub mod error;
pub mod nonce_ledger;
pub mod service;
pub mod signer;
pub mod verifier;

pub use bounty_escrow::authorization::DecisionRejection;
pub use bounty_escrow::codec::DecisionRecord;
pub use config::{AuthorityConfig, AuthoritySettings};
pub use decision::{DecisionEnvelope, PayoutArgs, SignedDecision};
pub use error::{AuthorityError, Result};
pub use nonce_ledger::{FileNonceLedger, NonceLedger};
pub use service::{AuthorityService, DecisionRequest};
pub use signer::DecisionSigner;
pub use verifier::{DecisionVerifier, Verification};
