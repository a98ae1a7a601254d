use anchor_lang::prelude::*;

use crate::authorization::DecisionRejection;
use crate::codec::CodecError;

#[error_code]
pub enum BountyError {
    #[msg("Invalid amount or configuration")]
    ValidationError,
    #[msg("Amount is below the current entry price")]
    InsufficientFunds,
    #[msg("Operation not allowed in the current bounty state")]
    WrongState,
    #[msg("Math overflow")]
    ArithmeticOverflow,

    // -----------------
    // Decision checks
    // -----------------
    #[msg("Decision signature is invalid for the bounty authority")]
    InvalidSignature,
    #[msg("Decision bytes do not match what was signed")]
    Tampered,
    #[msg("Decision is outside the freshness window")]
    Expired,
    #[msg("Decision nonce already consumed")]
    Replayed,
    #[msg("Decision verdict is not a win")]
    NotAWin,
    #[msg("Unauthorized")]
    Unauthorized,

    #[msg("Malformed decision record")]
    MalformedDecision,
    #[msg("Missing or invalid ed25519 verify instruction")]
    MissingOrInvalidEd25519Ix,
    #[msg("Used nonce PDA mismatch")]
    UsedNoncePdaMismatch,
    #[msg("Failed to borrow account data")]
    AccountBorrowFailed,

    // -----------------
    // Ledger
    // -----------------
    #[msg("Invalid revenue split")]
    InvalidSplit,
    #[msg("Split beneficiary account does not match configuration")]
    SplitAccountMismatch,
    #[msg("Rollover timeout has not elapsed")]
    RolloverTooEarly,
    #[msg("Bounty paused")]
    Paused,
    #[msg("Floor reserve cannot re-seed the pool")]
    ReserveUnderfunded,
    #[msg("Pool balance below floor")]
    FloorInvariantViolated,

    // -----------------
    // Emergency recovery
    // -----------------
    #[msg("Emergency recovery cooldown is still active")]
    RecoveryCooldownActive,
    #[msg("Emergency recovery amount exceeds maximum allowed")]
    RecoveryAmountExceedsLimit,
}

impl From<DecisionRejection> for BountyError {
    fn from(r: DecisionRejection) -> Self {
        match r {
            DecisionRejection::Tampered => BountyError::Tampered,
            DecisionRejection::InvalidSignature => BountyError::InvalidSignature,
            DecisionRejection::Expired => BountyError::Expired,
            DecisionRejection::Replayed => BountyError::Replayed,
            DecisionRejection::NotAWin => BountyError::NotAWin,
            DecisionRejection::Unauthorized => BountyError::Unauthorized,
        }
    }
}

impl From<CodecError> for BountyError {
    fn from(_: CodecError) -> Self {
        BountyError::MalformedDecision
    }
}
