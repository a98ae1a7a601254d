//! Events emitted by the bounty escrow program.
//!
//! Indexers join these with the transaction signature to build the public
//! history of entries and payouts.

use anchor_lang::prelude::*;

#[event]
pub struct BountyInitialized {
    pub bounty_id: u64,
    pub bounty: Pubkey,
    pub admin: Pubkey,
    pub mint: Pubkey,
    pub decision_authority: Pubkey,
    pub base_price: u64,
    pub floor_amount: u64,
    pub timestamp: i64,
}

/// Emitted for every accepted entry payment
#[event]
pub struct EntryAccepted {
    pub bounty_id: u64,
    pub payer: Pubkey,
    pub amount: u64,
    pub price: u64,
    pub pool_amount: u64,
    pub entry_count: u32,
    pub pool_balance: u64,
    pub epoch: u64,
    pub timestamp: i64,
}

#[event]
pub struct RolloverClaimed {
    pub bounty_id: u64,
    pub caller: Pubkey,
    pub new_epoch: u64,
    pub pool_balance: u64,
    pub timestamp: i64,
}

/// Emitted when a signed win decision released the pool
#[event]
pub struct PayoutExecuted {
    pub bounty_id: u64,
    pub winner: Pubkey,
    pub amount: u64,
    pub payout_index: u64,
    pub epoch: u64,
    pub decision_digest: [u8; 32],
    pub nonce: u128,
    pub slot: u64,
    pub timestamp: i64,
}

#[event]
pub struct ReserveFunded {
    pub bounty_id: u64,
    pub funder: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct DecisionAuthorityRotated {
    pub bounty_id: u64,
    pub old_authority: Pubkey,
    pub new_authority: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct PauseToggled {
    pub bounty_id: u64,
    pub paused: bool,
    pub timestamp: i64,
}

#[event]
pub struct EmergencyRecovered {
    pub bounty_id: u64,
    pub admin: Pubkey,
    pub amount: u64,
    pub pool_balance: u64,
    pub timestamp: i64,
}
