use anchor_lang::prelude::*;

use crate::errors::BountyError;
use crate::split::SplitShare;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BountyState {
    Active = 0,
    /// Never stored: an `Active` bounty whose timeout elapsed.
    Expired = 1,
    RolledOver = 2,
    Paying = 3,
}

impl TryFrom<u8> for BountyState {
    type Error = anchor_lang::error::Error;

    fn try_from(v: u8) -> Result<Self> {
        match v {
            0 => Ok(Self::Active),
            1 => Ok(Self::Expired),
            2 => Ok(Self::RolledOver),
            3 => Ok(Self::Paying),
            _ => err!(BountyError::WrongState),
        }
    }
}

#[account]
#[derive(InitSpace)]
pub struct Bounty {
    // Same field order as the legacy account, not the same offsets
    // (`entry_count` is narrower than `total_entries` was).
    pub bounty_id: u64,
    pub base_price: u64,
    pub pool_balance: u64,
    pub entry_count: u32,
    pub state: u8,
    pub created_at: i64,

    pub bump: u8,
    pub admin: Pubkey,
    pub mint: Pubkey,

    // SPL token account PDAs, authority = this bounty
    pub pool_vault: Pubkey,
    pub pool_vault_bump: u8,
    pub floor_reserve: Pubkey,
    pub floor_reserve_bump: u8,

    pub escalation_rate_bps: u16,
    pub price_cap: u64,
    pub floor_amount: u64,

    pub last_entry_at: i64,
    pub timeout_duration: i64,
    pub freshness_window: i64,

    /// ed25519 key whose signed decisions may release the pool.
    pub decision_authority: Pubkey,
    pub paused: bool,

    pub epoch: u64,
    pub payout_count: u64,
    pub total_paid_out: u64,
    pub last_recovery_at: i64,

    pub version: u16,

    /// `shares[0]` is the pool share; its destination is `pool_vault`.
    #[max_len(8)]
    pub shares: Vec<SplitShare>,
}

/// Existence of this account marks `nonce` as consumed for `bounty`.
#[account]
#[derive(InitSpace)]
pub struct UsedNonce {
    pub bounty: Pubkey,
    pub nonce: u128,
    pub decision_digest: [u8; 32],
    pub consumed_at: i64,
    pub bump: u8,
}

/// One per released pool.
#[account]
#[derive(InitSpace)]
pub struct Payout {
    pub bounty_id: u64,
    pub bounty: Pubkey,
    pub epoch: u64,
    pub winner: Pubkey,
    pub amount: u64,
    pub decision_digest: [u8; 32],
    pub nonce: u128,
    pub paid_at: i64,
    pub slot: u64,
    pub bump: u8,
}
