use anchor_lang::prelude::*;

pub mod authorization;
pub mod codec;
pub mod constants;
pub mod contexts;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod pricing;
pub mod split;
pub mod state;
pub mod utils;

pub use constants::*;
pub use contexts::*;
pub use errors::*;
pub use instructions::*;
pub use split::SplitShare;
pub use state::*;

declare_id!("F2FKxtSy6cppBFfMXmf4xkLpBTpqkuetj6kRVsta2Qhs");

#[program]
pub mod bounty_escrow {
    use super::*;
    use crate::instructions::{admin, entry, payout, rollover};

    // remaining_accounts: beneficiary token accounts, in `params.beneficiaries` order
    pub fn initialize_bounty<'info>(
        ctx: Context<'_, '_, 'info, 'info, InitializeBounty<'info>>,
        bounty_id: u64,
        params: BountyParams,
    ) -> Result<()> {
        admin::initialize_bounty(ctx, bounty_id, params)
    }

    // remaining_accounts: beneficiary token accounts, in split order
    pub fn enter<'info>(
        ctx: Context<'_, '_, 'info, 'info, Enter<'info>>,
        bounty_id: u64,
        amount: u64,
    ) -> Result<()> {
        entry::enter(ctx, bounty_id, amount)
    }

    pub fn claim_rollover(ctx: Context<ClaimRollover>, bounty_id: u64) -> Result<()> {
        rollover::claim_rollover(ctx, bounty_id)
    }

    // must be preceded by the ed25519 verify instruction for the decision digest
    pub fn execute_payout(
        ctx: Context<ExecutePayout>,
        bounty_id: u64,
        signature: [u8; 64],
        decision: Vec<u8>,
        nonce: u128,
    ) -> Result<()> {
        payout::execute_payout(ctx, bounty_id, signature, decision, nonce)
    }

    // ----------------------------
    // Operator controls
    // ----------------------------
    pub fn fund_reserve(ctx: Context<FundReserve>, bounty_id: u64, amount: u64) -> Result<()> {
        admin::fund_reserve(ctx, bounty_id, amount)
    }

    pub fn set_decision_authority(
        ctx: Context<SetDecisionAuthority>,
        bounty_id: u64,
        authority: Pubkey,
    ) -> Result<()> {
        admin::set_decision_authority(ctx, bounty_id, authority)
    }

    pub fn set_paused(ctx: Context<SetPaused>, bounty_id: u64, paused: bool) -> Result<()> {
        admin::set_paused(ctx, bounty_id, paused)
    }

    pub fn emergency_recovery(
        ctx: Context<EmergencyRecovery>,
        bounty_id: u64,
        amount: u64,
    ) -> Result<()> {
        admin::emergency_recovery(ctx, bounty_id, amount)
    }
}
