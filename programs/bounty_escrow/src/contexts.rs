// programs/bounty_escrow/src/contexts.rs

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::state::{Bounty, Payout};

#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct InitializeBounty<'info> {
    #[account(
        init,
        payer = admin,
        space = 8 + Bounty::INIT_SPACE,
        seeds = [crate::BOUNTY_SEED, bounty_id.to_le_bytes().as_ref()],
        bump
    )]
    pub bounty: Account<'info, Bounty>,

    pub mint: Account<'info, Mint>,

    #[account(
        init,
        payer = admin,
        token::mint = mint,
        token::authority = bounty,
        seeds = [crate::POOL_VAULT_SEED, bounty.key().as_ref()],
        bump
    )]
    pub pool_vault: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = admin,
        token::mint = mint,
        token::authority = bounty,
        seeds = [crate::FLOOR_RESERVE_SEED, bounty.key().as_ref()],
        bump
    )]
    pub floor_reserve: Account<'info, TokenAccount>,

    /// Source of the initial floor and reserve deposits.
    #[account(
        mut,
        token::mint = mint,
        token::authority = admin
    )]
    pub admin_token: Account<'info, TokenAccount>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

// remaining_accounts: beneficiary token accounts, in split order (shares[1..])
#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct Enter<'info> {
    #[account(
        mut,
        seeds = [crate::BOUNTY_SEED, bounty_id.to_le_bytes().as_ref()],
        bump = bounty.bump
    )]
    pub bounty: Account<'info, Bounty>,

    #[account(mut, address = bounty.pool_vault)]
    pub pool_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        token::mint = bounty.mint,
        token::authority = payer
    )]
    pub payer_token: Account<'info, TokenAccount>,

    pub payer: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct ClaimRollover<'info> {
    #[account(
        mut,
        seeds = [crate::BOUNTY_SEED, bounty_id.to_le_bytes().as_ref()],
        bump = bounty.bump
    )]
    pub bounty: Account<'info, Bounty>,

    pub caller: Signer<'info>,
}

#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct ExecutePayout<'info> {
    #[account(
        mut,
        seeds = [crate::BOUNTY_SEED, bounty_id.to_le_bytes().as_ref()],
        bump = bounty.bump
    )]
    pub bounty: Account<'info, Bounty>,

    #[account(mut, address = bounty.pool_vault)]
    pub pool_vault: Account<'info, TokenAccount>,

    #[account(mut, address = bounty.floor_reserve)]
    pub floor_reserve: Account<'info, TokenAccount>,

    /// CHECK: compared against the winner named in the signed decision.
    pub winner: UncheckedAccount<'info>,

    #[account(
        mut,
        token::mint = bounty.mint,
        token::authority = winner
    )]
    pub winner_token: Account<'info, TokenAccount>,

    /// CHECK: UsedNonce PDA, created by the handler. Address checked against the decision nonce.
    #[account(mut)]
    pub used_nonce: UncheckedAccount<'info>,

    #[account(
        init,
        payer = payer,
        space = 8 + Payout::INIT_SPACE,
        seeds = [
            crate::PAYOUT_SEED,
            bounty.key().as_ref(),
            bounty.payout_count.to_le_bytes().as_ref()
        ],
        bump
    )]
    pub payout: Account<'info, Payout>,

    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: instruction sysvar (for ed25519 introspection). Address enforced.
    #[account(address = anchor_lang::solana_program::sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct FundReserve<'info> {
    #[account(
        seeds = [crate::BOUNTY_SEED, bounty_id.to_le_bytes().as_ref()],
        bump = bounty.bump
    )]
    pub bounty: Account<'info, Bounty>,

    #[account(mut, address = bounty.floor_reserve)]
    pub floor_reserve: Account<'info, TokenAccount>,

    #[account(
        mut,
        token::mint = bounty.mint,
        token::authority = funder
    )]
    pub funder_token: Account<'info, TokenAccount>,

    pub funder: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct SetDecisionAuthority<'info> {
    #[account(
        mut,
        seeds = [crate::BOUNTY_SEED, bounty_id.to_le_bytes().as_ref()],
        bump = bounty.bump
    )]
    pub bounty: Account<'info, Bounty>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct SetPaused<'info> {
    #[account(
        mut,
        seeds = [crate::BOUNTY_SEED, bounty_id.to_le_bytes().as_ref()],
        bump = bounty.bump
    )]
    pub bounty: Account<'info, Bounty>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
#[instruction(bounty_id: u64)]
pub struct EmergencyRecovery<'info> {
    #[account(
        mut,
        seeds = [crate::BOUNTY_SEED, bounty_id.to_le_bytes().as_ref()],
        bump = bounty.bump
    )]
    pub bounty: Account<'info, Bounty>,

    #[account(mut, address = bounty.pool_vault)]
    pub pool_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        token::mint = bounty.mint,
        token::authority = admin
    )]
    pub admin_token: Account<'info, TokenAccount>,

    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
}
