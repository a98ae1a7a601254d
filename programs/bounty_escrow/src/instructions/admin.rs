use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::constants::*;
use crate::errors::BountyError;
use crate::events::{
    BountyInitialized, DecisionAuthorityRotated, EmergencyRecovered, PauseToggled, ReserveFunded,
};
use crate::split::{validate_split, SplitShare};
use crate::state::BountyState;
use crate::utils::check_beneficiary_account;
use crate::{EmergencyRecovery, FundReserve, InitializeBounty, SetDecisionAuthority, SetPaused};

/// Per-bounty configuration, fixed at `initialize_bounty`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct BountyParams {
    pub base_price: u64,
    pub escalation_rate_bps: u16,
    pub price_cap: u64,
    pub floor_amount: u64,
    pub timeout_duration: i64,
    pub freshness_window: i64,
    pub decision_authority: Pubkey,
    /// Share of every entry that stays in the pool.
    pub pool_share_bps: u16,
    /// Remaining shares; destinations are token accounts of the bounty mint.
    pub beneficiaries: Vec<SplitShare>,
    /// Initial deposit into the floor reserve.
    pub reserve_amount: u64,
}

impl BountyParams {
    pub fn validate(&self) -> Result<()> {
        require!(self.base_price > 0, BountyError::ValidationError);
        require!(self.price_cap >= self.base_price, BountyError::ValidationError);
        require!(self.floor_amount > 0, BountyError::ValidationError);
        require!(self.timeout_duration > 0, BountyError::ValidationError);
        require!(
            self.freshness_window > 0 && self.freshness_window <= MAX_FRESHNESS_WINDOW,
            BountyError::ValidationError
        );
        require!(
            self.escalation_rate_bps as u64 <= BPS_DENOMINATOR,
            BountyError::ValidationError
        );
        require!(
            self.decision_authority != Pubkey::default(),
            BountyError::ValidationError
        );
        Ok(())
    }

    /// The full split with the pool vault as primary destination.
    pub fn shares(&self, pool_vault: Pubkey) -> Result<Vec<SplitShare>> {
        let mut shares = Vec::with_capacity(self.beneficiaries.len() + 1);
        shares.push(SplitShare {
            destination: pool_vault,
            bps: self.pool_share_bps,
        });
        shares.extend_from_slice(&self.beneficiaries);
        validate_split(&shares)?;
        Ok(shares)
    }
}

// remaining_accounts: beneficiary token accounts, in `params.beneficiaries` order
pub fn initialize_bounty<'info>(
    ctx: Context<'_, '_, 'info, 'info, InitializeBounty<'info>>,
    bounty_id: u64,
    params: BountyParams,
) -> Result<()> {
    params.validate()?;
    let shares = params.shares(ctx.accounts.pool_vault.key())?;

    let mint = ctx.accounts.mint.key();
    require!(
        ctx.remaining_accounts.len() == params.beneficiaries.len(),
        BountyError::SplitAccountMismatch
    );
    for (ai, share) in ctx.remaining_accounts.iter().zip(params.beneficiaries.iter()) {
        check_beneficiary_account(ai, share, &mint)?;
    }

    let now = Clock::get()?.unix_timestamp;
    let admin = ctx.accounts.admin.key();

    let b = &mut ctx.accounts.bounty;
    b.bounty_id = bounty_id;
    b.base_price = params.base_price;
    b.pool_balance = params.floor_amount;
    b.entry_count = 0;
    b.state = BountyState::Active as u8;
    b.created_at = now;
    b.bump = ctx.bumps.bounty;
    b.admin = admin;
    b.mint = mint;
    b.pool_vault = ctx.accounts.pool_vault.key();
    b.pool_vault_bump = ctx.bumps.pool_vault;
    b.floor_reserve = ctx.accounts.floor_reserve.key();
    b.floor_reserve_bump = ctx.bumps.floor_reserve;
    b.escalation_rate_bps = params.escalation_rate_bps;
    b.price_cap = params.price_cap;
    b.floor_amount = params.floor_amount;
    b.last_entry_at = now;
    b.timeout_duration = params.timeout_duration;
    b.freshness_window = params.freshness_window;
    b.decision_authority = params.decision_authority;
    b.paused = false;
    b.epoch = 0;
    b.payout_count = 0;
    b.total_paid_out = 0;
    b.last_recovery_at = 0;
    b.version = INITIAL_VERSION;
    b.shares = shares;

    // the pool starts at the floor
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.admin_token.to_account_info(),
                to: ctx.accounts.pool_vault.to_account_info(),
                authority: ctx.accounts.admin.to_account_info(),
            },
        ),
        params.floor_amount,
    )?;

    if params.reserve_amount > 0 {
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.admin_token.to_account_info(),
                    to: ctx.accounts.floor_reserve.to_account_info(),
                    authority: ctx.accounts.admin.to_account_info(),
                },
            ),
            params.reserve_amount,
        )?;
    }

    emit!(BountyInitialized {
        bounty_id,
        bounty: ctx.accounts.bounty.key(),
        admin,
        mint,
        decision_authority: params.decision_authority,
        base_price: params.base_price,
        floor_amount: params.floor_amount,
        timestamp: now,
    });

    Ok(())
}

/// Anyone may top up the floor reserve.
pub fn fund_reserve(ctx: Context<FundReserve>, bounty_id: u64, amount: u64) -> Result<()> {
    require!(amount > 0, BountyError::ValidationError);

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.funder_token.to_account_info(),
                to: ctx.accounts.floor_reserve.to_account_info(),
                authority: ctx.accounts.funder.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(ReserveFunded {
        bounty_id,
        funder: ctx.accounts.funder.key(),
        amount,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn set_decision_authority(
    ctx: Context<SetDecisionAuthority>,
    bounty_id: u64,
    authority: Pubkey,
) -> Result<()> {
    let b = &mut ctx.accounts.bounty;
    require_keys_eq!(b.admin, ctx.accounts.admin.key(), BountyError::Unauthorized);
    require!(authority != Pubkey::default(), BountyError::ValidationError);

    let old_authority = b.decision_authority;
    b.decision_authority = authority;

    emit!(DecisionAuthorityRotated {
        bounty_id,
        old_authority,
        new_authority: authority,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

/// Pauses `enter` only; payouts and rollovers stay available.
pub fn set_paused(ctx: Context<SetPaused>, bounty_id: u64, paused: bool) -> Result<()> {
    let b = &mut ctx.accounts.bounty;
    require_keys_eq!(b.admin, ctx.accounts.admin.key(), BountyError::Unauthorized);

    b.paused = paused;

    emit!(PauseToggled {
        bounty_id,
        paused,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn emergency_recovery(ctx: Context<EmergencyRecovery>, bounty_id: u64, amount: u64) -> Result<()> {
    let admin = ctx.accounts.admin.key();
    require_keys_eq!(ctx.accounts.bounty.admin, admin, BountyError::Unauthorized);
    require!(
        ctx.accounts.pool_vault.amount >= amount,
        BountyError::InsufficientFunds
    );

    let now = Clock::get()?.unix_timestamp;
    ctx.accounts.bounty.apply_recovery(amount, now)?;

    let id_le = bounty_id.to_le_bytes();
    let signer_seeds: &[&[&[u8]]] = &[&[BOUNTY_SEED, &id_le, &[ctx.accounts.bounty.bump]]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.pool_vault.to_account_info(),
                to: ctx.accounts.admin_token.to_account_info(),
                authority: ctx.accounts.bounty.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )?;

    msg!("emergency recovery: {} moved out of bounty {}", amount, bounty_id);
    emit!(EmergencyRecovered {
        bounty_id,
        admin,
        amount,
        pool_balance: ctx.accounts.bounty.pool_balance,
        timestamp: now,
    });

    Ok(())
}
