use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::errors::BountyError;
use crate::events::EntryAccepted;
use crate::utils::check_beneficiary_account;
use crate::Enter;

// remaining_accounts: beneficiary token accounts, in split order (shares[1..])
pub fn enter<'info>(
    ctx: Context<'_, '_, 'info, 'info, Enter<'info>>,
    bounty_id: u64,
    amount: u64,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let quote = ctx.accounts.bounty.quote_entry(amount, now)?;

    let shares = ctx.accounts.bounty.shares.clone();
    let mint = ctx.accounts.bounty.mint;
    require!(
        ctx.remaining_accounts.len() + 1 == shares.len(),
        BountyError::SplitAccountMismatch
    );

    let pool_amount = quote.pool_amount();
    if pool_amount > 0 {
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.payer_token.to_account_info(),
                    to: ctx.accounts.pool_vault.to_account_info(),
                    authority: ctx.accounts.payer.to_account_info(),
                },
            ),
            pool_amount,
        )?;
    }

    for ((ai, share), part) in ctx
        .remaining_accounts
        .iter()
        .zip(shares.iter().skip(1))
        .zip(quote.amounts.iter().skip(1))
    {
        check_beneficiary_account(ai, share, &mint)?;
        if *part == 0 {
            continue;
        }
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.payer_token.to_account_info(),
                    to: ai.clone(),
                    authority: ctx.accounts.payer.to_account_info(),
                },
            ),
            *part,
        )?;
    }

    let b = &mut ctx.accounts.bounty;
    b.apply_entry(&quote, now)?;

    emit!(EntryAccepted {
        bounty_id,
        payer: ctx.accounts.payer.key(),
        amount,
        price: quote.price,
        pool_amount,
        entry_count: b.entry_count,
        pool_balance: b.pool_balance,
        epoch: b.epoch,
        timestamp: now,
    });

    Ok(())
}
