use anchor_lang::prelude::*;

use crate::events::RolloverClaimed;
use crate::ClaimRollover;

/// Permissionless: once the bounty has been quiet for `timeout_duration`,
/// anyone may start a new epoch. Price resets to `base_price`; the pool stays.
pub fn claim_rollover(ctx: Context<ClaimRollover>, bounty_id: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let b = &mut ctx.accounts.bounty;
    b.apply_rollover(now)?;

    emit!(RolloverClaimed {
        bounty_id,
        caller: ctx.accounts.caller.key(),
        new_epoch: b.epoch,
        pool_balance: b.pool_balance,
        timestamp: now,
    });

    Ok(())
}
