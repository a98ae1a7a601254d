//! State transitions of the `Bounty` account.
//!
//! Everything here is pure: handlers read `now` from the `Clock` sysvar,
//! call one of these, then move tokens. A transition that returns an error
//! leaves the account untouched.

use anchor_lang::prelude::*;

use crate::authorization::{authorize_payout, DecisionEvidence};
use crate::constants::{MAX_RECOVERY_PERCENT, RECOVERY_COOLDOWN};
use crate::errors::BountyError;
use crate::pricing::current_price;
use crate::split::split_amounts;
use crate::state::{Bounty, BountyState};

/// Accepted entry: the price charged and the per-share amounts, in split order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryQuote {
    pub price: u64,
    pub amounts: Vec<u64>,
}

impl EntryQuote {
    pub fn pool_amount(&self) -> u64 {
        self.amounts.first().copied().unwrap_or(0)
    }
}

impl Bounty {
    pub fn stored_state(&self) -> Result<BountyState> {
        BountyState::try_from(self.state)
    }

    pub fn is_timed_out(&self, now: i64) -> bool {
        now.saturating_sub(self.last_entry_at) >= self.timeout_duration
    }

    pub fn effective_state(&self, now: i64) -> Result<BountyState> {
        Ok(match self.stored_state()? {
            BountyState::Active if self.is_timed_out(now) => BountyState::Expired,
            s => s,
        })
    }

    pub fn current_price(&self) -> u64 {
        current_price(
            self.base_price,
            self.escalation_rate_bps,
            self.price_cap,
            self.entry_count,
        )
    }

    pub fn quote_entry(&self, amount: u64, now: i64) -> Result<EntryQuote> {
        require!(!self.paused, BountyError::Paused);
        require!(
            self.effective_state(now)? == BountyState::Active,
            BountyError::WrongState
        );
        require!(amount > 0, BountyError::ValidationError);

        let price = self.current_price();
        if amount < price {
            msg!(
                "price has increased, resend with at least {} (sent {})",
                price,
                amount
            );
            return err!(BountyError::InsufficientFunds);
        }

        // excess over the price goes through the split like the rest
        let amounts = split_amounts(amount, &self.shares)?;
        Ok(EntryQuote { price, amounts })
    }

    pub fn apply_entry(&mut self, quote: &EntryQuote, now: i64) -> Result<()> {
        let pool_balance = self
            .pool_balance
            .checked_add(quote.pool_amount())
            .ok_or(BountyError::ArithmeticOverflow)?;
        let entry_count = self
            .entry_count
            .checked_add(1)
            .ok_or(BountyError::ArithmeticOverflow)?;

        self.pool_balance = pool_balance;
        self.entry_count = entry_count;
        self.last_entry_at = now;
        Ok(())
    }

    /// Starts a new epoch once the bounty went quiet. The pool carries over.
    pub fn apply_rollover(&mut self, now: i64) -> Result<()> {
        match self.effective_state(now)? {
            BountyState::Expired => {}
            BountyState::Active => {
                msg!(
                    "rollover available at {}, now {}",
                    self.last_entry_at.saturating_add(self.timeout_duration),
                    now
                );
                return err!(BountyError::RolloverTooEarly);
            }
            _ => return err!(BountyError::WrongState),
        }
        require!(
            self.pool_balance >= self.floor_amount,
            BountyError::FloorInvariantViolated
        );
        let epoch = self
            .epoch
            .checked_add(1)
            .ok_or(BountyError::ArithmeticOverflow)?;

        // Expired -> RolledOver -> Active happens inside this one instruction,
        // so only the final state is ever stored.
        self.epoch = epoch;
        self.entry_count = 0;
        self.last_entry_at = now;
        self.state = BountyState::Active as u8;
        Ok(())
    }

    /// Decision checks of `execute_payout`, run before any account changes.
    pub fn check_payout_decision(
        &self,
        bounty_key: &Pubkey,
        winner: &Pubkey,
        evidence: &DecisionEvidence,
        now: i64,
    ) -> Result<()> {
        require!(
            self.stored_state()? == BountyState::Active,
            BountyError::WrongState
        );
        authorize_payout(evidence, bounty_key, winner, now, self.freshness_window).map_err(
            |rejection| {
                msg!("decision rejected: {}", rejection);
                error!(BountyError::from(rejection))
            },
        )
    }

    /// Locks the bounty for a payout and returns the amount to release.
    pub fn begin_payout(&mut self) -> Result<u64> {
        require!(
            self.stored_state()? == BountyState::Active,
            BountyError::WrongState
        );
        require!(
            self.pool_balance >= self.floor_amount,
            BountyError::FloorInvariantViolated
        );
        self.state = BountyState::Paying as u8;
        Ok(self.pool_balance)
    }

    /// Resets the ledger after `amount` left the pool and the floor was re-seeded.
    pub fn complete_payout(&mut self, amount: u64, now: i64) -> Result<()> {
        require!(
            self.stored_state()? == BountyState::Paying,
            BountyError::WrongState
        );
        let epoch = self
            .epoch
            .checked_add(1)
            .ok_or(BountyError::ArithmeticOverflow)?;
        let payout_count = self
            .payout_count
            .checked_add(1)
            .ok_or(BountyError::ArithmeticOverflow)?;
        let total_paid_out = self
            .total_paid_out
            .checked_add(amount)
            .ok_or(BountyError::ArithmeticOverflow)?;

        self.pool_balance = self.floor_amount;
        self.entry_count = 0;
        self.last_entry_at = now;
        self.epoch = epoch;
        self.payout_count = payout_count;
        self.total_paid_out = total_paid_out;
        self.state = BountyState::Active as u8;
        Ok(())
    }

    /// Largest amount `emergency_recovery` may take right now.
    pub fn max_recovery(&self) -> u64 {
        let above_floor = self.pool_balance.saturating_sub(self.floor_amount);
        // 10% of a u64 fits in a u64
        (above_floor as u128 * MAX_RECOVERY_PERCENT as u128 / 100) as u64
    }

    pub fn apply_recovery(&mut self, amount: u64, now: i64) -> Result<()> {
        require!(
            self.stored_state()? == BountyState::Active,
            BountyError::WrongState
        );
        require!(amount > 0, BountyError::ValidationError);
        if self.last_recovery_at != 0 {
            require!(
                now.saturating_sub(self.last_recovery_at) >= RECOVERY_COOLDOWN,
                BountyError::RecoveryCooldownActive
            );
        }
        require!(
            amount <= self.max_recovery(),
            BountyError::RecoveryAmountExceedsLimit
        );

        let pool_balance = self
            .pool_balance
            .checked_sub(amount)
            .ok_or(BountyError::ArithmeticOverflow)?;
        require!(
            pool_balance >= self.floor_amount,
            BountyError::FloorInvariantViolated
        );

        self.pool_balance = pool_balance;
        self.last_recovery_at = now;
        Ok(())
    }
}
