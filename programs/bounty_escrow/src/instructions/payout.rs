use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::authorization::DecisionEvidence;
use crate::codec::DecisionRecord;
use crate::constants::{BOUNTY_SEED, USED_NONCE_SEED};
use crate::errors::BountyError;
use crate::events::PayoutExecuted;
use crate::state::{BountyState, UsedNonce};
use crate::utils::{
    create_pda_account, load_preceding_ed25519_ix, nonce_account_consumed, write_account,
};
use crate::ExecutePayout;

// Tx layout must be: [ ed25519_verify(authority, digest(decision)), execute_payout ]
pub fn execute_payout(
    ctx: Context<ExecutePayout>,
    bounty_id: u64,
    signature: [u8; 64],
    decision: Vec<u8>,
    nonce: u128,
) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let bounty_key = ctx.accounts.bounty.key();

    require!(
        ctx.accounts.bounty.stored_state()? == BountyState::Active,
        BountyError::WrongState
    );

    let record = DecisionRecord::decode(&decision).map_err(|e| {
        msg!("decision rejected: {}", e);
        error!(BountyError::from(e))
    })?;
    // the nonce argument only exists to derive the UsedNonce address
    require!(record.nonce == nonce, BountyError::Tampered);

    let verified = load_preceding_ed25519_ix(&ctx.accounts.instructions.to_account_info())?;

    // --- nonce ledger ---
    let nonce_le = nonce.to_le_bytes();
    let (expected_pda, nonce_bump) = Pubkey::find_program_address(
        &[USED_NONCE_SEED, bounty_key.as_ref(), &nonce_le],
        ctx.program_id,
    );
    let used_nonce_ai = ctx.accounts.used_nonce.to_account_info();
    require_keys_eq!(expected_pda, *used_nonce_ai.key, BountyError::UsedNoncePdaMismatch);
    let nonce_consumed = nonce_account_consumed(used_nonce_ai.owner, used_nonce_ai.data_is_empty());

    // --- decision checks ---
    let bounty = &ctx.accounts.bounty;
    let signature_valid =
        verified.pubkey == bounty.decision_authority && verified.signature == signature;

    let evidence = DecisionEvidence {
        record: &record,
        signed_message: &verified.message,
        signature_valid,
        nonce_consumed,
    };
    bounty.check_payout_decision(&bounty_key, &ctx.accounts.winner.key(), &evidence, now)?;

    // --- funds ---
    require!(
        ctx.accounts.pool_vault.amount >= bounty.pool_balance,
        BountyError::InsufficientFunds
    );
    require!(
        ctx.accounts.floor_reserve.amount >= bounty.floor_amount,
        BountyError::ReserveUnderfunded
    );

    let digest = record
        .digest()
        .map_err(|e| error!(BountyError::from(e)))?;
    let floor_amount = bounty.floor_amount;
    let payout_index = bounty.payout_count;
    let bump = bounty.bump;

    let amount = ctx.accounts.bounty.begin_payout()?;

    // consume the nonce; a concurrent payout with the same nonce fails here
    let used_nonce_seeds: &[&[u8]] = &[USED_NONCE_SEED, bounty_key.as_ref(), &nonce_le, &[nonce_bump]];
    create_pda_account(
        &ctx.accounts.payer.to_account_info(),
        &used_nonce_ai,
        &ctx.accounts.system_program.to_account_info(),
        ctx.program_id,
        8 + UsedNonce::INIT_SPACE,
        used_nonce_seeds,
    )?;
    write_account(
        &used_nonce_ai,
        &UsedNonce {
            bounty: bounty_key,
            nonce,
            decision_digest: digest,
            consumed_at: now,
            bump: nonce_bump,
        },
    )?;

    let id_le = bounty_id.to_le_bytes();
    let signer_seeds: &[&[&[u8]]] = &[&[BOUNTY_SEED, &id_le, &[bump]]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.pool_vault.to_account_info(),
                to: ctx.accounts.winner_token.to_account_info(),
                authority: ctx.accounts.bounty.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )?;

    // re-seed the pool from the reserve
    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.floor_reserve.to_account_info(),
                to: ctx.accounts.pool_vault.to_account_info(),
                authority: ctx.accounts.bounty.to_account_info(),
            },
            signer_seeds,
        ),
        floor_amount,
    )?;

    let b = &mut ctx.accounts.bounty;
    let paid_epoch = b.epoch;
    b.complete_payout(amount, now)?;

    let p = &mut ctx.accounts.payout;
    p.bounty_id = bounty_id;
    p.bounty = bounty_key;
    p.epoch = paid_epoch;
    p.winner = record.winner;
    p.amount = amount;
    p.decision_digest = digest;
    p.nonce = nonce;
    p.paid_at = now;
    p.slot = clock.slot;
    p.bump = ctx.bumps.payout;

    msg!("payout {} of bounty {}: {} to {}", payout_index, bounty_id, amount, record.winner);
    emit!(PayoutExecuted {
        bounty_id,
        winner: record.winner,
        amount,
        payout_index,
        epoch: paid_epoch,
        decision_digest: digest,
        nonce,
        slot: clock.slot,
        timestamp: now,
    });

    Ok(())
}
