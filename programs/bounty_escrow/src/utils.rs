use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked,
};
use anchor_lang::solana_program::{program::invoke_signed, system_instruction};

use anchor_spl::token::TokenAccount;

use crate::errors::BountyError;
use crate::split::SplitShare;

// Ed25519SigVerify111111111111111111111111111
pub fn ed25519_program_id() -> Pubkey {
    Pubkey::new_from_array([
        3, 125, 70, 214, 124, 147, 251, 190, 18, 249, 66, 143, 131, 141, 64, 255,
        5, 112, 116, 73, 39, 244, 138, 100, 252, 202, 112, 68, 128, 0, 0, 0,
    ])
}

/// Byte layout of a single-signature ed25519 precompile instruction.
pub const ED25519_HEADER_LEN: usize = 16;
pub const ED25519_PUBKEY_LEN: usize = 32;
pub const ED25519_SIGNATURE_LEN: usize = 64;

/// What the precompile verified: `signature` by `pubkey` over `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ed25519Verification {
    pub pubkey: Pubkey,
    pub signature: [u8; 64],
    pub message: Vec<u8>,
}

pub fn parse_ed25519_ix(ix: &Instruction) -> Result<Ed25519Verification> {
    require!(
        ix.program_id == ed25519_program_id(),
        BountyError::MissingOrInvalidEd25519Ix
    );

    let data = &ix.data;
    require!(data.len() >= ED25519_HEADER_LEN, BountyError::MissingOrInvalidEd25519Ix);

    let num_sigs = data[0];
    require!(num_sigs == 1, BountyError::MissingOrInvalidEd25519Ix);

    // Only "self-contained" offsets (instruction_index == u16::MAX); anything
    // else would let the verified bytes live in another instruction.
    let sig_ix = u16::from_le_bytes([data[4], data[5]]);
    let pk_ix = u16::from_le_bytes([data[8], data[9]]);
    let msg_ix = u16::from_le_bytes([data[14], data[15]]);
    require!(sig_ix == u16::MAX, BountyError::MissingOrInvalidEd25519Ix);
    require!(pk_ix == u16::MAX, BountyError::MissingOrInvalidEd25519Ix);
    require!(msg_ix == u16::MAX, BountyError::MissingOrInvalidEd25519Ix);

    let sig_off = u16::from_le_bytes([data[2], data[3]]) as usize;
    let pk_off = u16::from_le_bytes([data[6], data[7]]) as usize;
    let msg_off = u16::from_le_bytes([data[10], data[11]]) as usize;
    let msg_sz = u16::from_le_bytes([data[12], data[13]]) as usize;

    require!(
        sig_off + ED25519_SIGNATURE_LEN <= data.len(),
        BountyError::MissingOrInvalidEd25519Ix
    );
    require!(
        pk_off + ED25519_PUBKEY_LEN <= data.len(),
        BountyError::MissingOrInvalidEd25519Ix
    );
    require!(msg_off + msg_sz <= data.len(), BountyError::MissingOrInvalidEd25519Ix);

    let pk_bytes: [u8; 32] = data[pk_off..pk_off + ED25519_PUBKEY_LEN]
        .try_into()
        .map_err(|_| error!(BountyError::MissingOrInvalidEd25519Ix))?;
    let signature: [u8; 64] = data[sig_off..sig_off + ED25519_SIGNATURE_LEN]
        .try_into()
        .map_err(|_| error!(BountyError::MissingOrInvalidEd25519Ix))?;

    Ok(Ed25519Verification {
        pubkey: Pubkey::new_from_array(pk_bytes),
        signature,
        message: data[msg_off..msg_off + msg_sz].to_vec(),
    })
}

// Tx layout must be: [ ed25519_verify, <current instruction> ]
pub fn load_preceding_ed25519_ix(ix_sysvar: &AccountInfo) -> Result<Ed25519Verification> {
    let current_ix = load_current_index_checked(ix_sysvar)? as usize;
    require!(current_ix >= 1, BountyError::MissingOrInvalidEd25519Ix);

    let ed_ix = load_instruction_at_checked(current_ix - 1, ix_sysvar)
        .map_err(|_| error!(BountyError::MissingOrInvalidEd25519Ix))?;

    parse_ed25519_ix(&ed_ix)
}

/// Creates a program-owned PDA the way `init` would, but lets the caller
/// decide what an already-existing account means.
///
/// A system account that merely holds lamports (someone pre-funded the
/// address) is still taken over: top up, allocate, assign.
pub fn create_pda_account<'info>(
    payer: &AccountInfo<'info>,
    target: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    program_id: &Pubkey,
    space: usize,
    signer_seeds: &[&[u8]],
) -> Result<()> {
    let rent = Rent::get()?.minimum_balance(space);
    let current = target.lamports();

    if current == 0 {
        let ix = system_instruction::create_account(
            payer.key,
            target.key,
            rent,
            space as u64,
            program_id,
        );
        invoke_signed(
            &ix,
            &[payer.clone(), target.clone(), system_program.clone()],
            &[signer_seeds],
        )?;
        return Ok(());
    }

    if current < rent {
        let ix = system_instruction::transfer(payer.key, target.key, rent - current);
        invoke_signed(
            &ix,
            &[payer.clone(), target.clone(), system_program.clone()],
            &[],
        )?;
    }
    invoke_signed(
        &system_instruction::allocate(target.key, space as u64),
        &[target.clone(), system_program.clone()],
        &[signer_seeds],
    )?;
    invoke_signed(
        &system_instruction::assign(target.key, program_id),
        &[target.clone(), system_program.clone()],
        &[signer_seeds],
    )?;
    Ok(())
}

/// Whether a `UsedNonce` address already records a consumed nonce.
///
/// Lamports alone do not count: a system-owned, data-less address is still
/// free and `create_pda_account` takes it over.
pub fn nonce_account_consumed(owner: &Pubkey, data_is_empty: bool) -> bool {
    *owner != system_program::ID || !data_is_empty
}

/// Serializes a freshly created Anchor account (discriminator included).
pub fn write_account<T: AccountSerialize>(target: &AccountInfo, value: &T) -> Result<()> {
    let mut data = target
        .try_borrow_mut_data()
        .map_err(|_| error!(BountyError::AccountBorrowFailed))?;
    let mut w = std::io::Cursor::new(&mut data[..]);
    value
        .try_serialize(&mut w)
        .map_err(|_| error!(BountyError::AccountBorrowFailed))?;
    Ok(())
}

/// A split destination passed as a remaining account: the configured
/// address, and a token account of the bounty mint.
pub fn check_beneficiary_account<'info>(
    ai: &'info AccountInfo<'info>,
    share: &SplitShare,
    mint: &Pubkey,
) -> Result<()> {
    require_keys_eq!(*ai.key, share.destination, BountyError::SplitAccountMismatch);
    let token_account = Account::<TokenAccount>::try_from(ai)?;
    require_keys_eq!(token_account.mint, *mint, BountyError::SplitAccountMismatch);
    Ok(())
}
