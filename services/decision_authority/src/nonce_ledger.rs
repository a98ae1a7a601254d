//! Consumed-nonce bookkeeping for the advisory verifier.
//!
//! The on-chain `UsedNonce` accounts are authoritative. This ledger lets the
//! service refuse a replay before anyone pays for a transaction, and it must
//! survive restarts, so the only non-test implementation is an append-only
//! file that is fsynced on every mark and replayed on open.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::str::FromStr;

use anchor_lang::prelude::Pubkey;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AuthorityError, Result};

pub trait NonceLedger {
    fn is_consumed(&self, bounty: &Pubkey, nonce: u128) -> bool;

    /// Durably records the nonce. Returns only after the mark would
    /// survive a crash.
    fn mark_consumed(
        &mut self,
        bounty: &Pubkey,
        nonce: u128,
        digest: &[u8; 32],
        consumed_at: i64,
    ) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
struct LedgerLine {
    bounty: String,
    nonce: String,
    digest: String,
    consumed_at: i64,
}

pub struct FileNonceLedger {
    file: File,
    consumed: HashSet<(Pubkey, u128)>,
}

impl FileNonceLedger {
    /// Opens (or creates) the ledger and loads every consumed nonce.
    /// Any unreadable line fails the open; a half-trusted ledger would let
    /// replays through.
    pub fn open(path: &Path) -> Result<Self> {
        let mut consumed = HashSet::new();

        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            for (i, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                consumed.insert(parse_line(&line).map_err(|reason| {
                    AuthorityError::LedgerCorrupt { line: i + 1, reason }
                })?);
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        debug!(path = %path.display(), entries = consumed.len(), "nonce ledger opened");

        Ok(Self {
            file,
            consumed,
        })
    }

    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }
}

fn parse_line(line: &str) -> std::result::Result<(Pubkey, u128), String> {
    let entry: LedgerLine = serde_json::from_str(line).map_err(|e| e.to_string())?;
    let bounty = Pubkey::from_str(&entry.bounty).map_err(|e| format!("bounty: {e}"))?;
    let nonce = u128::from_str_radix(&entry.nonce, 16).map_err(|e| format!("nonce: {e}"))?;
    Ok((bounty, nonce))
}

impl NonceLedger for FileNonceLedger {
    fn is_consumed(&self, bounty: &Pubkey, nonce: u128) -> bool {
        self.consumed.contains(&(*bounty, nonce))
    }

    fn mark_consumed(
        &mut self,
        bounty: &Pubkey,
        nonce: u128,
        digest: &[u8; 32],
        consumed_at: i64,
    ) -> Result<()> {
        let mut line = serde_json::to_string(&LedgerLine {
            bounty: bounty.to_string(),
            nonce: format!("{nonce:032x}"),
            digest: hex::encode(digest),
            consumed_at,
        })?;
        line.push('\n');

        self.file.write_all(line.as_bytes())?;
        self.file.sync_data()?;
        self.consumed.insert((*bounty, nonce));
        Ok(())
    }
}
