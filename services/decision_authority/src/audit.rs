//! Append-only JSON-lines audit trail of every sign and verify outcome.
//!
//! Records carry hashes and identifiers only. No key material and no raw
//! user message or AI response text is ever written.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anchor_lang::prelude::Pubkey;
use bounty_escrow::codec::hash_text;
use serde::{Deserialize, Serialize};

use crate::decision::SignedDecision;
use crate::service::DecisionRequest;
use crate::error::{AuthorityError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEvent {
    Signed,
    /// Signing was refused or errored; nothing was issued.
    SignFailed,
    Accepted,
    Rejected,
    /// Verification errored before an outcome was reached.
    VerifyFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub at: i64,
    pub event: AuditEvent,
    pub bounty: String,
    pub winner: String,
    pub user_id: u64,
    pub session_id: String,
    pub verdict: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    pub user_message_hash: String,
    pub ai_response_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AuditRecord {
    pub fn for_decision(
        at: i64,
        event: AuditEvent,
        signed: &SignedDecision,
        reason: Option<String>,
    ) -> Self {
        let r = &signed.record;
        Self {
            at,
            event,
            bounty: r.bounty.to_string(),
            winner: r.winner.to_string(),
            user_id: r.user_id,
            session_id: r.session_id.clone(),
            verdict: r.verdict,
            nonce: Some(format!("{:032x}", r.nonce)),
            digest: Some(hex::encode(signed.digest)),
            user_message_hash: hex::encode(r.user_message_hash),
            ai_response_hash: hex::encode(r.ai_response_hash),
            reason,
        }
    }

    /// A sign attempt that produced no decision, so no nonce or digest.
    pub fn for_request(at: i64, bounty: &Pubkey, request: &DecisionRequest, reason: String) -> Self {
        Self {
            at,
            event: AuditEvent::SignFailed,
            bounty: bounty.to_string(),
            winner: request.winner.to_string(),
            user_id: request.user_id,
            session_id: request.session_id.clone(),
            verdict: request.verdict,
            nonce: None,
            digest: None,
            user_message_hash: hex::encode(hash_text(&request.user_message)),
            ai_response_hash: hex::encode(hash_text(&request.ai_response)),
            reason: Some(reason),
        }
    }
}

pub struct AuditLog {
    file: Mutex<File>,
}

impl AuditLog {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one line and fsyncs it.
    pub fn append(&self, record: &AuditRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = self
            .file
            .lock()
            .map_err(|_| AuthorityError::Io(std::io::Error::other("audit log lock poisoned")))?;
        file.write_all(&line)?;
        file.sync_data()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::DecisionSigner;
    use bounty_escrow::codec::DecisionRecord;
    use rand::{rngs::OsRng, RngCore};

    #[test]
    fn lines_hold_hashes_not_text() {
        let path = std::env::temp_dir().join(format!("audit-{}.jsonl", OsRng.next_u64()));
        let signer = DecisionSigner::generate(&mut OsRng);
        let signed = signer
            .sign(DecisionRecord {
                bounty: Pubkey::new_unique(),
                winner: Pubkey::new_unique(),
                user_message_hash: hash_text("my secret plea"),
                ai_response_hash: hash_text("you got me"),
                verdict: true,
                user_id: 9,
                session_id: "s9".into(),
                nonce: 42,
                issued_at: 1,
            })
            .unwrap();

        let log = AuditLog::open(&path).unwrap();
        log.append(&AuditRecord::for_decision(1, AuditEvent::Signed, &signed, None))
            .unwrap();
        log.append(&AuditRecord::for_decision(
            2,
            AuditEvent::Rejected,
            &signed,
            Some("decision nonce already consumed".into()),
        ))
        .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<AuditRecord> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].event, AuditEvent::Signed);
        assert_eq!(lines[1].reason.as_deref(), Some("decision nonce already consumed"));
        assert_eq!(lines[0].user_message_hash, hex::encode(hash_text("my secret plea")));
        assert!(!text.contains("my secret plea"));
        assert!(!text.contains("you got me"));

        std::fs::remove_file(&path).ok();
    }
}
