use std::time::{SystemTime, UNIX_EPOCH};

use anchor_lang::prelude::Pubkey;
use bounty_escrow::codec::{hash_text, DecisionRecord};
use bounty_escrow::constants::BOUNTY_SEED;
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::audit::{AuditEvent, AuditLog, AuditRecord};
use crate::config::{AuthorityConfig, AuthoritySettings};
use crate::decision::{b58, SignedDecision};
use crate::error::{AuthorityError, Result};
use crate::nonce_ledger::FileNonceLedger;
use crate::signer::DecisionSigner;
use crate::verifier::{DecisionVerifier, Verification};

/// What the chat backend hands over once the AI has ruled on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionRequest {
    pub bounty_id: u64,
    #[serde(with = "b58")]
    pub winner: Pubkey,
    pub user_message: String,
    pub ai_response: String,
    pub verdict: bool,
    pub user_id: u64,
    pub session_id: String,
}

/// Signs win decisions and checks them before they go on chain.
///
/// Built from an explicit configuration and passed around by reference;
/// there is no process-wide instance.
pub struct AuthorityService {
    program_id: Pubkey,
    signer: Option<DecisionSigner>,
    verifier: DecisionVerifier<FileNonceLedger>,
    audit: AuditLog,
}

pub fn unix_now() -> Result<i64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AuthorityError::Clock(e.to_string()))?;
    i64::try_from(elapsed.as_secs()).map_err(|e| AuthorityError::Clock(e.to_string()))
}

impl AuthorityService {
    pub fn from_config(config: &AuthorityConfig) -> Result<Self> {
        Self::from_settings(config.validate()?)
    }

    pub fn from_settings(settings: AuthoritySettings) -> Result<Self> {
        let ledger = FileNonceLedger::open(&settings.nonce_ledger_path)?;
        let verifier = DecisionVerifier::new(settings.authority, settings.freshness_window, ledger)?;
        let audit = AuditLog::open(&settings.audit_log_path)?;

        info!(
            authority = %settings.authority,
            program_id = %settings.program_id,
            can_sign = settings.signer.is_some(),
            "decision authority ready"
        );

        Ok(Self {
            program_id: settings.program_id,
            signer: settings.signer,
            verifier,
            audit,
        })
    }

    pub fn get_public_key(&self) -> [u8; 32] {
        self.verifier.authority().to_bytes()
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Address of the bounty account a decision for `bounty_id` is bound to.
    pub fn bounty_address(&self, bounty_id: u64) -> Pubkey {
        Pubkey::find_program_address(&[BOUNTY_SEED, &bounty_id.to_le_bytes()], &self.program_id).0
    }

    pub fn sign_decision(&self, request: &DecisionRequest) -> Result<SignedDecision> {
        self.sign_decision_at(request, unix_now()?)
    }

    /// Signs a decision for `request`. Every attempt ends up in the audit
    /// trail, failed ones as `sign_failed` with the error text.
    #[instrument(skip_all, fields(bounty_id = request.bounty_id, user_id = request.user_id))]
    pub fn sign_decision_at(&self, request: &DecisionRequest, now: i64) -> Result<SignedDecision> {
        let bounty = self.bounty_address(request.bounty_id);
        self.try_sign(request, &bounty, now).inspect_err(|e| {
            warn!(error = %e, "decision not signed");
            let failed = AuditRecord::for_request(now, &bounty, request, e.to_string());
            if let Err(audit_err) = self.audit.append(&failed) {
                warn!(error = %audit_err, "audit append failed");
            }
        })
    }

    fn try_sign(&self, request: &DecisionRequest, bounty: &Pubkey, now: i64) -> Result<SignedDecision> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| AuthorityError::KeyUnavailable("no keypair configured".into()))?;

        let record = DecisionRecord {
            bounty: *bounty,
            winner: request.winner,
            user_message_hash: hash_text(&request.user_message),
            ai_response_hash: hash_text(&request.ai_response),
            verdict: request.verdict,
            user_id: request.user_id,
            session_id: request.session_id.clone(),
            nonce: OsRng.gen::<u128>(),
            issued_at: now,
        };

        let signed = signer.sign(record)?;
        self.audit
            .append(&AuditRecord::for_decision(now, AuditEvent::Signed, &signed, None))?;
        info!(
            verdict = signed.record.verdict,
            digest = %hex::encode(signed.digest),
            "decision signed"
        );
        Ok(signed)
    }

    pub fn verify_decision(&self, bounty_id: u64, signed: &SignedDecision) -> Result<Verification> {
        self.verify_decision_at(bounty_id, signed, unix_now()?)
    }

    /// Advisory check of `signed` as a payout from bounty `bounty_id`. The
    /// chain re-checks everything in `execute_payout`.
    ///
    /// The outcome is audited before an accepted nonce is consumed: if the
    /// audit write fails the call errors and the nonce stays usable.
    pub fn verify_decision_at(
        &self,
        bounty_id: u64,
        signed: &SignedDecision,
        now: i64,
    ) -> Result<Verification> {
        let bounty = self.bounty_address(bounty_id);
        self.verifier
            .verify_and_record(signed, &bounty, now, |outcome| {
                let (event, reason) = match outcome {
                    Verification::Accept => (AuditEvent::Accepted, None),
                    Verification::Reject(r) => (AuditEvent::Rejected, Some(format!("{r:?}"))),
                };
                self.audit
                    .append(&AuditRecord::for_decision(now, event, signed, reason))
            })
            .inspect_err(|e| {
                warn!(error = %e, "decision not verified");
                let failed = AuditRecord::for_decision(
                    now,
                    AuditEvent::VerifyFailed,
                    signed,
                    Some(e.to_string()),
                );
                if let Err(audit_err) = self.audit.append(&failed) {
                    warn!(error = %audit_err, "audit append failed");
                }
            })
    }
}
