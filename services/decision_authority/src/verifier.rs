use std::fmt;
use std::sync::Mutex;

use anchor_lang::prelude::Pubkey;
use bounty_escrow::authorization::{
    check_bounty_binding, evaluate_decision, DecisionEvidence, DecisionRejection,
};
use ed25519_dalek::{Signature, VerifyingKey};
use tracing::{info, warn};

use crate::decision::SignedDecision;
use crate::error::{AuthorityError, Result};
use crate::nonce_ledger::NonceLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Accept,
    Reject(DecisionRejection),
}

impl Verification {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accept => f.write_str("accept"),
            Self::Reject(r) => write!(f, "reject: {r}"),
        }
    }
}

/// Advisory verifier. Runs the same check sequence as `execute_payout`,
/// against the configured authority key and a local nonce ledger.
pub struct DecisionVerifier<L: NonceLedger> {
    authority: Pubkey,
    verifying_key: VerifyingKey,
    freshness_window: i64,
    ledger: Mutex<L>,
}

impl<L: NonceLedger> DecisionVerifier<L> {
    pub fn new(authority: Pubkey, freshness_window: i64, ledger: L) -> Result<Self> {
        let verifying_key = VerifyingKey::from_bytes(&authority.to_bytes())
            .map_err(|e| AuthorityError::Config(format!("authority key is not a valid ed25519 point: {e}")))?;
        Ok(Self {
            authority,
            verifying_key,
            freshness_window,
            ledger: Mutex::new(ledger),
        })
    }

    pub fn authority(&self) -> Pubkey {
        self.authority
    }

    fn signature_valid(&self, signed: &SignedDecision) -> bool {
        signed.signer == self.authority
            && self
                .verifying_key
                .verify_strict(&signed.digest, &Signature::from_bytes(&signed.signature))
                .is_ok()
    }

    /// Judges `signed` as a payout from `bounty` and, on accept, consumes
    /// the nonce.
    pub fn verify(&self, signed: &SignedDecision, bounty: &Pubkey, now: i64) -> Result<Verification> {
        self.verify_and_record(signed, bounty, now, |_| Ok(()))
    }

    /// Like [`verify`](Self::verify), with `record` called on the outcome
    /// before an accepted nonce is marked. The ledger lock is held across
    /// judging, `record` and the mark, so two concurrent calls cannot accept
    /// the same nonce. An error from `record` or from the mark leaves the
    /// nonce unconsumed.
    pub fn verify_and_record<F>(
        &self,
        signed: &SignedDecision,
        bounty: &Pubkey,
        now: i64,
        record: F,
    ) -> Result<Verification>
    where
        F: FnOnce(Verification) -> Result<()>,
    {
        let decision = &signed.record;
        let mut ledger = self
            .ledger
            .lock()
            .map_err(|_| AuthorityError::LedgerCorrupt {
                line: 0,
                reason: "ledger lock poisoned".into(),
            })?;

        let evidence = DecisionEvidence {
            record: decision,
            signed_message: &signed.digest,
            signature_valid: self.signature_valid(signed),
            nonce_consumed: ledger.is_consumed(&decision.bounty, decision.nonce),
        };

        // same order as execute_payout: the five checks, then the bounty binding
        let outcome = match evaluate_decision(&evidence, now, self.freshness_window)
            .and_then(|()| check_bounty_binding(decision, bounty))
        {
            Ok(()) => Verification::Accept,
            Err(rejection) => Verification::Reject(rejection),
        };

        record(outcome)?;

        match outcome {
            Verification::Accept => {
                ledger.mark_consumed(&decision.bounty, decision.nonce, &signed.digest, now)?;
                info!(
                    bounty = %decision.bounty,
                    nonce = %format!("{:032x}", decision.nonce),
                    "decision accepted"
                );
            }
            Verification::Reject(rejection) => {
                warn!(
                    bounty = %decision.bounty,
                    nonce = %format!("{:032x}", decision.nonce),
                    %rejection,
                    "decision rejected"
                );
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nonce_ledger::memory::MemoryNonceLedger;
    use crate::signer::DecisionSigner;
    use bounty_escrow::codec::{hash_text, DecisionRecord};
    use rand::rngs::OsRng;

    const NOW: i64 = 1_700_000_000;
    const WINDOW: i64 = 3_600;

    fn record(verdict: bool, nonce: u128) -> DecisionRecord {
        DecisionRecord {
            bounty: Pubkey::new_unique(),
            winner: Pubkey::new_unique(),
            user_message_hash: hash_text("open sesame"),
            ai_response_hash: hash_text("fine"),
            verdict,
            user_id: 11,
            session_id: "sess_1".into(),
            nonce,
            issued_at: NOW,
        }
    }

    fn setup() -> (DecisionSigner, DecisionVerifier<MemoryNonceLedger>) {
        let signer = DecisionSigner::generate(&mut OsRng);
        let verifier =
            DecisionVerifier::new(signer.pubkey(), WINDOW, MemoryNonceLedger::default()).unwrap();
        (signer, verifier)
    }

    #[test]
    fn accepts_once_then_rejects_replay() {
        let (signer, verifier) = setup();
        let signed = signer.sign(record(true, 1)).unwrap();

        assert_eq!(verifier.verify(&signed, &signed.record.bounty, NOW + 5).unwrap(), Verification::Accept);
        assert_eq!(
            verifier.verify(&signed, &signed.record.bounty, NOW + 6).unwrap(),
            Verification::Reject(DecisionRejection::Replayed)
        );
    }

    #[test]
    fn replay_with_another_winner_is_tampered_or_replayed() {
        let (signer, verifier) = setup();
        let signed = signer.sign(record(true, 2)).unwrap();
        assert!(verifier.verify(&signed, &signed.record.bounty, NOW).unwrap().is_accept());

        // same decision re-pointed at a different wallet
        let mut redirected = signed.clone();
        redirected.record.winner = Pubkey::new_unique();
        assert_eq!(
            verifier.verify(&redirected, &redirected.record.bounty, NOW).unwrap(),
            Verification::Reject(DecisionRejection::Tampered)
        );

        // validly re-signed for another wallet but reusing the nonce
        let mut again = signed.record.clone();
        again.winner = Pubkey::new_unique();
        let resigned = signer.sign(again).unwrap();
        assert_eq!(
            verifier.verify(&resigned, &resigned.record.bounty, NOW).unwrap(),
            Verification::Reject(DecisionRejection::Replayed)
        );
    }

    #[test]
    fn rejects_foreign_signer() {
        let (_, verifier) = setup();
        let stranger = DecisionSigner::generate(&mut OsRng);
        let signed = stranger.sign(record(true, 3)).unwrap();
        assert_eq!(
            verifier.verify(&signed, &signed.record.bounty, NOW).unwrap(),
            Verification::Reject(DecisionRejection::InvalidSignature)
        );

        // claiming to be the authority does not help
        let mut spoofed = signed;
        spoofed.signer = verifier.authority();
        assert_eq!(
            verifier.verify(&spoofed, &spoofed.record.bounty, NOW).unwrap(),
            Verification::Reject(DecisionRejection::InvalidSignature)
        );
    }

    #[test]
    fn every_single_bit_flip_in_the_signature_is_rejected() {
        let (signer, verifier) = setup();
        let signed = signer.sign(record(true, 4)).unwrap();
        for bit in 0..512 {
            let mut flipped = signed.clone();
            flipped.signature[bit / 8] ^= 1 << (bit % 8);
            assert_eq!(
                verifier.verify(&flipped, &flipped.record.bounty, NOW).unwrap(),
                Verification::Reject(DecisionRejection::InvalidSignature),
                "bit {bit}"
            );
        }
        // none of the rejections consumed the nonce
        assert!(verifier.verify(&signed, &signed.record.bounty, NOW).unwrap().is_accept());
    }

    #[test]
    fn expired_and_not_a_win() {
        let (signer, verifier) = setup();
        let stale = signer.sign(record(true, 5)).unwrap();
        assert_eq!(
            verifier.verify(&stale, &stale.record.bounty, NOW + WINDOW + 1).unwrap(),
            Verification::Reject(DecisionRejection::Expired)
        );

        let lost = signer.sign(record(false, 6)).unwrap();
        assert_eq!(
            verifier.verify(&lost, &lost.record.bounty, NOW).unwrap(),
            Verification::Reject(DecisionRejection::NotAWin)
        );
        // a no-win decision does not burn its nonce either
        assert!(!verifier
            .ledger
            .lock()
            .unwrap()
            .is_consumed(&lost.record.bounty, 6));
    }

    #[test]
    fn decision_for_another_bounty_is_unauthorized() {
        let (signer, verifier) = setup();
        let signed = signer.sign(record(true, 7)).unwrap();

        assert_eq!(
            verifier.verify(&signed, &Pubkey::new_unique(), NOW).unwrap(),
            Verification::Reject(DecisionRejection::Unauthorized)
        );
        // still good for the bounty it names
        assert!(verifier
            .verify(&signed, &signed.record.bounty, NOW)
            .unwrap()
            .is_accept());
    }

    #[test]
    fn failed_recording_keeps_the_nonce_unconsumed() {
        let (signer, verifier) = setup();
        let signed = signer.sign(record(true, 8)).unwrap();
        let bounty = signed.record.bounty;

        let err = verifier
            .verify_and_record(&signed, &bounty, NOW, |outcome| {
                assert_eq!(outcome, Verification::Accept);
                Err(AuthorityError::Io(std::io::Error::other("disk full")))
            })
            .unwrap_err();
        assert!(matches!(err, AuthorityError::Io(_)));
        assert!(!verifier.ledger.lock().unwrap().is_consumed(&bounty, 8));

        assert!(verifier.verify(&signed, &bounty, NOW).unwrap().is_accept());
    }
}
