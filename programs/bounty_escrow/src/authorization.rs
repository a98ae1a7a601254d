//! The win-decision check sequence.
//!
//! Both the off-chain advisory verifier and `execute_payout` call
//! [`evaluate_decision`], so the order of the checks cannot drift between
//! them. Each caller gathers its own evidence (how the signature was checked,
//! whether the nonce is already in its ledger) and marks the nonce only after
//! an accept, inside the same atomic step.

use core::fmt;

use anchor_lang::prelude::Pubkey;

use crate::codec::DecisionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionRejection {
    Tampered,
    InvalidSignature,
    Expired,
    Replayed,
    NotAWin,
    /// Decision names another bounty or another winner.
    Unauthorized,
}

impl fmt::Display for DecisionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Tampered => "decision bytes do not match what was signed",
            Self::InvalidSignature => "signature does not verify under the bounty authority",
            Self::Expired => "decision is outside the freshness window",
            Self::Replayed => "decision nonce already consumed",
            Self::NotAWin => "decision verdict is not a win",
            Self::Unauthorized => "decision is bound to another bounty or winner",
        };
        f.write_str(s)
    }
}

impl std::error::Error for DecisionRejection {}

pub struct DecisionEvidence<'a> {
    pub record: &'a DecisionRecord,
    /// The exact message covered by the signature.
    pub signed_message: &'a [u8],
    pub signature_valid: bool,
    pub nonce_consumed: bool,
}

/// `|now - issued_at| <= window`. Future-dated decisions get the same slack
/// so signer and validator clocks may disagree by up to the window.
pub fn is_fresh(issued_at: i64, now: i64, window: i64) -> bool {
    (now as i128 - issued_at as i128).abs() <= window as i128
}

pub fn evaluate_decision(
    evidence: &DecisionEvidence,
    now: i64,
    freshness_window: i64,
) -> Result<(), DecisionRejection> {
    let digest = evidence
        .record
        .digest()
        .map_err(|_| DecisionRejection::Tampered)?;
    if evidence.signed_message != digest.as_slice() {
        return Err(DecisionRejection::Tampered);
    }

    if !evidence.signature_valid {
        return Err(DecisionRejection::InvalidSignature);
    }

    if !is_fresh(evidence.record.issued_at, now, freshness_window) {
        return Err(DecisionRejection::Expired);
    }

    if evidence.nonce_consumed {
        return Err(DecisionRejection::Replayed);
    }

    if !evidence.record.verdict {
        return Err(DecisionRejection::NotAWin);
    }

    Ok(())
}

/// The record must name the bounty being paid from.
pub fn check_bounty_binding(record: &DecisionRecord, bounty: &Pubkey) -> Result<(), DecisionRejection> {
    if record.bounty != *bounty {
        return Err(DecisionRejection::Unauthorized);
    }
    Ok(())
}

/// Everything `execute_payout` asks of a decision: the five checks of
/// [`evaluate_decision`], then the bounty and winner it is bound to.
pub fn authorize_payout(
    evidence: &DecisionEvidence,
    bounty: &Pubkey,
    winner: &Pubkey,
    now: i64,
    freshness_window: i64,
) -> Result<(), DecisionRejection> {
    evaluate_decision(evidence, now, freshness_window)?;
    check_bounty_binding(evidence.record, bounty)?;
    if evidence.record.winner != *winner {
        return Err(DecisionRejection::Unauthorized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::hash_text;

    const NOW: i64 = 1_700_000_000;
    const WINDOW: i64 = 3_600;

    fn record(verdict: bool) -> DecisionRecord {
        DecisionRecord {
            bounty: Pubkey::new_unique(),
            winner: Pubkey::new_unique(),
            user_message_hash: hash_text("hi"),
            ai_response_hash: hash_text("no"),
            verdict,
            user_id: 7,
            session_id: "s1".into(),
            nonce: 99,
            issued_at: NOW - 10,
        }
    }

    fn check(r: &DecisionRecord, msg: &[u8], sig: bool, used: bool, now: i64) -> Result<(), DecisionRejection> {
        evaluate_decision(
            &DecisionEvidence {
                record: r,
                signed_message: msg,
                signature_valid: sig,
                nonce_consumed: used,
            },
            now,
            WINDOW,
        )
    }

    #[test]
    fn accepts_fresh_signed_unused_win() {
        let r = record(true);
        let d = r.digest().unwrap();
        assert_eq!(check(&r, &d, true, false, NOW), Ok(()));
    }

    #[test]
    fn rejection_order_is_fixed() {
        let r = record(false);
        let d = r.digest().unwrap();
        let stale = NOW + WINDOW + 100;

        // everything wrong: tamper wins
        assert_eq!(check(&r, b"other", false, true, stale), Err(DecisionRejection::Tampered));
        assert_eq!(check(&r, &d, false, true, stale), Err(DecisionRejection::InvalidSignature));
        assert_eq!(check(&r, &d, true, true, stale), Err(DecisionRejection::Expired));
        assert_eq!(check(&r, &d, true, true, NOW), Err(DecisionRejection::Replayed));
        assert_eq!(check(&r, &d, true, false, NOW), Err(DecisionRejection::NotAWin));
    }

    #[test]
    fn not_a_win_even_when_everything_else_passes() {
        let r = record(false);
        let d = r.digest().unwrap();
        assert_eq!(check(&r, &d, true, false, NOW), Err(DecisionRejection::NotAWin));
    }

    #[test]
    fn digest_of_a_modified_record_is_tampered() {
        let r = record(true);
        let d = r.digest().unwrap();
        let mut forged = r.clone();
        forged.user_id = 8;
        assert_eq!(check(&forged, &d, true, false, NOW), Err(DecisionRejection::Tampered));
    }

    #[test]
    fn freshness_window_edges() {
        assert!(is_fresh(NOW, NOW + WINDOW, WINDOW));
        assert!(!is_fresh(NOW, NOW + WINDOW + 1, WINDOW));
        assert!(is_fresh(NOW + WINDOW, NOW, WINDOW));
        assert!(!is_fresh(NOW + WINDOW + 1, NOW, WINDOW));
        assert!(!is_fresh(i64::MIN, i64::MAX, WINDOW));
    }

    fn authorize(r: &DecisionRecord, bounty: &Pubkey, winner: &Pubkey, used: bool) -> Result<(), DecisionRejection> {
        let d = r.digest().unwrap();
        authorize_payout(
            &DecisionEvidence {
                record: r,
                signed_message: &d,
                signature_valid: true,
                nonce_consumed: used,
            },
            bounty,
            winner,
            NOW,
            WINDOW,
        )
    }

    #[test]
    fn payout_needs_matching_bounty_and_winner() {
        let r = record(true);
        assert_eq!(authorize(&r, &r.bounty, &r.winner, false), Ok(()));

        // a win on bounty A cannot drain bounty B
        let other_bounty = Pubkey::new_unique();
        assert_eq!(
            authorize(&r, &other_bounty, &r.winner, false),
            Err(DecisionRejection::Unauthorized)
        );
        assert_eq!(
            authorize(&r, &r.bounty, &Pubkey::new_unique(), false),
            Err(DecisionRejection::Unauthorized)
        );
    }

    #[test]
    fn consumed_nonce_is_replayed_before_binding() {
        let r = record(true);
        assert_eq!(
            authorize(&r, &r.bounty, &r.winner, true),
            Err(DecisionRejection::Replayed)
        );
        assert_eq!(
            authorize(&r, &Pubkey::new_unique(), &r.winner, true),
            Err(DecisionRejection::Replayed)
        );
    }
}
