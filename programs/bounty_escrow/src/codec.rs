//! Canonical encoding of a win/no-win decision.
//!
//! The signer and the on-chain verifier must agree on every byte, so the
//! layout is fixed: little-endian integers, fixed offsets for every
//! fixed-width field, and the only variable field (`session_id`) last.
//!
//! ```text
//! offset  size  field
//!      0    25  domain tag "bounty-escrow:decision_v1"
//!     25    32  bounty (PDA address)
//!     57    32  winner
//!     89    32  user_message_hash
//!    121    32  ai_response_hash
//!    153     1  verdict (0 | 1)
//!    154     8  user_id
//!    162    16  nonce
//!    178     8  issued_at
//!    186     1  session_id length n
//!    187     n  session_id
//! ```

use anchor_lang::prelude::*;
use core::fmt;
use solana_sha256_hasher::hashv;

pub const DECISION_DOMAIN: &[u8] = b"bounty-escrow:decision_v1";
pub const MAX_SESSION_ID_LEN: usize = 64;

const BOUNTY_OFF: usize = DECISION_DOMAIN.len();
const WINNER_OFF: usize = BOUNTY_OFF + 32;
const USER_MESSAGE_OFF: usize = WINNER_OFF + 32;
const AI_RESPONSE_OFF: usize = USER_MESSAGE_OFF + 32;
const VERDICT_OFF: usize = AI_RESPONSE_OFF + 32;
const USER_ID_OFF: usize = VERDICT_OFF + 1;
const NONCE_OFF: usize = USER_ID_OFF + 8;
const ISSUED_AT_OFF: usize = NONCE_OFF + 16;
const SESSION_LEN_OFF: usize = ISSUED_AT_OFF + 8;

/// Size of the encoding without the session id bytes.
pub const FIXED_ENCODED_LEN: usize = SESSION_LEN_OFF + 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRecord {
    pub bounty: Pubkey,
    pub winner: Pubkey,
    pub user_message_hash: [u8; 32],
    pub ai_response_hash: [u8; 32],
    pub verdict: bool,
    pub user_id: u64,
    pub session_id: String,
    pub nonce: u128,
    pub issued_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    WrongDomain,
    Truncated,
    TrailingBytes,
    InvalidVerdict(u8),
    InvalidSessionId,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongDomain => write!(f, "decision domain tag mismatch"),
            Self::Truncated => write!(f, "decision bytes truncated"),
            Self::TrailingBytes => write!(f, "trailing bytes after decision"),
            Self::InvalidVerdict(b) => write!(f, "verdict byte {b} is not 0 or 1"),
            Self::InvalidSessionId => write!(f, "session id empty, too long or has invalid characters"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Session ids are 1..=64 bytes of `[A-Za-z0-9_-]`.
pub fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id.len() <= MAX_SESSION_ID_LEN
        && session_id
            .bytes()
            .all(|c| c.is_ascii_alphanumeric() || c == b'-' || c == b'_')
}

/// SHA-256 of free text (user message, AI response).
pub fn hash_text(text: &str) -> [u8; 32] {
    hashv(&[text.as_bytes()]).to_bytes()
}

impl DecisionRecord {
    pub fn encode(&self) -> std::result::Result<Vec<u8>, CodecError> {
        if !is_valid_session_id(&self.session_id) {
            return Err(CodecError::InvalidSessionId);
        }

        let mut out = Vec::with_capacity(FIXED_ENCODED_LEN + self.session_id.len());
        out.extend_from_slice(DECISION_DOMAIN);
        out.extend_from_slice(self.bounty.as_ref());
        out.extend_from_slice(self.winner.as_ref());
        out.extend_from_slice(&self.user_message_hash);
        out.extend_from_slice(&self.ai_response_hash);
        out.push(self.verdict as u8);
        out.extend_from_slice(&self.user_id.to_le_bytes());
        out.extend_from_slice(&self.nonce.to_le_bytes());
        out.extend_from_slice(&self.issued_at.to_le_bytes());
        out.push(self.session_id.len() as u8);
        out.extend_from_slice(self.session_id.as_bytes());
        Ok(out)
    }

    pub fn decode(data: &[u8]) -> std::result::Result<Self, CodecError> {
        if data.len() < FIXED_ENCODED_LEN {
            return Err(if data.starts_with(DECISION_DOMAIN) || DECISION_DOMAIN.starts_with(data) {
                CodecError::Truncated
            } else {
                CodecError::WrongDomain
            });
        }
        if &data[..BOUNTY_OFF] != DECISION_DOMAIN {
            return Err(CodecError::WrongDomain);
        }

        let verdict = match data[VERDICT_OFF] {
            0 => false,
            1 => true,
            other => return Err(CodecError::InvalidVerdict(other)),
        };

        let session_len = data[SESSION_LEN_OFF] as usize;
        let expected_len = FIXED_ENCODED_LEN + session_len;
        if data.len() < expected_len {
            return Err(CodecError::Truncated);
        }
        if data.len() > expected_len {
            return Err(CodecError::TrailingBytes);
        }

        let session_id = std::str::from_utf8(&data[FIXED_ENCODED_LEN..])
            .map_err(|_| CodecError::InvalidSessionId)?
            .to_string();
        if !is_valid_session_id(&session_id) {
            return Err(CodecError::InvalidSessionId);
        }

        Ok(Self {
            bounty: Pubkey::new_from_array(array_at(data, BOUNTY_OFF)),
            winner: Pubkey::new_from_array(array_at(data, WINNER_OFF)),
            user_message_hash: array_at(data, USER_MESSAGE_OFF),
            ai_response_hash: array_at(data, AI_RESPONSE_OFF),
            verdict,
            user_id: u64::from_le_bytes(array_at(data, USER_ID_OFF)),
            session_id,
            nonce: u128::from_le_bytes(array_at(data, NONCE_OFF)),
            issued_at: i64::from_le_bytes(array_at(data, ISSUED_AT_OFF)),
        })
    }

    /// SHA-256 over the canonical encoding. This is the message the authority signs.
    pub fn digest(&self) -> std::result::Result<[u8; 32], CodecError> {
        Ok(hashv(&[self.encode()?.as_slice()]).to_bytes())
    }
}

// Callers have already checked `data.len() >= FIXED_ENCODED_LEN`.
fn array_at<const N: usize>(data: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&data[offset..offset + N]);
    out
}
