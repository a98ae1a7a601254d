//! Signed decisions and their transport form.

use std::str::FromStr;

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction;
use bounty_escrow::codec::DecisionRecord;
use bounty_escrow::utils::{
    ed25519_program_id, ED25519_HEADER_LEN, ED25519_PUBKEY_LEN, ED25519_SIGNATURE_LEN,
};
use serde::{Deserialize, Serialize};

use crate::error::{AuthorityError, Result};

/// A decision record together with what was signed, the signature and the
/// signer. Never mutated after the signer produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDecision {
    pub record: DecisionRecord,
    pub digest: [u8; 32],
    pub signature: [u8; 64],
    pub signer: Pubkey,
}

/// JSON transport form. Binary fields are hex, the signer is base58.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionEnvelope {
    pub decision: String,
    pub digest: String,
    pub signature: String,
    pub signer: String,
}

/// Arguments of the `execute_payout` instruction for this decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutArgs {
    pub signature: [u8; 64],
    pub decision: Vec<u8>,
    pub nonce: u128,
}

impl SignedDecision {
    pub fn to_envelope(&self) -> Result<DecisionEnvelope> {
        Ok(DecisionEnvelope {
            decision: hex::encode(self.record.encode()?),
            digest: hex::encode(self.digest),
            signature: hex::encode(self.signature),
            signer: self.signer.to_string(),
        })
    }

    /// Parses the envelope as-is. Nothing is recomputed here: a digest that
    /// no longer matches the decision is for the verifier to reject.
    pub fn from_envelope(envelope: &DecisionEnvelope) -> Result<Self> {
        let decision = decode_hex(&envelope.decision, "decision")?;
        Ok(Self {
            record: DecisionRecord::decode(&decision)?,
            digest: decode_hex_array(&envelope.digest, "digest")?,
            signature: decode_hex_array(&envelope.signature, "signature")?,
            signer: Pubkey::from_str(&envelope.signer)
                .map_err(|e| AuthorityError::Encoding(format!("signer: {e}")))?,
        })
    }

    pub fn payout_args(&self) -> Result<PayoutArgs> {
        Ok(PayoutArgs {
            signature: self.signature,
            decision: self.record.encode()?,
            nonce: self.record.nonce,
        })
    }

    /// The ed25519 precompile instruction that must directly precede
    /// `execute_payout` in the same transaction.
    ///
    /// Layout follows the native program: one signature, every offset
    /// self-contained (`instruction_index == u16::MAX`), then pubkey,
    /// signature and message (the decision digest).
    pub fn ed25519_instruction(&self) -> Instruction {
        let pk_off = ED25519_HEADER_LEN;
        let sig_off = pk_off + ED25519_PUBKEY_LEN;
        let msg_off = sig_off + ED25519_SIGNATURE_LEN;

        let mut data = Vec::with_capacity(msg_off + self.digest.len());
        data.push(1u8); // number of signatures
        data.push(0u8); // padding
        for v in [
            sig_off as u16,
            u16::MAX,
            pk_off as u16,
            u16::MAX,
            msg_off as u16,
            self.digest.len() as u16,
            u16::MAX,
        ] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(self.signer.as_ref());
        data.extend_from_slice(&self.signature);
        data.extend_from_slice(&self.digest);

        Instruction {
            program_id: ed25519_program_id(),
            accounts: vec![],
            data,
        }
    }
}

fn decode_hex(s: &str, field: &str) -> Result<Vec<u8>> {
    hex::decode(s).map_err(|e| AuthorityError::Encoding(format!("{field}: {e}")))
}

fn decode_hex_array<const N: usize>(s: &str, field: &str) -> Result<[u8; N]> {
    let bytes = decode_hex(s, field)?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        AuthorityError::Encoding(format!("{field}: expected {N} bytes, got {}", v.len()))
    })
}

/// serde helper for base58 `Pubkey` fields.
pub(crate) mod b58 {
    use std::str::FromStr;

    use anchor_lang::prelude::Pubkey;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &Pubkey, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(key)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Pubkey, D::Error> {
        let s = String::deserialize(d)?;
        Pubkey::from_str(&s).map_err(D::Error::custom)
    }
}
