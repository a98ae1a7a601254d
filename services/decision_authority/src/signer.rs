use std::fmt;
use std::fs;
use std::path::Path;

use anchor_lang::prelude::Pubkey;
use bounty_escrow::codec::DecisionRecord;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::{CryptoRng, RngCore};

use crate::decision::SignedDecision;
use crate::error::{AuthorityError, Result};

/// Owns the authority's ed25519 key. The secret never leaves this struct:
/// it is not serialized and `Debug` shows only the public key.
pub struct DecisionSigner {
    signing_key: SigningKey,
}

impl fmt::Debug for DecisionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionSigner")
            .field("pubkey", &self.pubkey().to_string())
            .finish_non_exhaustive()
    }
}

impl DecisionSigner {
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        Self::from_signing_key(SigningKey::generate(rng))
    }

    /// Reads a Solana CLI keypair file: a JSON array of 64 bytes, secret
    /// half first. The public half must match the secret.
    pub fn from_keypair_file(path: &Path) -> Result<Self> {
        let unavailable =
            |reason: String| AuthorityError::KeyUnavailable(format!("{}: {reason}", path.display()));

        let raw = fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
        let bytes: Vec<u8> = serde_json::from_str(&raw).map_err(|e| unavailable(e.to_string()))?;
        let keypair: [u8; 64] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| unavailable(format!("expected 64 bytes, got {}", v.len())))?;
        let signing_key =
            SigningKey::from_keypair_bytes(&keypair).map_err(|e| unavailable(e.to_string()))?;

        Ok(Self::from_signing_key(signing_key))
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.verifying_key().to_bytes())
    }

    /// Signs `digest(record)`.
    pub fn sign(&self, record: DecisionRecord) -> Result<SignedDecision> {
        let digest = record.digest()?;
        let signature = self.signing_key.sign(&digest).to_bytes();
        Ok(SignedDecision {
            record,
            digest,
            signature,
            signer: self.pubkey(),
        })
    }
}
