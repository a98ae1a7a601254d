use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anchor_lang::prelude::Pubkey;
use bounty_escrow::constants::{DEFAULT_FRESHNESS_WINDOW, MAX_FRESHNESS_WINDOW};
use serde::{Deserialize, Serialize};

use crate::error::{AuthorityError, Result};
use crate::signer::DecisionSigner;

/// On-disk configuration of the decision authority.
///
/// ```json
/// {
///   "program_id": "F2FKxtSy6cppBFfMXmf4xkLpBTpqkuetj6kRVsta2Qhs",
///   "authority_pubkey": "<base58>",
///   "keypair_path": "/etc/bounty/authority.json",
///   "nonce_ledger_path": "/var/lib/bounty/nonces.jsonl",
///   "audit_log_path": "/var/log/bounty/audit.jsonl",
///   "freshness_window_secs": 3600
/// }
/// ```
///
/// `keypair_path` may be left out on verify-only hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorityConfig {
    pub program_id: String,
    pub authority_pubkey: String,
    #[serde(default)]
    pub keypair_path: Option<PathBuf>,
    pub nonce_ledger_path: PathBuf,
    pub audit_log_path: PathBuf,
    #[serde(default)]
    pub freshness_window_secs: Option<i64>,
}

/// Configuration after `validate`: keys parsed, window in range, keypair
/// loaded and matched against the configured authority.
#[derive(Debug)]
pub struct AuthoritySettings {
    pub program_id: Pubkey,
    pub authority: Pubkey,
    pub signer: Option<DecisionSigner>,
    pub nonce_ledger_path: PathBuf,
    pub audit_log_path: PathBuf,
    pub freshness_window: i64,
}

impl AuthorityConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| AuthorityError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| AuthorityError::Config(e.to_string()))
    }

    /// Runs once at startup. Nothing here falls back to a default key.
    pub fn validate(&self) -> Result<AuthoritySettings> {
        let program_id = parse_key(&self.program_id, "program_id")?;
        let authority = parse_key(&self.authority_pubkey, "authority_pubkey")?;
        if authority == Pubkey::default() {
            return Err(AuthorityError::Config("authority_pubkey is the default key".into()));
        }

        let freshness_window = self.freshness_window_secs.unwrap_or(DEFAULT_FRESHNESS_WINDOW);
        if freshness_window <= 0 || freshness_window > MAX_FRESHNESS_WINDOW {
            return Err(AuthorityError::Config(format!(
                "freshness_window_secs must be in (0, {MAX_FRESHNESS_WINDOW}], got {freshness_window}"
            )));
        }

        let signer = match &self.keypair_path {
            Some(path) => {
                let signer = DecisionSigner::from_keypair_file(path)?;
                if signer.pubkey() != authority {
                    return Err(AuthorityError::Config(format!(
                        "keypair {} does not match authority_pubkey {authority}",
                        signer.pubkey()
                    )));
                }
                Some(signer)
            }
            None => None,
        };

        Ok(AuthoritySettings {
            program_id,
            authority,
            signer,
            nonce_ledger_path: self.nonce_ledger_path.clone(),
            audit_log_path: self.audit_log_path.clone(),
            freshness_window,
        })
    }
}

fn parse_key(value: &str, field: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).map_err(|e| AuthorityError::Config(format!("{field}: {e}")))
}
