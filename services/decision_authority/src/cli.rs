//! The `decision-authority` command line.

use std::path::{Path, PathBuf};

use anchor_lang::prelude::Pubkey;
use anyhow::Context;
use argh::FromArgs;
use serde_json::json;

use crate::config::AuthorityConfig;
use crate::decision::{DecisionEnvelope, SignedDecision};
use crate::service::{AuthorityService, DecisionRequest};
use crate::verifier::Verification;

#[derive(FromArgs, PartialEq, Debug)]
/// Sign and verify bounty win decisions.
pub struct TopLevel {
    #[argh(subcommand)]
    pub nested: Subcommands,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
pub enum Subcommands {
    Pubkey(PubkeyCmd),
    Sign(SignCmd),
    Verify(VerifyCmd),
}

#[derive(FromArgs, PartialEq, Debug)]
/// Print the configured authority public key
#[argh(subcommand, name = "pubkey")]
pub struct PubkeyCmd {
    #[argh(option)]
    /// path to the authority config (JSON)
    pub config: PathBuf,
}

#[derive(FromArgs, PartialEq, Debug)]
/// Sign a decision request read from stdin, print the envelope
#[argh(subcommand, name = "sign")]
pub struct SignCmd {
    #[argh(option)]
    /// path to the authority config (JSON)
    pub config: PathBuf,
}

#[derive(FromArgs, PartialEq, Debug)]
/// Verify a decision envelope read from stdin, print the outcome
#[argh(subcommand, name = "verify")]
pub struct VerifyCmd {
    #[argh(option)]
    /// path to the authority config (JSON)
    pub config: PathBuf,

    #[argh(option)]
    /// bounty the decision is presented to
    pub bounty_id: u64,
}

fn open_service(path: &Path) -> anyhow::Result<AuthorityService> {
    let config = AuthorityConfig::from_file(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    Ok(AuthorityService::from_config(&config)?)
}

impl TopLevel {
    pub fn reads_stdin(&self) -> bool {
        !matches!(self.nested, Subcommands::Pubkey(_))
    }

    /// Runs the command on `input` (stdin) and returns its stdout.
    pub fn run(self, input: &str) -> anyhow::Result<String> {
        match self.nested {
            Subcommands::Pubkey(cmd) => {
                let service = open_service(&cmd.config)?;
                Ok(Pubkey::new_from_array(service.get_public_key()).to_string())
            }
            Subcommands::Sign(cmd) => {
                let service = open_service(&cmd.config)?;
                let request: DecisionRequest =
                    serde_json::from_str(input).context("parsing decision request")?;
                let signed = service.sign_decision(&request)?;
                Ok(serde_json::to_string_pretty(&signed.to_envelope()?)?)
            }
            Subcommands::Verify(cmd) => {
                let service = open_service(&cmd.config)?;
                let envelope: DecisionEnvelope =
                    serde_json::from_str(input).context("parsing decision envelope")?;
                let signed = SignedDecision::from_envelope(&envelope)?;
                let out = match service.verify_decision(cmd.bounty_id, &signed)? {
                    Verification::Accept => json!({ "verdict": "accept" }),
                    Verification::Reject(r) => json!({
                        "verdict": "reject",
                        "reason": format!("{r:?}"),
                        "detail": r.to_string(),
                    }),
                };
                Ok(out.to_string())
            }
        }
    }
}
