mod common;

use argh::FromArgs;
use common::{fixture, request};
use decision_authority::cli::TopLevel;
use decision_authority::DecisionEnvelope;

fn cli(args: &[&str]) -> TopLevel {
    TopLevel::from_args(&["decision-authority"], args).unwrap()
}

#[test]
fn sign_then_verify_through_the_command_line() {
    let f = fixture("cli");
    let config = f.write_config();
    let config = config.to_str().unwrap();

    let pubkey = cli(&["pubkey", "--config", config]);
    assert!(!pubkey.reads_stdin());
    assert_eq!(pubkey.run("").unwrap(), f.authority.to_string());

    let request_json = serde_json::to_string(&request(true)).unwrap();
    let envelope_json = cli(&["sign", "--config", config]).run(&request_json).unwrap();
    let envelope: DecisionEnvelope = serde_json::from_str(&envelope_json).unwrap();
    assert_eq!(envelope.signer, f.authority.to_string());

    let verify = cli(&["verify", "--config", config, "--bounty-id", "1"]);
    let out: serde_json::Value = serde_json::from_str(&verify.run(&envelope_json).unwrap()).unwrap();
    assert_eq!(out["verdict"], "accept");

    let again = cli(&["verify", "--config", config, "--bounty-id", "1"]);
    let out: serde_json::Value = serde_json::from_str(&again.run(&envelope_json).unwrap()).unwrap();
    assert_eq!(out["verdict"], "reject");
    assert_eq!(out["reason"], "Replayed");
}

#[test]
fn verify_needs_a_bounty_id() {
    assert!(TopLevel::from_args(&["decision-authority"], &["verify", "--config", "c.json"]).is_err());
}

#[test]
fn malformed_input_is_an_error() {
    let f = fixture("cli-bad");
    let config = f.write_config();
    let config = config.to_str().unwrap();

    assert!(cli(&["sign", "--config", config]).run("{not json").is_err());
    assert!(cli(&["verify", "--config", config, "--bounty-id", "1"])
        .run(r#"{"decision":"zz","digest":"","signature":"","signer":""}"#)
        .is_err());
}
