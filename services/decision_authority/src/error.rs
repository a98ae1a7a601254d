use bounty_escrow::codec::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("signing key unavailable: {0}")]
    KeyUnavailable(String),
    #[error("decision codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("nonce ledger corrupt at line {line}: {reason}")]
    LedgerCorrupt { line: usize, reason: String },
    #[error("system clock error: {0}")]
    Clock(String),
}

pub type Result<T, E = AuthorityError> = std::result::Result<T, E>;
