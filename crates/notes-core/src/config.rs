//! Configuration structures for the notes client.
//!
//! The core crate does not read environment variables or files. The CLI
//! fills a [`ClientConfig`] from flags and environment and passes it down.

use std::path::PathBuf;

use crate::errors::{NotesError, NotesResult};

/// Public devnet endpoint used when no RPC URL is configured.
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Connection settings for the notes program.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClientConfig {
    pub rpc_url: String,
    /// Base58 id of the deployed notes program.
    pub program_id: Option<String>,
    /// Keypair file acting as the wallet. `None` means no wallet is attached.
    pub keypair_path: Option<PathBuf>,
    pub commitment: Commitment,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            program_id: None,
            keypair_path: None,
            commitment: Commitment::Confirmed,
        }
    }
}

impl ClientConfig {
    /// The configured program id, or an error naming how to set it.
    pub fn require_program_id(&self) -> NotesResult<&str> {
        self.program_id
            .as_deref()
            .ok_or_else(|| NotesError::invalid_config("program id is not set (use --program-id or NOTES_PROGRAM_ID)"))
    }
}

/// Confirmation level awaited for reads and submitted transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "lowercase"))]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn parse(s: &str) -> NotesResult<Self> {
        match s {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            _ => Err(NotesError::invalid_argument(format!(
                "unsupported commitment: {s}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl std::str::FromStr for Commitment {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &ClientConfig) -> NotesResult<()> {
    let url = cfg.rpc_url.trim();
    if url.is_empty() {
        return Err(NotesError::invalid_config("rpc url must not be empty"));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(NotesError::invalid_config(format!(
            "rpc url must use http or https: {url}"
        )));
    }

    if let Some(id) = &cfg.program_id {
        if !looks_like_base58_key(id) {
            return Err(NotesError::invalid_config(format!(
                "program id is not a base58 public key: {id}"
            )));
        }
    }

    if let Some(path) = &cfg.keypair_path {
        if path.as_os_str().is_empty() {
            return Err(NotesError::invalid_config("keypair path must not be empty"));
        }
    }

    Ok(())
}

fn looks_like_base58_key(s: &str) -> bool {
    (32..=44).contains(&s.len()) && s.chars().all(|c| BASE58_ALPHABET.contains(c))
}
