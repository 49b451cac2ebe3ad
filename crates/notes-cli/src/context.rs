//! Wiring from CLI configuration to a live [`NotesClient`].

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use notes_core::config::{validate_config, ClientConfig};
use notes_solana_client::{rpc, KeypairSession, NotesClient, RpcLedger};
use solana_sdk::pubkey::Pubkey;

pub type RpcNotesClient = NotesClient<RpcLedger, KeypairSession>;

pub fn program_id(cfg: &ClientConfig) -> Result<Pubkey> {
    let id = cfg.require_program_id()?;
    id.parse().map_err(|e| anyhow!("invalid program id {id}: {e}"))
}

pub fn parse_pubkey(what: &str, s: &str) -> Result<Pubkey> {
    s.parse().map_err(|e| anyhow!("invalid {what} {s}: {e}"))
}

/// Build a client for `cfg`. The wallet is attached when the keypair file
/// exists; otherwise the client starts disconnected.
pub fn connect(cfg: &ClientConfig) -> Result<RpcNotesClient> {
    validate_config(cfg)?;
    let program_id = program_id(cfg)?;

    let rpc = rpc::rpc_client(&cfg.rpc_url, cfg.commitment);
    let ledger = RpcLedger::new(rpc.clone());
    let session = KeypairSession::new(rpc);

    if let Some(path) = &cfg.keypair_path {
        attach_keypair(&session, path)?;
    }
    tracing::debug!(rpc = %cfg.rpc_url, %program_id, "client ready");
    Ok(NotesClient::new(program_id, ledger, session))
}

pub fn attach_keypair(session: &KeypairSession, path: &Path) -> Result<Option<Pubkey>> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "keypair not found, wallet not connected");
        return Ok(None);
    }
    let pubkey = session
        .connect_file(path)
        .with_context(|| format!("loading wallet from {}", path.display()))?;
    tracing::info!(%pubkey, "wallet connected");
    Ok(Some(pubkey))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notes_solana_client::Session;
    use solana_sdk::signature::{write_keypair_file, Keypair, Signer};

    fn config(keypair_path: Option<std::path::PathBuf>) -> ClientConfig {
        ClientConfig {
            rpc_url: "http://127.0.0.1:8899".to_string(),
            program_id: Some(Pubkey::new_unique().to_string()),
            keypair_path,
            ..ClientConfig::default()
        }
    }

    #[test]
    fn attaches_existing_keypair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id.json");
        let kp = Keypair::new();
        write_keypair_file(&kp, &path).unwrap();

        let client = connect(&config(Some(path))).unwrap();
        assert_eq!(client.session().identity(), Some(kp.pubkey()));
    }

    #[test]
    fn missing_keypair_starts_disconnected() {
        let dir = tempfile::tempdir().unwrap();
        let client = connect(&config(Some(dir.path().join("absent.json")))).unwrap();
        assert!(client.session().identity().is_none());
    }

    #[test]
    fn malformed_keypair_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id.json");
        std::fs::write(&path, "not a keypair").unwrap();
        assert!(connect(&config(Some(path))).is_err());
    }

    #[test]
    fn program_id_is_required() {
        let mut cfg = config(None);
        cfg.program_id = None;
        let err = connect(&cfg).err().unwrap();
        assert!(err.to_string().contains("NOTES_PROGRAM_ID"));
    }
}
