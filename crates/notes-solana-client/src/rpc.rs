//! RPC-backed [`Ledger`] and keypair-file [`Session`].
//!
//! Both share one nonblocking `RpcClient`, configured once at startup.

use std::path::Path;
use std::sync::Arc;

use notes_core::config::Commitment;
use parking_lot::RwLock;
use solana_account_decoder::UiAccountEncoding;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_program::instruction::{Instruction, InstructionError};
use solana_program::pubkey::Pubkey;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::{read_keypair_file, Keypair, Signature, Signer};
use solana_sdk::transaction::{Transaction, TransactionError};
use thiserror::Error;

use crate::error::SendError;
use crate::ledger::{AccountFilter, Ledger, LedgerError, Session};

#[derive(Debug, Error)]
#[error("failed to read keypair {path}: {reason}")]
pub struct KeypairError {
    pub path: String,
    pub reason: String,
}

pub fn commitment_config(c: Commitment) -> CommitmentConfig {
    match c {
        Commitment::Processed => CommitmentConfig::processed(),
        Commitment::Confirmed => CommitmentConfig::confirmed(),
        Commitment::Finalized => CommitmentConfig::finalized(),
    }
}

/// Build the shared RPC client.
pub fn rpc_client(url: &str, commitment: Commitment) -> Arc<RpcClient> {
    Arc::new(RpcClient::new_with_commitment(url.to_string(), commitment_config(commitment)))
}

/// Read a Solana CLI keypair file (JSON array of 64 bytes).
pub fn load_keypair(path: &Path) -> Result<Keypair, KeypairError> {
    read_keypair_file(path).map_err(|e| KeypairError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[derive(Clone)]
pub struct RpcLedger {
    rpc: Arc<RpcClient>,
}

impl RpcLedger {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    pub fn url(&self) -> String {
        self.rpc.url()
    }

    /// Version string reported by the node.
    pub async fn node_version(&self) -> Result<String, LedgerError> {
        let v = self.rpc.get_version().await.map_err(request_error)?;
        Ok(v.solana_core)
    }

    /// `Some(executable)` if an account exists at `address`.
    pub async fn account_executable(&self, address: &Pubkey) -> Result<Option<bool>, LedgerError> {
        let resp = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await
            .map_err(request_error)?;
        Ok(resp.value.map(|a| a.executable))
    }
}

impl Ledger for RpcLedger {
    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, LedgerError> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filters.iter().map(to_rpc_filter).collect()),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        let accounts = self
            .rpc
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(request_error)?;
        Ok(accounts.into_iter().map(|(key, acc)| (key, acc.data)).collect())
    }
}

/// Wallet backed by a keypair held in memory.
///
/// Starts disconnected unless built with [`KeypairSession::with_keypair`].
pub struct KeypairSession {
    rpc: Arc<RpcClient>,
    signer: RwLock<Option<Arc<Keypair>>>,
}

impl KeypairSession {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc, signer: RwLock::new(None) }
    }

    pub fn with_keypair(rpc: Arc<RpcClient>, keypair: Keypair) -> Self {
        Self { rpc, signer: RwLock::new(Some(Arc::new(keypair))) }
    }

    pub fn connect(&self, keypair: Keypair) -> Pubkey {
        let pubkey = keypair.pubkey();
        *self.signer.write() = Some(Arc::new(keypair));
        pubkey
    }

    pub fn connect_file(&self, path: &Path) -> Result<Pubkey, KeypairError> {
        Ok(self.connect(load_keypair(path)?))
    }

    pub fn disconnect(&self) {
        *self.signer.write() = None;
    }
}

impl Session for KeypairSession {
    fn identity(&self) -> Option<Pubkey> {
        self.signer.read().as_ref().map(|k| k.pubkey())
    }

    fn can_sign(&self) -> bool {
        self.signer.read().is_some()
    }

    async fn sign_and_send(&self, ix: Instruction) -> Result<Signature, SendError> {
        let signer = self.signer.read().clone().ok_or(SendError::NotConnected)?;
        let blockhash = self.rpc.get_latest_blockhash().await.map_err(classify)?;
        let tx = Transaction::new_signed_with_payer(
            &[ix],
            Some(&signer.pubkey()),
            &[signer.as_ref()],
            blockhash,
        );
        self.rpc.send_and_confirm_transaction(&tx).await.map_err(classify)
    }
}

fn to_rpc_filter(f: &AccountFilter) -> RpcFilterType {
    match f {
        AccountFilter::Memcmp { offset, bytes } => {
            RpcFilterType::Memcmp(Memcmp::new_base58_encoded(*offset, bytes))
        }
    }
}

fn request_error(e: ClientError) -> LedgerError {
    LedgerError::Request(e.to_string())
}

/// Separate program errors (custom instruction error codes) from everything
/// else the node can report.
fn classify(e: ClientError) -> SendError {
    match e.get_transaction_error() {
        Some(TransactionError::InstructionError(_, InstructionError::Custom(code))) => {
            SendError::Program { code }
        }
        Some(other) => SendError::Rpc(format!("transaction rejected: {other}")),
        None => SendError::Rpc(e.to_string()),
    }
}
