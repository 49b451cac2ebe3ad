//! Seams between the notes client and the outside world.
//!
//! - [`Ledger`] reads program accounts (the RPC connection).
//! - [`Session`] is the wallet: an optional identity plus the ability to sign,
//!   send and await confirmation of one instruction.
//!
//! Both are injected into [`crate::NotesClient`], so tests can swap in the
//! in-memory implementations from `crate::mock`.

use std::future::Future;

use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

use crate::error::SendError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("rpc request failed: {0}")]
    Request(String),
}

/// Server-side account filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    /// Account data at `offset` must equal `bytes`.
    Memcmp { offset: usize, bytes: Vec<u8> },
}

impl AccountFilter {
    pub fn memcmp(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Memcmp { offset, bytes: bytes.into() }
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            Self::Memcmp { offset, bytes } => data
                .get(*offset..offset + bytes.len())
                .map(|window| window == bytes.as_slice())
                .unwrap_or(false),
        }
    }
}

pub trait Ledger: Send + Sync {
    /// Fetch `(address, data)` of every account owned by `program_id` that
    /// passes all `filters`.
    fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> impl Future<Output = Result<Vec<(Pubkey, Vec<u8>)>, LedgerError>> + Send;
}

pub trait Session: Send + Sync {
    /// Public key of the connected wallet, if any.
    fn identity(&self) -> Option<Pubkey>;

    /// Whether the connected wallet can sign transactions.
    fn can_sign(&self) -> bool;

    fn is_connected(&self) -> bool {
        self.identity().is_some()
    }

    /// Sign `ix` with the wallet, submit it and wait for confirmation.
    fn sign_and_send(&self, ix: Instruction) -> impl Future<Output = Result<Signature, SendError>> + Send;
}
