//! notes-solana-client
//!
//! A small, focused Rust client for the `notes_dapp` on-chain program.
//!
//! It includes:
//! - the program interface descriptor (instructions, account schema, errors)
//! - PDA derivation for note accounts
//! - instruction and account codecs matching the program's Anchor layout
//! - `Ledger`/`Session` seams plus their RPC-backed implementations
//! - `NotesClient`, which runs the list/create/update/delete operations
//!
//! The program id is provided by the consumer; there is no canonical
//! deployment.

pub mod account;
pub mod constants;
pub mod error;
pub mod idl;
pub mod instruction;
pub mod ledger;
pub mod notes_client;
pub mod pda;
pub mod rpc;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use account::Note;
pub use constants::*;
pub use error::{NotesClientError, PreconditionError, ProgramFailure, SendError};
pub use ledger::{AccountFilter, Ledger, LedgerError, Session};
pub use notes_client::NotesClient;
pub use pda::*;
pub use rpc::{KeypairSession, RpcLedger};
