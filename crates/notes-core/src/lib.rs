//! notes-core
//!
//! Core primitives for the notes dApp client:
//! - field limits shared with the on-chain program
//! - local validation that mirrors the program's checks
//! - explicit client configuration
//! - timestamp formatting for display
//!
//! This crate has no Solana dependency. Wire-level concerns live in
//! `notes-solana-client`.

pub mod config;
pub mod errors;
pub mod timestamp;
pub mod validate;

pub use crate::errors::{NotesError, NotesResult};

/// Field limits enforced by the notes program.
/// These must match the deployed program exactly.
pub mod limits {
    /// Maximum title length in characters.
    pub const MAX_TITLE_LEN: usize = 100;
    /// Maximum content length in characters.
    pub const MAX_CONTENT_LEN: usize = 1000;
    /// Maximum length in bytes of a single address seed.
    ///
    /// The raw title bytes are used as a seed, so this also caps how long a
    /// title can be before its address becomes underivable.
    pub const MAX_SEED_LEN: usize = 32;
}

/// Convenience re-exports.
pub mod prelude {
    pub use crate::config::{ClientConfig, Commitment};
    pub use crate::limits::{MAX_CONTENT_LEN, MAX_SEED_LEN, MAX_TITLE_LEN};
    pub use crate::validate::{validate_content, validate_new_note, ValidationError};
    pub use crate::{NotesError, NotesResult};
}
