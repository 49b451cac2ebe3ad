//! Error taxonomy of the notes client.
//!
//! Three tiers, kept apart so callers never conflate them:
//! - [`PreconditionError`]: nothing was sent (no wallet, no signer, title
//!   cannot be turned into an address)
//! - [`ProgramFailure`]: the program rejected the instruction
//! - `Rpc`: the transport failed or the node refused the transaction

use thiserror::Error;

use crate::idl::{IdlError, NOTES_IDL};
use crate::ledger::LedgerError;
use crate::pda::AddressError;

/// Anchor's code for an `init` on an address that already holds an account
/// surfaces as the system program's `AccountAlreadyInUse` (custom 0).
const CODE_ACCOUNT_ALREADY_IN_USE: u32 = 0;
/// `ErrorCode::ConstraintSeeds`.
const CODE_CONSTRAINT_SEEDS: u32 = 2006;
/// `ErrorCode::AccountNotInitialized`.
const CODE_ACCOUNT_NOT_INITIALIZED: u32 = 3012;

#[derive(Debug, Error)]
pub enum NotesClientError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("program error: {0}")]
    Program(#[from] ProgramFailure),

    #[error("rpc failure: {0}")]
    Rpc(String),
}

impl NotesClientError {
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    pub fn program_failure(&self) -> Option<ProgramFailure> {
        match self {
            Self::Program(p) => Some(*p),
            _ => None,
        }
    }
}

impl From<LedgerError> for NotesClientError {
    fn from(e: LedgerError) -> Self {
        Self::Rpc(e.to_string())
    }
}

impl From<SendError> for NotesClientError {
    fn from(e: SendError) -> Self {
        match e {
            SendError::Program { code } => Self::Program(ProgramFailure::from_code(code)),
            SendError::NotConnected => Self::Precondition(PreconditionError::NotConnected),
            SendError::Rpc(msg) => Self::Rpc(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("wallet not connected")]
    NotConnected,

    #[error("connected wallet cannot sign transactions")]
    CannotSign,

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Interface(#[from] IdlError),
}

/// Failure reported by the program for a submitted instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProgramFailure {
    #[error("TitleTooLong")]
    TitleTooLong,
    #[error("ContentTooLong")]
    ContentTooLong,
    #[error("TitleEmpty")]
    TitleEmpty,
    #[error("ContentEmpty")]
    ContentEmpty,
    #[error("Unauthorized")]
    Unauthorized,
    /// A note with this title already exists for the author.
    #[error("AccountAlreadyInUse")]
    AccountAlreadyInUse,
    /// Nothing is stored at the target address.
    #[error("AccountNotInitialized")]
    AccountNotInitialized,
    #[error("ConstraintSeeds")]
    ConstraintSeeds,
    #[error("custom program error {0}")]
    Other(u32),
}

impl ProgramFailure {
    pub fn from_code(code: u32) -> Self {
        match code {
            6000 => Self::TitleTooLong,
            6001 => Self::ContentTooLong,
            6002 => Self::TitleEmpty,
            6003 => Self::ContentEmpty,
            6004 => Self::Unauthorized,
            CODE_ACCOUNT_ALREADY_IN_USE => Self::AccountAlreadyInUse,
            CODE_CONSTRAINT_SEEDS => Self::ConstraintSeeds,
            CODE_ACCOUNT_NOT_INITIALIZED => Self::AccountNotInitialized,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::TitleTooLong => 6000,
            Self::ContentTooLong => 6001,
            Self::TitleEmpty => 6002,
            Self::ContentEmpty => 6003,
            Self::Unauthorized => 6004,
            Self::AccountAlreadyInUse => CODE_ACCOUNT_ALREADY_IN_USE,
            Self::ConstraintSeeds => CODE_CONSTRAINT_SEEDS,
            Self::AccountNotInitialized => CODE_ACCOUNT_NOT_INITIALIZED,
            Self::Other(code) => *code,
        }
    }

    /// Message from the program's error table, for program-defined codes.
    pub fn message(&self) -> Option<&'static str> {
        NOTES_IDL.error(self.code()).map(|e| e.msg)
    }
}

/// Outcome of a failed sign-and-send, as reported by a [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("wallet not connected")]
    NotConnected,

    #[error("instruction failed with custom error {code}")]
    Program { code: u32 },

    #[error("{0}")]
    Rpc(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn codes_round_trip_through_table() {
        for spec in NOTES_IDL.errors {
            let f = ProgramFailure::from_code(spec.code);
            assert_eq!(f.code(), spec.code);
            assert_eq!(f.to_string(), spec.name);
            assert_eq!(f.message(), Some(spec.msg));
        }
    }

    #[test]
    fn platform_codes_are_named() {
        assert_eq!(ProgramFailure::from_code(0), ProgramFailure::AccountAlreadyInUse);
        assert_eq!(ProgramFailure::from_code(3012), ProgramFailure::AccountNotInitialized);
        assert_eq!(ProgramFailure::from_code(42), ProgramFailure::Other(42));
        assert_eq!(ProgramFailure::from_code(3012).message(), None);
    }

    #[test]
    fn send_errors_map_to_tiers() {
        assert_matches!(
            NotesClientError::from(SendError::Program { code: 6004 }),
            NotesClientError::Program(ProgramFailure::Unauthorized)
        );
        assert_matches!(
            NotesClientError::from(SendError::Rpc("timeout".into())),
            NotesClientError::Rpc(_)
        );
        assert!(NotesClientError::from(SendError::NotConnected).is_precondition());
    }
}
