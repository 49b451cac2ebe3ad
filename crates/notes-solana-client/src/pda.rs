//! PDA derivation helpers for the notes program.
//!
//! These helpers implement deterministic address derivation and must match
//! the on-chain program's seeds: `["note", author, title]`.

use solana_program::pubkey::{Pubkey, MAX_SEED_LEN};
use thiserror::Error;

use crate::constants::SEED_NOTE;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("title is {len} bytes; address seeds are limited to {MAX_SEED_LEN} bytes")]
    SeedTooLong { len: usize },

    #[error("no viable bump seed for this title")]
    NoViableBump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotePda {
    pub address: Pubkey,
    pub bump: u8,
}

/// Derive the account address of the note `title` owned by `author`.
///
/// The title is used as raw UTF-8 bytes, untrimmed and untruncated, so two
/// titles that differ only in whitespace are different notes.
pub fn derive_note_address(
    author: &Pubkey,
    title: &str,
    program_id: &Pubkey,
) -> Result<NotePda, AddressError> {
    let title = title.as_bytes();
    if title.len() > MAX_SEED_LEN {
        return Err(AddressError::SeedTooLong { len: title.len() });
    }
    Pubkey::try_find_program_address(&[SEED_NOTE, author.as_ref(), title], program_id)
        .map(|(address, bump)| NotePda { address, bump })
        .ok_or(AddressError::NoViableBump)
}

/// Check `address` against the seeds it should have been derived from.
pub fn is_note_address(address: &Pubkey, author: &Pubkey, title: &str, program_id: &Pubkey) -> bool {
    derive_note_address(author, title, program_id)
        .map(|pda| pda.address == *address)
        .unwrap_or(false)
}
