//! Local validation of note fields.
//!
//! The on-chain program enforces the same rules. Checking them here first
//! avoids a wasted round-trip and gives immediate feedback. The `Display`
//! output of [`ValidationError`] is the user-facing status message.
//!
//! Lengths are counted in characters of the text as submitted. Emptiness is
//! checked after trimming.

use thiserror::Error;

use crate::limits::{MAX_CONTENT_LEN, MAX_SEED_LEN, MAX_TITLE_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title and content cannot be empty.")]
    Empty,

    #[error("Content cannot be empty.")]
    ContentEmpty,

    #[error("Title cannot be longer than {MAX_TITLE_LEN} chars")]
    TitleTooLong { chars: usize },

    #[error("Content cannot be longer than {MAX_CONTENT_LEN} chars")]
    ContentTooLong { chars: usize },

    #[error("Title cannot be longer than {MAX_SEED_LEN} bytes when stored on chain")]
    TitleSeedTooLong { bytes: usize },
}

/// Validate the fields of a note about to be created.
pub fn validate_new_note(title: &str, content: &str) -> Result<(), ValidationError> {
    if is_blank(title) || is_blank(content) {
        return Err(ValidationError::Empty);
    }
    let chars = title.chars().count();
    if chars > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong { chars });
    }
    check_content_len(content)?;
    if title.len() > MAX_SEED_LEN {
        return Err(ValidationError::TitleSeedTooLong { bytes: title.len() });
    }
    Ok(())
}

/// Validate replacement content for an existing note.
pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    if is_blank(content) {
        return Err(ValidationError::ContentEmpty);
    }
    check_content_len(content)
}

/// Character count as shown next to an input field.
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

fn check_content_len(content: &str) -> Result<(), ValidationError> {
    let chars = content.chars().count();
    if chars > MAX_CONTENT_LEN {
        return Err(ValidationError::ContentTooLong { chars });
    }
    Ok(())
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
