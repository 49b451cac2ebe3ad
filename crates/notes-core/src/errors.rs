//! Error type for notes-core.

use thiserror::Error;

pub type NotesResult<T> = Result<T, NotesError>;

#[derive(Debug, Error)]
pub enum NotesError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Validation(#[from] crate::validate::ValidationError),

    #[error("time formatting: {0}")]
    Time(String),
}

impl NotesError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
