//! Typed view of `Note` accounts.
//!
//! Account data is an 8-byte discriminator followed by the Borsh encoding of
//! the fields in schema order. Accounts are allocated at maximum size, so
//! zero padding after the last field is expected and ignored.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;
use thiserror::Error;

use crate::constants::DISCRIMINATOR_LEN;
use crate::idl::NOTE_ACCOUNT;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("account data too short: {0} bytes")]
    TooShort(usize),

    #[error("account discriminator mismatch")]
    Discriminator,

    #[error("malformed note account: {0}")]
    Borsh(#[from] std::io::Error),
}

/// A note as stored by the program, together with the address it lives at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub address: Pubkey,
    pub author: Pubkey,
    pub title: String,
    pub content: String,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds.
    pub last_updated: i64,
}

/// Borsh image of the account body, field order as in the schema.
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
struct NoteAccountData {
    author: [u8; 32],
    title: String,
    content: String,
    created_at: i64,
    last_updated: i64,
}

impl Note {
    /// Decode the data of the account at `address`.
    pub fn decode(address: Pubkey, data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(DecodeError::TooShort(data.len()));
        }
        let (disc, mut body) = data.split_at(DISCRIMINATOR_LEN);
        if disc != NOTE_ACCOUNT.discriminator() {
            return Err(DecodeError::Discriminator);
        }
        let raw = NoteAccountData::deserialize(&mut body)?;
        Ok(Self {
            address,
            author: Pubkey::new_from_array(raw.author),
            title: raw.title,
            content: raw.content,
            created_at: raw.created_at,
            last_updated: raw.last_updated,
        })
    }

    /// Encode as account data, discriminator included, without padding.
    pub fn encode(&self) -> std::io::Result<Vec<u8>> {
        let raw = NoteAccountData {
            author: self.author.to_bytes(),
            title: self.title.clone(),
            content: self.content.clone(),
            created_at: self.created_at,
            last_updated: self.last_updated,
        };
        let mut out = NOTE_ACCOUNT.discriminator().to_vec();
        borsh::to_writer(&mut out, &raw)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn sample() -> Note {
        Note {
            address: Pubkey::new_unique(),
            author: Pubkey::new_unique(),
            title: "Groceries".to_string(),
            content: "milk, eggs".to_string(),
            created_at: 1_700_000_000,
            last_updated: 1_700_000_050,
        }
    }

    #[test]
    fn decode_ignores_padding() {
        let note = sample();
        let mut data = note.encode().unwrap();
        data.resize(data.len() + 64, 0);
        assert_eq!(Note::decode(note.address, &data).unwrap(), note);
    }

    #[test]
    fn encoded_length_matches_layout() {
        let note = sample();
        let data = note.encode().unwrap();
        let expected = DISCRIMINATOR_LEN + 32 + (4 + note.title.len()) + (4 + note.content.len()) + 8 + 8;
        assert_eq!(data.len(), expected);
        assert_eq!(&data[..DISCRIMINATOR_LEN], NOTE_ACCOUNT.discriminator());
    }

    #[test]
    fn author_sits_at_filter_offset() {
        let note = sample();
        let data = note.encode().unwrap();
        let off = crate::idl::author_offset();
        assert_eq!(&data[off..off + 32], note.author.as_ref());
    }

    #[test]
    fn rejects_foreign_accounts() {
        let note = sample();
        let mut data = note.encode().unwrap();
        data[0] ^= 0xff;
        assert_matches!(Note::decode(note.address, &data), Err(DecodeError::Discriminator));
        assert_matches!(Note::decode(note.address, &[1, 2, 3]), Err(DecodeError::TooShort(3)));

        let data = note.encode().unwrap();
        assert_matches!(
            Note::decode(note.address, &data[..data.len() - 4]),
            Err(DecodeError::Borsh(_))
        );
    }
}
