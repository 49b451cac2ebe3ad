//! Interface descriptor of the notes program.
//!
//! This is the wire contract with the deployed program: instruction names,
//! account order and flags, argument lists, the `Note` account schema and the
//! error table. Renaming a field or reordering accounts breaks compatibility,
//! so instruction builders and the account filter read from here instead of
//! repeating the layout.

use serde::Serialize;
use sha2::{Digest, Sha256};
use solana_program::instruction::AccountMeta;
use solana_program::pubkey::Pubkey;
use thiserror::Error;

use crate::constants::{ACCOUNT_NAMESPACE, DISCRIMINATOR_LEN, IX_NAMESPACE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdlError {
    #[error("{instruction} expects {expected} accounts, got {got}")]
    AccountCount {
        instruction: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("failed to encode {instruction} arguments: {reason}")]
    Encode {
        instruction: &'static str,
        reason: String,
    },
}

/// Borsh-level type of an argument or account field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldType {
    #[serde(rename = "publicKey")]
    PublicKey,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "i64")]
    I64,
}

impl FieldType {
    /// Encoded size when it does not depend on the value.
    pub const fn fixed_size(&self) -> Option<usize> {
        match self {
            Self::PublicKey => Some(32),
            Self::I64 => Some(8),
            Self::String => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSpec {
    pub name: &'static str,
    pub is_mut: bool,
    pub is_signer: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct InstructionSpec {
    /// Name as it appears in the IDL.
    pub name: &'static str,
    /// Rust handler name, the input of the discriminator hash.
    #[serde(skip)]
    pub method: &'static str,
    pub accounts: &'static [AccountSpec],
    pub args: &'static [FieldSpec],
}

impl InstructionSpec {
    pub fn discriminator(&self) -> [u8; DISCRIMINATOR_LEN] {
        discriminator(IX_NAMESPACE, self.method)
    }

    pub fn discriminator_hex(&self) -> String {
        hex::encode(self.discriminator())
    }

    /// Pair `keys` with the declared accounts, in declaration order.
    pub fn account_metas(&self, keys: &[Pubkey]) -> Result<Vec<AccountMeta>, IdlError> {
        if keys.len() != self.accounts.len() {
            return Err(IdlError::AccountCount {
                instruction: self.name,
                expected: self.accounts.len(),
                got: keys.len(),
            });
        }
        Ok(self
            .accounts
            .iter()
            .zip(keys)
            .map(|(spec, key)| {
                if spec.is_mut {
                    AccountMeta::new(*key, spec.is_signer)
                } else {
                    AccountMeta::new_readonly(*key, spec.is_signer)
                }
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AccountSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl AccountSchema {
    pub fn discriminator(&self) -> [u8; DISCRIMINATOR_LEN] {
        discriminator(ACCOUNT_NAMESPACE, self.name)
    }

    pub fn discriminator_hex(&self) -> String {
        hex::encode(self.discriminator())
    }

    /// Byte offset of `field` within the serialized account.
    ///
    /// Returns `None` if the field is unknown or is preceded by a
    /// variable-length field (its offset would depend on the data).
    pub fn field_offset(&self, field: &str) -> Option<usize> {
        let mut offset = DISCRIMINATOR_LEN;
        for f in self.fields {
            if f.name == field {
                return Some(offset);
            }
            offset += f.ty.fixed_size()?;
        }
        None
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ErrorSpec {
    pub code: u32,
    pub name: &'static str,
    pub msg: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProgramInterface {
    pub version: &'static str,
    pub name: &'static str,
    pub instructions: &'static [InstructionSpec],
    pub accounts: &'static [AccountSchema],
    pub errors: &'static [ErrorSpec],
}

impl ProgramInterface {
    pub fn instruction(&self, name: &str) -> Option<&InstructionSpec> {
        self.instructions.iter().find(|ix| ix.name == name)
    }

    pub fn account(&self, name: &str) -> Option<&AccountSchema> {
        self.accounts.iter().find(|a| a.name == name)
    }

    pub fn error(&self, code: u32) -> Option<&ErrorSpec> {
        self.errors.iter().find(|e| e.code == code)
    }
}

pub const CREATE_NOTE: InstructionSpec = InstructionSpec {
    name: "createNote",
    method: "create_note",
    accounts: &[
        AccountSpec { name: "note", is_mut: true, is_signer: false },
        AccountSpec { name: "author", is_mut: true, is_signer: true },
        AccountSpec { name: "systemProgram", is_mut: false, is_signer: false },
    ],
    args: &[
        FieldSpec { name: "title", ty: FieldType::String },
        FieldSpec { name: "content", ty: FieldType::String },
    ],
};

pub const UPDATE_NOTE: InstructionSpec = InstructionSpec {
    name: "updateNote",
    method: "update_note",
    accounts: &[
        AccountSpec { name: "note", is_mut: true, is_signer: false },
        AccountSpec { name: "author", is_mut: false, is_signer: true },
    ],
    args: &[FieldSpec { name: "newContent", ty: FieldType::String }],
};

pub const DELETE_NOTE: InstructionSpec = InstructionSpec {
    name: "deleteNote",
    method: "delete_note",
    accounts: &[
        AccountSpec { name: "note", is_mut: true, is_signer: false },
        AccountSpec { name: "author", is_mut: true, is_signer: true },
    ],
    args: &[],
};

pub const NOTE_ACCOUNT: AccountSchema = AccountSchema {
    name: "Note",
    fields: &[
        FieldSpec { name: "author", ty: FieldType::PublicKey },
        FieldSpec { name: "title", ty: FieldType::String },
        FieldSpec { name: "content", ty: FieldType::String },
        FieldSpec { name: "createdAt", ty: FieldType::I64 },
        FieldSpec { name: "lastUpdated", ty: FieldType::I64 },
    ],
};

pub static NOTES_IDL: ProgramInterface = ProgramInterface {
    version: "0.1.0",
    name: "notes_dapp",
    instructions: &[CREATE_NOTE, UPDATE_NOTE, DELETE_NOTE],
    accounts: &[NOTE_ACCOUNT],
    errors: &[
        ErrorSpec { code: 6000, name: "TitleTooLong", msg: "The title cannot exceed 100 characters." },
        ErrorSpec { code: 6001, name: "ContentTooLong", msg: "The content cannot exceed 1000 characters." },
        ErrorSpec { code: 6002, name: "TitleEmpty", msg: "The title cannot be empty." },
        ErrorSpec { code: 6003, name: "ContentEmpty", msg: "The content cannot be empty." },
        ErrorSpec { code: 6004, name: "Unauthorized", msg: "Unauthorized to perform this action." },
    ],
};

/// Offset of `Note.author`, used by the server-side owner filter.
pub fn author_offset() -> usize {
    // author is the first field; it can never follow a variable-size field
    NOTE_ACCOUNT.field_offset("author").unwrap_or(DISCRIMINATOR_LEN)
}

/// Anchor discriminator: first 8 bytes of `sha256("<namespace>:<name>")`.
pub fn discriminator(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let mut h = Sha256::new();
    h.update(namespace.as_bytes());
    h.update(b":");
    h.update(name.as_bytes());
    let digest = h.finalize();
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_filter_offset_is_header_size() {
        assert_eq!(author_offset(), 8);
        assert_eq!(NOTE_ACCOUNT.field_offset("title"), Some(40));
        // content follows a string
        assert_eq!(NOTE_ACCOUNT.field_offset("content"), None);
        assert_eq!(NOTE_ACCOUNT.field_offset("missing"), None);
    }

    #[test]
    fn discriminators_follow_anchor_sighash() {
        let mut h = Sha256::new();
        h.update(b"global:create_note");
        assert_eq!(CREATE_NOTE.discriminator()[..], h.finalize()[..8]);

        let mut h = Sha256::new();
        h.update(b"account:Note");
        assert_eq!(NOTE_ACCOUNT.discriminator()[..], h.finalize()[..8]);

        let ds = [
            CREATE_NOTE.discriminator(),
            UPDATE_NOTE.discriminator(),
            DELETE_NOTE.discriminator(),
        ];
        assert_ne!(ds[0], ds[1]);
        assert_ne!(ds[1], ds[2]);
        assert_ne!(ds[0], ds[2]);
    }

    #[test]
    fn account_metas_follow_table() {
        let note = Pubkey::new_unique();
        let author = Pubkey::new_unique();
        let metas = UPDATE_NOTE.account_metas(&[note, author]).unwrap();
        assert_eq!(metas[0], AccountMeta::new(note, false));
        assert_eq!(metas[1], AccountMeta::new_readonly(author, true));

        let e = DELETE_NOTE.account_metas(&[note]).unwrap_err();
        assert_eq!(
            e,
            IdlError::AccountCount { instruction: "deleteNote", expected: 2, got: 1 }
        );
    }

    #[test]
    fn error_table_is_contiguous() {
        for (i, e) in NOTES_IDL.errors.iter().enumerate() {
            assert_eq!(e.code, 6000 + i as u32);
        }
        assert_eq!(NOTES_IDL.error(6004).map(|e| e.name), Some("Unauthorized"));
        assert!(NOTES_IDL.error(6005).is_none());
    }

    #[test]
    fn lookups_by_name() {
        assert_eq!(NOTES_IDL.instruction("updateNote").map(|i| i.args.len()), Some(1));
        assert!(NOTES_IDL.instruction("update_note").is_none());
        assert_eq!(NOTES_IDL.account("Note").map(|a| a.fields.len()), Some(5));
    }

    #[test]
    fn serializes_like_anchor_idl() {
        let v = serde_json::to_value(&NOTES_IDL).unwrap();
        assert_eq!(v["name"], "notes_dapp");
        assert_eq!(v["instructions"][0]["accounts"][1]["isSigner"], true);
        assert_eq!(v["accounts"][0]["fields"][0]["type"], "publicKey");
        assert!(v["instructions"][0].get("method").is_none());
    }
}
