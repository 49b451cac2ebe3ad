//! Instruction encoding for the notes program.
//!
//! Data is the instruction's 8-byte discriminator followed by the
//! Borsh-encoded arguments, as the program's Anchor entrypoint expects.

use std::io;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_program::system_program;

use crate::constants::DISCRIMINATOR_LEN;
use crate::idl::{IdlError, InstructionSpec, CREATE_NOTE, DELETE_NOTE, UPDATE_NOTE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesIx {
    CreateNote { title: String, content: String },
    UpdateNote { new_content: String },
    DeleteNote,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct CreateNoteArgs {
    title: String,
    content: String,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct UpdateNoteArgs {
    new_content: String,
}

impl NotesIx {
    pub fn spec(&self) -> &'static InstructionSpec {
        match self {
            NotesIx::CreateNote { .. } => &CREATE_NOTE,
            NotesIx::UpdateNote { .. } => &UPDATE_NOTE,
            NotesIx::DeleteNote => &DELETE_NOTE,
        }
    }

    /// Discriminator followed by the Borsh-encoded arguments.
    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        let mut out = self.spec().discriminator().to_vec();
        match self {
            NotesIx::CreateNote { title, content } => borsh::to_writer(
                &mut out,
                &CreateNoteArgs { title: title.clone(), content: content.clone() },
            )?,
            NotesIx::UpdateNote { new_content } => {
                borsh::to_writer(&mut out, &UpdateNoteArgs { new_content: new_content.clone() })?
            }
            NotesIx::DeleteNote => {}
        }
        Ok(out)
    }

    /// Decode instruction data. Returns `None` for unknown or malformed data.
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return None;
        }
        let (disc, mut args) = data.split_at(DISCRIMINATOR_LEN);
        if disc == CREATE_NOTE.discriminator() {
            let a = CreateNoteArgs::deserialize(&mut args).ok()?;
            Some(NotesIx::CreateNote { title: a.title, content: a.content })
        } else if disc == UPDATE_NOTE.discriminator() {
            let a = UpdateNoteArgs::deserialize(&mut args).ok()?;
            Some(NotesIx::UpdateNote { new_content: a.new_content })
        } else if disc == DELETE_NOTE.discriminator() {
            Some(NotesIx::DeleteNote)
        } else {
            None
        }
    }
}

/// Build `createNote`. `note` must be the PDA of `(author, title)`.
pub fn create_note(
    program_id: &Pubkey,
    note: Pubkey,
    author: Pubkey,
    title: &str,
    content: &str,
) -> Result<Instruction, IdlError> {
    let ix = NotesIx::CreateNote { title: title.to_string(), content: content.to_string() };
    build(program_id, &ix, &[note, author, system_program::id()])
}

/// Build `updateNote`.
pub fn update_note(
    program_id: &Pubkey,
    note: Pubkey,
    author: Pubkey,
    new_content: &str,
) -> Result<Instruction, IdlError> {
    let ix = NotesIx::UpdateNote { new_content: new_content.to_string() };
    build(program_id, &ix, &[note, author])
}

/// Build `deleteNote`. Rent is returned to `author`.
pub fn delete_note(program_id: &Pubkey, note: Pubkey, author: Pubkey) -> Result<Instruction, IdlError> {
    build(program_id, &NotesIx::DeleteNote, &[note, author])
}

fn build(program_id: &Pubkey, ix: &NotesIx, keys: &[Pubkey]) -> Result<Instruction, IdlError> {
    let spec = ix.spec();
    let data = ix.to_vec().map_err(|e| IdlError::Encode {
        instruction: spec.name,
        reason: e.to_string(),
    })?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: spec.account_metas(keys)?,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_note_layout() {
        let program = Pubkey::new_unique();
        let note = Pubkey::new_unique();
        let author = Pubkey::new_unique();
        let ix = create_note(&program, note, author, "hi", "there").unwrap();

        assert_eq!(ix.program_id, program);
        assert_eq!(ix.accounts.len(), 3);
        assert_eq!(ix.accounts[0].pubkey, note);
        assert!(ix.accounts[1].is_signer && ix.accounts[1].is_writable);
        assert_eq!(ix.accounts[2].pubkey, system_program::id());

        let mut expected = CREATE_NOTE.discriminator().to_vec();
        expected.extend_from_slice(&2u32.to_le_bytes());
        expected.extend_from_slice(b"hi");
        expected.extend_from_slice(&5u32.to_le_bytes());
        expected.extend_from_slice(b"there");
        assert_eq!(ix.data, expected);
    }

    #[test]
    fn data_is_discriminator_then_args() {
        let ix = NotesIx::UpdateNote { new_content: "é".to_string() };
        let data = ix.to_vec().unwrap();
        assert_eq!(&data[..DISCRIMINATOR_LEN], UPDATE_NOTE.discriminator());
        assert_eq!(&data[DISCRIMINATOR_LEN..], &[2, 0, 0, 0, 0xc3, 0xa9]);
        assert_eq!(NotesIx::from_slice(&data), Some(ix));

        assert_eq!(NotesIx::DeleteNote.to_vec().unwrap(), DELETE_NOTE.discriminator().to_vec());
    }

    #[test]
    fn decode_recovers_arguments() {
        let program = Pubkey::new_unique();
        let (note, author) = (Pubkey::new_unique(), Pubkey::new_unique());

        let ix = update_note(&program, note, author, "new body").unwrap();
        assert_eq!(
            NotesIx::from_slice(&ix.data),
            Some(NotesIx::UpdateNote { new_content: "new body".to_string() })
        );

        let ix = delete_note(&program, note, author).unwrap();
        assert_eq!(ix.data.len(), DISCRIMINATOR_LEN);
        assert_eq!(NotesIx::from_slice(&ix.data), Some(NotesIx::DeleteNote));
    }

    #[test]
    fn unknown_data_is_rejected() {
        assert_eq!(NotesIx::from_slice(&[0; 4]), None);
        assert_eq!(NotesIx::from_slice(&[0; 16]), None);

        let mut data = CREATE_NOTE.discriminator().to_vec();
        data.extend_from_slice(&[255, 255, 255, 255]);
        assert_eq!(NotesIx::from_slice(&data), None);
    }
}
