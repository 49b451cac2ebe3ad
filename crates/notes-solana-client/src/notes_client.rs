//! Client for the notes program.
//!
//! This client can:
//! - derive note PDAs for the connected wallet
//! - list the notes of an author with server-side filters
//! - build, sign, submit and confirm createNote/updateNote/deleteNote
//!
//! Every operation checks the session first and fails with a
//! `PreconditionError` (nothing sent) when no signing wallet is attached.
//! Operations return only once the ledger has confirmed or the call failed.

use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::account::Note;
use crate::error::{NotesClientError, PreconditionError};
use crate::idl::{author_offset, NOTE_ACCOUNT};
use crate::instruction;
use crate::ledger::{AccountFilter, Ledger, Session};
use crate::pda::{self, NotePda};

pub struct NotesClient<L, S> {
    program_id: Pubkey,
    ledger: L,
    session: S,
}

impl<L: Ledger, S: Session> NotesClient<L, S> {
    pub fn new(program_id: Pubkey, ledger: L, session: S) -> Self {
        Self { program_id, ledger, session }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Address of the connected wallet's note `title`.
    pub fn note_address(&self, title: &str) -> Result<NotePda, PreconditionError> {
        let author = self.signer()?;
        Ok(pda::derive_note_address(&author, title, &self.program_id)?)
    }

    /// Filters selecting `Note` accounts written by `owner`.
    pub fn owner_filters(owner: &Pubkey) -> Vec<AccountFilter> {
        vec![
            AccountFilter::memcmp(0, NOTE_ACCOUNT.discriminator().to_vec()),
            AccountFilter::memcmp(author_offset(), owner.to_bytes().to_vec()),
        ]
    }

    /// All notes authored by `owner`, oldest first.
    ///
    /// Accounts that do not decode as a `Note` are skipped.
    pub async fn list(&self, owner: &Pubkey) -> Result<Vec<Note>, NotesClientError> {
        let filters = Self::owner_filters(owner);
        let accounts = self.ledger.program_accounts(&self.program_id, &filters).await?;

        let mut notes: Vec<Note> = accounts
            .into_iter()
            .filter_map(|(address, data)| match Note::decode(address, &data) {
                Ok(note) if note.author == *owner => Some(note),
                Ok(_) => None,
                Err(err) => {
                    tracing::warn!(%address, %err, "skipping undecodable note account");
                    None
                }
            })
            .collect();
        notes.sort_by(|a, b| (a.created_at, &a.title).cmp(&(b.created_at, &b.title)));
        tracing::debug!(%owner, count = notes.len(), "listed notes");
        Ok(notes)
    }

    /// Notes of the connected wallet.
    pub async fn list_mine(&self) -> Result<Vec<Note>, NotesClientError> {
        let owner = self.session.identity().ok_or(PreconditionError::NotConnected)?;
        self.list(&owner).await
    }

    pub async fn create(&self, title: &str, content: &str) -> Result<Signature, NotesClientError> {
        let author = self.signer()?;
        let pda = pda::derive_note_address(&author, title, &self.program_id)
            .map_err(PreconditionError::from)?;
        let ix = instruction::create_note(&self.program_id, pda.address, author, title, content)
            .map_err(PreconditionError::from)?;
        self.submit("createNote", &pda.address, ix).await
    }

    /// Replace the content of the connected wallet's note `title`.
    pub async fn update(&self, title: &str, new_content: &str) -> Result<Signature, NotesClientError> {
        let pda = self.note_address(title)?;
        self.update_at(pda.address, new_content).await
    }

    /// Replace the content of the note stored at `note`.
    pub async fn update_at(&self, note: Pubkey, new_content: &str) -> Result<Signature, NotesClientError> {
        let author = self.signer()?;
        let ix = instruction::update_note(&self.program_id, note, author, new_content)
            .map_err(PreconditionError::from)?;
        self.submit("updateNote", &note, ix).await
    }

    /// Delete the connected wallet's note `title`.
    pub async fn delete(&self, title: &str) -> Result<Signature, NotesClientError> {
        let pda = self.note_address(title)?;
        self.delete_at(pda.address).await
    }

    /// Delete the note stored at `note`.
    pub async fn delete_at(&self, note: Pubkey) -> Result<Signature, NotesClientError> {
        let author = self.signer()?;
        let ix = instruction::delete_note(&self.program_id, note, author)
            .map_err(PreconditionError::from)?;
        self.submit("deleteNote", &note, ix).await
    }

    fn signer(&self) -> Result<Pubkey, PreconditionError> {
        let identity = self.session.identity().ok_or(PreconditionError::NotConnected)?;
        if !self.session.can_sign() {
            return Err(PreconditionError::CannotSign);
        }
        Ok(identity)
    }

    async fn submit(
        &self,
        name: &'static str,
        note: &Pubkey,
        ix: Instruction,
    ) -> Result<Signature, NotesClientError> {
        tracing::debug!(instruction = name, %note, "submitting");
        match self.session.sign_and_send(ix).await {
            Ok(sig) => {
                tracing::debug!(instruction = name, %note, %sig, "confirmed");
                Ok(sig)
            }
            Err(err) => {
                let err = NotesClientError::from(err);
                tracing::debug!(instruction = name, %note, %err, "failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProgramFailure, SendError};
    use crate::mock::{MemoryLedger, MemorySession};
    use crate::pda::AddressError;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn client() -> (MemoryLedger, NotesClient<MemoryLedger, MemorySession>) {
        let ledger = MemoryLedger::new(Pubkey::new_unique());
        let session = ledger.session(Pubkey::new_unique());
        let client = NotesClient::new(ledger.program_id(), ledger.clone(), session);
        (ledger, client)
    }

    fn other_client(ledger: &MemoryLedger) -> NotesClient<MemoryLedger, MemorySession> {
        NotesClient::new(ledger.program_id(), ledger.clone(), ledger.session(Pubkey::new_unique()))
    }

    #[tokio::test]
    async fn groceries_scenario() {
        let (_, client) = client();

        client.create("Groceries", "milk, eggs").await.unwrap();
        let notes = client.list_mine().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Groceries");
        assert_eq!(notes[0].content, "milk, eggs");
        let created = notes[0].clone();

        client.update("Groceries", "milk, eggs, bread").await.unwrap();
        let notes = client.list_mine().await.unwrap();
        assert_eq!(notes[0].content, "milk, eggs, bread");
        assert!(notes[0].last_updated > notes[0].created_at);
        assert_eq!(notes[0].created_at, created.created_at);
        assert_eq!(notes[0].title, created.title);
        assert_eq!(notes[0].address, created.address);

        client.delete("Groceries").await.unwrap();
        assert!(client.list_mine().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_title_fails_and_keeps_one() {
        let (_, client) = client();
        client.create("dup", "first").await.unwrap();
        let err = client.create("dup", "second").await.unwrap_err();
        assert_eq!(err.program_failure(), Some(ProgramFailure::AccountAlreadyInUse));

        let notes = client.list_mine().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "first");
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner() {
        let (ledger, alice) = client();
        let bob = other_client(&ledger);
        alice.create("a1", "x").await.unwrap();
        alice.create("a2", "y").await.unwrap();
        bob.create("a1", "z").await.unwrap();

        let mine = alice.list_mine().await.unwrap();
        assert_eq!(mine.iter().map(|n| n.title.as_str()).collect::<Vec<_>>(), ["a1", "a2"]);
        assert_eq!(bob.list_mine().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn foreign_identity_is_unauthorized() {
        let (ledger, alice) = client();
        alice.create("secret", "alice's").await.unwrap();
        let target = alice.note_address("secret").unwrap().address;

        let mallory = other_client(&ledger);
        let err = mallory.update_at(target, "pwned").await.unwrap_err();
        assert_eq!(err.program_failure(), Some(ProgramFailure::Unauthorized));
        let err = mallory.delete_at(target).await.unwrap_err();
        assert_eq!(err.program_failure(), Some(ProgramFailure::Unauthorized));

        let notes = alice.list_mine().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "alice's");
    }

    #[tokio::test]
    async fn missing_note_is_not_initialized() {
        let (_, client) = client();
        let err = client.update("nope", "x").await.unwrap_err();
        assert_eq!(err.program_failure(), Some(ProgramFailure::AccountNotInitialized));
        let err = client.delete("nope").await.unwrap_err();
        assert_eq!(err.program_failure(), Some(ProgramFailure::AccountNotInitialized));
    }

    #[tokio::test]
    async fn delete_leaves_other_notes() {
        let (_, client) = client();
        for t in ["one", "two", "three"] {
            client.create(t, "body").await.unwrap();
        }
        client.delete("two").await.unwrap();
        let titles: Vec<_> = client.list_mine().await.unwrap().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, ["one", "three"]);
    }

    #[tokio::test]
    async fn program_rejects_invalid_fields() {
        let (_, client) = client();
        let err = client.create("t", &"c".repeat(1001)).await.unwrap_err();
        assert_eq!(err.program_failure(), Some(ProgramFailure::ContentTooLong));
        let err = client.create("t", "   ").await.unwrap_err();
        assert_eq!(err.program_failure(), Some(ProgramFailure::ContentEmpty));
    }

    #[tokio::test]
    async fn preconditions_send_nothing() {
        let ledger = MemoryLedger::new(Pubkey::new_unique());
        let client = NotesClient::new(ledger.program_id(), ledger.clone(), ledger.disconnected_session());

        assert_matches!(
            client.create("a", "b").await,
            Err(NotesClientError::Precondition(PreconditionError::NotConnected))
        );
        assert_matches!(client.note_address("a"), Err(PreconditionError::NotConnected));
        assert_matches!(
            client.list_mine().await,
            Err(NotesClientError::Precondition(PreconditionError::NotConnected))
        );

        client.session().connect(Pubkey::new_unique());
        client.session().set_can_sign(false);
        assert_matches!(
            client.delete("a").await,
            Err(NotesClientError::Precondition(PreconditionError::CannotSign))
        );

        client.session().set_can_sign(true);
        assert_matches!(
            client.create(&"x".repeat(40), "b").await,
            Err(NotesClientError::Precondition(PreconditionError::Address(AddressError::SeedTooLong { len: 40 })))
        );
        assert_eq!(ledger.submissions(), 0);
        assert_eq!(ledger.fetches(), 0);
    }

    #[tokio::test]
    async fn transport_failures_are_rpc_tier() {
        let (ledger, client) = client();
        ledger.fail_next_send(SendError::Rpc("blockhash not found".into()));
        assert_matches!(client.create("a", "b").await, Err(NotesClientError::Rpc(_)));

        ledger.fail_fetches(true);
        assert_matches!(client.list_mine().await, Err(NotesClientError::Rpc(_)));
    }

    #[tokio::test]
    async fn foreign_accounts_are_skipped() {
        let (ledger, client) = client();
        client.create("real", "x").await.unwrap();

        // right author bytes at the filter offset, wrong discriminator
        let owner = client.session().identity().unwrap();
        let mut junk = vec![0u8; 8];
        junk.extend_from_slice(owner.as_ref());
        ledger.insert_raw(Pubkey::new_unique(), junk);

        // right discriminator, truncated body
        let mut truncated = NOTE_ACCOUNT.discriminator().to_vec();
        truncated.extend_from_slice(owner.as_ref());
        truncated.extend_from_slice(&[50, 0, 0, 0]);
        ledger.insert_raw(Pubkey::new_unique(), truncated);

        let notes = client.list_mine().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "real");
    }

    #[tokio::test]
    async fn boundary_fields_read_back_unchanged() {
        let (_, client) = client();
        let cases = [
            ("t".repeat(32), "c".to_string()),
            ("  padded title ".to_string(), " padded content\n".to_string()),
            ("漢字の題名".to_string(), "é".repeat(1000)),
        ];
        for (title, content) in &cases {
            client.create(title, content).await.unwrap();
        }

        let notes = client.list_mine().await.unwrap();
        assert_eq!(notes.len(), cases.len());
        for (title, content) in &cases {
            let found: Vec<_> = notes.iter().filter(|n| &n.title == title).collect();
            assert_eq!(found.len(), 1, "title {title:?}");
            assert_eq!(&found[0].content, content);
            assert_eq!(found[0].address, client.note_address(title).unwrap().address);
        }
    }

    fn note_title() -> impl Strategy<Value = String> {
        (" {0,2}", "[a-zA-Z0-9é漢][a-zA-Z0-9é漢 ]{0,9}", " {0,2}")
            .prop_map(|(pre, body, post)| format!("{pre}{body}{post}"))
            .prop_filter("title must fit in one seed", |t| t.len() <= 32)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn created_note_lists_once(title in note_title(), content in "[a-zé漢][a-zé漢 \n]{0,999}") {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let notes = rt.block_on(async {
                let (_, client) = client();
                client.create(&title, &content).await.unwrap();
                client.list_mine().await.unwrap()
            });
            prop_assert_eq!(notes.len(), 1);
            prop_assert_eq!(&notes[0].title, &title);
            prop_assert_eq!(&notes[0].content, &content);
        }
    }
}
