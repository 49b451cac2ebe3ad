//! In-memory ledger that emulates the notes program.
//!
//! `MemoryLedger` stores note accounts in a map and executes submitted
//! instructions with the program's rules: seed check, duplicate check,
//! field validation, author check. Failures carry the same custom codes the
//! deployed program returns. A monotonic clock advances on every mutation.
//!
//! It also counts fetches and submissions and can inject failures, which is
//! what the client and controller tests are built on.

use std::collections::BTreeMap;
use std::future::poll_fn;
use std::sync::Arc;
use std::task::Poll;

use parking_lot::{Mutex, RwLock};
use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::account::Note;
use crate::error::{ProgramFailure, SendError};
use crate::instruction::NotesIx;
use crate::ledger::{AccountFilter, Ledger, LedgerError, Session};
use crate::pda::is_note_address;
use notes_core::limits::{MAX_CONTENT_LEN, MAX_TITLE_LEN};

/// Allocated size of a note account: header, author, two length-prefixed
/// strings at their limits, two timestamps.
pub const NOTE_ACCOUNT_SPACE: usize = 8 + 32 + (4 + MAX_TITLE_LEN) + (4 + MAX_CONTENT_LEN) + 8 + 8;

/// Clock value of the first mutation.
pub const GENESIS_TIMESTAMP: i64 = 1_700_000_000;

/// Anchor's `InstructionFallbackNotFound`.
const CODE_UNKNOWN_INSTRUCTION: u32 = 101;
/// Anchor's `AccountNotEnoughKeys`.
const CODE_NOT_ENOUGH_KEYS: u32 = 3005;

#[derive(Clone)]
pub struct MemoryLedger {
    inner: Arc<Mutex<LedgerState>>,
}

struct LedgerState {
    program_id: Pubkey,
    accounts: BTreeMap<Pubkey, Vec<u8>>,
    clock: i64,
    submissions: usize,
    fetches: usize,
    fail_next_send: Option<SendError>,
    fail_fetches: bool,
}

impl MemoryLedger {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LedgerState {
                program_id,
                accounts: BTreeMap::new(),
                clock: GENESIS_TIMESTAMP - 1,
                submissions: 0,
                fetches: 0,
                fail_next_send: None,
                fail_fetches: false,
            })),
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.inner.lock().program_id
    }

    /// A wallet for `identity` that submits to this ledger.
    pub fn session(&self, identity: Pubkey) -> MemorySession {
        MemorySession {
            ledger: self.clone(),
            identity: RwLock::new(Some(identity)),
            can_sign: RwLock::new(true),
        }
    }

    /// A wallet with nothing attached yet.
    pub fn disconnected_session(&self) -> MemorySession {
        MemorySession {
            ledger: self.clone(),
            identity: RwLock::new(None),
            can_sign: RwLock::new(true),
        }
    }

    /// Number of sign-and-send calls that reached the ledger.
    pub fn submissions(&self) -> usize {
        self.inner.lock().submissions
    }

    /// Number of account fetches that reached the ledger.
    pub fn fetches(&self) -> usize {
        self.inner.lock().fetches
    }

    /// Fail the next submission with `err` without executing it.
    pub fn fail_next_send(&self, err: SendError) {
        self.inner.lock().fail_next_send = Some(err);
    }

    /// Make every fetch fail until switched off again.
    pub fn fail_fetches(&self, fail: bool) {
        self.inner.lock().fail_fetches = fail;
    }

    /// Store arbitrary data at `address`, e.g. an account of another type.
    pub fn insert_raw(&self, address: Pubkey, data: Vec<u8>) {
        self.inner.lock().accounts.insert(address, data);
    }

    pub fn note_at(&self, address: &Pubkey) -> Option<Note> {
        let state = self.inner.lock();
        state.accounts.get(address).and_then(|d| Note::decode(*address, d).ok())
    }

    pub fn account_count(&self) -> usize {
        self.inner.lock().accounts.len()
    }
}

impl Ledger for MemoryLedger {
    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, LedgerError> {
        let mut state = self.inner.lock();
        state.fetches += 1;
        if state.fail_fetches {
            return Err(LedgerError::Request("connection refused".to_string()));
        }
        if *program_id != state.program_id {
            return Ok(Vec::new());
        }
        Ok(state
            .accounts
            .iter()
            .filter(|(_, data)| filters.iter().all(|f| f.matches(data)))
            .map(|(k, d)| (*k, d.clone()))
            .collect())
    }
}

impl LedgerState {
    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn execute(&mut self, signer: Pubkey, ix: &Instruction) -> Result<(), SendError> {
        if ix.program_id != self.program_id {
            return Err(SendError::Rpc(format!("program {} not found", ix.program_id)));
        }
        if let Some(meta) = ix.accounts.iter().find(|m| m.is_signer && m.pubkey != signer) {
            return Err(SendError::Rpc(format!(
                "transaction rejected: missing signature for {}",
                meta.pubkey
            )));
        }
        let parsed = NotesIx::from_slice(&ix.data).ok_or(SendError::Program { code: CODE_UNKNOWN_INSTRUCTION })?;
        if ix.accounts.len() < parsed.spec().accounts.len() {
            return Err(SendError::Program { code: CODE_NOT_ENOUGH_KEYS });
        }
        let note = ix.accounts[0].pubkey;
        let author = ix.accounts[1].pubkey;

        match parsed {
            NotesIx::CreateNote { title, content } => {
                if !is_note_address(&note, &author, &title, &self.program_id) {
                    return Err(fail(ProgramFailure::ConstraintSeeds));
                }
                if self.accounts.contains_key(&note) {
                    return Err(fail(ProgramFailure::AccountAlreadyInUse));
                }
                check_title(&title)?;
                check_content(&content)?;
                let now = self.tick();
                let record = Note {
                    address: note,
                    author,
                    title,
                    content,
                    created_at: now,
                    last_updated: now,
                };
                let mut data = record.encode().map_err(|e| SendError::Rpc(e.to_string()))?;
                if data.len() < NOTE_ACCOUNT_SPACE {
                    data.resize(NOTE_ACCOUNT_SPACE, 0);
                }
                self.accounts.insert(note, data);
            }
            NotesIx::UpdateNote { new_content } => {
                let mut record = self.load_owned(&note, &author)?;
                check_content(&new_content)?;
                record.content = new_content;
                record.last_updated = self.tick();
                let mut data = record.encode().map_err(|e| SendError::Rpc(e.to_string()))?;
                if data.len() < NOTE_ACCOUNT_SPACE {
                    data.resize(NOTE_ACCOUNT_SPACE, 0);
                }
                self.accounts.insert(note, data);
            }
            NotesIx::DeleteNote => {
                self.load_owned(&note, &author)?;
                self.accounts.remove(&note);
                self.tick();
            }
        }
        Ok(())
    }

    fn load_owned(&self, note: &Pubkey, author: &Pubkey) -> Result<Note, SendError> {
        let data = self
            .accounts
            .get(note)
            .ok_or(fail(ProgramFailure::AccountNotInitialized))?;
        let record = Note::decode(*note, data).map_err(|_| SendError::Program { code: 3003 })?;
        if record.author != *author {
            return Err(fail(ProgramFailure::Unauthorized));
        }
        Ok(record)
    }
}

fn fail(f: ProgramFailure) -> SendError {
    SendError::Program { code: f.code() }
}

fn check_title(title: &str) -> Result<(), SendError> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(fail(ProgramFailure::TitleTooLong));
    }
    if title.trim().is_empty() {
        return Err(fail(ProgramFailure::TitleEmpty));
    }
    Ok(())
}

fn check_content(content: &str) -> Result<(), SendError> {
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(fail(ProgramFailure::ContentTooLong));
    }
    if content.trim().is_empty() {
        return Err(fail(ProgramFailure::ContentEmpty));
    }
    Ok(())
}

/// Wallet attached to a [`MemoryLedger`].
pub struct MemorySession {
    ledger: MemoryLedger,
    identity: RwLock<Option<Pubkey>>,
    can_sign: RwLock<bool>,
}

impl MemorySession {
    pub fn connect(&self, identity: Pubkey) {
        *self.identity.write() = Some(identity);
    }

    pub fn disconnect(&self) {
        *self.identity.write() = None;
    }

    /// Simulate a watch-only wallet.
    pub fn set_can_sign(&self, can_sign: bool) {
        *self.can_sign.write() = can_sign;
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }
}

impl Session for MemorySession {
    fn identity(&self) -> Option<Pubkey> {
        *self.identity.read()
    }

    fn can_sign(&self) -> bool {
        self.identity().is_some() && *self.can_sign.read()
    }

    async fn sign_and_send(&self, ix: Instruction) -> Result<Signature, SendError> {
        let signer = self.identity().ok_or(SendError::NotConnected)?;
        // suspend once, like a network round-trip, so concurrent callers interleave
        yield_once().await;

        let mut state = self.ledger.inner.lock();
        state.submissions += 1;
        if let Some(err) = state.fail_next_send.take() {
            return Err(err);
        }
        state.execute(signer, &ix)?;
        Ok(Signature::new_unique())
    }
}

async fn yield_once() {
    let mut yielded = false;
    poll_fn(|cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{create_note, delete_note, update_note};
    use crate::pda::derive_note_address;
    use assert_matches::assert_matches;

    fn setup() -> (MemoryLedger, Pubkey, MemorySession) {
        let program = Pubkey::new_unique();
        let ledger = MemoryLedger::new(program);
        let author = Pubkey::new_unique();
        let session = ledger.session(author);
        (ledger, author, session)
    }

    #[tokio::test]
    async fn create_then_duplicate() {
        let (ledger, author, session) = setup();
        let program = ledger.program_id();
        let pda = derive_note_address(&author, "a", &program).unwrap();

        let ix = create_note(&program, pda.address, author, "a", "b").unwrap();
        session.sign_and_send(ix.clone()).await.unwrap();
        let note = ledger.note_at(&pda.address).unwrap();
        assert_eq!(note.created_at, GENESIS_TIMESTAMP);

        assert_eq!(
            session.sign_and_send(ix).await,
            Err(SendError::Program { code: 0 })
        );
        assert_eq!(ledger.submissions(), 2);
        assert_eq!(ledger.account_count(), 1);
    }

    #[tokio::test]
    async fn wrong_seeds_rejected() {
        let (ledger, author, session) = setup();
        let program = ledger.program_id();
        let ix = create_note(&program, Pubkey::new_unique(), author, "a", "b").unwrap();
        assert_eq!(
            session.sign_and_send(ix).await,
            Err(SendError::Program { code: 2006 })
        );
    }

    #[tokio::test]
    async fn program_validation_codes() {
        let (ledger, author, session) = setup();
        let program = ledger.program_id();
        let pda = derive_note_address(&author, " ", &program).unwrap();
        let ix = create_note(&program, pda.address, author, " ", "b").unwrap();
        assert_eq!(session.sign_and_send(ix).await, Err(SendError::Program { code: 6002 }));

        let pda = derive_note_address(&author, "t", &program).unwrap();
        let ix = create_note(&program, pda.address, author, "t", &"c".repeat(1001)).unwrap();
        assert_eq!(session.sign_and_send(ix).await, Err(SendError::Program { code: 6001 }));
    }

    #[tokio::test]
    async fn other_signers_are_unauthorized() {
        let (ledger, author, session) = setup();
        let program = ledger.program_id();
        let pda = derive_note_address(&author, "mine", &program).unwrap();
        session
            .sign_and_send(create_note(&program, pda.address, author, "mine", "x").unwrap())
            .await
            .unwrap();

        let intruder = Pubkey::new_unique();
        let other = ledger.session(intruder);
        let ix = update_note(&program, pda.address, intruder, "y").unwrap();
        assert_eq!(other.sign_and_send(ix).await, Err(SendError::Program { code: 6004 }));
        let ix = delete_note(&program, pda.address, intruder).unwrap();
        assert_eq!(other.sign_and_send(ix).await, Err(SendError::Program { code: 6004 }));

        // signing for someone else is refused before execution
        let ix = delete_note(&program, pda.address, author).unwrap();
        assert_matches!(other.sign_and_send(ix).await, Err(SendError::Rpc(_)));
        assert_eq!(ledger.note_at(&pda.address).unwrap().content, "x");
    }

    #[tokio::test]
    async fn injected_failures() {
        let (ledger, author, session) = setup();
        ledger.fail_next_send(SendError::Rpc("timeout".into()));
        let program = ledger.program_id();
        let pda = derive_note_address(&author, "a", &program).unwrap();
        let ix = create_note(&program, pda.address, author, "a", "b").unwrap();
        assert_matches!(session.sign_and_send(ix.clone()).await, Err(SendError::Rpc(_)));
        assert_eq!(ledger.account_count(), 0);
        session.sign_and_send(ix).await.unwrap();

        ledger.fail_fetches(true);
        assert!(ledger.program_accounts(&program, &[]).await.is_err());
        assert_eq!(ledger.fetches(), 1);
    }

    #[tokio::test]
    async fn disconnected_wallet_cannot_send() {
        let (ledger, _, _) = setup();
        let session = ledger.disconnected_session();
        let ix = Instruction::new_with_bytes(ledger.program_id(), &[], vec![]);
        assert_eq!(session.sign_and_send(ix).await, Err(SendError::NotConnected));
        assert_eq!(ledger.submissions(), 0);
    }
}
