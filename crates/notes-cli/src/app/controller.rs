//! Form controller: owns the view state and sequences calls into the client.
//!
//! The form is either `Viewing` (a create form) or `Editing(note)`. Deletes
//! are keyed by account address and run independently of the edit state.
//! After every successful mutation the whole list is fetched again; there is
//! no local patching, so a failed refresh leaves the list stale but never
//! half-applied.
//!
//! State sits behind a mutex that is only held between awaits, so several
//! actions on one controller can be in flight at the same time.

use std::collections::BTreeSet;

use notes_core::validate::{validate_content, validate_new_note, ValidationError};
use notes_solana_client::{Ledger, Note, NotesClient, NotesClientError, Session};
use parking_lot::Mutex;
use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Viewing,
    Editing(Note),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Info, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Error, text: text.into() }
    }
}

#[derive(Debug, Clone)]
pub struct ViewState {
    /// Connected wallet, filled in by [`FormController::snapshot`].
    pub identity: Option<Pubkey>,
    pub notes: Vec<Note>,
    pub title: String,
    pub content: String,
    pub mode: EditMode,
    /// List fetches in flight.
    pub fetching: usize,
    /// Sequence number of the most recently started fetch. Only that fetch's
    /// response is applied; older responses may predate a later mutation.
    pub fetch_generation: u64,
    pub creating: bool,
    pub updating: bool,
    /// Addresses with a delete in flight.
    pub deleting: BTreeSet<Pubkey>,
    pub status: Option<Status>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            identity: None,
            notes: Vec::new(),
            title: String::new(),
            content: String::new(),
            mode: EditMode::Viewing,
            fetching: 0,
            fetch_generation: 0,
            creating: false,
            updating: false,
            deleting: BTreeSet::new(),
            status: None,
        }
    }
}

impl ViewState {
    pub fn is_editing(&self) -> bool {
        matches!(self.mode, EditMode::Editing(_))
    }

    pub fn editing(&self) -> Option<&Note> {
        match &self.mode {
            EditMode::Editing(note) => Some(note),
            EditMode::Viewing => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.fetching > 0
    }

    pub fn can_create(&self) -> bool {
        !self.is_editing() && !self.creating
    }

    pub fn can_save(&self) -> bool {
        self.is_editing() && !self.updating
    }

    pub fn can_cancel(&self) -> bool {
        self.is_editing() && !self.updating
    }

    pub fn can_edit(&self, note: &Pubkey) -> bool {
        !self.creating && !self.updating && !self.deleting.contains(note)
    }

    pub fn can_delete(&self, note: &Pubkey) -> bool {
        !self.deleting.contains(note)
    }

    fn clear_form(&mut self) {
        self.title.clear();
        self.content.clear();
    }
}

/// Result of one user action.
#[derive(Debug)]
pub enum Outcome {
    /// The action ran and succeeded.
    Done,
    /// The control was disabled; nothing happened.
    Skipped,
    /// Local validation failed; no call was made.
    Invalid(ValidationError),
    /// The call was made, or refused by a precondition, and failed.
    Failed(NotesClientError),
}

pub struct FormController<L, S> {
    client: NotesClient<L, S>,
    state: Mutex<ViewState>,
}

impl<L: Ledger, S: Session> FormController<L, S> {
    pub fn new(client: NotesClient<L, S>) -> Self {
        Self { client, state: Mutex::new(ViewState::default()) }
    }

    pub fn client(&self) -> &NotesClient<L, S> {
        &self.client
    }

    pub fn snapshot(&self) -> ViewState {
        let mut view = self.state.lock().clone();
        view.identity = self.client.session().identity();
        view
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        f(&mut self.state.lock())
    }

    /// Returns `false` while editing: the title is part of the note's
    /// address and cannot change.
    pub fn set_title(&self, title: &str) -> bool {
        self.with_state(|s| {
            if s.is_editing() {
                return false;
            }
            s.title = title.to_string();
            true
        })
    }

    pub fn set_content(&self, content: &str) {
        self.with_state(|s| s.content = content.to_string());
    }

    /// Drop everything tied to the previous wallet. Fetches still in flight
    /// are counted down when they finish but their results are dropped.
    pub fn reset(&self) {
        self.with_state(|s| {
            let fetching = s.fetching;
            let generation = s.fetch_generation + 1;
            *s = ViewState::default();
            s.fetching = fetching;
            s.fetch_generation = generation;
        });
    }

    /// Fetch the connected wallet's notes. Runs on connect.
    pub async fn load(&self) -> Outcome {
        self.fetch(true).await
    }

    /// Re-fetch after a mutation, keeping the mutation's status message.
    async fn refresh(&self) -> Outcome {
        self.fetch(false).await
    }

    async fn fetch(&self, clear_status: bool) -> Outcome {
        if self.client.session().identity().is_none() {
            return Outcome::Skipped;
        }
        let generation = self.with_state(|s| {
            s.fetching += 1;
            s.fetch_generation += 1;
            s.fetch_generation
        });
        let result = self.client.list_mine().await;
        self.with_state(|s| {
            s.fetching = s.fetching.saturating_sub(1);
            if generation != s.fetch_generation {
                tracing::debug!(generation, latest = s.fetch_generation, "dropping superseded note list");
                return Outcome::Skipped;
            }
            match result {
                Ok(notes) => {
                    s.notes = notes;
                    if clear_status {
                        s.status = None;
                    }
                    Outcome::Done
                }
                Err(err) => {
                    tracing::error!(?err, "failed to load notes");
                    s.status = Some(Status::error("Failed to load notes."));
                    Outcome::Failed(err)
                }
            }
        })
    }

    pub async fn create(&self) -> Outcome {
        let fields = self.with_state(|s| {
            s.can_create().then(|| (s.title.clone(), s.content.clone()))
        });
        let Some((title, content)) = fields else {
            return Outcome::Skipped;
        };
        if let Err(e) = validate_new_note(&title, &content) {
            self.with_state(|s| s.status = Some(Status::error(e.to_string())));
            return Outcome::Invalid(e);
        }

        self.with_state(|s| s.creating = true);
        match self.client.create(&title, &content).await {
            Ok(sig) => {
                tracing::info!(%sig, %title, "note created");
                self.with_state(|s| {
                    s.clear_form();
                    s.status = Some(Status::info("Note created successfully."));
                });
                self.refresh().await;
                self.with_state(|s| s.creating = false);
                Outcome::Done
            }
            Err(err) => {
                tracing::error!(?err, %title, "failed to create note");
                self.with_state(|s| {
                    s.creating = false;
                    s.status = Some(failure_status(&err, "Failed to create note."));
                });
                Outcome::Failed(err)
            }
        }
    }

    /// Switch the form to editing the listed note at `address`.
    pub fn start_edit(&self, address: &Pubkey) -> bool {
        self.with_state(|s| {
            if !s.can_edit(address) {
                return false;
            }
            let Some(note) = s.notes.iter().find(|n| n.address == *address).cloned() else {
                return false;
            };
            s.title = note.title.clone();
            s.content = note.content.clone();
            s.mode = EditMode::Editing(note);
            s.status = None;
            true
        })
    }

    pub fn cancel_edit(&self) -> bool {
        self.with_state(|s| {
            if !s.can_cancel() {
                return false;
            }
            s.mode = EditMode::Viewing;
            s.clear_form();
            s.status = None;
            true
        })
    }

    pub async fn save(&self) -> Outcome {
        let target = self.with_state(|s| match &s.mode {
            EditMode::Editing(note) if !s.updating => Some((note.address, s.content.clone())),
            _ => None,
        });
        let Some((address, content)) = target else {
            return Outcome::Skipped;
        };
        if let Err(e) = validate_content(&content) {
            self.with_state(|s| s.status = Some(Status::error(e.to_string())));
            return Outcome::Invalid(e);
        }

        self.with_state(|s| s.updating = true);
        match self.client.update_at(address, &content).await {
            Ok(sig) => {
                tracing::info!(%sig, note = %address, "note updated");
                self.with_state(|s| {
                    s.mode = EditMode::Viewing;
                    s.clear_form();
                    s.status = Some(Status::info("Note updated successfully."));
                });
                self.refresh().await;
                self.with_state(|s| s.updating = false);
                Outcome::Done
            }
            Err(err) => {
                tracing::error!(?err, note = %address, "failed to update note");
                self.with_state(|s| {
                    s.updating = false;
                    s.status = Some(failure_status(&err, "Failed to update note."));
                });
                Outcome::Failed(err)
            }
        }
    }

    /// Delete the listed note at `address`, regardless of what the form is
    /// doing.
    pub async fn delete(&self, address: Pubkey) -> Outcome {
        let started = self.with_state(|s| {
            if !s.can_delete(&address) || !s.notes.iter().any(|n| n.address == address) {
                return false;
            }
            s.deleting.insert(address);
            true
        });
        if !started {
            return Outcome::Skipped;
        }

        match self.client.delete_at(address).await {
            Ok(sig) => {
                tracing::info!(%sig, note = %address, "note deleted");
                self.with_state(|s| s.status = Some(Status::info("Note deleted successfully.")));
                self.refresh().await;
                self.with_state(|s| s.deleting.remove(&address));
                Outcome::Done
            }
            Err(err) => {
                tracing::error!(?err, note = %address, "failed to delete note");
                self.with_state(|s| {
                    s.deleting.remove(&address);
                    s.status = Some(failure_status(&err, "Failed to delete note."));
                });
                Outcome::Failed(err)
            }
        }
    }
}

/// Program and transport failures share one generic message; the specific
/// code goes to the log. A refused precondition says what is missing.
fn failure_status(err: &NotesClientError, generic: &str) -> Status {
    match err {
        NotesClientError::Precondition(p) => Status::error(format!("{generic} ({p})")),
        _ => Status::error(generic),
    }
}
