//! Plain-text rendering of a [`ViewState`] snapshot.

use std::fmt::Write as _;

use notes_core::limits::{MAX_CONTENT_LEN, MAX_TITLE_LEN};
use notes_core::timestamp::display_unix_seconds;
use notes_core::validate::char_count;

use super::controller::{StatusKind, ViewState};

pub fn render(view: &ViewState) -> String {
    let mut out = String::new();

    let Some(identity) = view.identity else {
        out.push_str("Please connect your wallet to start using the app. (connect [keypair])\n");
        return out;
    };
    let _ = writeln!(out, "Wallet: {identity}\n");

    let editing = view.editing();
    let _ = writeln!(out, "{}", if editing.is_some() { "Edit Note" } else { "Create new Note" });
    let _ = writeln!(
        out,
        "  Title ({}/{}){}: {}",
        char_count(&view.title),
        MAX_TITLE_LEN,
        if editing.is_some() { " [read-only]" } else { "" },
        view.title,
    );
    let _ = writeln!(out, "  Content ({}/{}): {}", char_count(&view.content), MAX_CONTENT_LEN, view.content);

    let content_blank = view.content.trim().is_empty();
    if editing.is_some() {
        let save = if view.updating { "Saving..." } else { "Save Update" };
        let _ = writeln!(
            out,
            "  [{}]{} [Cancel]{}",
            save,
            disabled(!view.can_save() || content_blank),
            disabled(!view.can_cancel()),
        );
    } else {
        let create = if view.creating { "Creating note..." } else { "Create Note" };
        let blank = view.title.trim().is_empty() || content_blank;
        let _ = writeln!(out, "  [{}]{}", create, disabled(!view.can_create() || blank));
    }

    if let Some(status) = &view.status {
        let tag = match status.kind {
            StatusKind::Info => "ok",
            StatusKind::Error => "error",
        };
        let _ = writeln!(out, "\n[{tag}] {}", status.text);
    }

    out.push('\n');
    if view.is_loading() {
        let _ = writeln!(out, "Loading your notes...");
        return out;
    }
    let _ = writeln!(out, "Your Notes ({})", view.notes.len());
    if view.notes.is_empty() {
        let _ = writeln!(out, "  No notes yet. Create your first note above.");
    }
    for (i, note) in view.notes.iter().enumerate() {
        let n = i + 1;
        let _ = writeln!(out, "  {n}. {}", note.title);
        let _ = writeln!(out, "     {}", note.content);
        let _ = write!(out, "     created {}", display_unix_seconds(note.created_at));
        if note.last_updated != note.created_at {
            let _ = write!(out, ", updated {}", display_unix_seconds(note.last_updated));
        }
        out.push('\n');
        let delete = if view.deleting.contains(&note.address) { "Deleting..." } else { "Delete" };
        let _ = writeln!(
            out,
            "     [Edit]{} [{}]{}",
            disabled(!view.can_edit(&note.address)),
            delete,
            disabled(!view.can_delete(&note.address)),
        );
    }
    out
}

fn disabled(yes: bool) -> &'static str {
    if yes {
        " (disabled)"
    } else {
        ""
    }
}
