//! Line-oriented front end for the notes form.
//!
//! Each input line is one user action. The view is printed again after every
//! action that can change it.

use std::path::PathBuf;

use anyhow::Result;
use notes_core::config::ClientConfig;
use notes_solana_client::{KeypairSession, RpcLedger, Session};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::{view, FormController, Outcome};
use crate::context;
use crate::output;
use ShellCommand::*;

type ShellController = FormController<RpcLedger, KeypairSession>;

const HELP: &str = "\
commands:
  connect [keypair]   attach a wallet (default: configured keypair)
  disconnect          detach the wallet
  title <text>        set the title (create mode only)
  content <text>      set the content
  create              create a note from the form
  edit <n>            edit note n
  save                save the note being edited
  cancel              leave edit mode
  delete <n>          delete note n
  refresh             reload your notes
  show                print the form and list
  help                this text
  quit                leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Connect(Option<PathBuf>),
    Disconnect,
    Title(String),
    Content(String),
    Create,
    Edit(usize),
    Save,
    Cancel,
    Delete(usize),
    Refresh,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArg(&'static str),

    #[error("not a note number: {0}")]
    BadIndex(String),
}

/// Parse one input line. Blank lines yield `Ok(None)`.
///
/// `title` and `content` take the rest of the line verbatim, so inner
/// spacing survives.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.trim().is_empty() {
        return Ok(None);
    }
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r),
        None => (trimmed, ""),
    };

    let cmd = match word {
        "connect" => Connect(non_empty(rest).map(PathBuf::from)),
        "disconnect" => Disconnect,
        "title" => Title(rest.to_string()),
        "content" => Content(rest.to_string()),
        "create" => Create,
        "edit" => Edit(index(rest, "edit")?),
        "save" => Save,
        "cancel" => Cancel,
        "delete" => Delete(index(rest, "delete")?),
        "refresh" => Refresh,
        "show" => Show,
        "help" | "?" => Help,
        "quit" | "exit" => Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(cmd))
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

fn index(rest: &str, cmd: &'static str) -> Result<usize, ParseError> {
    let arg = non_empty(rest).ok_or(ParseError::MissingArg(cmd))?;
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ParseError::BadIndex(arg.to_string())),
    }
}

pub async fn run(cfg: &ClientConfig) -> Result<()> {
    let client = context::connect(cfg)?;
    let ctrl = FormController::new(client);
    if ctrl.client().session().identity().is_some() {
        ctrl.load().await;
    }
    print_view(&ctrl);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let cmd = match parse_line(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                output::eprintln_line(&e.to_string());
                continue;
            }
        };
        if !step(&ctrl, cfg, cmd).await {
            break;
        }
    }
    Ok(())
}

/// Run one command. Returns `false` on `quit`.
async fn step(ctrl: &ShellController, cfg: &ClientConfig, cmd: ShellCommand) -> bool {
    match cmd {
        Quit => return false,
        Help => {
            println!("{HELP}");
            return true;
        }
        Show => {}
        Connect(path) => {
            let Some(path) = path.or_else(|| cfg.keypair_path.clone()) else {
                output::eprintln_line("no keypair path configured; use `connect <path>`");
                return true;
            };
            match context::attach_keypair(ctrl.client().session(), &path) {
                Ok(Some(_)) => {
                    ctrl.reset();
                    ctrl.load().await;
                }
                Ok(None) => output::eprintln_line(&format!("keypair not found: {}", path.display())),
                Err(e) => output::eprintln_line(&format!("{e:#}")),
            }
        }
        Disconnect => {
            ctrl.client().session().disconnect();
            ctrl.reset();
        }
        Title(text) => {
            if !ctrl.set_title(&text) {
                output::eprintln_line("the title cannot change while editing");
            }
        }
        Content(text) => ctrl.set_content(&text),
        Create => report(ctrl.create().await),
        Save => report(ctrl.save().await),
        Cancel => {
            ctrl.cancel_edit();
        }
        Edit(n) => match nth_address(ctrl, n) {
            Some(addr) => {
                if !ctrl.start_edit(&addr) {
                    output::eprintln_line("that note cannot be edited right now");
                }
            }
            None => output::eprintln_line(&format!("no note {n}")),
        },
        Delete(n) => match nth_address(ctrl, n) {
            Some(addr) => report(ctrl.delete(addr).await),
            None => output::eprintln_line(&format!("no note {n}")),
        },
        Refresh => {
            ctrl.load().await;
        }
    }
    print_view(ctrl);
    true
}

fn nth_address(ctrl: &ShellController, n: usize) -> Option<Pubkey> {
    ctrl.snapshot().notes.get(n.checked_sub(1)?).map(|note| note.address)
}

/// The view already carries the status line; only failure detail is added.
fn report(outcome: Outcome) {
    match outcome {
        Outcome::Failed(err) => output::eprintln_line(&format!("detail: {err}")),
        Outcome::Invalid(e) => tracing::debug!(%e, "rejected locally"),
        Outcome::Done | Outcome::Skipped => {}
    }
}

fn print_view(ctrl: &ShellController) {
    print!("{}", view::render(&ctrl.snapshot()));
}
