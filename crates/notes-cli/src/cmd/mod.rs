use anyhow::{anyhow, Result};
use notes_core::timestamp::display_unix_seconds;
use notes_solana_client::{Note, NotesClientError};
use serde::Serialize;

use crate::args::{Cli, Command};

mod address;
mod create;
mod delete;
mod doctor;
mod idl;
mod list;
mod shell;
mod update;

pub async fn dispatch(cli: Cli) -> Result<()> {
    let cfg = cli.client_config();
    match cli.command {
        Command::List { owner } => list::run(&cfg, owner.as_deref()).await,
        Command::Create { title, content } => create::run(&cfg, &title, &content).await,
        Command::Update { title, content } => update::run(&cfg, &title, &content).await,
        Command::Delete { title } => delete::run(&cfg, &title).await,
        Command::Address { title, owner } => address::run(&cfg, &title, owner.as_deref()),
        Command::Idl => idl::run(),
        Command::Doctor => doctor::run(&cfg).await,
        Command::Shell => shell::run(&cfg).await,
    }
}

#[derive(Debug, Serialize)]
pub struct NoteOut {
    pub address: String,
    pub author: String,
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub last_updated: i64,
}

impl From<&Note> for NoteOut {
    fn from(n: &Note) -> Self {
        Self {
            address: n.address.to_string(),
            author: n.author.to_string(),
            title: n.title.clone(),
            content: n.content.clone(),
            created_at: n.created_at,
            last_updated: n.last_updated,
        }
    }
}

impl NoteOut {
    pub fn human(&self) -> String {
        format!(
            "{}\n  {}\n  address {}\n  created {}, updated {}\n",
            self.title,
            self.content,
            self.address,
            display_unix_seconds(self.created_at),
            display_unix_seconds(self.last_updated),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct TxOut {
    pub action: &'static str,
    pub title: String,
    pub address: String,
    pub signature: String,
}

/// Describe a failed client call by tier.
pub fn client_error(action: &str, err: NotesClientError) -> anyhow::Error {
    match err {
        NotesClientError::Program(failure) => match failure.message() {
            Some(msg) => anyhow!("{action} rejected by program: {failure} ({msg})"),
            None => anyhow!("{action} rejected by program: {failure} (code {})", failure.code()),
        },
        other => anyhow!("{action} failed: {other}"),
    }
}
