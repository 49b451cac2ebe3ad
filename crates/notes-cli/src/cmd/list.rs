use anyhow::{anyhow, Result};
use notes_core::config::ClientConfig;
use notes_solana_client::Session;

use super::{client_error, NoteOut};
use crate::{context, output};

pub async fn run(cfg: &ClientConfig, owner: Option<&str>) -> Result<()> {
    let client = context::connect(cfg)?;
    let owner = match owner {
        Some(s) => context::parse_pubkey("owner", s)?,
        None => client
            .session()
            .identity()
            .ok_or_else(|| anyhow!("no wallet connected; pass --keypair or --owner"))?,
    };

    let pb = output::spinner("fetching notes");
    let result = client.list(&owner).await;
    pb.finish_and_clear();
    let notes = result.map_err(|e| client_error("list", e))?;

    let out: Vec<NoteOut> = notes.iter().map(NoteOut::from).collect();
    output::print(&out, |notes| {
        if notes.is_empty() {
            return format!("no notes for {owner}");
        }
        notes.iter().map(NoteOut::human).collect::<Vec<_>>().join("\n")
    })
}
