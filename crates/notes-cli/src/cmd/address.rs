use anyhow::{anyhow, Result};
use notes_core::config::ClientConfig;
use notes_solana_client::{derive_note_address, Session};
use serde::Serialize;

use crate::{context, output};

#[derive(Debug, Serialize)]
pub struct AddressOut {
    pub author: String,
    pub title: String,
    pub address: String,
    pub bump: u8,
}

/// Derivation is local; nothing is fetched.
pub fn run(cfg: &ClientConfig, title: &str, owner: Option<&str>) -> Result<()> {
    let program_id = context::program_id(cfg)?;
    let author = match owner {
        Some(s) => context::parse_pubkey("owner", s)?,
        None => context::connect(cfg)?
            .session()
            .identity()
            .ok_or_else(|| anyhow!("no wallet connected; pass --keypair or --owner"))?,
    };

    let pda = derive_note_address(&author, title, &program_id)?;
    let out = AddressOut {
        author: author.to_string(),
        title: title.to_string(),
        address: pda.address.to_string(),
        bump: pda.bump,
    };
    output::print(&out, |o| format!("{} (bump {})", o.address, o.bump))
}
