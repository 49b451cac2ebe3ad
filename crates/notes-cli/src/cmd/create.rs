use anyhow::Result;
use notes_core::config::ClientConfig;
use notes_core::validate::validate_new_note;

use super::{client_error, TxOut};
use crate::{context, output};

pub async fn run(cfg: &ClientConfig, title: &str, content: &str) -> Result<()> {
    validate_new_note(title, content)?;
    let client = context::connect(cfg)?;
    let address = client.note_address(title).map_err(|e| client_error("create", e.into()))?.address;

    let pb = output::spinner("creating note");
    let result = client.create(title, content).await;
    pb.finish_and_clear();
    let sig = result.map_err(|e| client_error("create", e))?;

    output::status(true, "Note created successfully.");
    let out = TxOut {
        action: "create",
        title: title.to_string(),
        address: address.to_string(),
        signature: sig.to_string(),
    };
    output::print(&out, |o| format!("address {}\nsignature {}", o.address, o.signature))
}
