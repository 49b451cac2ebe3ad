use anyhow::Result;
use notes_core::config::ClientConfig;
use notes_core::validate::validate_content;

use super::{client_error, TxOut};
use crate::{context, output};

pub async fn run(cfg: &ClientConfig, title: &str, content: &str) -> Result<()> {
    validate_content(content)?;
    let client = context::connect(cfg)?;
    let address = client.note_address(title).map_err(|e| client_error("update", e.into()))?.address;

    let pb = output::spinner("updating note");
    let result = client.update_at(address, content).await;
    pb.finish_and_clear();
    let sig = result.map_err(|e| client_error("update", e))?;

    output::status(true, "Note updated successfully.");
    let out = TxOut {
        action: "update",
        title: title.to_string(),
        address: address.to_string(),
        signature: sig.to_string(),
    };
    output::print(&out, |o| format!("signature {}", o.signature))
}
