use anyhow::Result;
use notes_core::config::ClientConfig;

use super::{client_error, TxOut};
use crate::{context, output};

pub async fn run(cfg: &ClientConfig, title: &str) -> Result<()> {
    let client = context::connect(cfg)?;
    let address = client.note_address(title).map_err(|e| client_error("delete", e.into()))?.address;

    let pb = output::spinner("deleting note");
    let result = client.delete_at(address).await;
    pb.finish_and_clear();
    let sig = result.map_err(|e| client_error("delete", e))?;

    output::status(true, "Note deleted successfully.");
    let out = TxOut {
        action: "delete",
        title: title.to_string(),
        address: address.to_string(),
        signature: sig.to_string(),
    };
    output::print(&out, |o| format!("signature {}", o.signature))
}
