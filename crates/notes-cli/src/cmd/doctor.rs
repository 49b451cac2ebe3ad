use anyhow::Result;
use notes_core::config::{validate_config, ClientConfig};
use notes_solana_client::Session;
use serde::Serialize;

use crate::{context, output};

#[derive(Debug, Serialize)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorOut {
    pub ok: bool,
    pub checks: Vec<Check>,
}

impl Check {
    fn new(name: &str, ok: bool, detail: impl Into<String>) -> Self {
        Self { name: name.to_string(), ok, detail: detail.into() }
    }
}

pub async fn run(cfg: &ClientConfig) -> Result<()> {
    let mut checks = Vec::new();

    if let Err(e) = validate_config(cfg) {
        checks.push(Check::new("config", false, e.to_string()));
        return report(checks);
    }
    checks.push(Check::new("config", true, format!("rpc {} ({})", cfg.rpc_url, cfg.commitment.as_str())));

    let client = match context::connect(cfg) {
        Ok(client) => client,
        Err(e) => {
            checks.push(Check::new("client", false, format!("{e:#}")));
            return report(checks);
        }
    };

    // A missing wallet is reported but does not fail the run: listing other
    // authors' notes works without one.
    let wallet = match client.session().identity() {
        Some(pk) => format!("connected as {pk}"),
        None => "no keypair found (read-only)".to_string(),
    };
    checks.push(Check::new("wallet", true, wallet));

    match client.ledger().node_version().await {
        Ok(version) => checks.push(Check::new("rpc", true, format!("solana-core {version}"))),
        Err(e) => {
            checks.push(Check::new("rpc", false, e.to_string()));
            return report(checks);
        }
    }

    let program = client.program_id();
    let check = match client.ledger().account_executable(program).await {
        Ok(Some(true)) => Check::new("program", true, format!("{program} deployed")),
        Ok(Some(false)) => Check::new("program", false, format!("{program} is not executable")),
        Ok(None) => Check::new("program", false, format!("{program} not found on this cluster")),
        Err(e) => Check::new("program", false, e.to_string()),
    };
    checks.push(check);

    report(checks)
}

fn report(checks: Vec<Check>) -> Result<()> {
    let ok = checks.iter().all(|c| c.ok);
    output::print(&DoctorOut { ok, checks }, |out| {
        out.checks
            .iter()
            .map(|c| format!("[{}] {}: {}", if c.ok { "ok" } else { "fail" }, c.name, c.detail))
            .collect::<Vec<_>>()
            .join("\n")
    })
}
