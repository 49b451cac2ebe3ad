use std::path::PathBuf;

use clap::{Parser, Subcommand};
use notes_core::config::{ClientConfig, Commitment, DEFAULT_RPC_URL};

#[derive(Parser, Debug, Clone)]
#[command(name = "notes", version, about = "Notes dApp CLI")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Solana JSON-RPC endpoint.
    #[arg(long, global = true, env = "NOTES_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Base58 id of the deployed notes program.
    #[arg(long, global = true, env = "NOTES_PROGRAM_ID")]
    pub program_id: Option<String>,

    /// Keypair file used as the wallet (default: ~/.config/solana/id.json)
    #[arg(long, global = true, env = "NOTES_KEYPAIR")]
    pub keypair: Option<PathBuf>,

    /// processed|confirmed|finalized
    #[arg(long, global = true, default_value = "confirmed")]
    pub commitment: Commitment,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            rpc_url: self.rpc_url.clone(),
            program_id: self.program_id.clone(),
            keypair_path: self.keypair.clone().or_else(default_keypair_path),
            commitment: self.commitment,
        }
    }
}

/// Where the Solana CLI keeps its default wallet.
pub fn default_keypair_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/solana/id.json"))
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the notes of a wallet (default: the connected one).
    List {
        /// Base58 author to list instead of the connected wallet.
        #[arg(long)]
        owner: Option<String>,
    },

    /// Create a note.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },

    /// Replace the content of one of your notes.
    Update {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },

    /// Delete one of your notes.
    Delete {
        #[arg(long)]
        title: String,
    },

    /// Print the account address a note title maps to.
    Address {
        #[arg(long)]
        title: String,
        /// Author to derive for (default: the connected wallet).
        #[arg(long)]
        owner: Option<String>,
    },

    /// Print the program interface descriptor.
    Idl,

    /// Run environment checks.
    Doctor,

    /// Interactive session driving the notes form.
    Shell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "notes",
            "create",
            "--title",
            "t",
            "--content",
            "c",
            "--rpc-url",
            "http://127.0.0.1:8899",
            "--commitment",
            "finalized",
            "--keypair",
            "/tmp/id.json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Create { ref title, .. } if title == "t"));

        let cfg = cli.client_config();
        assert_eq!(cfg.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(cfg.commitment, Commitment::Finalized);
        assert_eq!(cfg.keypair_path, Some(PathBuf::from("/tmp/id.json")));
    }

    #[test]
    fn rejects_unknown_commitment() {
        assert!(Cli::try_parse_from(["notes", "--commitment", "eventual", "idl"]).is_err());
    }

    #[test]
    fn create_requires_both_fields() {
        assert!(Cli::try_parse_from(["notes", "create", "--title", "t"]).is_err());
    }
}
