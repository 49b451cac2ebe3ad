use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::Result;
use notes_solana_client::idl::{ProgramInterface, NOTES_IDL};
use serde::Serialize;

use crate::output;

#[derive(Debug, Serialize)]
pub struct IdlOut {
    pub idl: &'static ProgramInterface,
    /// Instruction and account discriminators, hex encoded.
    pub discriminators: BTreeMap<String, String>,
}

pub fn run() -> Result<()> {
    output::print(&describe(), human)
}

fn describe() -> IdlOut {
    let mut discriminators = BTreeMap::new();
    for ix in NOTES_IDL.instructions {
        discriminators.insert(format!("instruction:{}", ix.name), ix.discriminator_hex());
    }
    for acc in NOTES_IDL.accounts {
        discriminators.insert(format!("account:{}", acc.name), acc.discriminator_hex());
    }
    IdlOut { idl: &NOTES_IDL, discriminators }
}

fn human(out: &IdlOut) -> String {
    let idl = out.idl;
    let mut s = String::new();
    let _ = writeln!(s, "{} v{}", idl.name, idl.version);
    for ix in idl.instructions {
        let args: Vec<String> = ix.args.iter().map(|a| format!("{}: {:?}", a.name, a.ty)).collect();
        let _ = writeln!(s, "\ninstruction {} ({}) [{}]", ix.name, args.join(", "), ix.discriminator_hex());
        for acc in ix.accounts {
            let flags = match (acc.is_mut, acc.is_signer) {
                (true, true) => "mut, signer",
                (true, false) => "mut",
                (false, true) => "signer",
                (false, false) => "",
            };
            let _ = writeln!(s, "  {} {}", acc.name, flags);
        }
    }
    for acc in idl.accounts {
        let _ = writeln!(s, "\naccount {} [{}]", acc.name, acc.discriminator_hex());
        for f in acc.fields {
            let _ = writeln!(s, "  {}: {:?}", f.name, f.ty);
        }
    }
    let _ = writeln!(s, "\nerrors");
    for e in idl.errors {
        let _ = writeln!(s, "  {} {}: {}", e.code, e.name, e.msg);
    }
    s
}
