//! `disasm`: one instruction per line

use crate::error::{parse_hex, CliError};
use clap::Args;
use serde_json::{json, Value};
use zxc_evm::disassemble;

/// Arguments for `disasm`
#[derive(Debug, Args)]
pub struct DisasmArgs {
    /// Bytecode as hex
    #[arg(long)]
    pub code: String,
}

pub fn execute(args: &DisasmArgs, json: bool) -> Result<(), CliError> {
    let code = parse_hex(&args.code)?;
    let listing = disassemble(&code);

    if json {
        let items: Vec<Value> = listing
            .iter()
            .map(|ins| {
                let mut item = json!({ "pc": ins.pc, "op": ins.opcode.to_string() });
                if !ins.immediate.is_empty() {
                    item["immediate"] = Value::String(format!("0x{}", hex::encode(&ins.immediate)));
                }
                item
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for ins in &listing {
            println!("{ins}");
        }
    }
    Ok(())
}
