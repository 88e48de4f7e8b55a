//! `run` and `create`: execute bytecode against a fresh in-memory ledger

use super::{parse_address, parse_u256};
use crate::config::Config;
use crate::error::{parse_hex, CliError};
use crate::output::Output;
use clap::Args;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;
use zxc_evm::{Message, Revision};
use zxc_primitives::Address;
use zxc_state::{genesis_from_file, MemoryHost, TransactionOutcome};

/// Account that holds the code for `run`
pub const CONTRACT: Address = Address::from_bytes([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xc0, 0xde,
]);

/// Sender when `--caller` is not given
pub const DEFAULT_CALLER: Address = Address::from_bytes([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xca, 0x11,
]);

/// Arguments shared by `run` and `create`
#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Bytecode as hex (runtime code for `run`, init code for `create`)
    #[arg(long)]
    pub code: String,

    /// Call data as hex; appended to the init code for `create`
    #[arg(long, default_value = "")]
    pub input: String,

    /// Gas available to the outermost frame
    #[arg(long, default_value_t = 10_000_000)]
    pub gas: i64,

    /// Protocol revision, overriding the config file
    #[arg(long)]
    pub revision: Option<Revision>,

    /// Value in drops, decimal or 0x-prefixed hex
    #[arg(long, default_value = "0")]
    pub value: String,

    /// Sender address
    #[arg(long)]
    pub caller: Option<String>,

    /// JSON file of pre-existing accounts
    #[arg(long)]
    pub genesis: Option<PathBuf>,

    /// Emit a trace event per executed instruction
    #[arg(long)]
    pub trace: bool,
}

/// Host prepared for one transaction
struct Prepared {
    host: MemoryHost,
    caller: Address,
    code: Vec<u8>,
    input: Vec<u8>,
    value: primitive_types::U256,
}

impl ExecArgs {
    fn prepare(&self, mut config: Config) -> Result<Prepared, CliError> {
        if self.gas < 0 {
            return Err(CliError::InvalidNumber(format!("gas must be non-negative, got {}", self.gas)));
        }
        if let Some(revision) = self.revision {
            config.vm.revision = revision;
        }
        if self.trace {
            config.vm.trace_steps = true;
        }

        let code = parse_hex(&self.code)?;
        let input = parse_hex(&self.input)?;
        let value = parse_u256(&self.value)?;
        let caller = match &self.caller {
            Some(s) => parse_address(s)?,
            None => DEFAULT_CALLER,
        };

        let genesis = match &self.genesis {
            Some(path) => genesis_from_file(path).map_err(|e| CliError::Config(e.to_string()))?,
            None => Default::default(),
        };

        info!(revision = %config.vm.revision, gas = self.gas, "preparing host");
        let mut host = MemoryHost::with_genesis(config.vm, genesis);
        host.set_env(config.env);

        // The sender always holds at least the transferred value
        let mut sender = host.account(&caller).cloned().unwrap_or_default();
        if sender.balance < value {
            sender.balance = value;
            host.set_account(caller, sender);
        }

        Ok(Prepared {
            host,
            caller,
            code,
            input,
            value,
        })
    }
}

/// Deploy `--code` at [`CONTRACT`] and call it
pub fn run(args: &ExecArgs, config: Config, json: bool) -> Result<(), CliError> {
    let Prepared {
        mut host,
        caller,
        code,
        input,
        value,
    } = args.prepare(config)?;

    host.deploy(CONTRACT, code);
    let message = Message::call(caller, CONTRACT, args.gas)
        .with_input(input)
        .with_value(value);
    let outcome = host.execute_transaction(&message);

    report(json, args.gas, &outcome).print();
    Ok(())
}

/// Run `--code` as init code of a top-level CREATE
pub fn create(args: &ExecArgs, config: Config, json: bool) -> Result<(), CliError> {
    let Prepared {
        mut host,
        caller,
        mut code,
        input,
        value,
    } = args.prepare(config)?;

    code.extend_from_slice(&input);
    let message = Message::create(caller, code, args.gas).with_value(value);
    let outcome = host.execute_transaction(&message);

    let mut out = report(json, args.gas, &outcome);
    if let Some(address) = outcome.result.create_address {
        let deployed = host.code(&address);
        out = out
            .field("address", &address.to_hex())
            .field_u64("code_size", deployed.len() as u64)
            .field("code", &format!("0x{}", hex::encode(deployed)));
    }
    out.print();
    Ok(())
}

fn report(json: bool, gas: i64, outcome: &TransactionOutcome) -> Output {
    let result = &outcome.result;
    let mut out = Output::new(json)
        .field("status", result.status_code.as_str())
        .field_i64("gas_used", gas - result.gas_left)
        .field_i64("gas_left", result.gas_left)
        .field("output", &format!("0x{}", hex::encode(&result.output)))
        .field_u64("refund", outcome.substate.refunds);

    let logs: Vec<Value> = outcome
        .logs
        .iter()
        .map(|log| {
            json!({
                "address": log.address.to_hex(),
                "topics": log.topics.iter().map(|t| t.to_hex()).collect::<Vec<_>>(),
                "data": format!("0x{}", hex::encode(&log.data)),
            })
        })
        .collect();
    for (i, log) in outcome.logs.iter().enumerate() {
        let topics: Vec<String> = log.topics.iter().map(|t| t.to_hex()).collect();
        out = out.line(format!(
            "log[{i}]: {} [{}] 0x{}",
            log.address,
            topics.join(", "),
            hex::encode(&log.data)
        ));
    }
    out.field_value("logs", Value::Array(logs))
}
