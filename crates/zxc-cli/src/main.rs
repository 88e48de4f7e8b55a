//! # zxc-cli
//!
//! Command-line driver for the ZXC contract runtime.
//!
//! ## Usage
//!
//! ```bash
//! # Execute runtime code against a fresh in-memory ledger
//! zxcvm run --code 600160020160005260206000f3
//! zxcvm run --code 0x... --input 0x... --value 1000 --revision byzantium
//!
//! # Run init code as a CREATE and print the new address
//! zxcvm create --code 0x...
//!
//! # Disassemble
//! zxcvm disasm --code 0x6001600201
//!
//! # Run JSON fixtures
//! zxcvm fixtures crates/zxc-evm-tests/fixtures
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

use commands::{disasm::DisasmArgs, exec::ExecArgs, fixtures::FixturesArgs};
use config::Config;

/// ZXC contract VM
#[derive(Parser, Debug)]
#[command(name = "zxcvm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// TOML config file with `[vm]` and `[env]` tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute runtime code deployed at a fixed address
    Run(ExecArgs),
    /// Execute init code as a contract creation
    Create(ExecArgs),
    /// Print one instruction per line
    Disasm(DisasmArgs),
    /// Run a JSON fixture file or directory
    Fixtures(FixturesArgs),
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;
    match &cli.command {
        Commands::Run(args) => commands::exec::run(args, Config::load(cli.config.as_deref())?, json)?,
        Commands::Create(args) => {
            commands::exec::create(args, Config::load(cli.config.as_deref())?, json)?
        }
        Commands::Disasm(args) => commands::disasm::execute(args, json)?,
        Commands::Fixtures(args) => commands::fixtures::execute(args, json)?,
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json);

    let json = cli.json;
    if let Err(e) = dispatch(cli) {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "error": format!("{e:#}"),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}
