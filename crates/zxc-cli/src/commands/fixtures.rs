//! `fixtures`: run JSON fixture cases

use clap::Args;
use serde_json::{json, Value};
use std::path::PathBuf;
use zxc_evm::Revision;
use zxc_evm_tests::TestRunner;

use crate::output::Output;

/// Arguments for `fixtures`
#[derive(Debug, Args)]
pub struct FixturesArgs {
    /// Fixture file or directory
    pub path: PathBuf,

    /// Revision for cases that do not name one
    #[arg(long, default_value_t = Revision::Istanbul)]
    pub revision: Revision,

    /// Log each case as it runs
    #[arg(long)]
    pub verbose: bool,
}

pub fn execute(args: &FixturesArgs, json: bool) -> anyhow::Result<()> {
    let stats = TestRunner::new(args.revision, args.verbose).run_path(&args.path)?;

    if json {
        let failures: Vec<Value> = stats
            .failures
            .iter()
            .map(|(name, reason)| json!({ "name": name, "reason": reason }))
            .collect();
        Output::new(true)
            .field_u64("total", stats.total as u64)
            .field_u64("passed", stats.passed as u64)
            .field_u64("failed", stats.failed as u64)
            .field_u64("unreadable", stats.unreadable.len() as u64)
            .field_value("failures", Value::Array(failures))
            .print();
    } else {
        stats.print_summary();
    }

    if !stats.all_passed() {
        anyhow::bail!(
            "{} of {} fixture cases failed, {} files unreadable",
            stats.failed,
            stats.total,
            stats.unreadable.len()
        );
    }
    Ok(())
}
