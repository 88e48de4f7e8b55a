//! Directory walking and statistics

use crate::error::TestResult;
use crate::vm_test::{VmTestResults, VmTestRunner};
use std::path::Path;
use std::time::{Duration, Instant};
use zxc_evm::Revision;

/// Aggregated statistics
#[derive(Debug, Default)]
pub struct TestStats {
    /// Total cases executed
    pub total: usize,
    /// Cases passed
    pub passed: usize,
    /// Cases failed
    pub failed: usize,
    /// Files that could not be parsed
    pub unreadable: Vec<(String, String)>,
    /// Total execution time
    pub duration: Duration,
    /// Failed case names with reasons
    pub failures: Vec<(String, String)>,
}

impl TestStats {
    /// Create empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add results of one file
    pub fn add_results(&mut self, results: &VmTestResults) {
        self.total += results.total();
        self.passed += results.passed.len();
        self.failed += results.failed.len();
        for (name, reason) in &results.failed {
            self.failures.push((name.clone(), reason.clone()));
        }
    }

    /// Whether every case passed and every file was readable
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.unreadable.is_empty()
    }

    /// Pass rate as percentage
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.passed as f64 / self.total as f64) * 100.0
    }

    /// Print summary
    pub fn print_summary(&self) {
        println!("\n========================================");
        println!("Fixture Summary");
        println!("========================================");
        println!("Total:   {}", self.total);
        println!("Passed:  {}", self.passed);
        println!("Failed:  {}", self.failed);
        println!("Pass Rate: {:.2}%", self.pass_rate());
        println!("Duration: {:.2}s", self.duration.as_secs_f64());

        if !self.unreadable.is_empty() {
            println!("\nUnreadable files:");
            for (file, reason) in &self.unreadable {
                println!("  - {}: {}", file, reason);
            }
        }

        if !self.failures.is_empty() {
            println!("\nFailed cases:");
            for (name, reason) in &self.failures {
                println!("  - {}: {}", name, reason);
            }
        }
    }
}

/// Runs a fixture file or every `.json` file below a directory
pub struct TestRunner {
    runner: VmTestRunner,
    verbose: bool,
}

impl TestRunner {
    /// Create a runner; cases without a revision use `revision`
    pub fn new(revision: Revision, verbose: bool) -> Self {
        Self {
            runner: VmTestRunner::new(revision, verbose),
            verbose,
        }
    }

    /// Run a file or a directory tree
    pub fn run_path(&self, path: &Path) -> TestResult<TestStats> {
        let mut stats = TestStats::new();
        let start = Instant::now();

        if self.verbose {
            tracing::info!("Running fixtures from: {:?}", path);
        }

        if path.is_dir() {
            self.run_dir(path, &mut stats)?;
        } else {
            self.run_one(path, &mut stats);
        }

        stats.duration = start.elapsed();
        Ok(stats)
    }

    fn run_dir(&self, dir: &Path, stats: &mut TestStats) -> TestResult<()> {
        let mut entries = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                self.run_dir(&path, stats)?;
            } else if path.extension().is_some_and(|e| e == "json") {
                self.run_one(&path, stats);
            }
        }
        Ok(())
    }

    fn run_one(&self, path: &Path, stats: &mut TestStats) {
        match self.runner.run_file(path) {
            Ok(results) => {
                if self.verbose && !results.failed.is_empty() {
                    tracing::warn!(
                        "File: {:?} - {} passed, {} failed",
                        path,
                        results.passed.len(),
                        results.failed.len()
                    );
                }
                stats.add_results(&results);
            }
            Err(e) => {
                tracing::warn!("Unreadable fixture {:?}: {}", path, e);
                stats
                    .unreadable
                    .push((path.to_string_lossy().to_string(), e.to_string()));
            }
        }
    }
}
