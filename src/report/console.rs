// Console emitter - terminal summary of the merged snapshot

use super::{Emitter, format_duration};
use crate::model::RunSnapshot;
use anyhow::Result;
use console::style;
use std::path::PathBuf;

/// Prints the run summary and the final report location
pub struct ConsoleEmitter {
    report_path: PathBuf,
}

impl ConsoleEmitter {
    pub fn new(report_path: PathBuf) -> Self {
        Self { report_path }
    }
}

impl Emitter for ConsoleEmitter {
    fn emit(&self, stats: &RunSnapshot) -> Result<()> {
        let duration = format_duration(stats.duration_ms);

        println!();
        if stats.counts.failures > 0 {
            println!(
                "{} ({} failed, {} passed in {})",
                style("FAILED").red().bold(),
                stats.counts.failures,
                stats.counts.passes,
                duration
            );
        } else {
            println!(
                "{} ({} passed in {})",
                style("PASSED").green().bold(),
                stats.counts.passes,
                duration
            );
        }
        println!(
            "  Tests:  {} passed, {} pending, {} failed",
            stats.counts.passes, stats.counts.pending, stats.counts.failures
        );
        println!(
            "  Suites: {} passed, {} pending, {} failed",
            stats.suite_results.passing, stats.suite_results.pending, stats.suite_results.failing
        );
        println!();
        println!("View report at: {}", self.report_path.display());

        Ok(())
    }
}
