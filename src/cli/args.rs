// CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Aggregate test-runner lifecycle events into a cumulative HTML report
#[derive(Parser, Debug)]
#[command(name = "reportify")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Turn runner lifecycle events into a cumulative HTML report",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // Flatten RunArgs to support the implicit run command at top level.
    // This allows `reportify events.ndjson` to work as expected.
    #[command(flatten)]
    pub run_args: RunArgs,

    /// Enable verbose debug output
    #[arg(short = 'v', long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value_t = false)]
    pub no_color: bool,

    /// Show current configuration and exit
    #[arg(long, default_value_t = false)]
    pub config: bool,

    /// Create default configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub init_config: Option<PathBuf>,

    /// Install shell completion (bash, zsh, fish, elvish, powershell)
    #[arg(long, value_name = "SHELL_TYPE", value_parser = ["bash", "zsh", "fish", "elvish", "powershell"])]
    pub completion: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest an event stream and write the report (default)
    Run(RunArgs),

    /// Re-render the HTML document from the persisted history
    Render(RenderArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// NDJSON event stream to ingest (`-` or omitted reads stdin)
    #[arg(required = false)]
    pub events: Option<PathBuf>,

    /// Directory the report artifacts are written into
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Base name of the report files
    #[arg(long, value_name = "NAME")]
    pub report_name: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RenderArgs {
    /// Directory the report artifacts are written into
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Base name of the report files
    #[arg(long, value_name = "NAME")]
    pub report_name: Option<String>,
}
