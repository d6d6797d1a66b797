// Main entry point for reportify

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::warn;

use reportify::cli::{Cli, Commands, RenderArgs, RunArgs};
use reportify::config::{self, Config};
use reportify::ingest::{Ingestor, RunnerEvent};
use reportify::merge::{HistoryStore, merge_snapshots};
use reportify::report::{ConsoleEmitter, Emitter, HtmlEmitter};

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    // Load configuration from file (if exists)
    let config = Config::load();

    let cli = Cli::parse();

    // Setup tracing
    let filter = if cli.verbose {
        "reportify=debug,warn"
    } else {
        "reportify=warn,error"
    };

    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .event_format(reportify::logging::CustomFormatter)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    if cli.no_color {
        console::set_colors_enabled(false);
    }

    // Handle completion flag
    if let Some(shell) = cli.completion.as_deref() {
        generate_completion(shell);
        return Ok(());
    }

    // Handle init-config flag
    if let Some(path) = cli.init_config {
        let default_config = Config::default();
        std::fs::write(&path, default_config.to_toml())
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        println!("Created configuration file: {}", path.display());
        return Ok(());
    }

    // Handle config flag
    if cli.config {
        print_config(config.as_ref(), &cli.run_args);
        return Ok(());
    }

    match cli.command {
        Some(Commands::Run(args)) => run(args, config.as_ref()),
        Some(Commands::Render(args)) => render(args, config.as_ref()),
        None => run(cli.run_args, config.as_ref()),
    }
}

/// Ingest the event stream, fold the run into the persisted history, and
/// emit the report artifacts.
fn run(args: RunArgs, config: Option<&Config>) -> Result<()> {
    let base = resolve_report_base(args.output_dir.as_deref(), args.report_name.as_deref(), config);

    let mut ingestor = Ingestor::new();
    let reader = open_events(args.events.as_deref())?;
    for (number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read event stream")?;
        if line.trim().is_empty() {
            continue;
        }
        let event: RunnerEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(err) => {
                warn!("skipping undecodable event at line {}: {}", number + 1, err);
                continue;
            }
        };
        ingestor.apply(event).with_context(|| {
            format!(
                "event stream violated the ordering contract at line {}",
                number + 1
            )
        })?;
    }
    let snapshot = ingestor.finalize();

    let store = HistoryStore::new(&base);
    let mut history = store.load()?;
    history.push(merge_snapshots(std::slice::from_ref(&snapshot)));
    store.save(&history)?;

    emit_report(&base, &history)
}

/// Re-render the report artifacts from the persisted history
fn render(args: RenderArgs, config: Option<&Config>) -> Result<()> {
    let base = resolve_report_base(args.output_dir.as_deref(), args.report_name.as_deref(), config);

    let store = HistoryStore::new(&base);
    let history = store.load()?;

    emit_report(&base, &history)
}

fn emit_report(base: &Path, history: &[reportify::RunSnapshot]) -> Result<()> {
    let cumulative = merge_snapshots(history);
    let html_path = base.with_extension("html");

    HtmlEmitter::new(html_path.clone()).emit(&cumulative)?;
    ConsoleEmitter::new(html_path).emit(&cumulative)?;
    Ok(())
}

fn open_events(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open event stream: {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn resolve_report_base(
    cli_dir: Option<&Path>,
    cli_name: Option<&str>,
    config: Option<&Config>,
) -> PathBuf {
    let config_dir = config.and_then(|c| c.report.output_dir.as_deref().map(PathBuf::from));
    let dir = cli_dir.map(Path::to_path_buf).or(config_dir);
    let name = cli_name
        .map(str::to_string)
        .or_else(|| config.map(|c| c.report.report_name.clone()));

    config::report_base(dir.as_deref(), name.as_deref())
}

fn print_config(config: Option<&Config>, args: &RunArgs) {
    println!("Current configuration:");

    println!("\n  Command-line arguments:");
    if let Some(ref dir) = args.output_dir {
        println!("    Output directory: {}", dir.display());
    }
    if let Some(ref name) = args.report_name {
        println!("    Report name: {}", name);
    }

    if let Some(cfg) = config {
        println!("\n  Configuration file loaded:");
        if let Some(ref dir) = cfg.report.output_dir {
            println!("    Output directory: {}", dir);
        }
        println!("    Report name: {}", cfg.report.report_name);
    } else {
        println!("\n  No configuration file loaded");
        println!("  Create one with: reportify --init-config .reportifyrc.toml");
    }

    let base = resolve_report_base(
        args.output_dir.as_deref(),
        args.report_name.as_deref(),
        config,
    );
    println!("\n  Effective report base: {}", base.display());
}

fn generate_completion(shell: &str) {
    use clap_complete::{generate, shells};

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut out = io::stdout();

    match shell {
        "bash" => generate(shells::Bash, &mut cmd, &name, &mut out),
        "zsh" => generate(shells::Zsh, &mut cmd, &name, &mut out),
        "fish" => generate(shells::Fish, &mut cmd, &name, &mut out),
        "elvish" => generate(shells::Elvish, &mut cmd, &name, &mut out),
        "powershell" => generate(shells::PowerShell, &mut cmd, &name, &mut out),
        other => warn!("unsupported completion shell: {}", other),
    }
}
