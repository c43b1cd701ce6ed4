//! odsgrid - view and edit OpenDocument spreadsheets in the terminal

mod config;
mod logging;
#[cfg(feature = "tui")]
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use odsgrid_core::{CellAddress, Document};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use crate::config::Config;
use crate::logging::LogOutput;

#[derive(Debug, Parser)]
#[command(name = "odsgrid", version, about = "View and edit .ods spreadsheets")]
struct Cli {
    /// Spreadsheet file to open (.ods)
    file: PathBuf,

    /// Print the parsed sheets as JSON and exit
    #[arg(long)]
    dump: bool,

    /// Set a cell before anything else, then save (SHEET:ROW:COL=VALUE, zero-based)
    #[arg(long = "set", value_name = "SHEET:ROW:COL=VALUE")]
    set: Vec<String>,

    /// Export all sheets to a markdown file (non-interactive)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Export one sheet to a CSV file (non-interactive)
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Sheet exported by --csv (1-based)
    #[arg(long, default_value_t = 1, value_name = "N")]
    sheet: usize,

    /// Read configuration from this file
    #[arg(long, value_name = "PATH", env = "ODSGRID_CONFIG")]
    config: Option<PathBuf>,

    /// Select keybindings (vim or emacs)
    #[arg(long, value_name = "NAME")]
    keymap: Option<String>,
}

impl Cli {
    fn is_headless(&self) -> bool {
        self.dump || !self.set.is_empty() || self.output.is_some() || self.csv.is_some()
    }
}

/// Split `SHEET:ROW:COL=VALUE` at the first `=`.
fn parse_set(arg: &str) -> Result<(CellAddress, &str)> {
    let (address, value) = arg
        .split_once('=')
        .with_context(|| format!("--set expects SHEET:ROW:COL=VALUE, got '{}'", arg))?;
    let address = address.parse::<CellAddress>()?;
    Ok((address, value))
}

fn run_headless(cli: &Cli) -> Result<()> {
    let mut doc = Document::open(&cli.file)
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;
    for arg in &cli.set {
        let (address, value) = parse_set(arg)?;
        doc.apply_edit(address, value)
            .with_context(|| format!("Failed to set {}", address))?;
        info!(%address, "set");
    }
    if doc.modified {
        doc.save()
            .with_context(|| format!("Failed to save {}", cli.file.display()))?;
    }

    if cli.dump {
        let json = serde_json::to_string_pretty(doc.model())?;
        println!("{}", json);
    }
    if let Some(path) = &cli.output {
        doc.export_markdown(path)?;
        eprintln!("Exported to {}", path.display());
    }
    if let Some(path) = &cli.csv {
        let sheet = cli
            .sheet
            .checked_sub(1)
            .context("--sheet is 1-based")?;
        doc.export_csv(path, sheet)?;
        eprintln!("Exported to {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn run_tui(cli: &Cli, config: &Config) -> Result<()> {
    let requested = cli.keymap.as_deref().unwrap_or(&config.keymap);
    let (keymap, warning) = tui::Keymap::from_name(requested);
    if let Some(warning) = warning {
        eprintln!("Warning: {}", warning);
    }

    let mut app = tui::App::open(&cli.file, config, keymap)
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;
    tui::run(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_tui(_cli: &Cli, _config: &Config) -> Result<()> {
    anyhow::bail!("built without the terminal UI; use --dump, --set, --output or --csv")
}

fn log_output(cli: &Cli, config: &Config) -> Option<LogOutput> {
    if cli.is_headless() {
        return Some(LogOutput::Stderr);
    }
    // Anything on stderr would draw over the terminal UI.
    config
        .log_file
        .then(crate::config::log_file_path)
        .flatten()
        .map(LogOutput::File)
}

fn run(cli: Cli) -> Result<()> {
    let (config, warnings) = config::load_config(cli.config.as_deref());
    for warning in &warnings {
        eprintln!("Warning: {}", warning);
    }

    let _guard = match log_output(&cli, &config) {
        Some(output) => Some(logging::init_logging(&output)?),
        None => None,
    };

    if cli.is_headless() {
        run_headless(&cli)
    } else {
        run_tui(&cli, &config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_set_splits_at_first_equals() {
        let (address, value) = parse_set("0:2:1=a=b").unwrap();
        assert_eq!(address, CellAddress::new(0, 2, 1));
        assert_eq!(value, "a=b");
        assert!(parse_set("0:2:1").is_err());
        assert!(parse_set("B3=x").is_err());
    }

    #[test]
    fn headless_flags() {
        let cli = Cli::parse_from(["odsgrid", "book.ods"]);
        assert!(!cli.is_headless());
        let cli = Cli::parse_from(["odsgrid", "book.ods", "--set", "0:0:0=x", "--set", "0:1:0=y"]);
        assert!(cli.is_headless());
        assert_eq!(cli.set.len(), 2);
    }
}
