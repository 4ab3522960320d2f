mod calc;
mod cmd;
mod data;
mod logging;
mod ui;

use crate::calc::MonthCursor;
use crate::data::AppSettings;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "homedash", about = "personal dashboard: calendar notes and shopping list")]
struct Cli {
    /// Path to the data directory containing config and data files (default: ./config)
    #[arg(long, default_value = "./config")]
    data_dir: PathBuf,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Write logs here instead of <data-dir>/homedash.log
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize data files
    Init,
    /// List all calendar notes
    Notes,
    /// Save a note for a date; empty text removes it
    Note {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
        /// Note text
        text: Vec<String>,
    },
    /// Print the calendar grid for a month
    Month {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(value_parser = parse_month)]
        month: Option<MonthCursor>,
    },
    /// Print the shopping list
    Shopping,
}

fn parse_month(s: &str) -> Result<MonthCursor, String> {
    MonthCursor::parse(s).ok_or_else(|| format!("expected YYYY-MM, got '{s}'"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Resolve data_dir to an absolute path so file I/O works regardless of
    // future directory changes within the process.
    let data_dir = if cli.data_dir.is_absolute() {
        cli.data_dir.clone()
    } else {
        std::env::current_dir()?.join(&cli.data_dir)
    };
    data::persistence::set_data_dir(data_dir.clone());

    // Auto-init when the data directory is missing or empty and the user did not
    // explicitly invoke the `init` subcommand.
    let is_init_command = matches!(cli.command, Some(Commands::Init));
    if !is_init_command && dir_needs_init(&data_dir) {
        eprintln!(
            "Data directory '{}' is missing or empty, running init...",
            data_dir.display()
        );
        cmd::init::run()?;
    }

    let settings = AppSettings::load()?;
    let log_path = logging::resolve_log_path(&data_dir, cli.log_file.as_deref());
    let _logger = logging::init_logging(&settings.log_level, &log_path)?;
    info!(
        "event=app_start version={} data_dir={}",
        env!("CARGO_PKG_VERSION"),
        data_dir.display()
    );

    match cli.command {
        None => cmd::root::run(&settings, cli.today),
        Some(Commands::Init) => cmd::init::run(),
        Some(Commands::Notes) => cmd::notes::run(),
        Some(Commands::Note { date, text }) => cmd::notes::run_set(date, &text.join(" ")),
        Some(Commands::Month { month }) => cmd::month::run(&settings, month, cli.today),
        Some(Commands::Shopping) => cmd::shopping::run(),
    }
}

/// Returns true when `dir` does not exist or exists but contains no files.
fn dir_needs_init(dir: &std::path::Path) -> bool {
    if !dir.exists() {
        return true;
    }
    dir.read_dir()
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
