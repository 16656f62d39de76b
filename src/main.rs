use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gapmatrix::{Error, Gap, GapMatrixConfig, JsonFileBackend, Matrix, SettingsStore};
use tracing_subscriber::EnvFilter;

/// Inspect and edit tiered referral reward schedules
#[derive(Debug, Parser)]
#[command(name = "gapmatrix", version)]
struct Cli {
    /// Path to the JSON settings document
    #[arg(long, default_value = "assets/admin.json")]
    settings: PathBuf,

    /// Configuration scope (bot language or deployment)
    #[arg(long, default_value = "en")]
    scope: String,

    /// Fail instead of creating a missing settings file
    #[arg(long)]
    no_create: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every level and gap of the scope
    Show,
    /// Reward for COUNT at LEVEL
    Reward {
        level: usize,
        #[arg(allow_hyphen_values = true)]
        count: i64,
    },
    /// Print the gap at (LEVEL, INDEX)
    Gap { level: usize, index: usize },
    /// Append a one-count gap to LEVEL
    AddGap { level: usize },
    /// Overwrite a gap and propagate its borders through the level
    UpdateGap {
        level: usize,
        index: usize,
        left: i64,
        right: i64,
        amount: i64,
    },
    /// Delete the gap at (LEVEL, INDEX)
    DeleteGap { level: usize, index: usize },
    /// Add DELTA (may be negative) to a gap's amount
    AdjustAmount {
        level: usize,
        index: usize,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Append a level holding a single default gap
    AddLevel,
    /// Delete LEVEL and renumber the rest
    DeleteLevel { level: usize },
}

fn print_matrix(scope: &str, matrix: &Matrix) {
    println!("Scope: {}", scope);
    for level in matrix.levels() {
        println!("Level {}", level.number());
        for gap in level.gaps() {
            let top = if gap.index == level.len() { "+" } else { "" };
            println!(
                "  {:>3}. {:>6} ..= {:<6}{:1} -> {}",
                gap.index, gap.left_border, gap.right_border, top, gap.amount
            );
        }
    }
}

fn print_focus(gap: &Gap) {
    println!("Focus: {}", gap);
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = GapMatrixConfig::with_path(cli.settings)
        .with_scopes([cli.scope.clone()])
        .create_if_missing(!cli.no_create);
    let store: SettingsStore<JsonFileBackend> = SettingsStore::open_file(&config)?;
    let scope = cli.scope.as_str();

    match cli.command {
        Command::Show => print_matrix(scope, &store.matrix(scope)),
        Command::Reward { level, count } => println!("{}", store.reward(scope, level, count)),
        Command::Gap { level, index } => println!("{}", store.gap(scope, level, index)),
        Command::AddGap { level } => print_focus(&store.add_gap(scope, level)?),
        Command::UpdateGap {
            level,
            index,
            left,
            right,
            amount,
        } => {
            let gap = Gap::new(left, right, amount).at(level, index);
            print_focus(&store.update_gap(scope, gap)?);
        }
        Command::DeleteGap { level, index } => print_focus(&store.delete_gap(scope, level, index)?),
        Command::AdjustAmount { level, index, delta } => {
            print_focus(&store.adjust_amount(scope, level, index, delta)?)
        }
        Command::AddLevel => print_focus(&store.add_level(scope)?),
        Command::DeleteLevel { level } => print_focus(&store.delete_level(scope, level)?),
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
