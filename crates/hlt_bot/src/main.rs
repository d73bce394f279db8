//! Fleet bot entry point.

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use hlt_bot::logging::{init_logging, init_stderr_logging};
use hlt_bot::shutdown::SHUTDOWN_GRACE;
use hlt_bot::{BotRunner, Result, ShutdownSignal};
use hlt_core::config::Tuning;
use hlt_core::replay::TurnRecording;

/// Halite III fleet bot.
#[derive(Parser)]
#[command(name = "hlt_bot")]
#[command(about = "Halite III fleet bot", long_about = None)]
struct Cli {
    /// RNG seed. Defaults to clock nanoseconds modulo the process id.
    seed: Option<u64>,

    /// Name reported to the host.
    #[arg(long, default_value = "FleetBot")]
    name: String,

    /// RON file with tuning overrides.
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Directory for the per-player log file.
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,

    /// Write a turn recording to this file when the game ends.
    #[arg(long)]
    record: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-plan a recorded game and check it reproduces.
    Replay {
        /// Recording file.
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Replay { file }) => cmd_replay(file, cli.verbose),
        None => cmd_play(&cli),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Bot stopped");
            eprintln!("FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}

fn default_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let pid = u128::from(std::process::id().max(1));
    u64::try_from(nanos % pid).unwrap_or_default()
}

fn cmd_play(cli: &Cli) -> Result<ExitCode> {
    let seed = cli.seed.unwrap_or_else(default_seed);
    let tuning = match &cli.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };

    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    let mut runner = BotRunner::connect(stdin, stdout, tuning, seed)?;

    let log_path = init_logging(&cli.log_dir, runner.player_id(), cli.verbose)?;
    let shutdown = match ShutdownSignal::install(SHUTDOWN_GRACE) {
        Ok(signal) => signal,
        Err(e) => {
            warn!(error = %e, "Signal handling unavailable");
            ShutdownSignal::new()
        }
    };

    if cli.record.is_some() {
        runner.record_as(&cli.name);
    }
    runner.ready(&cli.name)?;
    info!(log = %log_path.display(), config = ?runner.config(), "Bot ready");

    let outcome = runner.run(&shutdown);

    if let (Some(path), Some(recording)) = (&cli.record, runner.take_recording()) {
        match recording.save(path) {
            Ok(()) => info!(
                path = %path.display(),
                turns = recording.turn_count(),
                "Saved recording"
            ),
            Err(e) => error!(path = %path.display(), error = %e, "Failed to save recording"),
        }
    }

    let summary = outcome?;
    info!(
        turns = summary.turns,
        moves = summary.moves,
        spawns = summary.spawns,
        interrupted = summary.interrupted,
        "Game over"
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_replay(file: &Path, verbose: bool) -> Result<ExitCode> {
    init_stderr_logging(verbose)?;

    let recording = TurnRecording::load(file)?;
    info!(
        bot = %recording.bot_name,
        seed = recording.seed,
        turns = recording.turn_count(),
        "Loaded recording"
    );

    match recording.verify()? {
        None => {
            println!(
                "Recording reproduces: {} turns, seed {}",
                recording.turn_count(),
                recording.seed
            );
            Ok(ExitCode::SUCCESS)
        }
        Some(turn) => {
            println!("Recording diverges at turn {turn}");
            Ok(ExitCode::FAILURE)
        }
    }
}
