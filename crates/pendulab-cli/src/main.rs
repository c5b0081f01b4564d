//! Pendulab CLI: period measurement, length sweeps, and debugging.

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

#[derive(Parser)]
#[command(name = "pendulab")]
#[command(version, about = "Pendulab — pendulum simulation and period-measurement lab")]
struct Cli {
    /// Logging verbosity (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one measured pendulum session.
    Simulate {
        /// Session config (TOML or JSON). Defaults apply when omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Frame budget for the run.
        #[arg(short, long, default_value_t = 20_000)]
        frames: u64,

        /// Write a state snapshot here when the run ends.
        #[arg(short, long)]
        snapshot: Option<String>,

        /// Print the session report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Measure the period at several lengths and estimate g.
    Sweep {
        /// Scenario (seconds_pendulum, short_pendulum, length_sweep, all).
        #[arg(short, long, default_value = "length_sweep")]
        scenario: String,

        /// Comma-separated lengths in metres; overrides the scenario's.
        #[arg(long, value_delimiter = ',')]
        lengths: Option<Vec<f64>>,

        /// Oscillations timed per length.
        #[arg(long)]
        oscillations: Option<u32>,

        /// Output CSV file path.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Export per-frame render transforms to JSON.
    Frames {
        /// Session config (TOML or JSON). Defaults apply when omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Frames to export.
        #[arg(short, long, default_value_t = 600)]
        frames: u64,

        /// Output JSON file path.
        #[arg(short, long, default_value = "frames.json")]
        output: String,
    },

    /// Inspect a state snapshot file.
    Inspect {
        /// Path to snapshot file.
        path: String,
    },

    /// Validate a session config file.
    Validate {
        /// Path to config file (TOML or JSON).
        path: String,
    },
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not install logger: {e}");
    }

    let result = match cli.command {
        Commands::Simulate {
            config,
            frames,
            snapshot,
            json,
        } => commands::simulate(config.as_deref(), frames, snapshot.as_deref(), json),
        Commands::Sweep {
            scenario,
            lengths,
            oscillations,
            output,
        } => commands::sweep(&scenario, lengths, oscillations, output.as_deref()),
        Commands::Frames {
            config,
            frames,
            output,
        } => commands::frames(config.as_deref(), frames, &output),
        Commands::Inspect { path } => commands::inspect(&path),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
