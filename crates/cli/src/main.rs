use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use ppcboot_config::{BoardManifest, StopReason};
use ppcboot_core::board::{Board, BootOptions};

mod script;

#[derive(Parser, Debug)]
#[command(author, version, about = "ppcboot console simulator", long_about = None)]
struct Cli {
    /// Enable register-level tracing
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Boot a simulated board and print what its console transmitted
    Run {
        /// Path to the board manifest (YAML)
        #[arg(short, long)]
        board: Option<PathBuf>,

        /// Boot as if running under QEMU
        #[arg(short, long)]
        emulated: bool,

        /// Number of received bytes to echo back after the banner
        #[arg(long, default_value = "0")]
        echo: u32,

        /// Status polls allowed per wait before giving up
        #[arg(long, default_value = "100000", value_parser = clap::value_parser!(u32).range(1..))]
        max_polls: u32,
    },
    /// Run a test script and check its assertions
    Test {
        /// Path to the test script (YAML)
        #[arg(short, long)]
        script: PathBuf,

        /// Directory to write result.json into
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Console output owns stdout; logs go to stderr.
    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Command::Run {
            board,
            emulated,
            echo,
            max_polls,
        } => run(board, emulated, echo, max_polls),
        Command::Test { script, output_dir } => test(script, output_dir),
    }
}

fn run(board: Option<PathBuf>, emulated: bool, echo: u32, max_polls: u32) -> anyhow::Result<()> {
    let manifest = if let Some(path) = board {
        info!("Loading board manifest: {:?}", path);
        BoardManifest::from_file(&path)?
    } else {
        info!("Using default board");
        BoardManifest::default()
    };

    let options = BootOptions {
        emulated: emulated || manifest.emulated,
        max_polls,
        echo,
    };
    let report = Board::new(&manifest).boot(&options);

    let mut stdout = std::io::stdout();
    stdout.write_all(&report.transcript)?;
    stdout.flush()?;

    info!(
        "Console: {}, stop reason: {:?}, status polls: {}",
        report.console, report.stop_reason, report.status_polls
    );
    if let Some(divisor) = report.clock_divisor {
        info!("Clock divisor: {}", divisor);
    }

    if report.stop_reason != StopReason::Halt {
        anyhow::bail!("Firmware did not halt: {:?}", report.stop_reason);
    }
    Ok(())
}

fn test(script: PathBuf, output_dir: Option<PathBuf>) -> anyhow::Result<()> {
    info!("Running test script: {:?}", script);
    let result = script::run_script(&script)?;

    for assertion in &result.assertions {
        info!(
            "[{}] {:?}: {}",
            if assertion.passed { "PASS" } else { "FAIL" },
            assertion.assertion,
            assertion.detail
        );
    }

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("result.json");
        std::fs::write(&path, serde_json::to_string_pretty(&result)?)?;
        info!("Wrote {:?}", path);
    }

    if !result.passed() {
        let failed = result.assertions.iter().filter(|a| !a.passed).count();
        anyhow::bail!("{} assertion(s) failed", failed);
    }
    Ok(())
}
