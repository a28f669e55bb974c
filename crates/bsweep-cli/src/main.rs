use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    plan::{self, PlanArgs},
    run::{self, RunArgs},
    version::{self, VersionArgs},
};
use tracing::Level;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "bsweep", about = "Benchmark sweep driver")]
struct Cli {
    /// Maximum level of diagnostics written to stderr.
    #[arg(long, global = true, default_value_t = Level::WARN)]
    log_level: Level,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a sweep and write the result table.
    Run(RunArgs),
    /// Print the sweep points and trial counts without running anything.
    Plan(PlanArgs),
    /// Print version information.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    // stdout carries the table; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Plan(args) => plan::run(&args),
        Command::Version(args) => version::run(&args),
    }
}
