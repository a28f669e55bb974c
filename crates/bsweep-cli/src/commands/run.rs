use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use bsweep_exp::{run_sweep, SystemInvoker};
use clap::Args;
use tracing::info;

use super::resolve_config;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML sweep configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Measurement executable, overriding the one in the config.
    #[arg(long)]
    pub executable: Option<PathBuf>,
    /// Write the table to this file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(&args.config, args.executable.as_deref())?;
    let mut invoker = SystemInvoker::new(&config.invocation);
    let summary = match &args.out {
        Some(path) => {
            let file = File::create(path)?;
            run_sweep(&config, &mut invoker, BufWriter::new(file))?
        }
        None => run_sweep(&config, &mut invoker, io::stdout().lock())?,
    };
    if let Some(path) = &args.out {
        info!(path = %path.display(), rows = summary.rows, "table written");
    }
    Ok(())
}
