use std::error::Error;
use std::path::PathBuf;

use bsweep_exp::{plan_sweep, to_canonical_json_bytes, to_yaml_string};
use clap::{Args, ValueEnum};

use super::resolve_config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    Json,
    Yaml,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// YAML sweep configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Measurement executable, overriding the one in the config.
    #[arg(long)]
    pub executable: Option<PathBuf>,
    /// Output encoding of the plan.
    #[arg(long, value_enum, default_value_t = PlanFormat::Json)]
    pub format: PlanFormat,
}

pub fn run(args: &PlanArgs) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(&args.config, args.executable.as_deref())?;
    let plan = plan_sweep(&config)?;
    match args.format {
        PlanFormat::Json => {
            let bytes = to_canonical_json_bytes(&plan)?;
            println!("{}", String::from_utf8(bytes)?);
        }
        PlanFormat::Yaml => print!("{}", to_yaml_string(&plan)?),
    }
    Ok(())
}
