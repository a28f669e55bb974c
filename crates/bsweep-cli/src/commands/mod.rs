use std::error::Error;
use std::path::Path;

use bsweep_exp::{load_config, SweepConfig};

pub mod plan;
pub mod run;
pub mod version;

/// Loads the config file and applies command-line overrides.
pub fn resolve_config(
    path: &Path,
    executable: Option<&Path>,
) -> Result<SweepConfig, Box<dyn Error>> {
    let mut config = load_config(path)?;
    if let Some(executable) = executable {
        config.executable = executable.to_path_buf();
        config.validate()?;
    }
    Ok(config)
}
