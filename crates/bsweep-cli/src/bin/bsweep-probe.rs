//! Deterministic stand-in for a measurement executable.
//!
//! Invoked as `bsweep-probe <size> [<secondary>]`. The environment selects
//! what it prints so the driver can be exercised end to end:
//!
//! - `BSWEEP_PROBE_STYLE`: `pair` (default, `setup <n>` / `run <n>`), `csv`
//!   (`<size>,<run>`), `short` (setup line only), `echo` (the received
//!   arguments as `size <a>` / `param <b>`), `hang` (sleeps for a minute).
//! - `BSWEEP_PROBE_SETUP`, `BSWEEP_PROBE_RUN`: reported costs (10 and 20).
//! - `BSWEEP_PROBE_EXIT`: exit status after printing (0).

use std::env;
use std::error::Error;
use std::io::{self, Write};
use std::process;
use std::thread;
use std::time::Duration;

const USAGE: &str = "usage: bsweep-probe <size> [<secondary>]";

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let size = args.next().ok_or(USAGE)?;
    let secondary = args.next();

    let setup = var_or("BSWEEP_PROBE_SETUP", "10");
    let run = var_or("BSWEEP_PROBE_RUN", "20");
    match var_or("BSWEEP_PROBE_STYLE", "pair").as_str() {
        "pair" => print!("setup {setup}\nrun {run}\n"),
        "csv" => println!("{size},{run}"),
        "short" => println!("setup {setup}"),
        "echo" => print!(
            "size {size}\nparam {}\n",
            secondary.as_deref().unwrap_or("0")
        ),
        "hang" => thread::sleep(Duration::from_secs(60)),
        other => return Err(format!("unknown BSWEEP_PROBE_STYLE `{other}`").into()),
    }

    let status: i32 = var_or("BSWEEP_PROBE_EXIT", "0").parse()?;
    if status != 0 {
        io::stdout().flush()?;
        process::exit(status);
    }
    Ok(())
}
