//! Sweep orchestration for external benchmark executables.
//!
//! A [`SweepConfig`] is expanded into sweep points, every point is measured
//! a scheduled number of times through a [`ProcessInvoker`], the trials are
//! reduced, optionally normalized by size, and written as a comma-separated
//! table.

mod aggregate;
mod config;
mod driver;
mod hash;
mod invoke;
mod normalize;
mod schedule;
mod sequence;
mod serde;
mod table;

pub use aggregate::{aggregate, parse_sample, Aggregated};
pub use config::{
    load_config, ArgumentFormat, InvocationConfig, ReductionMode, RepeatPolicy, SecondaryRange,
    Spacing, SweepConfig, MAX_SECONDARY_VALUES,
};
pub use driver::{plan_sweep, run_sweep, PlannedPoint, SweepPlan, SweepSummary};
pub use hash::stable_hash_string;
pub use invoke::{build_args, format_size_argument, ProcessInvoker, SystemInvoker};
pub use normalize::RateNormalizer;
pub use schedule::{RepeatCounts, RepeatScheduler};
pub use sequence::{generate, SweepPoints};
pub use table::{format_size, format_value, table_header, TableEmitter};

pub use crate::serde::{to_canonical_json_bytes, to_yaml_string};
