use std::io::Write;

use bsweep_core::errors::SweepError;
use bsweep_core::{OutputRow, SweepPoint};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{aggregate, Aggregated};
use crate::config::SweepConfig;
use crate::hash::stable_hash_string;
use crate::invoke::{build_args, ProcessInvoker};
use crate::normalize::RateNormalizer;
use crate::schedule::RepeatCounts;
use crate::sequence::generate;
use crate::table::{table_header, TableEmitter};

/// Counters reported once a sweep completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SweepSummary {
    /// Sweep points measured.
    pub points: usize,
    /// Executable invocations.
    pub trials: usize,
    /// Lines written after the header (raw chunks in concatenate mode).
    pub rows: usize,
}

/// A sweep point with the trial count the scheduler assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedPoint {
    /// The point itself.
    #[serde(flatten)]
    pub point: SweepPoint,
    /// Number of trials.
    pub repeats: u32,
    /// Exact argument list passed to the executable.
    pub args: Vec<String>,
}

/// Dry-run description of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Stable hash of the validated config.
    pub config_hash: String,
    /// Header the table will start with, if any.
    pub header: Option<Vec<String>>,
    /// Points in execution order.
    pub points: Vec<PlannedPoint>,
    /// Total executable invocations.
    pub total_trials: u64,
}

/// Pairs every generated point with its trial count. The scheduler advances
/// once per primary size; secondary values of that size reuse the count.
fn scheduled_points(
    config: &SweepConfig,
) -> Result<impl Iterator<Item = (SweepPoint, u32)> + '_, SweepError> {
    let points = generate(config)?;
    let mut counts = RepeatCounts::new(&config.repeat);
    let mut current: Option<(u32, u32)> = None;
    Ok(points.map(move |point| {
        let repeats = match current {
            Some((step, repeats)) if step == point.step => repeats,
            _ => {
                let repeats = counts.next().unwrap_or(config.repeat.floor);
                current = Some((point.step, repeats));
                repeats
            }
        };
        (point, repeats)
    }))
}

/// Expands `config` into the full execution plan without launching anything.
pub fn plan_sweep(config: &SweepConfig) -> Result<SweepPlan, SweepError> {
    config.validate()?;
    let config_hash = stable_hash_string(config)?;
    let format = config.invocation.argument_format;
    let points: Vec<PlannedPoint> = scheduled_points(config)?
        .map(|(point, repeats)| PlannedPoint {
            args: build_args(&point, format),
            point,
            repeats,
        })
        .collect();
    let total_trials = points.iter().map(|p| u64::from(p.repeats)).sum();
    Ok(SweepPlan {
        config_hash,
        header: table_header(config),
        points,
        total_trials,
    })
}

/// Runs the sweep: generate, schedule, invoke, aggregate, normalize, emit.
///
/// Processing is strictly sequential. The first error aborts the sweep; rows
/// already written to `out` stay there.
pub fn run_sweep<I, W>(
    config: &SweepConfig,
    invoker: &mut I,
    out: W,
) -> Result<SweepSummary, SweepError>
where
    I: ProcessInvoker + ?Sized,
    W: Write,
{
    config.validate()?;
    let normalizer = RateNormalizer::new(config.normalize);
    let mut emitter = TableEmitter::new(out);
    if let Some(header) = table_header(config) {
        emitter.emit_header(&header)?;
    }
    let config_hash = stable_hash_string(config)?;
    info!(
        %config_hash,
        executable = %config.executable.display(),
        mode = ?config.reduction,
        normalize = config.normalize,
        "sweep started"
    );

    let mut summary = SweepSummary::default();
    let mut last_step = None;
    for (point, repeats) in scheduled_points(config)? {
        if last_step != Some(point.step) {
            debug!(step = point.step, size = point.size, repeats, "primary point");
            last_step = Some(point.step);
        }
        let mut outputs = Vec::with_capacity(repeats as usize);
        for _ in 0..repeats {
            outputs.push(invoker.invoke(&config.executable, &point)?);
        }
        summary.points += 1;
        summary.trials += outputs.len();

        match aggregate(&outputs, &config.fields, config.reduction)? {
            Aggregated::Reduced(result) => {
                let result = normalizer.normalize(result, point.size);
                emitter.emit_row(&OutputRow::from(&result))?;
                summary.rows += 1;
            }
            Aggregated::PerTrial(results) => {
                for result in results {
                    let result = normalizer.normalize(result, point.size);
                    emitter.emit_row(&OutputRow::from(&result))?;
                    summary.rows += 1;
                }
            }
            Aggregated::Verbatim(texts) => {
                for text in &texts {
                    emitter.emit_raw(text)?;
                    summary.rows += 1;
                }
            }
        }
    }
    emitter.into_inner()?;
    info!(
        points = summary.points,
        trials = summary.trials,
        rows = summary.rows,
        "sweep finished"
    );
    Ok(summary)
}
