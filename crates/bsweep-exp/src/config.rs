use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bsweep_core::errors::{ErrorInfo, SweepError};
use serde::{Deserialize, Serialize};

use crate::sequence::size_at;
use crate::serde::from_yaml_slice;

/// How primary sizes are spread between `start` and `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Spacing {
    /// `start` and `end` are base-2 exponents; sizes grow geometrically.
    #[default]
    Geometric,
    /// `start` and `end` are sizes; sizes grow by a fixed step.
    Linear,
}

/// Secondary dimension crossed with every primary size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecondaryRange {
    /// Explicit ordered values.
    Values(Vec<i64>),
    /// Half-open span `start..end`.
    Span { start: i64, end: i64 },
}

/// Largest secondary range a config may declare.
pub const MAX_SECONDARY_VALUES: u64 = 1 << 16;

impl SecondaryRange {
    /// Number of values, or `None` when a span's width overflows `i64`.
    pub fn len(&self) -> Option<u64> {
        match self {
            SecondaryRange::Values(values) => Some(values.len() as u64),
            SecondaryRange::Span { start, end } if end <= start => Some(0),
            SecondaryRange::Span { start, end } => end.checked_sub(*start).map(|n| n as u64),
        }
    }

    /// Whether the range holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Expands the range into its ordered values.
    ///
    /// Spans wider than [`MAX_SECONDARY_VALUES`] are rejected by
    /// [`SweepConfig::validate`]; expand only validated ranges.
    pub fn values(&self) -> Vec<i64> {
        match self {
            SecondaryRange::Values(values) => values.clone(),
            SecondaryRange::Span { start, end } => (*start..*end).collect(),
        }
    }
}

/// Decaying-but-floored repeat policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatPolicy {
    /// Count handed to the scheduler before the first primary point.
    #[serde(alias = "initial_repeat_count")]
    pub initial: u32,
    /// Lowest count the scheduler will ever return.
    #[serde(default = "default_floor", alias = "repeat_floor")]
    pub floor: u32,
    /// Amount subtracted per primary point while above the floor.
    #[serde(default, alias = "repeat_decrement")]
    pub decrement: u32,
}

fn default_floor() -> u32 {
    1
}

impl Default for RepeatPolicy {
    fn default() -> Self {
        Self {
            initial: 1,
            floor: default_floor(),
            decrement: 0,
        }
    }
}

/// Policy governing how trial outputs become table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReductionMode {
    /// Per-field minimum across the trials of a point.
    #[default]
    #[serde(rename = "min", alias = "min-reduction")]
    MinReduction,
    /// One row per trial, tagged with its trial index.
    #[serde(rename = "raw", alias = "raw-passthrough")]
    RawPassthrough,
    /// Trial stdout forwarded verbatim, no header.
    #[serde(rename = "concatenate", alias = "concatenate-passthrough")]
    ConcatenatePassthrough,
}

impl ReductionMode {
    /// Whether trial outputs are parsed into numeric fields.
    pub fn parses(self) -> bool {
        !matches!(self, ReductionMode::ConcatenatePassthrough)
    }
}

/// How the size parameter is rendered on the executable's command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ArgumentFormat {
    /// Integer part only (`2.83` becomes `2`).
    #[default]
    Truncate,
    /// Shortest decimal that round-trips (`2.8284271247461903`).
    Decimal,
}

/// Settings applied to every launch of the measurement executable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InvocationConfig {
    /// Wall-clock limit per trial. Absent means wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<f64>,
    /// Rendering of the size argument.
    #[serde(default)]
    pub argument_format: ArgumentFormat,
    /// Extra environment variables for the child process.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl InvocationConfig {
    /// Returns the configured timeout as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// Immutable description of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Measurement executable, invoked as `<executable> <size> [<secondary>]`.
    pub executable: PathBuf,
    /// Interpretation of `start` / `end`.
    #[serde(default)]
    pub spacing: Spacing,
    /// Lower bound (exponent under geometric spacing).
    #[serde(alias = "start_exponent")]
    pub start: f64,
    /// Upper bound (exponent under geometric spacing).
    #[serde(alias = "end_exponent")]
    pub end: f64,
    /// Number of intervals between the bounds; `step_count - 1` sizes are emitted.
    pub step_count: u32,
    /// Optional secondary dimension, iterated inside every primary size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<SecondaryRange>,
    /// Header name of the secondary column.
    #[serde(default = "default_secondary_label")]
    pub secondary_label: String,
    /// Trial count policy.
    #[serde(default)]
    pub repeat: RepeatPolicy,
    /// Reduction applied to the trials of a point.
    #[serde(default)]
    pub reduction: ReductionMode,
    /// Divide every value by the point's size.
    #[serde(default)]
    pub normalize: bool,
    /// Field names of the executable's output lines, in order.
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,
    /// Launch settings.
    #[serde(default)]
    pub invocation: InvocationConfig,
}

fn default_secondary_label() -> String {
    "param".to_string()
}

fn default_fields() -> Vec<String> {
    vec!["setup".to_string(), "run".to_string()]
}

impl SweepConfig {
    /// Creates a geometric min-reduction config with default policies.
    pub fn new(executable: impl Into<PathBuf>, start: f64, end: f64, step_count: u32) -> Self {
        Self {
            executable: executable.into(),
            spacing: Spacing::Geometric,
            start,
            end,
            step_count,
            secondary: None,
            secondary_label: default_secondary_label(),
            repeat: RepeatPolicy::default(),
            reduction: ReductionMode::MinReduction,
            normalize: false,
            fields: default_fields(),
            invocation: InvocationConfig::default(),
        }
    }

    /// Expanded secondary values, if a secondary range is configured.
    pub fn secondary_values(&self) -> Option<Vec<i64>> {
        self.secondary.as_ref().map(SecondaryRange::values)
    }

    /// Parses and validates a YAML config.
    pub fn from_yaml_slice(data: &[u8]) -> Result<Self, SweepError> {
        let config: SweepConfig = from_yaml_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every constraint the pipeline relies on.
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.executable.as_os_str().is_empty() {
            return Err(SweepError::config(
                "executable",
                "executable path must not be empty",
            ));
        }
        self.validate_bounds()?;
        self.validate_repeat()?;
        self.validate_secondary()?;
        self.validate_fields()?;
        if self.normalize && !self.reduction.parses() {
            return Err(SweepError::Config(
                ErrorInfo::new(
                    "normalize-concatenate",
                    "normalization needs parsed values but concatenate mode forwards raw text",
                )
                .with_hint("set `normalize: false` or pick the `min` or `raw` reduction"),
            ));
        }
        if let Some(timeout) = self.invocation.timeout_secs {
            if !timeout.is_finite() || timeout <= 0.0 || self.invocation.timeout().is_none() {
                return Err(SweepError::Config(
                    ErrorInfo::new("timeout", "timeout must be a positive number of seconds")
                        .with_context("timeout_secs", timeout.to_string()),
                ));
            }
        }
        Ok(())
    }

    fn validate_bounds(&self) -> Result<(), SweepError> {
        if self.step_count == 0 {
            return Err(SweepError::config(
                "step-count",
                "step count must be positive",
            ));
        }
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(bounds_error("bounds-non-finite", "bounds must be finite", self));
        }
        if self.start >= self.end {
            return Err(bounds_error(
                "bounds-order",
                "start must be strictly below end",
                self,
            ));
        }
        if self.spacing == Spacing::Linear && self.start < 0.0 {
            return Err(bounds_error(
                "bounds-negative",
                "linear spacing needs a non-negative start",
                self,
            ));
        }
        let mut previous = 0.0;
        for step in 1..self.step_count {
            let size = size_at(self, step);
            if !size.is_finite() || size <= previous {
                return Err(SweepError::Config(
                    bounds_info(
                        "bounds-resolution",
                        "generated sizes must be finite, positive and strictly increasing",
                        self,
                    )
                    .with_context("step", step.to_string()),
                ));
            }
            previous = size;
        }
        Ok(())
    }

    fn validate_repeat(&self) -> Result<(), SweepError> {
        let policy = &self.repeat;
        if policy.initial == 0 {
            return Err(SweepError::config(
                "repeat-initial",
                "initial repeat count must be positive",
            ));
        }
        if policy.floor == 0 {
            return Err(SweepError::config(
                "repeat-floor",
                "repeat floor must be at least 1",
            ));
        }
        if policy.initial < policy.floor {
            return Err(SweepError::Config(
                ErrorInfo::new(
                    "repeat-below-floor",
                    "initial repeat count is below the repeat floor",
                )
                .with_context("initial", policy.initial.to_string())
                .with_context("floor", policy.floor.to_string()),
            ));
        }
        Ok(())
    }

    pub(crate) fn validate_secondary(&self) -> Result<(), SweepError> {
        let Some(range) = &self.secondary else {
            return Ok(());
        };
        match range.len() {
            Some(0) => Err(SweepError::config(
                "secondary-empty",
                "secondary range must contain at least one value",
            )),
            Some(len) if len <= MAX_SECONDARY_VALUES => Ok(()),
            len => Err(SweepError::Config(
                ErrorInfo::new("secondary-too-large", "secondary range has too many values")
                    .with_context(
                        "values",
                        len.map_or_else(|| "overflow".to_string(), |n| n.to_string()),
                    )
                    .with_context("limit", MAX_SECONDARY_VALUES.to_string()),
            )),
        }
    }

    fn validate_fields(&self) -> Result<(), SweepError> {
        if !self.reduction.parses() {
            return Ok(());
        }
        if self.fields.is_empty() {
            return Err(SweepError::config(
                "fields-empty",
                "at least one output field is required to parse trial output",
            ));
        }
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if !seen.insert(field.as_str()) {
                return Err(SweepError::Config(
                    ErrorInfo::new("fields-duplicate", "output field names must be unique")
                        .with_context("field", field.clone()),
                ));
            }
        }
        Ok(())
    }
}

fn bounds_info(code: &str, message: &str, config: &SweepConfig) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("start", config.start.to_string())
        .with_context("end", config.end.to_string())
        .with_context("step_count", config.step_count.to_string())
}

fn bounds_error(code: &str, message: &str, config: &SweepConfig) -> SweepError {
    SweepError::Config(bounds_info(code, message, config))
}

/// Loads, validates and anchors a sweep config file.
///
/// A relative executable with a directory component (`./probe`,
/// `bin/probe`) is resolved against the config file's directory; a bare name
/// is left for `PATH` lookup.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SweepConfig, SweepError> {
    let config_path = path.as_ref();
    let bytes = fs::read(config_path).map_err(|err| {
        SweepError::Config(
            ErrorInfo::new("config-read", "failed to read sweep config")
                .with_context("path", config_path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    let mut config = SweepConfig::from_yaml_slice(&bytes)?;
    let has_dir = config
        .executable
        .parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty());
    if config.executable.is_relative() && has_dir {
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        config.executable = base.join(&config.executable);
    }
    Ok(config)
}
