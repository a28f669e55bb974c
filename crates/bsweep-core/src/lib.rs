#![deny(missing_docs)]
#![doc = "Core data model and error types for the bsweep benchmark sweep driver."]

use serde::{Deserialize, Serialize};

pub mod errors;

pub use errors::{ErrorInfo, SweepError};

/// One parameter setting at which the measurement executable is run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Primary size parameter, always strictly positive.
    pub size: f64,
    /// Optional secondary parameter from the configured secondary range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<i64>,
    /// Generator step `i` the size was derived from (starts at 1).
    pub step: u32,
    /// Rank of the point in the generated sequence (starts at 0).
    pub index: usize,
}

/// Raw captured standard output of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialOutput {
    /// Point the invocation was made for.
    pub point: SweepPoint,
    /// Complete standard output text.
    pub text: String,
}

/// Named numeric field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    /// Field name taken from the output contract.
    pub name: String,
    /// Numeric value.
    pub value: f64,
}

impl FieldValue {
    /// Creates a new named value.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Ordered fields parsed from a single [`TrialOutput`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSample {
    /// Fields in output-contract order.
    pub fields: Vec<FieldValue>,
}

impl ParsedSample {
    /// Returns the value of the named field.
    pub fn get(&self, name: &str) -> Option<f64> {
        lookup(&self.fields, name)
    }
}

/// Reduced (or per-trial) values for one sweep point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// Point the values belong to.
    pub point: SweepPoint,
    /// Trial index when the result was forwarded without reduction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial: Option<usize>,
    /// Fields in output-contract order.
    pub fields: Vec<FieldValue>,
}

impl AggregatedResult {
    /// Returns the value of the named field.
    pub fn get(&self, name: &str) -> Option<f64> {
        lookup(&self.fields, name)
    }

    /// Applies `f` to every field value, keeping names and order.
    pub fn map_values(mut self, f: impl Fn(f64) -> f64) -> Self {
        for field in &mut self.fields {
            field.value = f(field.value);
        }
        self
    }
}

/// Values destined for a single line of tabular output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    /// Primary size parameter.
    pub size: f64,
    /// Secondary parameter, present when a secondary range is configured.
    pub secondary: Option<i64>,
    /// Trial index, present for per-trial rows.
    pub trial: Option<usize>,
    /// Field values in output-contract order.
    pub values: Vec<f64>,
}

impl From<&AggregatedResult> for OutputRow {
    fn from(result: &AggregatedResult) -> Self {
        Self {
            size: result.point.size,
            secondary: result.point.secondary,
            trial: result.trial,
            values: result.fields.iter().map(|field| field.value).collect(),
        }
    }
}

fn lookup(fields: &[FieldValue], name: &str) -> Option<f64> {
    fields
        .iter()
        .find(|field| field.name == name)
        .map(|field| field.value)
}
