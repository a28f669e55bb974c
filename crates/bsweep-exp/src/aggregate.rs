use bsweep_core::errors::{ErrorInfo, SweepError};
use bsweep_core::{AggregatedResult, FieldValue, ParsedSample, TrialOutput};

use crate::config::ReductionMode;

/// Result of reducing the trials of one sweep point.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregated {
    /// One result per point (minimum reduction).
    Reduced(AggregatedResult),
    /// One result per trial, in trial order.
    PerTrial(Vec<AggregatedResult>),
    /// Unparsed stdout of every trial, in trial order.
    Verbatim(Vec<String>),
}

/// Parses one trial's stdout against the field contract.
///
/// Line `k` carries field `k` as `<label> <number>`; only the second
/// whitespace-separated token is read. Lines past the last field are ignored.
pub fn parse_sample(output: &TrialOutput, fields: &[String]) -> Result<ParsedSample, SweepError> {
    let mut lines = output.text.lines();
    let mut parsed = Vec::with_capacity(fields.len());
    for (idx, name) in fields.iter().enumerate() {
        let describe = |info: ErrorInfo| {
            SweepError::Format(
                info.with_context("field", name.clone())
                    .with_context("line", (idx + 1).to_string())
                    .with_context("size", output.point.size.to_string()),
            )
        };
        let line = lines.next().ok_or_else(|| {
            describe(
                ErrorInfo::new("missing-line", "trial output ended before all fields were read")
                    .with_context("expected_lines", fields.len().to_string()),
            )
        })?;
        let token = line.split_whitespace().nth(1).ok_or_else(|| {
            describe(
                ErrorInfo::new("missing-token", "expected `<label> <number>`")
                    .with_context("text", line.to_string()),
            )
        })?;
        let value: f64 = token.parse().map_err(|_| {
            describe(
                ErrorInfo::new("bad-number", "numeric token could not be parsed")
                    .with_context("token", token.to_string()),
            )
        })?;
        if !value.is_finite() {
            return Err(describe(
                ErrorInfo::new("non-finite", "numeric token is not finite")
                    .with_context("token", token.to_string()),
            ));
        }
        parsed.push(FieldValue::new(name.clone(), value));
    }
    Ok(ParsedSample { fields: parsed })
}

/// Reduces the trial outputs of a single point according to `mode`.
pub fn aggregate(
    outputs: &[TrialOutput],
    fields: &[String],
    mode: ReductionMode,
) -> Result<Aggregated, SweepError> {
    let first = outputs.first().ok_or_else(|| {
        SweepError::format("no-trials", "a sweep point needs at least one trial")
    })?;
    match mode {
        ReductionMode::ConcatenatePassthrough => Ok(Aggregated::Verbatim(
            outputs.iter().map(|output| output.text.clone()).collect(),
        )),
        ReductionMode::RawPassthrough => {
            let mut results = Vec::with_capacity(outputs.len());
            for (trial, output) in outputs.iter().enumerate() {
                let sample = parse_sample(output, fields)?;
                results.push(AggregatedResult {
                    point: output.point,
                    trial: Some(trial),
                    fields: sample.fields,
                });
            }
            Ok(Aggregated::PerTrial(results))
        }
        ReductionMode::MinReduction => {
            let mut minimum = parse_sample(first, fields)?.fields;
            for output in &outputs[1..] {
                let sample = parse_sample(output, fields)?;
                for (current, candidate) in minimum.iter_mut().zip(sample.fields) {
                    current.value = current.value.min(candidate.value);
                }
            }
            Ok(Aggregated::Reduced(AggregatedResult {
                point: first.point,
                trial: None,
                fields: minimum,
            }))
        }
    }
}
