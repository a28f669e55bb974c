use std::io::Write;

use bsweep_core::errors::{ErrorInfo, SweepError};
use bsweep_core::OutputRow;
use csv::{Terminator, Writer, WriterBuilder};

use crate::config::{ReductionMode, SweepConfig};

fn io_error(code: &str, err: impl ToString) -> SweepError {
    SweepError::Io(ErrorInfo::new(code, err.to_string()))
}

/// Column names for `config`, or `None` when raw text is forwarded without a
/// header.
pub fn table_header(config: &SweepConfig) -> Option<Vec<String>> {
    if !config.reduction.parses() {
        return None;
    }
    let mut header = vec!["size".to_string()];
    if config.secondary.is_some() {
        header.push(config.secondary_label.clone());
    }
    if config.reduction == ReductionMode::RawPassthrough {
        header.push("trial".to_string());
    }
    header.extend(config.fields.iter().cloned());
    Some(header)
}

/// Shortest round-trip decimal (`4`, `2.8284271247461903`).
pub fn format_size(size: f64) -> String {
    format!("{size}")
}

/// Measured value in plain decimal notation, always with a decimal point
/// (`5.0`, `0.000001`, `100000000000000000.0`).
pub fn format_value(value: f64) -> String {
    let mut text = format!("{value}");
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

enum Sink<W: Write> {
    Csv(Writer<W>),
    Raw(W),
}

/// Writes the comma-separated result table.
///
/// Every row is flushed as soon as it is written, so an aborted sweep leaves
/// all completed rows on the output.
pub struct TableEmitter<W: Write> {
    sink: Option<Sink<W>>,
    builder: WriterBuilder,
}

impl<W: Write> TableEmitter<W> {
    /// Wraps `out`.
    pub fn new(out: W) -> Self {
        let mut builder = WriterBuilder::new();
        builder.has_headers(false).terminator(Terminator::Any(b'\n'));
        let sink = Sink::Csv(builder.from_writer(out));
        Self {
            sink: Some(sink),
            builder,
        }
    }

    /// Writes `header` (if any) followed by `rows`.
    pub fn emit(&mut self, header: Option<&[String]>, rows: &[OutputRow]) -> Result<(), SweepError> {
        if let Some(header) = header {
            self.emit_header(header)?;
        }
        for row in rows {
            self.emit_row(row)?;
        }
        Ok(())
    }

    /// Writes the header line.
    pub fn emit_header(&mut self, header: &[String]) -> Result<(), SweepError> {
        self.write_record(header, "table-header")
    }

    /// Writes one data line.
    pub fn emit_row(&mut self, row: &OutputRow) -> Result<(), SweepError> {
        let mut record = Vec::with_capacity(row.values.len() + 3);
        record.push(format_size(row.size));
        if let Some(secondary) = row.secondary {
            record.push(secondary.to_string());
        }
        if let Some(trial) = row.trial {
            record.push(trial.to_string());
        }
        record.extend(row.values.iter().copied().map(format_value));
        self.write_record(&record, "table-row")
    }

    /// Writes `text` exactly as received.
    pub fn emit_raw(&mut self, text: &str) -> Result<(), SweepError> {
        let out = self.raw()?;
        out.write_all(text.as_bytes())
            .map_err(|err| io_error("table-raw", err))?;
        out.flush().map_err(|err| io_error("table-flush", err))
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> Result<W, SweepError> {
        let mut out = match self.sink.take() {
            Some(Sink::Csv(writer)) => unwrap_csv(writer)?,
            Some(Sink::Raw(out)) => out,
            None => return Err(closed()),
        };
        out.flush().map_err(|err| io_error("table-flush", err))?;
        Ok(out)
    }

    fn write_record(&mut self, record: &[String], code: &str) -> Result<(), SweepError> {
        let writer = self.csv()?;
        writer
            .write_record(record)
            .map_err(|err| io_error(code, err))?;
        writer.flush().map_err(|err| io_error("table-flush", err))
    }

    fn csv(&mut self) -> Result<&mut Writer<W>, SweepError> {
        self.sink = match self.sink.take() {
            Some(Sink::Raw(out)) => Some(Sink::Csv(self.builder.from_writer(out))),
            other => other,
        };
        match self.sink.as_mut() {
            Some(Sink::Csv(writer)) => Ok(writer),
            _ => Err(closed()),
        }
    }

    fn raw(&mut self) -> Result<&mut W, SweepError> {
        self.sink = match self.sink.take() {
            Some(Sink::Csv(writer)) => Some(Sink::Raw(unwrap_csv(writer)?)),
            other => other,
        };
        match self.sink.as_mut() {
            Some(Sink::Raw(out)) => Ok(out),
            _ => Err(closed()),
        }
    }
}

fn unwrap_csv<W: Write>(writer: Writer<W>) -> Result<W, SweepError> {
    writer
        .into_inner()
        .map_err(|err| io_error("table-flush", err.error().to_string()))
}

fn closed() -> SweepError {
    io_error("table-closed", "table output was lost after a failed flush")
}
