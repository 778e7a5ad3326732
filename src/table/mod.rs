//! Tab-delimited stream primitives: headers, rows, and record splitting.
//!
//! Every filter in the family reads the same shape of input: one record per
//! line, fields separated by a single tab. The first record is a header
//! unless the caller declares the stream headerless, in which case column
//! names are synthesized as `col_1..col_N`.
//!
//! Rows are opaque string fields; no type coercion happens anywhere in this
//! layer. A row shorter than expected is tolerated: missing trailing fields
//! read as empty strings at extraction time, never as errors.

pub mod columns;
pub mod couplets;

use std::io::BufRead;

use crate::error::{TableError, TableResult};

/// Field separator for all input and output streams.
pub const FIELD_DELIMITER: char = '\t';

/// One record's field values, in column order.
pub type Row = Vec<String>;

/// An ordered, immutable list of column names.
///
/// Duplicate names are legal; resolution by name returns the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Positional names `col_1..col_N` for a headerless stream.
    pub fn synthesize(width: usize) -> Self {
        Self {
            names: (1..=width).map(|i| format!("col_{}", i)).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    /// Lowest index whose name matches, if any.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// Split one record into its fields.
pub fn split_record(record: &str) -> Row {
    record.split(FIELD_DELIMITER).map(str::to_string).collect()
}

/// Join fields back into one record.
pub fn join_row(fields: &[String]) -> String {
    fields.join("\t")
}

/// Read the header record from a stream.
///
/// When `headered` is true this consumes exactly one record; otherwise the
/// stream is untouched and `None` is returned, deferring name synthesis to
/// the column resolver.
pub fn read_header<R: BufRead>(reader: &mut R, headered: bool) -> TableResult<Option<Header>> {
    if !headered {
        return Ok(None);
    }

    let mut line = String::new();
    let bytes = reader.read_line(&mut line)?;
    if bytes == 0 {
        return Err(TableError::MalformedHeader(
            "input ended before the header record".to_string(),
        ));
    }

    let record = trim_record(&line);
    if record.is_empty() {
        return Err(TableError::MalformedHeader(
            "header record has no fields".to_string(),
        ));
    }

    Ok(Some(Header::new(split_record(record))))
}

/// Read the next data row.
///
/// Blank lines are skipped rather than read as records: a line that is
/// empty after stripping its terminator would otherwise split into a
/// single empty field, turning trailing newlines and stray empty lines
/// into phantom rows.
///
/// Returns `None` at end of input; normal exhaustion is never an error.
pub fn read_row<R: BufRead>(reader: &mut R) -> TableResult<Option<Row>> {
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader.read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }
        let record = trim_record(&line);
        if record.is_empty() {
            continue;
        }
        return Ok(Some(split_record(record)));
    }
}

/// Wrap a flat list of values into rows of `width` columns.
///
/// The final short row, if any, is padded with empty fields so every output
/// row has the configured column count.
pub fn wrap_values(values: &[String], width: usize) -> Vec<Row> {
    if width == 0 {
        return Vec::new();
    }
    values
        .chunks(width)
        .map(|chunk| {
            (0..width)
                .map(|i| chunk.get(i).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

fn trim_record(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
