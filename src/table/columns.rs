//! Column-reference resolution.
//!
//! A user-supplied column reference is either a 1-based position or a header
//! name. It is parsed once into a [`ColumnRef`] and resolved once into a
//! zero-based index; nothing downstream ever re-inspects the raw string.

use super::{Header, Row};
use crate::error::{ColumnError, ColumnResult};

/// A parsed column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// 1-based position.
    Position(usize),
    /// Header name, matched against the lowest occurrence.
    Name(String),
}

impl ColumnRef {
    /// Parse a raw reference. A positive integer is positional; anything
    /// else (including `0`) is a name lookup.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<usize>() {
            Ok(n) if n >= 1 => ColumnRef::Position(n),
            _ => ColumnRef::Name(raw.to_string()),
        }
    }

    /// Resolve against a header into a zero-based index.
    pub fn resolve(&self, header: &Header) -> ColumnResult<usize> {
        match self {
            ColumnRef::Position(n) => {
                if (1..=header.width()).contains(n) {
                    Ok(n - 1)
                } else {
                    Err(ColumnError::PositionOutOfRange {
                        position: *n,
                        width: header.width(),
                    })
                }
            }
            ColumnRef::Name(name) => header
                .position(name)
                .ok_or_else(|| ColumnError::UnknownColumn(name.clone())),
        }
    }
}

/// Resolve one raw reference against a header.
pub fn resolve_one(raw: &str, header: &Header) -> ColumnResult<usize> {
    ColumnRef::parse(raw).resolve(header)
}

/// Resolve a list of references, preserving order and duplicates.
///
/// Fails on the first unresolvable reference; no partial result.
pub fn resolve_many(raws: &[String], header: &Header) -> ColumnResult<Vec<usize>> {
    raws.iter().map(|raw| resolve_one(raw, header)).collect()
}

/// Indices `0..width` minus the given set, in header-position order.
///
/// Reverse selection emits the complement in original header order, not in
/// the order the exclusions were listed.
pub fn complement(indices: &[usize], width: usize) -> Vec<usize> {
    (0..width).filter(|i| !indices.contains(i)).collect()
}

/// The identity index set `0..width` (pass-through copy).
pub fn all_columns(width: usize) -> Vec<usize> {
    (0..width).collect()
}

/// Project a row onto an index set.
///
/// Indices beyond a ragged row read as empty fields.
pub fn select(row: &[String], indices: &[usize]) -> Row {
    indices
        .iter()
        .map(|&i| row.get(i).cloned().unwrap_or_default())
        .collect()
}
