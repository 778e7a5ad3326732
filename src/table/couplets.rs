//! Couplet generation: pairing each row with its key-column value.
//!
//! A couplet is the unit of work for batch remote lookups: the key drives
//! the lookup, the full row rides along so output can be stitched back
//! together in input order.

use std::io::BufRead;

use super::{read_row, Row};
use crate::error::TableResult;

/// A `(key, row)` pair extracted from one input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Couplet {
    pub key: String,
    pub row: Row,
}

impl Couplet {
    /// Extract the key at `key_index` from a row.
    ///
    /// A row shorter than the key index yields an empty-string key; the
    /// row payload is kept untouched.
    pub fn from_row(row: Row, key_index: usize) -> Self {
        let key = row.get(key_index).cloned().unwrap_or_default();
        Self { key, row }
    }
}

/// Lazy, single-pass couplet stream over a tab-delimited reader.
///
/// The stream owns its cursor; restarting means re-opening the input.
pub struct Couplets<R> {
    reader: R,
    key_index: usize,
}

impl<R: BufRead> Couplets<R> {
    pub fn new(reader: R, key_index: usize) -> Self {
        Self { reader, key_index }
    }

    /// Drain up to `limit` couplets.
    ///
    /// Used by callers that process large inputs in bounded chunks. An
    /// empty result means the stream is exhausted.
    pub fn take_chunk(&mut self, limit: usize) -> TableResult<Vec<Couplet>> {
        let mut chunk = Vec::new();
        while chunk.len() < limit {
            match read_row(&mut self.reader)? {
                Some(row) => chunk.push(Couplet::from_row(row, self.key_index)),
                None => break,
            }
        }
        Ok(chunk)
    }
}

impl<R: BufRead> Iterator for Couplets<R> {
    type Item = TableResult<Couplet>;

    fn next(&mut self) -> Option<Self::Item> {
        match read_row(&mut self.reader) {
            Ok(Some(row)) => Some(Ok(Couplet::from_row(row, self.key_index))),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_couplets_preserve_input_order() {
        let input = Cursor::new("83333.1\tE. coli\n100226.1\tS. coelicolor\n");
        let keys: Vec<String> = Couplets::new(input, 0)
            .map(|c| c.unwrap().key)
            .collect();
        assert_eq!(keys, vec!["83333.1", "100226.1"]);
    }

    #[test]
    fn test_key_from_second_column() {
        let input = Cursor::new("E. coli\t83333.1\n");
        let couplet = Couplets::new(input, 1).next().unwrap().unwrap();
        assert_eq!(couplet.key, "83333.1");
        assert_eq!(couplet.row, vec!["E. coli", "83333.1"]);
    }

    #[test]
    fn test_ragged_row_yields_empty_key() {
        let input = Cursor::new("only-one-field\n");
        let couplet = Couplets::new(input, 2).next().unwrap().unwrap();
        assert_eq!(couplet.key, "");
        assert_eq!(couplet.row, vec!["only-one-field"]);
    }

    #[test]
    fn test_take_chunk_bounds_and_resumes() {
        let input = Cursor::new("a\nb\nc\n");
        let mut couplets = Couplets::new(input, 0);

        let first = couplets.take_chunk(2).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].key, "a");

        let second = couplets.take_chunk(2).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].key, "c");

        assert!(couplets.take_chunk(2).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_keys_kept() {
        let input = Cursor::new("k\t1\nk\t2\n");
        let couplets: Vec<Couplet> = Couplets::new(input, 0).map(|c| c.unwrap()).collect();
        assert_eq!(couplets.len(), 2);
        assert_eq!(couplets[0].key, couplets[1].key);
        assert_ne!(couplets[0].row, couplets[1].row);
    }
}
