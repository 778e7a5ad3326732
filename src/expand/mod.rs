//! Expand delimiter-joined set columns into a flat relation.
//!
//! A set column holds values like `x::y::z`. Each input row becomes one
//! output row per set member, paired with a group identifier so the members
//! can be re-associated downstream:
//!
//! ```text
//! Input                     →  Output
//! ┌──────────────────┐         ┌──────────────┐
//! │ set: x::y::z     │         │ 1   x        │
//! │                  │    →    │ 1   y        │
//! │                  │         │ 1   z        │
//! │ set: q           │         │ 2   q        │
//! └──────────────────┘         └──────────────┘
//! ```
//!
//! Members are sorted lexicographically so identical sets from different
//! rows produce identically ordered output, which keeps downstream diffing
//! and deduplication stable.

use crate::table::Row;

/// Default separator between set members.
pub const DEFAULT_DELIMITER: &str = "::";

/// One expanded `(group_id, item)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub group_id: String,
    pub item: String,
}

/// Where a row's group identifier comes from.
#[derive(Debug, Clone)]
pub enum GroupIdSource {
    /// Counter starting at 1, advanced once per row with a non-empty set.
    Auto,
    /// Copied from the row's value at this column index.
    Column(usize),
    /// The same literal id for every row.
    Fixed(String),
}

/// Stateful set expander.
///
/// The auto-increment counter is explicit state on the expander value, so
/// separate runs within one process never share ids.
pub struct SetExpander {
    delimiter: String,
    id_source: GroupIdSource,
    next_id: u64,
}

impl SetExpander {
    pub fn new(delimiter: impl Into<String>, id_source: GroupIdSource) -> Self {
        Self {
            delimiter: delimiter.into(),
            id_source,
            next_id: 1,
        }
    }

    /// Expand one row's set column.
    ///
    /// Empty pieces are dropped, so an empty set value emits zero entries
    /// and never an entry with an empty item. The entry count always equals
    /// the number of non-empty pieces.
    pub fn expand(&mut self, row: &Row, set_index: usize) -> Vec<GroupEntry> {
        let raw = row.get(set_index).map(String::as_str).unwrap_or("");
        let mut items: Vec<&str> = raw
            .split(self.delimiter.as_str())
            .filter(|piece| !piece.is_empty())
            .collect();
        if items.is_empty() {
            return Vec::new();
        }
        items.sort_unstable();

        let group_id = match &self.id_source {
            GroupIdSource::Auto => {
                let id = self.next_id.to_string();
                self.next_id += 1;
                id
            }
            GroupIdSource::Column(index) => row.get(*index).cloned().unwrap_or_default(),
            GroupIdSource::Fixed(id) => id.clone(),
        };

        items
            .into_iter()
            .map(|item| GroupEntry {
                group_id: group_id.clone(),
                item: item.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::split_record;

    fn expander() -> SetExpander {
        SetExpander::new(DEFAULT_DELIMITER, GroupIdSource::Auto)
    }

    #[test]
    fn test_expand_sorts_members() {
        let mut exp = expander();
        let entries = exp.expand(&split_record("z::x::y"), 0);

        assert_eq!(entries.len(), 3);
        let items: Vec<&str> = entries.iter().map(|e| e.item.as_str()).collect();
        assert_eq!(items, vec!["x", "y", "z"]);
        assert!(entries.iter().all(|e| e.group_id == "1"));
    }

    #[test]
    fn test_counter_advances_per_non_empty_set() {
        let mut exp = expander();
        assert_eq!(exp.expand(&split_record("a::b"), 0)[0].group_id, "1");
        // Empty set: no entries, no counter movement.
        assert!(exp.expand(&split_record(""), 0).is_empty());
        assert_eq!(exp.expand(&split_record("c"), 0)[0].group_id, "2");
    }

    #[test]
    fn test_single_item_set_counts_as_a_set() {
        let mut exp = expander();
        let entries = exp.expand(&split_record("solo"), 0);
        assert_eq!(entries, vec![GroupEntry { group_id: "1".into(), item: "solo".into() }]);
    }

    #[test]
    fn test_idempotent_on_expanded_relation() {
        // A single-item-per-row relation expands to exactly itself.
        let mut first = expander();
        let rows = ["x", "y", "z"];
        let expanded: Vec<GroupEntry> = rows
            .iter()
            .flat_map(|r| first.expand(&split_record(r), 0))
            .collect();

        let mut second = expander();
        let again: Vec<GroupEntry> = expanded
            .iter()
            .flat_map(|e| second.expand(&split_record(&e.item), 0))
            .collect();

        let items: Vec<&str> = again.iter().map(|e| e.item.as_str()).collect();
        assert_eq!(items, vec!["x", "y", "z"]);
        assert_eq!(expanded.len(), again.len());
    }

    #[test]
    fn test_id_from_column() {
        let mut exp = SetExpander::new(DEFAULT_DELIMITER, GroupIdSource::Column(1));
        let entries = exp.expand(&split_record("a::b\tG7"), 0);
        assert!(entries.iter().all(|e| e.group_id == "G7"));
    }

    #[test]
    fn test_fixed_id() {
        let mut exp = SetExpander::new(DEFAULT_DELIMITER, GroupIdSource::Fixed("batch-1".into()));
        let entries = exp.expand(&split_record("b::a"), 0);
        assert_eq!(entries[0].group_id, "batch-1");
        assert_eq!(entries[0].item, "a");
    }

    #[test]
    fn test_custom_delimiter() {
        let mut exp = SetExpander::new(";", GroupIdSource::Auto);
        let entries = exp.expand(&split_record("b;a"), 0);
        let items: Vec<&str> = entries.iter().map(|e| e.item.as_str()).collect();
        assert_eq!(items, vec!["a", "b"]);
    }

    #[test]
    fn test_trailing_delimiter_drops_empty_piece() {
        let mut exp = expander();
        let entries = exp.expand(&split_record("x::y::"), 0);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_set_column_beyond_ragged_row() {
        let mut exp = expander();
        assert!(exp.expand(&split_record("only"), 3).is_empty());
    }
}
