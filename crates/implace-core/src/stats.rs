//! Type statistics over a record set

use std::collections::HashMap;

use serde::Serialize;

use crate::record::PlaceRecord;

/// Number of records carrying one type tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub count: usize,
}

/// Count records per non-empty type tag
///
/// Sorted by count descending, then tag ascending. Untyped records are not
/// counted.
pub fn count_types(records: &[PlaceRecord]) -> Vec<TypeCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records.iter().filter(|r| r.has_type()) {
        *counts.entry(record.type_tag()).or_insert(0) += 1;
    }

    let mut result: Vec<TypeCount> = counts
        .into_iter()
        .map(|(type_tag, count)| TypeCount {
            type_tag: type_tag.to_string(),
            count,
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.type_tag.cmp(&b.type_tag)));
    result
}

/// Records split by whether they carry a type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSplit {
    pub untyped: Vec<PlaceRecord>,
    pub typed: Vec<PlaceRecord>,
}

/// Partition records into untyped and typed, keeping relative order
pub fn split_by_type(records: Vec<PlaceRecord>) -> TypeSplit {
    let (typed, untyped): (Vec<_>, Vec<_>) = records.into_iter().partition(PlaceRecord::has_type);
    TypeSplit { untyped, typed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(id: &str, type_tag: &str) -> PlaceRecord {
        PlaceRecord::new(id, id, type_tag, 0, 0.0, 0.0, 7)
    }

    #[test]
    fn test_count_types_sorted() {
        let counts = count_types(&[
            typed("1", "cafe"),
            typed("2", "bar"),
            typed("3", "cafe"),
            typed("4", ""),
            typed("5", "atm"),
        ]);
        let pairs: Vec<_> = counts.iter().map(|c| (c.type_tag.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("cafe", 2), ("atm", 1), ("bar", 1)]);
    }

    #[test]
    fn test_split_by_type() {
        let split = split_by_type(vec![typed("1", ""), typed("2", "cafe"), typed("3", "")]);
        let untyped: Vec<_> = split.untyped.iter().map(|r| r.id()).collect();
        assert_eq!(untyped, vec!["1", "3"]);
        assert_eq!(split.typed.len(), 1);
    }
}
