//! Keeping range lists canonical.
//!
//! After every op the engine leaves the list:
//!
//! 1. ordered by base position, with no overlapping deletes;
//! 2. free of zero-length ranges;
//! 3. without two deletes covering contiguous base content;
//! 4. free of deletes that reach before base position 0.
//!
//! [`Frontier`] is the placement rule shared by the engine's scan and by
//! [`check`], so a corrupt list is reported the same way by both.

use tracing::warn;

use crate::error::{Error, Result};
use super::range::Range;

/// How far a left-to-right scan has advanced through base content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Frontier {
    /// First base position past every range admitted so far.
    pub base_end: i64,
    /// Start of the most recent delete.
    last_delete: Option<i64>,
    /// Anchor of the most recent insert.
    last_insert: Option<i64>,
}

impl Frontier {
    /// Validate that `range` may follow everything admitted so far, then
    /// advance past it.
    pub fn admit(&mut self, index: usize, range: Range) -> Result<()> {
        let malformed = |reason: &'static str| {
            warn!(index, %range, reason, "malformed range");
            return Error::MalformedRange {
                index,
                range,
                reason,
            };
        };

        if range.is_empty() {
            return Err(malformed("zero-length range"));
        }
        if range.base_position < 0 {
            return Err(malformed("negative base position"));
        }

        if range.is_delete() {
            if range.base_position < self.base_end {
                return Err(malformed("delete overlaps content already covered"));
            }
            self.base_end = range.base_end();
            self.last_delete = Some(range.base_position);
            return Ok(());
        }

        if self.last_delete.is_some_and(|start| range.base_position <= start) {
            return Err(malformed("insert anchored at or before the preceding delete"));
        }
        if self.last_insert.is_some_and(|anchor| range.base_position <= anchor) {
            return Err(malformed("insert anchored at or before the preceding insert"));
        }
        self.base_end = self.base_end.max(range.base_position);
        self.last_insert = Some(range.base_position);
        return Ok(());
    }
}

/// Remove every zero-length range at or after `from`.
///
/// Only the op being applied can zero a range, and only from the point where
/// it started mutating, so earlier entries are left alone.
pub fn prune_zero_length(ranges: &mut Vec<Range>, from: usize) {
    if from >= ranges.len() {
        return;
    }
    let mut index = 0;
    ranges.retain(|range| {
        let keep = index < from || !range.is_empty();
        index += 1;
        return keep;
    });
}

/// Place a delete of base `start..start + len` whose sorted slot is `index`,
/// coalescing it with the nearest delete on either side when contiguous.
///
/// Inserts between the new delete and a neighbour do not block coalescing:
/// they end up anchored inside the merged run. A neighbour absorbed from the
/// right is zeroed, not removed. Returns the lowest index that was touched.
pub fn splice_delete(ranges: &mut Vec<Range>, index: usize, start: i64, len: i64) -> usize {
    let previous = ranges[..index].iter().rposition(|r| r.is_delete());
    let target = match previous {
        Some(j) if ranges[j].base_end() == start => {
            ranges[j].length -= len;
            j
        }
        _ => {
            ranges.insert(index, Range::delete(start, len));
            index
        }
    };

    let end = ranges[target].base_end();
    let next = ranges[target + 1..].iter().position(|r| r.is_delete());
    if let Some(offset) = next {
        let k = target + 1 + offset;
        if ranges[k].base_position == end {
            ranges[target].length += ranges[k].length;
            ranges[k].length = 0;
        }
    }
    return target;
}

/// Verify every invariant of a canonical range list.
pub fn check(ranges: &[Range]) -> Result<()> {
    let mut frontier = Frontier::default();
    let mut previous_delete_end: Option<i64> = None;
    for (index, &range) in ranges.iter().enumerate() {
        frontier.admit(index, range)?;
        if range.is_delete() {
            if previous_delete_end == Some(range.base_position) {
                warn!(index, %range, "uncoalesced delete");
                return Err(Error::MalformedRange {
                    index,
                    range,
                    reason: "delete is contiguous with the preceding delete",
                });
            }
            previous_delete_end = Some(range.base_end());
        }
    }
    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(pairs: &[(i64, i64)]) -> Vec<Range> {
        return pairs.iter().copied().map(Range::from).collect();
    }

    fn pairs(ranges: &[Range]) -> Vec<(i64, i64)> {
        return ranges.iter().map(|r| (r.base_position, r.length)).collect();
    }

    #[test]
    fn prune_keeps_zeros_before_start() {
        let mut list = ranges(&[(1, 0), (2, 1), (3, 0), (4, -1), (9, 0)]);
        prune_zero_length(&mut list, 2);
        assert_eq!(pairs(&list), vec![(1, 0), (2, 1), (4, -1)]);
    }

    #[test]
    fn prune_past_end_is_noop() {
        let mut list = ranges(&[(1, 0)]);
        prune_zero_length(&mut list, 1);
        assert_eq!(pairs(&list), vec![(1, 0)]);
    }

    #[test]
    fn splice_without_neighbours_inserts() {
        let mut list = ranges(&[(2, 1), (9, 1)]);
        let touched = splice_delete(&mut list, 1, 4, 2);
        assert_eq!(touched, 1);
        assert_eq!(pairs(&list), vec![(2, 1), (4, -2), (9, 1)]);
    }

    #[test]
    fn splice_extends_previous_delete() {
        let mut list = ranges(&[(5, -1)]);
        let touched = splice_delete(&mut list, 1, 6, 2);
        assert_eq!(touched, 0);
        assert_eq!(pairs(&list), vec![(5, -3)]);
    }

    #[test]
    fn splice_coalesces_on_both_sides() {
        let mut list = ranges(&[(5, -1), (7, -1)]);
        let touched = splice_delete(&mut list, 1, 6, 1);
        prune_zero_length(&mut list, touched);
        assert_eq!(pairs(&list), vec![(5, -3)]);
    }

    #[test]
    fn splice_coalesces_across_inserts() {
        // 6 deleted, then a run anchored at 7, then 7 deleted: new delete of 6..7
        // is inserted before the run, the delete at 7 joins it.
        let mut list = ranges(&[(7, 1), (7, -1)]);
        let touched = splice_delete(&mut list, 0, 6, 1);
        prune_zero_length(&mut list, touched);
        assert_eq!(pairs(&list), vec![(6, -2), (7, 1)]);
    }

    #[test]
    fn splice_extends_previous_across_inserts() {
        let mut list = ranges(&[(3, -2), (5, 1)]);
        let touched = splice_delete(&mut list, 2, 5, 1);
        assert_eq!(touched, 0);
        assert_eq!(pairs(&list), vec![(3, -3), (5, 1)]);
    }

    #[test]
    fn check_accepts_canonical_lists() {
        assert!(check(&ranges(&[])).is_ok());
        assert!(check(&ranges(&[(5, 1), (5, -2), (6, 1), (7, 1)])).is_ok());
        assert!(check(&ranges(&[(3, -5), (4, 1), (5, 1), (6, 1)])).is_ok());
        assert!(check(&ranges(&[(0, 2), (0, -1), (4, -1)])).is_ok());
    }

    #[test]
    fn check_rejects_zero_length() {
        let err = check(&ranges(&[(5, 1), (6, 0)])).unwrap_err();
        assert!(matches!(err, Error::MalformedRange { index: 1, .. }));
    }

    #[test]
    fn check_rejects_overlapping_deletes() {
        let err = check(&ranges(&[(2, -3), (4, -1)])).unwrap_err();
        assert!(matches!(err, Error::MalformedRange { index: 1, .. }));
    }

    #[test]
    fn check_rejects_uncoalesced_deletes() {
        assert!(check(&ranges(&[(2, -2), (4, -1)])).is_err());
        assert!(check(&ranges(&[(2, -2), (3, 1), (4, -1)])).is_err());
    }

    #[test]
    fn check_rejects_unordered_inserts() {
        assert!(check(&ranges(&[(6, 1), (6, 1)])).is_err());
        assert!(check(&ranges(&[(6, 1), (2, 1)])).is_err());
        assert!(check(&ranges(&[(5, -2), (5, 1)])).is_err());
    }

    #[test]
    fn check_rejects_negative_positions() {
        assert!(check(&ranges(&[(-1, -1)])).is_err());
    }
}
