//! The canonical, base-coordinate representation of an edit history.
//!
//! A [`RangeList`] describes the current document as a set of changes to the
//! original ("base") document:
//!
//! - `(p, +n)`: `n` characters that do not exist in the base, sitting in
//!   front of base position `p`.
//! - `(p, -n)`: base positions `p..p + n` are deleted.
//!
//! Ranges are kept in base order. An insert anchored at the start of a
//! delete is listed before it; inserts anchored inside or at the end of a
//! delete are listed after it. Deletes are maximal runs of base content, so
//! two deletes are never contiguous, even with inserts between them.
//!
//! ```text
//! base     1234567890...
//! list     [(5,-2),(6,1),(7,1)]
//! current  12345ab890...
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use super::invariants;
use super::op::OpSeq;

/// One entry of a range list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Anchor (inserts) or first deleted position (deletes), in base coordinates.
    pub base_position: i64,
    /// Characters inserted (positive) or deleted (negative).
    pub length: i64,
}

impl Range {
    pub fn new(base_position: i64, length: i64) -> Range {
        return Range {
            base_position,
            length,
        };
    }

    pub fn insert(anchor: i64, len: i64) -> Range {
        return Range {
            base_position: anchor,
            length: len,
        };
    }

    pub fn delete(start: i64, len: i64) -> Range {
        return Range {
            base_position: start,
            length: -len,
        };
    }

    pub fn is_insert(&self) -> bool {
        return self.length > 0;
    }

    pub fn is_delete(&self) -> bool {
        return self.length < 0;
    }

    pub fn is_empty(&self) -> bool {
        return self.length == 0;
    }

    /// Number of characters inserted or deleted.
    pub fn magnitude(&self) -> i64 {
        return self.length.abs();
    }

    /// Base position just past this range. Inserts occupy no base content.
    pub fn base_end(&self) -> i64 {
        if self.is_delete() {
            return self.base_position - self.length;
        }
        return self.base_position;
    }
}

impl From<(i64, i64)> for Range {
    fn from((base_position, length): (i64, i64)) -> Range {
        return Range {
            base_position,
            length,
        };
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "({},{})", self.base_position, self.length);
    }
}

/// An ordered list of ranges in base coordinates.
///
/// Equality is elementwise. `clone` yields an independent copy, which is how
/// callers run speculative transforms or keep a before/after pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeList {
    ranges: Vec<Range>,
}

impl RangeList {
    pub fn new() -> RangeList {
        return RangeList { ranges: Vec::new() };
    }

    /// Load ranges verbatim. No invariants are checked here.
    pub fn from_ranges(ranges: Vec<Range>) -> RangeList {
        return RangeList { ranges };
    }

    /// Load `(base_position, length)` pairs verbatim.
    pub fn from_pairs<I>(pairs: I) -> RangeList
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        return RangeList {
            ranges: pairs.into_iter().map(Range::from).collect(),
        };
    }

    pub fn ranges(&self) -> &[Range] {
        return &self.ranges;
    }

    pub(crate) fn ranges_mut(&mut self) -> &mut Vec<Range> {
        return &mut self.ranges;
    }

    pub fn into_ranges(self) -> Vec<Range> {
        return self.ranges;
    }

    pub fn len(&self) -> usize {
        return self.ranges.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.ranges.is_empty();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Range> {
        return self.ranges.iter();
    }

    pub fn to_pairs(&self) -> Vec<(i64, i64)> {
        return self
            .ranges
            .iter()
            .map(|r| (r.base_position, r.length))
            .collect();
    }

    /// Length of the current document minus length of the base document.
    pub fn net_length(&self) -> i64 {
        return self.ranges.iter().map(|r| r.length).sum();
    }

    /// Check ordering, non-overlap, zero-length pruning and delete coalescing.
    pub fn check_invariants(&self) -> Result<()> {
        return invariants::check(&self.ranges);
    }

    /// Convert back into an incremental op sequence.
    ///
    /// Always fails: there is no agreed mapping from a canonical list back to
    /// a replayable history yet.
    pub fn to_incremental_ops(&self) -> Result<OpSeq> {
        return Err(Error::NotImplemented("range list to incremental ops"));
    }

    /// Human-readable rendering of the edited document.
    ///
    /// Always fails. [`Display`](fmt::Display) prints the raw pairs, and
    /// `model::Replay::render` shows the document against the digit base.
    pub fn pretty(&self) -> Result<String> {
        return Err(Error::NotImplemented("pretty printer"));
    }
}

impl fmt::Display for RangeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", range)?;
        }
        return write!(f, "]");
    }
}

impl From<Vec<Range>> for RangeList {
    fn from(ranges: Vec<Range>) -> RangeList {
        return RangeList { ranges };
    }
}

impl FromIterator<Range> for RangeList {
    fn from_iter<T: IntoIterator<Item = Range>>(iter: T) -> RangeList {
        return RangeList {
            ranges: iter.into_iter().collect(),
        };
    }
}

impl<'a> IntoIterator for &'a RangeList {
    type Item = &'a Range;
    type IntoIter = std::slice::Iter<'a, Range>;

    fn into_iter(self) -> Self::IntoIter {
        return self.ranges.iter();
    }
}
