//! The transform engine: rewrites one op at a time into base coordinates.
//!
//! Each op is resolved by a single left-to-right scan over the range list. A
//! [`Cursor`] tracks how much base content has been passed (`base_end`) and
//! how far current coordinates have drifted from base coordinates
//! (`aggregate_offset`). Every range is seen through a [`Window`]: the run of
//! untouched base content in front of it (the gap), followed by the range's
//! own inserted characters.
//!
//! ```text
//!             gap_start        gap_end      end
//!  current:   |---- untouched ----|-- inserted --|
//!  base:      gap_base ...    base_position
//! ```
//!
//! [`classify`] decides what the op does to one window and returns an
//! [`Outcome`]. Deletes that cover visible base content accumulate into a
//! [`PendingDelete`], threaded through the scan by value, and are spliced
//! into the list once the scan stops.

use tracing::{debug, trace};

use crate::error::Result;
use super::invariants::{self, Frontier};
use super::op::{Edit, Op};
use super::range::{Range, RangeList};

/// Scan position, in both coordinate systems.
#[derive(Clone, Copy, Debug, Default)]
struct Cursor {
    frontier: Frontier,
    /// Sum of the lengths of every range passed so far.
    aggregate_offset: i64,
}

impl Cursor {
    fn base_end(&self) -> i64 {
        return self.frontier.base_end;
    }

    /// Current-document position of `base_end`.
    fn current(&self) -> i64 {
        return self.frontier.base_end + self.aggregate_offset;
    }

    fn window(&self, index: usize, range: Range) -> Window {
        let gap_len = if range.is_delete() {
            range.base_position - self.base_end()
        } else {
            // An insert anchored inside a delete has no visible base in front of it.
            (range.base_position - self.base_end()).max(0)
        };
        return Window {
            index,
            gap_base: self.base_end(),
            gap_start: self.current(),
            gap_len,
            range,
        };
    }

    /// Validate `range` and move past it.
    fn advance(&mut self, index: usize, range: Range) -> Result<()> {
        self.frontier.admit(index, range)?;
        self.aggregate_offset += range.length;
        return Ok(());
    }
}

/// One range as seen from current coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Window {
    pub index: usize,
    /// Base position of the first untouched character in front of the range.
    pub gap_base: i64,
    /// Current position of the same character.
    pub gap_start: i64,
    /// Untouched characters between the previous range and this one.
    pub gap_len: i64,
    pub range: Range,
}

impl Window {
    pub fn gap_end(&self) -> i64 {
        return self.gap_start + self.gap_len;
    }

    /// Current position just past everything this window covers.
    pub fn end(&self) -> i64 {
        if self.range.is_insert() {
            return self.gap_end() + self.range.length;
        }
        return self.gap_end();
    }
}

/// Base content a delete op has covered so far, and the list slot it sorts into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PendingDelete {
    pub start: i64,
    pub len: i64,
    pub index: usize,
}

impl PendingDelete {
    pub fn end(&self) -> i64 {
        return self.start + self.len;
    }

    /// Cover `len` more characters from base position `start`, which must
    /// follow on directly.
    fn extend(self, start: i64, len: i64) -> PendingDelete {
        debug_assert_eq!(self.end(), start);
        return PendingDelete {
            len: self.len + len,
            ..self
        };
    }
}

/// What an op does to one window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The op lies entirely past this window.
    Pass,
    /// Add the delta to this range's length. The op is spent.
    MergeIntoCurrent(i64),
    /// Insert a new range in front of this one. The op is spent.
    StageNewRange(Range),
    /// The op ended inside untouched content; only the pending delete remains.
    StageDeleteAccumulator,
    /// Add the delta to this range and keep scanning with what is left of the op.
    ConsumeAndCarryForward { delta: i64, remainder: Edit },
}

/// Decide what `edit` does to `window`.
pub(crate) fn classify(
    window: &Window,
    edit: Edit,
    pending: Option<PendingDelete>,
) -> (Option<PendingDelete>, Outcome) {
    return match edit {
        Edit::Insert { position, len } => (pending, place_insert(window, position, len)),
        Edit::Delete { start, len } => place_delete(window, start, len, pending),
    };
}

/// Inserts land immediately after the character in front of them, so the
/// gap claims positions `(gap_start, gap_end]` and an insert range claims
/// `(gap_end, end]`. Position 0 belongs to the first window.
fn place_insert(window: &Window, position: i64, len: i64) -> Outcome {
    let gap_end = window.gap_end();
    let leading = position == 0 && window.index == 0;

    if leading || (window.gap_start < position && position <= gap_end) {
        if position == gap_end && window.range.is_insert() {
            return Outcome::MergeIntoCurrent(len);
        }
        let anchor = window.gap_base + (position - window.gap_start);
        return Outcome::StageNewRange(Range::insert(anchor, len));
    }

    if window.range.is_insert() && gap_end < position && position <= window.end() {
        return Outcome::MergeIntoCurrent(len);
    }
    return Outcome::Pass;
}

fn place_delete(
    window: &Window,
    start: i64,
    len: i64,
    mut pending: Option<PendingDelete>,
) -> (Option<PendingDelete>, Outcome) {
    let end = start + len;
    let gap_end = window.gap_end();
    let range = window.range;
    let mut consumed = false;
    let mut delta = 0;

    let lo = start.max(window.gap_start);
    let hi = end.min(gap_end);
    if lo < hi {
        let base = window.gap_base + (lo - window.gap_start);
        pending = Some(match pending {
            Some(p) => p.extend(base, hi - lo),
            None => PendingDelete {
                start: base,
                len: hi - lo,
                index: window.index,
            },
        });
        consumed = true;
    }

    if range.is_insert() {
        let lo = start.max(gap_end);
        let hi = end.min(gap_end + range.length);
        if lo < hi {
            delta = -(hi - lo);
            consumed = true;
        }
    } else if end > gap_end {
        // The op spans this delete, so the deleted run joins the pending one.
        if let Some(p) = pending.as_mut() {
            if p.end() == range.base_position {
                p.len += range.magnitude();
                delta = range.magnitude();
                consumed = true;
            }
        }
    }

    if !consumed {
        return (pending, Outcome::Pass);
    }
    if end > window.end() {
        let remainder = Edit::Delete {
            start: window.end(),
            len: end - window.end(),
        };
        return (pending, Outcome::ConsumeAndCarryForward { delta, remainder });
    }
    if delta != 0 {
        return (pending, Outcome::MergeIntoCurrent(delta));
    }
    return (pending, Outcome::StageDeleteAccumulator);
}

/// Place whatever is left of `edit` past the last range.
fn place_tail(
    cursor: &Cursor,
    index: usize,
    edit: Edit,
    pending: Option<PendingDelete>,
) -> (Option<PendingDelete>, Outcome) {
    let current = cursor.current();
    return match edit {
        Edit::Insert { position, len } => {
            let anchor = cursor.base_end() + (position - current);
            (pending, Outcome::StageNewRange(Range::insert(anchor, len)))
        }
        Edit::Delete { start, len } => {
            let lo = start.max(current);
            let base = cursor.base_end() + (lo - current);
            let covered = start + len - lo;
            let pending = match pending {
                Some(p) => p.extend(base, covered),
                None => PendingDelete {
                    start: base,
                    len: covered,
                    index,
                },
            };
            (Some(pending), Outcome::StageDeleteAccumulator)
        }
    };
}

/// Apply one normalized edit to `ranges`.
fn apply_edit(ranges: &mut Vec<Range>, edit: Edit) -> Result<()> {
    let mut cursor = Cursor::default();
    let mut edit = edit;
    let mut pending = None;
    let mut staged = None;
    let mut first_touched = ranges.len();
    let mut spent = false;

    for index in 0..ranges.len() {
        let range = ranges[index];
        let window = cursor.window(index, range);
        cursor.advance(index, range)?;

        let (next, outcome) = classify(&window, edit, pending);
        pending = next;
        if outcome != Outcome::Pass {
            trace!(index, %range, ?outcome, "range outcome");
        }

        match outcome {
            Outcome::Pass => {}
            Outcome::MergeIntoCurrent(delta) => {
                ranges[index].length += delta;
                first_touched = first_touched.min(index);
                spent = true;
            }
            Outcome::StageNewRange(new) => {
                staged = Some((index, new));
                spent = true;
            }
            Outcome::StageDeleteAccumulator => {
                spent = true;
            }
            Outcome::ConsumeAndCarryForward { delta, remainder } => {
                ranges[index].length += delta;
                first_touched = first_touched.min(index);
                edit = remainder;
            }
        }
        if spent {
            break;
        }
    }

    if !spent {
        let index = ranges.len();
        let (next, outcome) = place_tail(&cursor, index, edit, pending);
        trace!(index, ?outcome, "tail outcome");
        pending = next;
        if let Outcome::StageNewRange(new) = outcome {
            staged = Some((index, new));
        }
    }

    if let Some((index, new)) = staged {
        ranges.insert(index, new);
        first_touched = first_touched.min(index);
    }
    if let Some(p) = pending {
        let touched = invariants::splice_delete(ranges, p.index, p.start, p.len);
        first_touched = first_touched.min(touched);
    }
    invariants::prune_zero_length(ranges, first_touched);
    return Ok(());
}

fn apply_op(ranges: &mut Vec<Range>, op: Op) -> Result<()> {
    let Some(edit) = op.normalize()? else {
        debug!(%op, "discarding zero-length op");
        return Ok(());
    };
    trace!(%op, ?edit, "apply op");
    return apply_edit(ranges, edit);
}

impl RangeList {
    /// Apply `ops` in order, in place.
    ///
    /// Stops at the first failing op. Ops before it stay applied and the
    /// failing op may have partially mutated the list; run on a clone when
    /// that matters.
    pub fn apply(&mut self, ops: &[Op]) -> Result<()> {
        for &op in ops {
            apply_op(self.ranges_mut(), op)?;
        }
        return Ok(());
    }
}

/// Apply `ops` to `list` and return the resulting list.
pub fn apply(mut list: RangeList, ops: &[Op]) -> Result<RangeList> {
    list.apply(ops)?;
    return Ok(list);
}

/// Derive the canonical list for `ops` applied to an untouched document.
///
/// The first non-empty op maps straight to a single range; the rest go
/// through the engine.
pub fn derive(ops: &[Op]) -> Result<RangeList> {
    for (i, &op) in ops.iter().enumerate() {
        match op.normalize()? {
            Some(edit) => {
                let mut list = RangeList::from_ranges(vec![edit.to_range()]);
                list.apply(&ops[i + 1..])?;
                return Ok(list);
            }
            None => debug!(%op, "discarding zero-length op"),
        }
    }
    return Ok(RangeList::new());
}
