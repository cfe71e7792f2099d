//! A naive reference model of the edited document.
//!
//! [`Replay`] keeps one cell per character, deleted base characters
//! included, and applies ops by walking the cells directly. It is far slower
//! than the transform engine but obviously correct, which makes it the oracle
//! the property tests and the fuzz harness compare the engine against.
//!
//! The base document is conceptually infinite (`1234567890...`); base cells
//! are materialized on demand as ops reach further into it.

use std::collections::BTreeMap;

use crate::error::Result;
use super::op::{Edit, Op};
use super::range::{Range, RangeList};

/// Rendering of an inserted character in [`Replay::render`].
pub const INSERTED: char = '+';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cell {
    Base { index: i64, deleted: bool },
    Inserted,
}

impl Cell {
    fn is_visible(&self) -> bool {
        return !matches!(self, Cell::Base { deleted: true, .. });
    }
}

#[derive(Clone, Debug, Default)]
pub struct Replay {
    cells: Vec<Cell>,
    /// Base cells materialized so far.
    base_len: i64,
}

impl Replay {
    pub fn new() -> Replay {
        return Replay::default();
    }

    /// Rebuild the document a canonical range list describes.
    ///
    /// Fails if the list does not satisfy the canonical invariants.
    pub fn from_range_list(list: &RangeList) -> Result<Replay> {
        list.check_invariants()?;

        let mut inserts = BTreeMap::new();
        let mut deleted = Vec::new();
        let mut limit = 0;
        for range in list {
            if range.is_insert() {
                inserts.insert(range.base_position, range.length);
            } else {
                deleted.push((range.base_position, range.base_end()));
            }
            limit = limit.max(range.base_end());
        }

        let mut replay = Replay::new();
        for index in 0..=limit {
            if let Some(&len) = inserts.get(&index) {
                replay.cells.extend((0..len).map(|_| Cell::Inserted));
            }
            if index < limit {
                let deleted = deleted.iter().any(|&(s, e)| s <= index && index < e);
                replay.cells.push(Cell::Base { index, deleted });
            }
        }
        replay.base_len = limit;
        return Ok(replay);
    }

    /// Characters currently visible.
    pub fn visible_len(&self) -> usize {
        return self.cells.iter().filter(|c| c.is_visible()).count();
    }

    pub fn apply(&mut self, ops: &[Op]) -> Result<()> {
        for &op in ops {
            self.apply_op(op)?;
        }
        return Ok(());
    }

    pub fn apply_op(&mut self, op: Op) -> Result<()> {
        match op.normalize()? {
            None => {}
            Some(Edit::Insert { position, len }) => self.insert(position, len),
            Some(Edit::Delete { start, len }) => self.delete(start, len),
        }
        return Ok(());
    }

    /// Grow the base until at least `visible` characters can be seen.
    fn materialize(&mut self, visible: usize) {
        let mut have = self.visible_len();
        while have < visible {
            self.cells.push(Cell::Base {
                index: self.base_len,
                deleted: false,
            });
            self.base_len += 1;
            have += 1;
        }
    }

    /// Cell index just past the `count`-th visible cell.
    fn slot_after(&self, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        let mut seen = 0;
        for (slot, cell) in self.cells.iter().enumerate() {
            if cell.is_visible() {
                seen += 1;
                if seen == count {
                    return slot + 1;
                }
            }
        }
        return self.cells.len();
    }

    fn insert(&mut self, position: i64, len: i64) {
        let position = position as usize;
        self.materialize(position);
        let slot = self.slot_after(position);
        self.cells
            .splice(slot..slot, (0..len).map(|_| Cell::Inserted));
    }

    fn delete(&mut self, start: i64, len: i64) {
        let (start, end) = (start as usize, (start + len) as usize);
        self.materialize(end);
        let mut seen = 0;
        let mut kept = Vec::with_capacity(self.cells.len());
        for cell in self.cells.drain(..) {
            if !cell.is_visible() {
                kept.push(cell);
                continue;
            }
            let hit = start <= seen && seen < end;
            seen += 1;
            match cell {
                Cell::Base { index, .. } if hit => kept.push(Cell::Base {
                    index,
                    deleted: true,
                }),
                Cell::Inserted if hit => {}
                other => kept.push(other),
            }
        }
        self.cells = kept;
    }

    /// Canonical range list for the current document.
    pub fn to_range_list(&self) -> RangeList {
        let mut ranges: Vec<Range> = Vec::new();
        let mut inserts: Vec<Range> = Vec::new();
        let mut base = 0;

        for cell in &self.cells {
            match *cell {
                Cell::Inserted => match inserts.last_mut() {
                    Some(last) if last.base_position == base => last.length += 1,
                    _ => inserts.push(Range::insert(base, 1)),
                },
                Cell::Base { index, deleted } => {
                    base = index + 1;
                    if !deleted {
                        continue;
                    }
                    match ranges.last_mut() {
                        Some(last) if last.base_end() == index => last.length -= 1,
                        _ => ranges.push(Range::delete(index, 1)),
                    }
                }
            }
        }

        ranges.extend(inserts);
        ranges.sort_by_key(|r| (r.base_position, r.is_delete()));
        return RangeList::from_ranges(ranges);
    }

    /// The current document against the base `1234567890...`, with
    /// inserted characters shown as [`INSERTED`].
    pub fn render(&self) -> String {
        return self
            .cells
            .iter()
            .filter_map(|cell| match *cell {
                Cell::Base { deleted: true, .. } => None,
                Cell::Base { index, .. } => char::from_digit(((index + 1) % 10) as u32, 10),
                Cell::Inserted => Some(INSERTED),
            })
            .collect();
    }
}
