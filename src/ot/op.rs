//! Edit operations expressed against the evolving document.
//!
//! An [`Op`] is what an editor emits: a raw `(position, length)` pair in
//! current-document coordinates. Positive lengths insert, negative lengths
//! delete. A delete's raw position is the boundary *after* the deleted span,
//! so `(5, -2)` removes the two characters in front of position 5.
//!
//! Before an op reaches the transform engine it is normalized into an
//! [`Edit`], which always carries the start of the affected span. Because
//! `Edit` is a separate type, an op cannot be normalized twice.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use super::range::{Range, RangeList};
use super::transform;

/// A raw edit in current-document coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Op {
    /// Insert position, or the end (exclusive) of the deleted span.
    pub position: i64,
    /// Characters inserted (positive) or deleted (negative).
    pub length: i64,
}

/// A normalized op: the start of the span plus its magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edit {
    Insert { position: i64, len: i64 },
    Delete { start: i64, len: i64 },
}

impl Op {
    pub fn new(position: i64, length: i64) -> Op {
        return Op { position, length };
    }

    /// An insert of `len` characters at `position`.
    pub fn insert(position: i64, len: i64) -> Op {
        return Op { position, length: len };
    }

    /// A delete of the `len` characters ending at `end`.
    pub fn delete(end: i64, len: i64) -> Op {
        return Op { position: end, length: -len };
    }

    pub fn is_insert(&self) -> bool {
        return self.length > 0;
    }

    pub fn is_delete(&self) -> bool {
        return self.length < 0;
    }

    /// Zero-length ops carry no edit and are discarded by the engine.
    pub fn is_empty(&self) -> bool {
        return self.length == 0;
    }

    /// Convert to start-based form.
    ///
    /// Returns `Ok(None)` for a zero-length op. Fails if the op would reach
    /// before the start of the document.
    pub fn normalize(self) -> Result<Option<Edit>> {
        if self.length == 0 {
            return Ok(None);
        }
        if self.length > 0 {
            if self.position < 0 {
                return Err(Error::InvalidOp {
                    op: self,
                    reason: "insert at a negative position",
                });
            }
            return Ok(Some(Edit::Insert {
                position: self.position,
                len: self.length,
            }));
        }
        let Some(start) = self.position.checked_add(self.length) else {
            return Err(Error::InvalidOp {
                op: self,
                reason: "delete start overflows",
            });
        };
        if start < 0 {
            return Err(Error::InvalidOp {
                op: self,
                reason: "delete reaches before the start of the document",
            });
        }
        return Ok(Some(Edit::Delete {
            start,
            len: -self.length,
        }));
    }
}

impl From<(i64, i64)> for Op {
    fn from((position, length): (i64, i64)) -> Op {
        return Op { position, length };
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "({},{})", self.position, self.length);
    }
}

impl Edit {
    /// First current-document position the edit touches.
    pub fn start(&self) -> i64 {
        return match *self {
            Edit::Insert { position, .. } => position,
            Edit::Delete { start, .. } => start,
        };
    }

    /// Signed length: positive for inserts, negative for deletes.
    pub fn signed_len(&self) -> i64 {
        return match *self {
            Edit::Insert { len, .. } => len,
            Edit::Delete { len, .. } => -len,
        };
    }

    /// The range this edit produces when applied to an untouched document.
    pub fn to_range(&self) -> Range {
        return Range::new(self.start(), self.signed_len());
    }
}

/// A batch of ops, optionally paired with a pre-existing range list.
///
/// Without a seed, [`OpSeq::to_range_list`] derives the canonical form from
/// scratch. With a seed, the seed is taken verbatim as the starting list and
/// every op is run through the engine against it.
#[derive(Clone, Debug, Default)]
pub struct OpSeq {
    /// Most batches are a single keystroke or a short transaction.
    ops: SmallVec<[Op; 8]>,
    seed: Option<RangeList>,
}

impl OpSeq {
    pub fn new() -> OpSeq {
        return OpSeq {
            ops: SmallVec::new(),
            seed: None,
        };
    }

    /// Build from `(position, length)` pairs.
    pub fn from_pairs<I>(pairs: I) -> OpSeq
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        return OpSeq {
            ops: pairs.into_iter().map(Op::from).collect(),
            seed: None,
        };
    }

    /// Build a batch that starts from `seed` instead of an empty list.
    ///
    /// The seed is loaded as-is; it is only checked when the engine scans it.
    pub fn for_testing<S, I>(seed: S, ops: I) -> OpSeq
    where
        S: IntoIterator<Item = (i64, i64)>,
        I: IntoIterator<Item = (i64, i64)>,
    {
        return OpSeq {
            ops: ops.into_iter().map(Op::from).collect(),
            seed: Some(RangeList::from_pairs(seed)),
        };
    }

    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[Op] {
        return &self.ops;
    }

    pub fn seed(&self) -> Option<&RangeList> {
        return self.seed.as_ref();
    }

    pub fn len(&self) -> usize {
        return self.ops.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.ops.is_empty();
    }

    /// Run the batch through the transform engine.
    pub fn to_range_list(&self) -> Result<RangeList> {
        return match &self.seed {
            Some(seed) => transform::apply(seed.clone(), &self.ops),
            None => transform::derive(&self.ops),
        };
    }
}

impl<const N: usize> From<[(i64, i64); N]> for OpSeq {
    fn from(pairs: [(i64, i64); N]) -> OpSeq {
        return OpSeq::from_pairs(pairs);
    }
}

impl From<Vec<(i64, i64)>> for OpSeq {
    fn from(pairs: Vec<(i64, i64)>) -> OpSeq {
        return OpSeq::from_pairs(pairs);
    }
}

impl From<Vec<Op>> for OpSeq {
    fn from(ops: Vec<Op>) -> OpSeq {
        return OpSeq {
            ops: SmallVec::from_vec(ops),
            seed: None,
        };
    }
}

impl FromIterator<Op> for OpSeq {
    fn from_iter<T: IntoIterator<Item = Op>>(iter: T) -> OpSeq {
        return OpSeq {
            ops: iter.into_iter().collect(),
            seed: None,
        };
    }
}
