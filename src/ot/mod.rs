//! Operational transform of plain text into base coordinates.
//!
//! Editors emit [`Op`]s relative to the document as it currently reads. The
//! engine in [`transform`] folds them into a [`RangeList`] relative to the
//! original document, which stays canonical after every op so two lists can be
//! compared elementwise.

pub mod invariants;
pub mod model;
pub mod op;
pub mod range;
pub mod transform;

pub use op::{Edit, Op, OpSeq};
pub use range::{Range, RangeList};
