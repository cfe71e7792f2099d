//! AFL fuzz harness for the transform engine
//!
//! Each input decodes into a stream of ops. After every op this checks:
//! 1. Invariants: the incremental list stays canonical
//! 2. Model agreement: the list matches a naive replay of the same ops
//! 3. Batch equivalence: at checkpoints, deriving the whole prefix from
//!    scratch gives the same list as applying it one op at a time

use afl::fuzz;
use mako::ot::model::Replay;
use mako::ot::{Op, RangeList};
use mako::ot::transform;

/// Positions may reach this far past the materialized document.
const SLACK: u64 = 8;

// SLACK and the decoder below must match repro_crash.rs exactly.

#[derive(Debug, Clone, Copy)]
enum FuzzOp {
    Insert { pos_frac: u8, len: u8 },
    Delete { pos_frac: u8, len: u8 },
    Checkpoint,
}

impl FuzzOp {
    fn from_bytes(bytes: &[u8]) -> Option<(FuzzOp, &[u8])> {
        if bytes.is_empty() {
            return None;
        }

        let op_type = bytes[0] % 3;
        let rest = &bytes[1..];

        match op_type {
            0 if rest.len() >= 2 => {
                let op = FuzzOp::Insert {
                    pos_frac: rest[0],
                    len: (rest[1] % 8).saturating_add(1),
                };
                Some((op, &rest[2..]))
            }
            1 if rest.len() >= 2 => {
                let op = FuzzOp::Delete {
                    pos_frac: rest[0],
                    len: (rest[1] % 8).saturating_add(1),
                };
                Some((op, &rest[2..]))
            }
            2 => Some((FuzzOp::Checkpoint, rest)),
            _ => None,
        }
    }

    /// Resolve against a document currently `doc_len` characters long.
    fn to_op(self, doc_len: u64) -> Option<Op> {
        let span = doc_len + SLACK;
        match self {
            FuzzOp::Insert { pos_frac, len } => {
                let pos = (pos_frac as u64) * span / 256;
                Some(Op::insert(pos as i64, len as i64))
            }
            FuzzOp::Delete { pos_frac, len } => {
                let end = ((pos_frac as u64) * span / 256).max(len as u64);
                Some(Op::delete(end as i64, len as i64))
            }
            FuzzOp::Checkpoint => None,
        }
    }
}

fn main() {
    fuzz!(|data: &[u8]| {
        let mut list = RangeList::new();
        let mut replay = Replay::new();
        let mut history: Vec<Op> = Vec::new();
        let mut remaining = data;

        while let Some((fuzz_op, rest)) = FuzzOp::from_bytes(remaining) {
            remaining = rest;

            let Some(op) = fuzz_op.to_op(replay.visible_len() as u64) else {
                let batch = transform::derive(&history).expect("batch derive failed");
                assert_eq!(batch, list, "Batch/incremental mismatch after {:?}", history);
                continue;
            };

            list.apply(&[op]).expect("engine rejected a valid op");
            replay.apply_op(op).expect("model rejected a valid op");
            history.push(op);

            if let Err(e) = list.check_invariants() {
                panic!("Invariant violated after {}: {} in {}", op, e, list);
            }
            assert_eq!(
                list,
                replay.to_range_list(),
                "Model mismatch after {:?}",
                history
            );
        }

        let batch = transform::derive(&history).expect("batch derive failed");
        assert_eq!(batch, list, "Final batch/incremental mismatch");
    });
}
