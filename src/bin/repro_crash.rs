//! Reproduce AFL crashes without AFL instrumentation
//!
//! Usage: RUST_LOG=mako=trace cargo run --features tools --bin repro_crash -- <crash_file>

use std::fs;

use mako::ot::model::Replay;
use mako::ot::transform;
use mako::ot::{Op, RangeList};
use tracing_subscriber::EnvFilter;

const SLACK: u64 = 8;

// SLACK and the decoder below must match fuzz_transform.rs exactly.

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
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <crash_file>", args[0]);
        std::process::exit(1);
    }
    let data = fs::read(&args[1]).expect("Failed to read file");

    eprintln!("Input: {} bytes", data.len());
    eprintln!("Hex: {}", data.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" "));

    let mut list = RangeList::new();
    let mut replay = Replay::new();
    let mut history: Vec<Op> = Vec::new();
    let mut remaining = data.as_slice();
    let mut op_num = 0;

    while let Some((fuzz_op, rest)) = FuzzOp::from_bytes(remaining) {
        remaining = rest;
        op_num += 1;

        let Some(op) = fuzz_op.to_op(replay.visible_len() as u64) else {
            eprintln!("Op {}: Checkpoint", op_num);
            let batch = transform::derive(&history).expect("batch derive failed");
            assert_eq!(batch, list, "Batch/incremental mismatch");
            eprintln!("  Batch check: PASSED");
            continue;
        };

        eprintln!("Op {}: {}", op_num, op);
        eprintln!("  Before: {} {:?}", list, replay.render());

        list.apply(&[op]).expect("engine rejected a valid op");
        replay.apply_op(op).expect("model rejected a valid op");
        history.push(op);

        eprintln!("  After:  {} {:?}", list, replay.render());

        if let Err(e) = list.check_invariants() {
            panic!("Invariant violated: {}", e);
        }
        assert_eq!(list, replay.to_range_list(), "Model mismatch");
    }

    eprintln!("\n=== Final batch check ===");
    let batch = transform::derive(&history).expect("batch derive failed");
    eprintln!("Incremental: {}", list);
    eprintln!("Batch:       {}", batch);
    assert_eq!(batch, list, "Final batch/incremental mismatch");

    eprintln!("\nAll checks passed!");
}
