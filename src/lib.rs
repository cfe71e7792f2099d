//! Mako - canonical base-coordinate range lists for plain-text OT.
//!
//! # Quick Start
//!
//! ```
//! use mako::ot::{Op, OpSeq};
//!
//! // Delete "6" from 1234567890..., then type after "8".
//! let mut list = OpSeq::from([(6, -1), (7, 1)]).to_range_list().unwrap();
//! assert_eq!(list.to_string(), "[(5,-1),(8,1)]");
//!
//! // Keep editing the same list.
//! list.apply(&[Op::new(6, -1)]).unwrap();
//! assert_eq!(list.to_string(), "[(5,-2),(8,1)]");
//! ```

pub mod error;
pub mod fuzz;
pub mod ot;

pub use error::{Error, Result};
