//! Random op generation for fuzzing the transform engine.
//!
//! Generated ops are expressed in current-document coordinates against the
//! infinite base, so any position is valid as long as a delete does not
//! reach before the start of the document.
//!
//! ```toml
//! numTests = 200
//! minInsertPos = 0
//! maxInsertPos = 40
//! minLength = -8
//! maxLength = 8
//! ```

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::ot::op::Op;

/// Bounds for [`generate`]. Every bound is inclusive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FuzzConfig {
    /// Ops to draw. Discarded draws are not replaced.
    pub num_tests: usize,
    pub min_insert_pos: i64,
    pub max_insert_pos: i64,
    pub min_length: i64,
    pub max_length: i64,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        return FuzzConfig {
            num_tests: 10,
            min_insert_pos: 1,
            max_insert_pos: 10,
            min_length: -5,
            max_length: 5,
        };
    }
}

impl FuzzConfig {
    /// The default bounds with a different op count.
    pub fn with_num_tests(num_tests: usize) -> Self {
        return FuzzConfig {
            num_tests,
            ..FuzzConfig::default()
        };
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: FuzzConfig = toml::from_str(content)?;
        config.validate()?;
        return Ok(config);
    }

    /// Load a config file. A missing file yields `Ok(None)`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        return FuzzConfig::from_toml_str(&content).map(Some);
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_insert_pos < 0 {
            return Err(Error::InvalidConfig {
                field: "minInsertPos",
                reason: format!("{} is negative", self.min_insert_pos),
            });
        }
        if self.min_insert_pos > self.max_insert_pos {
            return Err(Error::InvalidConfig {
                field: "minInsertPos",
                reason: format!(
                    "{} is greater than maxInsertPos {}",
                    self.min_insert_pos, self.max_insert_pos
                ),
            });
        }
        if self.min_length > self.max_length {
            return Err(Error::InvalidConfig {
                field: "minLength",
                reason: format!(
                    "{} is greater than maxLength {}",
                    self.min_length, self.max_length
                ),
            });
        }
        return Ok(());
    }
}

/// Draw `config.num_tests` ops, dropping zero-length draws, draws at a
/// negative position, and draws whose end does not fit in an `i64` or lies
/// before the start of the document.
///
/// Panics on inverted bounds; configs loaded through [`FuzzConfig::from_toml_str`]
/// are already validated.
pub fn generate<R: Rng>(config: &FuzzConfig, rng: &mut R) -> Vec<Op> {
    let mut ops = Vec::with_capacity(config.num_tests);
    for _ in 0..config.num_tests {
        let position = rng.gen_range(config.min_insert_pos..=config.max_insert_pos);
        let length = rng.gen_range(config.min_length..=config.max_length);
        let end = position.checked_add(length);
        if length == 0 || position < 0 || end.is_none_or(|end| end < 0) {
            debug!(position, length, "discarding generated op");
            continue;
        }
        ops.push(Op::new(position, length));
    }
    return ops;
}

/// Draw `n` inserts with position and length both in `1..=10`.
pub fn generate_positive<R: Rng>(n: usize, rng: &mut R) -> Vec<Op> {
    return (0..n)
        .map(|_| Op::insert(rng.gen_range(1..=10), rng.gen_range(1..=10)))
        .collect();
}

/// [`generate`] with the default bounds and a thread-local rng.
pub fn random_ops(n: usize) -> Vec<Op> {
    return generate(&FuzzConfig::with_num_tests(n), &mut rand::thread_rng());
}
