//! Random op generation and fuzz configuration loading.

use std::fs;

use mako::Error;
use mako::fuzz::{self, FuzzConfig};
use mako::ot::transform;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;

// =============================================================================
// Generators
// =============================================================================

#[test]
fn generate_respects_bounds() {
    let mut rng = StdRng::seed_from_u64(42);
    let config = FuzzConfig {
        num_tests: 1000,
        min_insert_pos: 3,
        max_insert_pos: 6,
        min_length: -2,
        max_length: 4,
    };
    let ops = fuzz::generate(&config, &mut rng);
    assert!(!ops.is_empty());
    assert!(ops.len() <= 1000);
    for op in &ops {
        assert!((3..=6).contains(&op.position), "{}", op);
        assert!((-2..=4).contains(&op.length), "{}", op);
        assert_ne!(op.length, 0);
    }
}

#[test]
fn generate_discards_deletes_before_start() {
    let mut rng = StdRng::seed_from_u64(1);
    let config = FuzzConfig {
        num_tests: 200,
        min_insert_pos: 0,
        max_insert_pos: 2,
        min_length: -5,
        max_length: -1,
    };
    for op in fuzz::generate(&config, &mut rng) {
        assert!(op.position + op.length >= 0, "{}", op);
    }
}

#[test]
fn generate_drops_negative_positions_from_unchecked_config() {
    let mut rng = StdRng::seed_from_u64(5);
    let config = FuzzConfig {
        num_tests: 200,
        min_insert_pos: -4,
        max_insert_pos: 3,
        min_length: 1,
        max_length: 5,
    };
    let ops = fuzz::generate(&config, &mut rng);
    assert!(ops.iter().all(|op| op.position >= 0));
    transform::derive(&ops).unwrap();
}

#[test]
fn generate_drops_draws_that_overflow() {
    let mut rng = StdRng::seed_from_u64(11);
    let config = FuzzConfig {
        num_tests: 200,
        min_insert_pos: i64::MAX - 2,
        max_insert_pos: i64::MAX,
        min_length: 1,
        max_length: 5,
    };
    config.validate().unwrap();
    for op in fuzz::generate(&config, &mut rng) {
        assert!(op.position.checked_add(op.length).is_some(), "{}", op);
    }
}

#[test]
fn generate_is_deterministic_for_a_seed() {
    let config = FuzzConfig::with_num_tests(50);
    let a = fuzz::generate(&config, &mut StdRng::seed_from_u64(9));
    let b = fuzz::generate(&config, &mut StdRng::seed_from_u64(9));
    assert_eq!(a, b);
}

#[test]
fn generate_positive_only_inserts() {
    let mut rng = StdRng::seed_from_u64(3);
    let ops = fuzz::generate_positive(100, &mut rng);
    assert_eq!(ops.len(), 100);
    for op in &ops {
        assert!((1..=10).contains(&op.position));
        assert!((1..=10).contains(&op.length));
    }
}

#[test]
fn generated_ops_transform_cleanly() {
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let ops = fuzz::generate(&FuzzConfig::with_num_tests(60), &mut rng);
        let list = transform::derive(&ops).unwrap();
        list.check_invariants().unwrap();
    }
    let list = transform::derive(&fuzz::random_ops(30)).unwrap();
    list.check_invariants().unwrap();
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn load_from_path_reads_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fuzz.toml");
    fs::write(&path, "numTests = 25\nminInsertPos = 0\nmaxInsertPos = 40\n").unwrap();

    let config = FuzzConfig::load_from_path(&path).unwrap().unwrap();
    assert_eq!(config.num_tests, 25);
    assert_eq!(config.min_insert_pos, 0);
    assert_eq!(config.max_insert_pos, 40);
    assert_eq!(config.min_length, -5);
}

#[test]
fn load_from_missing_path_is_none() {
    let dir = TempDir::new().unwrap();
    let config = FuzzConfig::load_from_path(dir.path().join("absent.toml")).unwrap();
    assert!(config.is_none());
}

#[test]
fn load_rejects_malformed_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fuzz.toml");
    fs::write(&path, "numTests = \"many\"").unwrap();
    let err = FuzzConfig::load_from_path(&path).unwrap_err();
    assert!(matches!(err, Error::ConfigParse(_)));
}

#[test]
fn load_rejects_inverted_lengths() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fuzz.toml");
    fs::write(&path, "minLength = 3\nmaxLength = -3").unwrap();
    let err = FuzzConfig::load_from_path(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { field: "minLength", .. }));
}

#[test]
fn load_rejects_negative_insert_positions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fuzz.toml");
    fs::write(&path, "minInsertPos = -4\nmaxInsertPos = -1\nminLength = 1\nmaxLength = 5").unwrap();
    let err = FuzzConfig::load_from_path(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { field: "minInsertPos", .. }));
}

#[test]
fn config_serializes_with_camel_case_keys() {
    let text = toml::to_string(&FuzzConfig::default()).unwrap();
    assert!(text.contains("numTests = 10"));
    assert!(text.contains("minLength = -5"));
    assert_eq!(FuzzConfig::from_toml_str(&text).unwrap(), FuzzConfig::default());
}
