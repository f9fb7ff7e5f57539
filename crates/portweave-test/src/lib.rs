//! portweave test harness - randomized wiring and shared test setup
//!
//! This crate provides:
//! - Wiring fuzzer (random connect/disconnect/clear with invariant checks)
//! - Structural pattern properties
//! - Tracing setup for test runs

pub mod wiring_fuzzer;

pub use wiring_fuzzer::*;

use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber filtered by `RUST_LOG`.
///
/// Safe to call from many tests; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
