//! Stress tests for templator
//!
//! These tests hammer a registry from many threads at once to surface races
//! and deadlocks in cache resolution and rendering. They take longer than the
//! integration suite and are meant for manual runs:
//!
//! ```bash
//! cargo test --release --test stress -- --nocapture
//! ```
//!
//! Throughput is printed for manual review rather than asserted; only
//! correctness (one compilation per name, identical output) is checked.
