//! Shared helpers for the scenario tests.

use tracing_subscriber::EnvFilter;

/// Routes container logs to the test output. Set `RUST_LOG=compono_container=trace`
/// to see resolution details.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
