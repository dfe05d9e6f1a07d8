#![cfg(test)]

//! One-time test subscriber for unit tests.
//!
//! Level precedence: `TEST_LOG`, then `RUST_LOG`, then `warn`. Output goes
//! through the test writer so the harness captures it per test.
//!
//! ```bash
//! TEST_LOG=debug cargo test -p compat-backend paging
//! ```

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Idempotent; safe to call from every test and from the ctor hook.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
