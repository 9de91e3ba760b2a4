//! Logging utilities
//!
//! The crate logs through the `log` facade; binaries and tests pick the
//! backend. `init` wires up `env_logger` and honours `RUST_LOG`.

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = env_logger::builder().is_test(cfg!(test)).try_init();
}

/// Initialize logging with an explicit default filter (e.g. `"rove=debug"`)
///
/// `RUST_LOG` still takes precedence when set.
pub fn init_with_filter(filter: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .try_init();
}
