//! Logging utilities
//!
//! The engine logs through the `log` facade; `env_logger` is the default
//! sink and honours `RUST_LOG`.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system with a fallback level used when `RUST_LOG`
/// is unset. Safe to call more than once; later calls are ignored.
pub fn init_with_level(level: log::LevelFilter) {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_ignored() {
        init_with_level(log::LevelFilter::Debug);
        init_with_level(log::LevelFilter::Warn);
        info!("logger still usable after a second init");
    }
}
