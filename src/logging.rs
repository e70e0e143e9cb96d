//! Logging bootstrap.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies.
//! Initialization is idempotent so tests and the binary can both call it.

use env_logger::{Builder, Env};
use log::debug;

/// Install the global logger. Returns false if one was already installed.
pub fn init(default_level: &str) -> bool {
    let installed = Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init()
        .is_ok();

    if installed {
        debug!("Logging initialized (default level {})", default_level);
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::init;

    #[test]
    fn test_second_init_is_rejected_quietly() {
        init("debug");
        assert!(!init("info"));
    }
}
