//! `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn,cosmic_text=warn";

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over [`DEFAULT_FILTER`]. Returns `false` if a
/// global subscriber was already installed, in which case nothing changes.
pub fn init() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter, false)
}

/// Install the global fmt subscriber with explicit filter directives.
pub fn init_with_filter(directives: &str) -> bool {
    install(EnvFilter::new(directives), false)
}

/// Install a subscriber that writes through the test harness capture.
pub fn init_for_tests() -> bool {
    install(EnvFilter::new("debug"), true)
}

fn install(filter: EnvFilter, test_writer: bool) -> bool {
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if test_writer {
        builder.with_test_writer().try_init()
    } else {
        builder.try_init()
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_noop() {
        init_for_tests();
        assert!(!init_with_filter("trace"));
        assert!(!init());
    }
}
