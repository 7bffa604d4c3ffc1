use crate::logging;
use crate::profiling::{self, ProfilingMode};

/// Engine-wide settings applied once at startup.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Explicit `tracing` filter directives. `None` uses `RUST_LOG` or the default filter.
    pub log_filter: Option<String>,
    pub profiling: ProfilingMode,
}

impl Config {
    pub fn with_log_filter(mut self, directives: impl Into<String>) -> Self {
        self.log_filter = Some(directives.into());
        self
    }

    pub fn with_profiling(mut self, mode: ProfilingMode) -> Self {
        self.profiling = mode;
        self
    }

    /// Install logging and profiling. Returns `false` if a subscriber was already set.
    pub fn apply(&self) -> bool {
        let installed = match &self.log_filter {
            Some(directives) => logging::init_with_filter(directives),
            None => logging::init(),
        };
        profiling::init_profiling(self.profiling);
        installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_log_filter("lumen_resources=debug")
            .with_profiling(ProfilingMode::On);
        assert_eq!(config.log_filter.as_deref(), Some("lumen_resources=debug"));
        assert_eq!(config.profiling, ProfilingMode::On);
    }

    #[test]
    fn test_apply_twice() {
        let config = Config::default().with_log_filter("warn");
        config.apply();
        assert!(!config.apply());
    }
}
