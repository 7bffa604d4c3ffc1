//! Profiling hooks based on the `puffin` crate.
//!
//! With the `profiling` feature disabled the scope macros expand to nothing
//! and the functions are no-ops, so call sites never need a `cfg`.

#[cfg(feature = "profiling")]
pub use puffin::{profile_function, profile_scope};

#[cfg(not(feature = "profiling"))]
pub use crate::{profile_function, profile_scope};

/// How profiling data is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfilingMode {
    /// Scopes are not recorded.
    #[default]
    Off,
    /// Scopes are recorded in-process.
    On,
    /// Scopes are recorded and served to `puffin_viewer` over HTTP.
    WithWebServer,
}

/// Default address of the puffin HTTP server.
pub const PUFFIN_ADDRESS: &str = "0.0.0.0:8585";

#[cfg(feature = "profiling")]
static PROFILING_SERVER: std::sync::OnceLock<puffin_http::Server> = std::sync::OnceLock::new();

/// Initialize profiling for the given mode.
#[cfg(feature = "profiling")]
pub fn init_profiling(mode: ProfilingMode) {
    match mode {
        ProfilingMode::Off => puffin::set_scopes_on(false),
        ProfilingMode::On => puffin::set_scopes_on(true),
        ProfilingMode::WithWebServer => {
            puffin::set_scopes_on(true);
            if PROFILING_SERVER.get().is_some() {
                return;
            }
            match puffin_http::Server::new(PUFFIN_ADDRESS) {
                Ok(server) => {
                    tracing::info!("Puffin profiler server started on http://{}", PUFFIN_ADDRESS);
                    let _ = PROFILING_SERVER.set(server);
                }
                Err(e) => {
                    tracing::error!("Failed to start puffin server: {}", e);
                }
            }
        }
    }
}

#[cfg(not(feature = "profiling"))]
pub fn init_profiling(mode: ProfilingMode) {
    if mode != ProfilingMode::Off {
        tracing::warn!(
            "Profiling requested but lumen-core was built without the `profiling` feature"
        );
    }
}

/// Mark the start of a new frame. Call once per tick.
#[inline]
pub fn new_frame() {
    #[cfg(feature = "profiling")]
    puffin::GlobalProfiler::lock().new_frame();
}

#[doc(hidden)]
#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_function {
    ($($arg:tt)*) => {};
}

#[doc(hidden)]
#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_scope {
    ($($arg:tt)*) => {};
}
