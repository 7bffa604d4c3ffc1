//! Lumen Core
//!
//! Shared plumbing for the Lumen crates: hash collections, logging setup,
//! profiling hooks and engine-wide configuration.

pub mod alloc;
pub mod config;
pub mod logging;
pub mod profiling;
