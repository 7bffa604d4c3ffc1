//! Error types for the resource pipeline.

use std::fmt;

use lumen_gfx::ShaderStage;

/// Errors that can occur while loading a resource.
///
/// Apart from [`ResourceError::WorkerSpawn`], every variant is local to one
/// resource and ends up attached to its handle.
#[derive(Debug)]
pub enum ResourceError {
    /// The source path did not exist when the worker looked at it.
    NotFound {
        path: String,
    },

    /// Reading the source failed.
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The decoder rejected the bytes.
    Decode {
        path: String,
        message: String,
    },

    /// A technique descriptor parsed but does not describe a usable technique.
    InvalidDescriptor {
        path: String,
        message: String,
    },

    /// A dependency resolved to `Failed`.
    DependencyFailed {
        path: String,
        dependency: String,
    },

    /// A technique references a shader compiled for the wrong stage.
    StageMismatch {
        path: String,
        expected: ShaderStage,
        actual: ShaderStage,
    },

    /// The background worker thread could not be started.
    WorkerSpawn(std::io::Error),
}

impl ResourceError {
    pub(crate) fn decode(path: &str, message: impl fmt::Display) -> Self {
        ResourceError::Decode {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// Path of the resource this error belongs to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            ResourceError::NotFound { path }
            | ResourceError::Io { path, .. }
            | ResourceError::Decode { path, .. }
            | ResourceError::InvalidDescriptor { path, .. }
            | ResourceError::DependencyFailed { path, .. }
            | ResourceError::StageMismatch { path, .. } => Some(path),
            ResourceError::WorkerSpawn(_) => None,
        }
    }

    /// True for failures that the worker reports as `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResourceError::NotFound { .. })
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound { path } => {
                write!(f, "Resource not found: {}", path)
            }
            ResourceError::Io { path, source } => {
                write!(f, "IO error reading '{}': {}", path, source)
            }
            ResourceError::Decode { path, message } => {
                write!(f, "Failed to decode '{}': {}", path, message)
            }
            ResourceError::InvalidDescriptor { path, message } => {
                write!(f, "Invalid descriptor '{}': {}", path, message)
            }
            ResourceError::DependencyFailed { path, dependency } => {
                write!(f, "'{}' failed because dependency '{}' failed", path, dependency)
            }
            ResourceError::StageMismatch {
                path,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "'{}' expected a {} shader but got a {} shader",
                    path, expected, actual
                )
            }
            ResourceError::WorkerSpawn(source) => {
                write!(f, "Failed to spawn resource worker: {}", source)
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Io { source, .. } | ResourceError::WorkerSpawn(source) => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;
