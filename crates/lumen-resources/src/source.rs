//! Where resource bytes come from.

use std::path::{Path, PathBuf};

use lumen_core::alloc::HashMap;
use parking_lot::RwLock;

use crate::error::{ResourceError, ResourceResult};

/// Blocking byte access used by the worker.
pub trait ByteSource: Send + Sync {
    /// Check if a path exists.
    fn exists(&self, path: &str) -> bool;

    /// Read all bytes at `path`. A missing path yields [`ResourceError::NotFound`].
    fn read(&self, path: &str) -> ResourceResult<Vec<u8>>;
}

/// Reads from disk relative to a root directory.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ByteSource for FileSource {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn read(&self, path: &str) -> ResourceResult<Vec<u8>> {
        let full_path = self.resolve(path);
        std::fs::read(&full_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ResourceError::NotFound {
                    path: path.to_string(),
                }
            } else {
                ResourceError::Io {
                    path: path.to_string(),
                    source: e,
                }
            }
        })
    }
}

/// In-memory byte source keyed by normalized path.
#[derive(Default)]
pub struct MemorySource {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the bytes stored at `path`.
    pub fn insert(&self, path: &str, data: impl Into<Vec<u8>>) {
        self.data.write().insert(normalize_path(path), data.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }

    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.data.write().remove(&normalize_path(path))
    }
}

impl ByteSource for MemorySource {
    fn exists(&self, path: &str) -> bool {
        self.data.read().contains_key(&normalize_path(path))
    }

    fn read(&self, path: &str) -> ResourceResult<Vec<u8>> {
        self.data
            .read()
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| ResourceError::NotFound {
                path: path.to_string(),
            })
    }
}

/// Normalize a request path into its cache key.
///
/// Separators become `/`, `.` segments are dropped and `..` pops the previous
/// segment when there is one. Leading `..` segments are kept.
pub fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/') || path.starts_with('\\');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    if absolute { format!("/{}", joined) } else { joined }
}

/// Resolve `relative` against the directory containing `base`.
pub fn resolve_relative(base: &str, relative: &str) -> String {
    if relative.starts_with('/') || relative.starts_with('\\') {
        return normalize_path(relative);
    }
    let base = normalize_path(base);
    match base.rfind('/') {
        Some(index) => normalize_path(&format!("{}/{}", &base[..index], relative)),
        None => normalize_path(relative),
    }
}

/// Lowercased extension of `path`, without the dot.
pub fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
