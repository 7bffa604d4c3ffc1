use std::path::PathBuf;

/// Default name of the background worker thread.
pub const DEFAULT_WORKER_NAME: &str = "lumen-resource-worker";

/// Settings for a [`ResourceManager`](crate::ResourceManager).
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    /// Base directory request paths are resolved against.
    pub root: PathBuf,
    /// Name given to the worker thread.
    pub worker_name: String,
    /// Whether [`update`](crate::ResourceManager::update) evicts unused resources.
    pub evict_unused: bool,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            worker_name: DEFAULT_WORKER_NAME.to_string(),
            evict_unused: true,
        }
    }
}

impl ResourceConfig {
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    pub fn with_evict_unused(mut self, evict: bool) -> Self {
        self.evict_unused = evict;
        self
    }
}
