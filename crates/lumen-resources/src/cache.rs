//! Path to handle maps, one per kind.

use lumen_core::alloc::HashMap;

use crate::command::LoadCommand;
use crate::kinds::{Font, Model, ResourceType, Shader, Technique, Texture};
use crate::resource::Handle;
use crate::worker::WorkQueue;

/// Cache for one resource kind. Holds one strong handle per path.
pub struct ResourceCache<T: ResourceType> {
    entries: HashMap<String, Handle<T>>,
}

impl<T: ResourceType> Default for ResourceCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T: ResourceType> ResourceCache<T> {
    pub fn get(&self, path: &str) -> Option<&Handle<T>> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, handle: Handle<T>) {
        self.entries.insert(handle.path().to_string(), handle);
    }

    /// Remove every entry the cache is the sole owner of, returning their paths.
    ///
    /// Dropping the removed handle releases the resource and its GPU objects.
    pub(crate) fn evict_unused(&mut self) -> Vec<String> {
        let mut evicted = Vec::new();
        self.entries.retain(|path, handle| {
            if handle.owner_count() == 1 {
                evicted.push(path.clone());
                false
            } else {
                true
            }
        });
        evicted
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// One cache per kind.
#[derive(Default)]
pub struct ResourceCaches {
    pub(crate) font: ResourceCache<Font>,
    pub(crate) shader: ResourceCache<Shader>,
    pub(crate) technique: ResourceCache<Technique>,
    pub(crate) texture: ResourceCache<Texture>,
    pub(crate) model: ResourceCache<Model>,
}

impl ResourceCaches {
    /// Return the cached handle for `path`, or create a `Loading` resource and
    /// queue exactly one load command for it. `path` must already be normalized.
    pub(crate) fn get_or_create<T: ResourceType>(
        &mut self,
        path: &str,
        queue: &WorkQueue,
    ) -> Handle<T> {
        let cache = T::cache_mut(self);
        if let Some(handle) = cache.get(path) {
            return handle.clone();
        }

        tracing::debug!("Requesting {} '{}'", T::KIND, path);
        let handle = Handle::<T>::new_loading(path);
        cache.insert(handle.clone());
        queue.push(LoadCommand::new(handle.clone()));
        handle
    }

    pub fn get<T: ResourceType>(&self, path: &str) -> Option<&Handle<T>> {
        T::cache(self).get(path)
    }

    /// Total cached entries across kinds.
    pub fn len(&self) -> usize {
        self.font.len()
            + self.shader.len()
            + self.technique.len()
            + self.texture.len()
            + self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn clear(&mut self) {
        self.technique.clear();
        self.model.clear();
        self.shader.clear();
        self.texture.clear();
        self.font.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_dedups() {
        let queue = WorkQueue::new();
        let mut caches = ResourceCaches::default();

        let a = caches.get_or_create::<Texture>("a.png", &queue);
        let b = caches.get_or_create::<Texture>("a.png", &queue);
        assert!(a.ptr_eq(&b));
        assert_eq!(queue.stats().pending, 1);
        assert_eq!(caches.len(), 1);

        // Same path, different kind is a different resource.
        caches.get_or_create::<Shader>("a.png", &queue);
        assert_eq!(queue.stats().pending, 2);
        assert_eq!(caches.len(), 2);
    }

    #[test]
    fn test_evict_only_sole_owner() {
        let mut cache = ResourceCache::<Texture>::default();
        let kept = Handle::<Texture>::new_loading("kept.png");
        cache.insert(kept.clone());
        cache.insert(Handle::<Texture>::new_loading("dropped.png"));

        let evicted = cache.evict_unused();
        assert_eq!(evicted, vec!["dropped.png".to_string()]);
        assert!(cache.contains("kept.png"));
        assert!(!cache.contains("dropped.png"));

        drop(kept);
        assert_eq!(cache.evict_unused(), vec!["kept.png".to_string()]);
        assert!(cache.is_empty());
    }
}
