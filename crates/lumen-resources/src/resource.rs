//! Resources and the handles that own them.
//!
//! A [`Handle`] is a strong reference: the resource and its GPU objects live
//! until the last handle drops. The cache holds one handle per path, so a
//! resource with an owner count of one is owned by the cache alone.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};

use crate::error::ResourceError;
use crate::kinds::{Font, Model, ResourceKind, ResourceType, Shader, Technique, Texture};

/// Observable status of a resource. `Loading` settles exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceStatus {
    Loading,
    Loaded,
    Failed,
}

enum ResourceState<T: ResourceType> {
    Loading,
    Loaded(T::Content),
    Failed(Arc<ResourceError>),
}

/// A cached resource of kind `T`.
pub struct Resource<T: ResourceType> {
    path: String,
    state: RwLock<ResourceState<T>>,
}

impl<T: ResourceType> Resource<T> {
    fn new(path: String) -> Self {
        Self {
            path,
            state: RwLock::new(ResourceState::Loading),
        }
    }
}

/// Strong, shared reference to a resource.
pub struct Handle<T: ResourceType>(Arc<Resource<T>>);

impl<T: ResourceType> Handle<T> {
    /// Create a fresh `Loading` resource.
    pub(crate) fn new_loading(path: impl Into<String>) -> Self {
        Self(Arc::new(Resource::new(path.into())))
    }

    /// Normalized path this resource was requested with.
    pub fn path(&self) -> &str {
        &self.0.path
    }

    pub fn kind(&self) -> ResourceKind {
        T::KIND
    }

    pub fn status(&self) -> ResourceStatus {
        match &*self.0.state.read() {
            ResourceState::Loading => ResourceStatus::Loading,
            ResourceState::Loaded(_) => ResourceStatus::Loaded,
            ResourceState::Failed(_) => ResourceStatus::Failed,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status() == ResourceStatus::Loading
    }

    pub fn is_loaded(&self) -> bool {
        self.status() == ResourceStatus::Loaded
    }

    pub fn is_failed(&self) -> bool {
        self.status() == ResourceStatus::Failed
    }

    /// Borrow the content if the resource is loaded.
    ///
    /// The guard holds a read lock; do not keep it across a frame.
    pub fn get(&self) -> Option<MappedRwLockReadGuard<'_, T::Content>> {
        RwLockReadGuard::try_map(self.0.state.read(), |state| match state {
            ResourceState::Loaded(content) => Some(content),
            _ => None,
        })
        .ok()
    }

    /// Why the resource failed, if it did.
    pub fn error(&self) -> Option<Arc<ResourceError>> {
        match &*self.0.state.read() {
            ResourceState::Failed(error) => Some(error.clone()),
            _ => None,
        }
    }

    pub fn downgrade(&self) -> WeakHandle<T> {
        WeakHandle(Arc::downgrade(&self.0))
    }

    /// Both handles refer to the same resource instance.
    pub fn ptr_eq(&self, other: &Handle<T>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live strong handles, the cache's included.
    pub fn owner_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Settle as `Loaded`. Returns `false` if the resource had already settled.
    pub(crate) fn set_loaded(&self, content: T::Content) -> bool {
        let mut state = self.0.state.write();
        if !matches!(*state, ResourceState::Loading) {
            return false;
        }
        *state = ResourceState::Loaded(content);
        true
    }

    /// Settle as `Failed`. Returns the shared error, or `None` if already settled.
    pub(crate) fn set_failed(&self, error: ResourceError) -> Option<Arc<ResourceError>> {
        let mut state = self.0.state.write();
        if !matches!(*state, ResourceState::Loading) {
            return None;
        }
        let error = Arc::new(error);
        *state = ResourceState::Failed(error.clone());
        Some(error)
    }
}

impl<T: ResourceType> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ResourceType> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: ResourceType> Eq for Handle<T> {}

impl<T: ResourceType> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("kind", &T::KIND)
            .field("path", &self.path())
            .field("status", &self.status())
            .finish()
    }
}

/// Non-owning reference. Reads as empty once the resource is gone.
pub struct WeakHandle<T: ResourceType>(Weak<Resource<T>>);

impl<T: ResourceType> WeakHandle<T> {
    pub fn upgrade(&self) -> Option<Handle<T>> {
        self.0.upgrade().map(Handle)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl<T: ResourceType> Clone for WeakHandle<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ResourceType> fmt::Debug for WeakHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakHandle")
            .field("kind", &T::KIND)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// A handle of any kind, used for dependency lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnyHandle {
    Font(Handle<Font>),
    Shader(Handle<Shader>),
    Technique(Handle<Technique>),
    Texture(Handle<Texture>),
    Model(Handle<Model>),
}

macro_rules! any_handle_dispatch {
    ($self:ident, $handle:ident => $body:expr) => {
        match $self {
            AnyHandle::Font($handle) => $body,
            AnyHandle::Shader($handle) => $body,
            AnyHandle::Technique($handle) => $body,
            AnyHandle::Texture($handle) => $body,
            AnyHandle::Model($handle) => $body,
        }
    };
}

impl AnyHandle {
    pub fn kind(&self) -> ResourceKind {
        any_handle_dispatch!(self, handle => handle.kind())
    }

    pub fn path(&self) -> &str {
        any_handle_dispatch!(self, handle => handle.path())
    }

    pub fn status(&self) -> ResourceStatus {
        any_handle_dispatch!(self, handle => handle.status())
    }
}

macro_rules! impl_from_handle {
    ($($ty:ident),*) => {
        $(
            impl From<Handle<$ty>> for AnyHandle {
                fn from(handle: Handle<$ty>) -> Self {
                    AnyHandle::$ty(handle)
                }
            }
        )*
    };
}

impl_from_handle!(Font, Shader, Technique, Texture, Model);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_settles_once() {
        let handle = Handle::<Texture>::new_loading("a.png");
        assert!(handle.is_loading());
        assert!(handle.get().is_none());

        let error = handle.set_failed(ResourceError::NotFound {
            path: "a.png".to_string(),
        });
        assert!(error.is_some());
        assert!(handle.is_failed());

        assert!(
            handle
                .set_failed(ResourceError::NotFound {
                    path: "a.png".to_string()
                })
                .is_none()
        );
        assert!(handle.error().map(|e| e.is_not_found()).unwrap_or(false));
    }

    #[test]
    fn test_fonts_load_without_gpu() {
        let handle = Handle::<Font>::new_loading("ui.ttf");
        let data = crate::kinds::FontData {
            format: crate::kinds::FontFormat::TrueType,
            families: vec!["Test Sans".to_string()],
            bytes: Arc::new(vec![0, 1, 0, 0]),
        };
        assert!(handle.set_loaded(data));
        assert!(handle.is_loaded());
        assert_eq!(handle.get().map(|f| f.families.len()), Some(1));
        assert!(
            handle
                .set_failed(ResourceError::NotFound {
                    path: "ui.ttf".to_string()
                })
                .is_none()
        );
        assert!(handle.is_loaded());
    }

    #[test]
    fn test_weak_handle_reads_empty_after_drop() {
        let handle = Handle::<Texture>::new_loading("a.png");
        let weak = handle.downgrade();
        assert!(weak.is_alive());
        assert!(weak.upgrade().is_some_and(|h| h.ptr_eq(&handle)));
        drop(handle);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_owner_count_and_any_handle() {
        let handle = Handle::<Texture>::new_loading("a.png");
        assert_eq!(handle.owner_count(), 1);
        let any = AnyHandle::from(handle.clone());
        assert_eq!(handle.owner_count(), 2);
        assert_eq!(any.kind(), ResourceKind::Texture);
        assert_eq!(any.path(), "a.png");
        assert_eq!(any.status(), ResourceStatus::Loading);
        assert_eq!(any, AnyHandle::Texture(handle.clone()));

        let other = AnyHandle::from(Handle::<Texture>::new_loading("a.png"));
        assert_ne!(any, other);
    }
}
