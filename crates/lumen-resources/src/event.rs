//! Resource events, buffered per frame.

use std::sync::Arc;

use crate::error::ResourceError;
use crate::kinds::ResourceKind;

/// Emitted when a resource settles or leaves the cache.
#[derive(Debug, Clone)]
pub enum ResourceEvent {
    Loaded {
        kind: ResourceKind,
        path: String,
    },
    Failed {
        kind: ResourceKind,
        path: String,
        error: Arc<ResourceError>,
    },
    Evicted {
        kind: ResourceKind,
        path: String,
    },
}

impl ResourceEvent {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceEvent::Loaded { kind, .. }
            | ResourceEvent::Failed { kind, .. }
            | ResourceEvent::Evicted { kind, .. } => *kind,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ResourceEvent::Loaded { path, .. }
            | ResourceEvent::Failed { path, .. }
            | ResourceEvent::Evicted { path, .. } => path,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ResourceEvent::Loaded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ResourceEvent::Failed { .. })
    }

    pub fn is_evicted(&self) -> bool {
        matches!(self, ResourceEvent::Evicted { .. })
    }
}

/// A buffer of resource events that can be drained each frame.
#[derive(Debug, Default)]
pub struct ResourceEventBuffer {
    events: Vec<ResourceEvent>,
}

impl ResourceEventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ResourceEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = ResourceEvent> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
