//! Frame-thread side of the pipeline.

use std::sync::Arc;
use std::thread::JoinHandle;

use lumen_core::profiling::{profile_function, profile_scope};
use lumen_gfx::GraphicsContext;

use crate::cache::ResourceCaches;
use crate::command::{LoadCommand, LoadCommands, Payload};
use crate::config::ResourceConfig;
use crate::error::{ResourceError, ResourceResult};
use crate::event::{ResourceEvent, ResourceEventBuffer};
use crate::kinds::{FinalizeContext, Finalized, ResourceKind, ResourceType, for_kind};
use crate::loader::Loaders;
use crate::resource::{Handle, ResourceStatus};
use crate::source::{ByteSource, FileSource, normalize_path};
use crate::status::LoadStatus;
use crate::worker::WorkQueue;

/// Snapshot of the pipeline's batch sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineStats {
    /// Commands queued for the next hand-off.
    pub pending: usize,
    /// Commands in the batch the worker owns, finished husks included.
    pub in_flight: usize,
    /// Commands waiting on dependencies.
    pub waiting: usize,
    /// Cached resources across every kind.
    pub cached: usize,
}

/// Owns the caches, the worker and every batch.
///
/// All methods run on the frame thread; the only other thread is the
/// background worker spawned in the constructor and joined on drop. Call
/// [`update`](Self::update) once per frame, or the three steps it wraps in
/// the same order.
pub struct ResourceManager {
    caches: ResourceCaches,
    queue: WorkQueue,
    waiting: LoadCommands,
    graphics: Arc<dyn GraphicsContext>,
    events: ResourceEventBuffer,
    config: ResourceConfig,
    worker: Option<JoinHandle<()>>,
}

impl ResourceManager {
    /// Read from disk under `config.root` with the default loaders.
    pub fn new(config: ResourceConfig, graphics: Arc<dyn GraphicsContext>) -> ResourceResult<Self> {
        let source = Arc::new(FileSource::new(&config.root));
        Self::with_source(config, graphics, source, Loaders::default())
    }

    pub fn with_source(
        config: ResourceConfig,
        graphics: Arc<dyn GraphicsContext>,
        source: Arc<dyn ByteSource>,
        loaders: Loaders,
    ) -> ResourceResult<Self> {
        let queue = WorkQueue::new();
        let worker = queue.spawn_worker(&config.worker_name, source, loaders)?;
        Ok(Self {
            caches: ResourceCaches::default(),
            queue,
            waiting: LoadCommands::new(),
            graphics,
            events: ResourceEventBuffer::new(),
            config,
            worker: Some(worker),
        })
    }

    /// Get the handle for `path`, starting a load if it is not cached.
    ///
    /// Never blocks and never fails; failures show up later as
    /// [`ResourceStatus::Failed`].
    pub fn request<T: ResourceType>(&mut self, path: &str) -> Handle<T> {
        self.caches
            .get_or_create::<T>(&normalize_path(path), &self.queue)
    }

    /// Look up a cached handle without starting a load.
    pub fn find<T: ResourceType>(&self, path: &str) -> Option<Handle<T>> {
        self.caches.get::<T>(&normalize_path(path)).cloned()
    }

    /// Run one frame of the pipeline.
    pub fn update(&mut self) {
        profile_function!();
        self.submit_pending_work();
        self.drain_finished_work();
        if self.config.evict_unused {
            self.evict_unused_resources();
        }
    }

    /// Hand pending work to the worker if it is idle. Returns the number of
    /// commands handed off.
    pub fn submit_pending_work(&mut self) -> usize {
        profile_function!();
        let count = self.queue.submit();
        if count > 0 {
            tracing::debug!("Handed {} load commands to the resource worker", count);
        }
        count
    }

    /// Finalize what the worker finished, then re-check waiting commands.
    pub fn drain_finished_work(&mut self) {
        profile_function!();
        let mut finished = LoadCommands::new();
        self.queue.take_finished(&mut finished);

        for kind in ResourceKind::PROCESSING_ORDER {
            for_kind!(kind, T => self.finalize_batch::<T>(&mut finished));
        }
        self.waiting.collect_waiting(&mut finished);
        debug_assert!(finished.all_have_status(LoadStatus::Finished));

        for kind in ResourceKind::PROCESSING_ORDER {
            for_kind!(kind, T => self.recheck_waiting::<T>());
        }
    }

    /// Drop every resource the cache is the sole owner of. Returns the number
    /// evicted.
    pub fn evict_unused_resources(&mut self) -> usize {
        profile_function!();
        let mut count = 0;
        for kind in ResourceKind::EVICTION_ORDER {
            for_kind!(kind, T => {
                for path in T::cache_mut(&mut self.caches).evict_unused() {
                    tracing::debug!("Evicted {} '{}'", T::KIND, path);
                    self.events.push(ResourceEvent::Evicted { kind: T::KIND, path });
                    count += 1;
                }
            });
        }
        count
    }

    /// Drain the events emitted since the last call.
    pub fn drain_events(&mut self) -> impl Iterator<Item = ResourceEvent> + '_ {
        self.events.drain()
    }

    pub fn stats(&self) -> PipelineStats {
        let queue = self.queue.stats();
        PipelineStats {
            pending: queue.pending,
            in_flight: queue.in_flight,
            waiting: self.waiting.count(),
            cached: self.caches.len(),
        }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn graphics(&self) -> &Arc<dyn GraphicsContext> {
        &self.graphics
    }

    fn finalize_batch<T: ResourceType>(&mut self, finished: &mut LoadCommands) {
        for command in T::batch_mut(finished) {
            self.finalize_command(command);
        }
    }

    fn finalize_command<T: ResourceType>(&mut self, command: &mut LoadCommand<T>) {
        let target = command.target().clone();
        let status = command.status();

        if status.is_failure() {
            let error = command.error.take().unwrap_or_else(|| ResourceError::NotFound {
                path: target.path().to_string(),
            });
            command.advance(LoadStatus::Finished);
            self.fail(&target, error);
            return;
        }

        let Payload::Decoded(decoded) = std::mem::take(&mut command.payload) else {
            command.advance(LoadStatus::Finished);
            self.fail(
                &target,
                ResourceError::decode(target.path(), "worker produced no payload"),
            );
            return;
        };

        let outcome = {
            profile_scope!("finalize");
            let mut ctx = FinalizeContext::new(
                target.path(),
                &mut self.caches,
                &self.queue,
                self.graphics.as_ref(),
            );
            T::finalize(decoded, &mut ctx)
        };
        command.advance(LoadStatus::Finished);

        match outcome {
            Ok(Finalized::Ready(content)) => self.succeed(&target, content),
            Ok(Finalized::Waiting {
                staged,
                dependencies,
            }) => {
                tracing::debug!(
                    "{} '{}' waiting on {} dependencies",
                    T::KIND,
                    target.path(),
                    dependencies.len()
                );
                command.payload = Payload::Staged(staged);
                command.dependencies = dependencies;
                command.advance(LoadStatus::WaitingDependencies);
            }
            Err(error) => self.fail(&target, error),
        }
    }

    fn recheck_waiting<T: ResourceType>(&mut self) {
        let mut waiting = std::mem::take(T::batch_mut(&mut self.waiting));
        if waiting.is_empty() {
            return;
        }
        waiting.retain_mut(|command| !self.resolve_waiting(command));

        let slot = T::batch_mut(&mut self.waiting);
        waiting.append(slot);
        *slot = waiting;
    }

    /// Returns `true` once the command has settled its resource.
    fn resolve_waiting<T: ResourceType>(&mut self, command: &mut LoadCommand<T>) -> bool {
        let target = command.target().clone();

        if let Some(failed) = command
            .dependencies()
            .iter()
            .find(|dependency| dependency.status() == ResourceStatus::Failed)
        {
            let error = ResourceError::DependencyFailed {
                path: target.path().to_string(),
                dependency: failed.path().to_string(),
            };
            command.advance(LoadStatus::Finished);
            self.fail(&target, error);
            return true;
        }

        if !command
            .dependencies()
            .iter()
            .all(|dependency| dependency.status() == ResourceStatus::Loaded)
        {
            return false;
        }

        command.advance(LoadStatus::Finished);
        let Payload::Staged(staged) = std::mem::take(&mut command.payload) else {
            self.fail(
                &target,
                ResourceError::decode(target.path(), "staged payload missing"),
            );
            return true;
        };
        match T::complete(target.path(), staged, self.graphics.as_ref()) {
            Ok(content) => self.succeed(&target, content),
            Err(error) => self.fail(&target, error),
        }
        true
    }

    fn succeed<T: ResourceType>(&mut self, target: &Handle<T>, content: T::Content) {
        if target.set_loaded(content) {
            tracing::debug!("Loaded {} '{}'", T::KIND, target.path());
            self.events.push(ResourceEvent::Loaded {
                kind: T::KIND,
                path: target.path().to_string(),
            });
        }
    }

    fn fail<T: ResourceType>(&mut self, target: &Handle<T>, error: ResourceError) {
        if let Some(error) = target.set_failed(error) {
            tracing::error!("Failed to load {} '{}': {}", T::KIND, target.path(), error);
            self.events.push(ResourceEvent::Failed {
                kind: T::KIND,
                path: target.path().to_string(),
                error,
            });
        }
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        self.queue.shutdown();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("Resource worker panicked during shutdown");
        }
        self.waiting.clear();
        self.queue.clear();
        self.caches.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{Shader, Texture};
    use crate::source::MemorySource;
    use lumen_gfx::MockGraphicsContext;

    fn manager() -> ResourceManager {
        ResourceManager::with_source(
            ResourceConfig::default(),
            Arc::new(MockGraphicsContext::new()),
            Arc::new(MemorySource::new()),
            Loaders::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_request_normalizes_and_dedups() {
        let mut resources = manager();
        let a = resources.request::<Texture>("./textures/a.png");
        let b = resources.request::<Texture>("textures\\a.png");

        assert!(a.ptr_eq(&b));
        assert_eq!(a.path(), "textures/a.png");
        assert_eq!(
            resources.stats(),
            PipelineStats {
                pending: 1,
                in_flight: 0,
                waiting: 0,
                cached: 1,
            }
        );
    }

    #[test]
    fn test_find_does_not_load() {
        let mut resources = manager();
        assert!(resources.find::<Shader>("basic.vs").is_none());
        assert_eq!(resources.stats().pending, 0);

        let handle = resources.request::<Shader>("basic.vs");
        let found = resources.find::<Shader>("./basic.vs").unwrap();
        assert!(found.ptr_eq(&handle));
        assert!(resources.find::<Texture>("basic.vs").is_none());
    }

    #[test]
    fn test_submit_hands_off_once() {
        let mut resources = manager();
        resources.request::<Texture>("a.png");
        resources.request::<Texture>("b.png");
        assert_eq!(resources.submit_pending_work(), 2);
        assert_eq!(resources.submit_pending_work(), 0);
        assert_eq!(resources.stats().pending, 0);
    }

    #[test]
    fn test_drop_joins_idle_worker() {
        let mut resources = manager();
        let handle = resources.request::<Texture>("a.png");
        drop(resources);
        // The pending command was abandoned, so the resource never settled.
        assert!(handle.is_loading());
        assert_eq!(handle.owner_count(), 1);
    }
}
