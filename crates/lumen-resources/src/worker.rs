//! Batch hand-off between the frame thread and the background worker.
//!
//! One mutex guards the pending and in-flight batches. The frame thread locks
//! it to append requests, to steal pending into in-flight, and to move worker
//! outcomes out. The worker locks it to read its wake condition and to write
//! one command's outcome at a time. Reads and decoding run unlocked.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use lumen_core::profiling::{profile_function, profile_scope};
use parking_lot::{Condvar, Mutex};

use crate::command::{LoadCommand, LoadCommands, Payload};
use crate::error::{ResourceError, ResourceResult};
use crate::kinds::{ResourceKind, ResourceType, for_kind};
use crate::loader::{LoadContext, Loaders};
use crate::source::ByteSource;
use crate::status::LoadStatus;

struct Batches {
    pending: LoadCommands,
    in_flight: LoadCommands,
    /// Bumped each time pending is handed off as a new in-flight batch.
    generation: u64,
    running: bool,
}

struct Shared {
    batches: Mutex<Batches>,
    wake: Condvar,
}

/// Sizes of the shared batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct QueueStats {
    pub pending: usize,
    pub in_flight: usize,
}

/// Producer side of the worker hand-off.
#[derive(Clone)]
pub(crate) struct WorkQueue {
    shared: Arc<Shared>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                batches: Mutex::new(Batches {
                    pending: LoadCommands::new(),
                    in_flight: LoadCommands::new(),
                    generation: 0,
                    running: true,
                }),
                wake: Condvar::new(),
            }),
        }
    }

    pub fn push<T: ResourceType>(&self, command: LoadCommand<T>) {
        self.shared.batches.lock().pending.push(command);
    }

    /// Hand pending work to the worker if it is idle. Returns the number of
    /// commands handed off.
    pub fn submit(&self) -> usize {
        let count = {
            let mut batches = self.shared.batches.lock();
            if !batches.in_flight.is_empty() || batches.pending.is_empty() {
                return 0;
            }
            batches.generation = batches.generation.wrapping_add(1);
            let Batches {
                pending, in_flight, ..
            } = &mut *batches;
            pending.drain(in_flight);
            in_flight.count()
        };
        self.shared.wake.notify_one();
        count
    }

    /// Move every command the worker is done with into `into`.
    ///
    /// The in-flight batch keeps a `Finished` husk per command so the worker's
    /// indices stay valid. Once every husk is `Finished` the batch is cleared.
    pub fn take_finished(&self, into: &mut LoadCommands) {
        fn take<T: ResourceType>(from: &mut LoadCommands, into: &mut LoadCommands) {
            for command in T::batch_mut(from) {
                if command.status().is_worker_done() {
                    into.push(command.take_outcome());
                }
            }
        }

        let mut batches = self.shared.batches.lock();
        for kind in ResourceKind::PROCESSING_ORDER {
            for_kind!(kind, T => take::<T>(&mut batches.in_flight, into));
        }
        if !batches.in_flight.is_empty()
            && batches.in_flight.all_have_status(LoadStatus::Finished)
        {
            batches.in_flight.clear();
        }
    }

    pub fn stats(&self) -> QueueStats {
        let batches = self.shared.batches.lock();
        QueueStats {
            pending: batches.pending.count(),
            in_flight: batches.in_flight.count(),
        }
    }

    /// Stop the worker. In-flight commands are abandoned.
    pub fn shutdown(&self) {
        self.shared.batches.lock().running = false;
        self.shared.wake.notify_one();
    }

    /// Drop every queued command.
    pub fn clear(&self) {
        let mut batches = self.shared.batches.lock();
        batches.pending.clear();
        batches.in_flight.clear();
    }

    pub fn spawn_worker(
        &self,
        name: &str,
        source: Arc<dyn ByteSource>,
        loaders: Loaders,
    ) -> ResourceResult<JoinHandle<()>> {
        let shared = self.shared.clone();
        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run(&shared, source.as_ref(), &loaders))
            .map_err(ResourceError::WorkerSpawn)
    }
}

/// How a pass over one kind ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Done,
    /// The in-flight batch was replaced; restart from the first kind.
    Replaced,
    Shutdown,
}

fn run(shared: &Shared, source: &dyn ByteSource, loaders: &Loaders) {
    tracing::info!("Resource worker started");

    'outer: loop {
        let generation = {
            let mut batches = shared.batches.lock();
            while batches.running && !batches.in_flight.any_has_status(LoadStatus::Pending) {
                shared.wake.wait(&mut batches);
            }
            if !batches.running {
                break;
            }
            batches.generation
        };

        profile_scope!("resource_batch");
        for kind in ResourceKind::PROCESSING_ORDER {
            match for_kind!(kind, T => process_kind::<T>(shared, generation, source, loaders)) {
                Pass::Done => {}
                Pass::Replaced => {
                    tracing::trace!("In-flight batch replaced, restarting pass");
                    continue 'outer;
                }
                Pass::Shutdown => break 'outer,
            }
        }
    }

    tracing::info!("Resource worker stopped");
}

/// Process every `Pending` command of one kind in array order, as long as the
/// in-flight batch is still the one handed off as `generation`.
fn process_kind<T: ResourceType>(
    shared: &Shared,
    generation: u64,
    source: &dyn ByteSource,
    loaders: &Loaders,
) -> Pass {
    let mut index = 0;
    loop {
        let target = {
            let mut batches = shared.batches.lock();
            if !batches.running {
                return Pass::Shutdown;
            }
            if batches.generation != generation {
                return Pass::Replaced;
            }
            let Some(command) = T::batch_mut(&mut batches.in_flight).get_mut(index) else {
                return Pass::Done;
            };
            index += 1;
            if command.status() != LoadStatus::Pending {
                continue;
            }
            command.advance(LoadStatus::Loading);
            command.target().clone()
        };

        let path = target.path();
        let outcome = if source.exists(path) {
            decode::<T>(path, source, loaders)
        } else {
            Err(ResourceError::NotFound {
                path: path.to_string(),
            })
        };

        let mut batches = shared.batches.lock();
        if batches.generation != generation {
            tracing::warn!("Load command for '{}' vanished while decoding", path);
            return Pass::Replaced;
        }
        let Some(command) = T::batch_mut(&mut batches.in_flight)
            .get_mut(index - 1)
            .filter(|command| command.target().ptr_eq(&target))
        else {
            tracing::warn!("Load command for '{}' vanished while decoding", path);
            continue;
        };
        match outcome {
            Ok(decoded) => {
                command.payload = Payload::Decoded(decoded);
                command.advance(LoadStatus::Loaded);
            }
            Err(error) => {
                let status = match &error {
                    ResourceError::NotFound { path: missing } if missing == path => {
                        LoadStatus::NotFound
                    }
                    _ => LoadStatus::ErrorReading,
                };
                command.error = Some(error);
                command.advance(status);
            }
        }
    }
}

fn decode<T: ResourceType>(
    path: &str,
    source: &dyn ByteSource,
    loaders: &Loaders,
) -> ResourceResult<T::Decoded> {
    profile_function!();
    let bytes = source.read(path)?;
    let ctx = LoadContext::new(path, &bytes, source);
    match panic::catch_unwind(AssertUnwindSafe(|| T::loader(loaders).load(&ctx))) {
        Ok(result) => result,
        Err(payload) => Err(ResourceError::decode(
            path,
            format!("decoder panicked: {}", panic_message(payload.as_ref())),
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::kinds::{Shader, Texture};
    use crate::resource::Handle;
    use crate::source::MemorySource;

    fn wait_for_outcomes(queue: &WorkQueue, expected: usize) -> LoadCommands {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut finished = LoadCommands::new();
        while finished.count() < expected {
            assert!(Instant::now() < deadline, "worker did not finish in time");
            queue.take_finished(&mut finished);
            thread::sleep(Duration::from_millis(1));
        }
        finished
    }

    #[test]
    fn test_submit_only_when_idle() {
        let queue = WorkQueue::new();
        assert_eq!(queue.submit(), 0);

        queue.push(LoadCommand::new(Handle::<Texture>::new_loading("a.png")));
        assert_eq!(queue.submit(), 1);
        assert_eq!(queue.stats(), QueueStats { pending: 0, in_flight: 1 });

        // In-flight is busy, so new work stays pending.
        queue.push(LoadCommand::new(Handle::<Texture>::new_loading("b.png")));
        assert_eq!(queue.submit(), 0);
        assert_eq!(queue.stats(), QueueStats { pending: 1, in_flight: 1 });
    }

    #[test]
    fn test_worker_reports_outcomes() {
        let source = Arc::new(
            MemorySource::new()
                .with("basic.vs", "fn vs_main() {}")
                .with("empty.ps", ""),
        );
        let queue = WorkQueue::new();
        let worker = queue
            .spawn_worker("test-worker", source, Loaders::default())
            .unwrap();

        queue.push(LoadCommand::new(Handle::<Shader>::new_loading("basic.vs")));
        queue.push(LoadCommand::new(Handle::<Shader>::new_loading("missing.vs")));
        queue.push(LoadCommand::new(Handle::<Shader>::new_loading("empty.ps")));
        assert_eq!(queue.submit(), 3);

        let finished = wait_for_outcomes(&queue, 3);
        let statuses: Vec<_> = finished
            .commands::<Shader>()
            .iter()
            .map(|c| (c.path().to_string(), c.status()))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("basic.vs".to_string(), LoadStatus::Loaded),
                ("missing.vs".to_string(), LoadStatus::NotFound),
                ("empty.ps".to_string(), LoadStatus::ErrorReading),
            ]
        );

        // All husks finished, so the in-flight batch is cleared.
        assert_eq!(queue.stats().in_flight, 0);

        queue.shutdown();
        worker.join().unwrap();
    }

    #[test]
    fn test_stale_pass_leaves_new_batch_untouched() {
        let source = MemorySource::new().with("a.vs", "a").with("b.vs", "b");
        let queue = WorkQueue::new();
        queue.push(LoadCommand::new(Handle::<Shader>::new_loading("a.vs")));
        queue.push(LoadCommand::new(Handle::<Shader>::new_loading("b.vs")));
        assert_eq!(queue.submit(), 2);

        let current = queue.shared.batches.lock().generation;
        let loaders = Loaders::default();
        assert_eq!(
            process_kind::<Shader>(&queue.shared, current.wrapping_sub(1), &source, &loaders),
            Pass::Replaced
        );
        let batches = queue.shared.batches.lock();
        assert!(
            batches
                .in_flight
                .commands::<Shader>()
                .iter()
                .all(|command| command.status() == LoadStatus::Pending)
        );
    }

    #[test]
    fn test_pass_decodes_in_submission_order() {
        let source = MemorySource::new().with("b.vs", "b").with("a.vs", "a");
        let queue = WorkQueue::new();
        queue.push(LoadCommand::new(Handle::<Shader>::new_loading("b.vs")));
        queue.push(LoadCommand::new(Handle::<Shader>::new_loading("a.vs")));
        queue.submit();

        let current = queue.shared.batches.lock().generation;
        let loaders = Loaders::default();
        assert_eq!(
            process_kind::<Shader>(&queue.shared, current, &source, &loaders),
            Pass::Done
        );

        let mut finished = LoadCommands::new();
        queue.take_finished(&mut finished);
        let paths: Vec<_> = finished.commands::<Shader>().iter().map(|c| c.path()).collect();
        assert_eq!(paths, vec!["b.vs", "a.vs"]);
        assert_eq!(queue.stats().in_flight, 0);
    }

    #[test]
    fn test_submit_bumps_generation() {
        let queue = WorkQueue::new();
        let before = queue.shared.batches.lock().generation;
        queue.push(LoadCommand::new(Handle::<Texture>::new_loading("a.png")));
        queue.submit();
        assert_eq!(queue.shared.batches.lock().generation, before.wrapping_add(1));

        // Nothing handed off, so the batch is unchanged.
        assert_eq!(queue.submit(), 0);
        assert_eq!(queue.shared.batches.lock().generation, before.wrapping_add(1));
    }

    #[test]
    fn test_shutdown_wakes_idle_worker() {
        let queue = WorkQueue::new();
        let worker = queue
            .spawn_worker("idle-worker", Arc::new(MemorySource::new()), Loaders::default())
            .unwrap();
        queue.shutdown();
        worker.join().unwrap();
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
