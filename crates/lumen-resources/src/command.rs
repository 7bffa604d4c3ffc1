//! Load commands and the per-kind batches that carry them between stages.

use crate::error::ResourceError;
use crate::kinds::{Font, Model, ResourceType, Shader, Technique, Texture};
use crate::resource::{AnyHandle, Handle};
use crate::status::LoadStatus;

/// Data a command carries between stages.
pub(crate) enum Payload<T: ResourceType> {
    Empty,
    Decoded(T::Decoded),
    Staged(T::Staged),
}

impl<T: ResourceType> Default for Payload<T> {
    fn default() -> Self {
        Payload::Empty
    }
}

/// One request's trip through the pipeline.
pub struct LoadCommand<T: ResourceType> {
    target: Handle<T>,
    status: LoadStatus,
    pub(crate) payload: Payload<T>,
    pub(crate) error: Option<ResourceError>,
    pub(crate) dependencies: Vec<AnyHandle>,
}

impl<T: ResourceType> LoadCommand<T> {
    pub(crate) fn new(target: Handle<T>) -> Self {
        Self {
            target,
            status: LoadStatus::Pending,
            payload: Payload::Empty,
            error: None,
            dependencies: Vec::new(),
        }
    }

    pub fn target(&self) -> &Handle<T> {
        &self.target
    }

    pub fn path(&self) -> &str {
        self.target.path()
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn dependencies(&self) -> &[AnyHandle] {
        &self.dependencies
    }

    /// Move to `next`. Backward or skipping transitions are refused and logged.
    pub(crate) fn advance(&mut self, next: LoadStatus) -> bool {
        if !self.status.can_advance_to(next) {
            debug_assert!(
                false,
                "invalid load status transition {} -> {} for '{}'",
                self.status,
                next,
                self.path()
            );
            tracing::error!(
                "Refusing load status transition {} -> {} for '{}'",
                self.status,
                next,
                self.path()
            );
            return false;
        }
        self.status = next;
        true
    }

    /// Move the worker outcome out, leaving a `Finished` husk behind.
    pub(crate) fn take_outcome(&mut self) -> LoadCommand<T> {
        let taken = LoadCommand {
            target: self.target.clone(),
            status: self.status,
            payload: std::mem::take(&mut self.payload),
            error: self.error.take(),
            dependencies: Vec::new(),
        };
        self.advance(LoadStatus::Finished);
        taken
    }
}

/// Per-kind arrays of load commands.
pub struct LoadCommands {
    pub(crate) font: Vec<LoadCommand<Font>>,
    pub(crate) shader: Vec<LoadCommand<Shader>>,
    pub(crate) technique: Vec<LoadCommand<Technique>>,
    pub(crate) texture: Vec<LoadCommand<Texture>>,
    pub(crate) model: Vec<LoadCommand<Model>>,
}

impl Default for LoadCommands {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadCommands {
    pub const fn new() -> Self {
        Self {
            font: Vec::new(),
            shader: Vec::new(),
            technique: Vec::new(),
            texture: Vec::new(),
            model: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.font.len()
            + self.shader.len()
            + self.technique.len()
            + self.texture.len()
            + self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn push<T: ResourceType>(&mut self, command: LoadCommand<T>) {
        T::batch_mut(self).push(command);
    }

    pub fn commands<T: ResourceType>(&self) -> &[LoadCommand<T>] {
        T::batch(self)
    }

    /// Move every command into `into`, leaving `self` empty.
    pub fn drain(&mut self, into: &mut LoadCommands) {
        into.font.append(&mut self.font);
        into.shader.append(&mut self.shader);
        into.technique.append(&mut self.technique);
        into.texture.append(&mut self.texture);
        into.model.append(&mut self.model);
    }

    /// Move the `WaitingDependencies` commands of `from` into `self`.
    pub fn collect_waiting(&mut self, from: &mut LoadCommands) {
        fn collect<T: ResourceType>(
            into: &mut Vec<LoadCommand<T>>,
            from: &mut Vec<LoadCommand<T>>,
        ) {
            let (waiting, rest): (Vec<_>, Vec<_>) = std::mem::take(from)
                .into_iter()
                .partition(|command| command.status == LoadStatus::WaitingDependencies);
            *from = rest;
            into.extend(waiting);
        }

        collect(&mut self.font, &mut from.font);
        collect(&mut self.shader, &mut from.shader);
        collect(&mut self.technique, &mut from.technique);
        collect(&mut self.texture, &mut from.texture);
        collect(&mut self.model, &mut from.model);
    }

    /// Whether every command has the given status. True when empty.
    pub fn all_have_status(&self, status: LoadStatus) -> bool {
        fn all<T: ResourceType>(commands: &[LoadCommand<T>], status: LoadStatus) -> bool {
            commands.iter().all(|command| command.status == status)
        }

        all(&self.font, status)
            && all(&self.shader, status)
            && all(&self.technique, status)
            && all(&self.texture, status)
            && all(&self.model, status)
    }

    /// Whether any command has the given status.
    pub fn any_has_status(&self, status: LoadStatus) -> bool {
        fn any<T: ResourceType>(commands: &[LoadCommand<T>], status: LoadStatus) -> bool {
            commands.iter().any(|command| command.status == status)
        }

        any(&self.font, status)
            || any(&self.shader, status)
            || any(&self.technique, status)
            || any(&self.texture, status)
            || any(&self.model, status)
    }

    pub fn clear(&mut self) {
        self.font.clear();
        self.shader.clear();
        self.technique.clear();
        self.texture.clear();
        self.model.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command<T: ResourceType>(path: &str) -> LoadCommand<T> {
        LoadCommand::new(Handle::<T>::new_loading(path))
    }

    #[test]
    fn test_drain_is_ownership_transfer() {
        let mut pending = LoadCommands::new();
        pending.push(command::<Texture>("a.png"));
        pending.push(command::<Shader>("a.vs"));
        pending.push(command::<Texture>("b.png"));

        let mut in_flight = LoadCommands::new();
        pending.drain(&mut in_flight);

        assert!(pending.is_empty());
        assert_eq!(in_flight.count(), 3);
        let paths: Vec<_> = in_flight.commands::<Texture>().iter().map(|c| c.path()).collect();
        assert_eq!(paths, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_collect_waiting_moves_only_waiting() {
        let mut finished = LoadCommands::new();
        let mut waiting_cmd = command::<Technique>("basic.tech");
        waiting_cmd.status = LoadStatus::Loaded;
        assert!(waiting_cmd.advance(LoadStatus::Finished));
        assert!(waiting_cmd.advance(LoadStatus::WaitingDependencies));
        finished.push(waiting_cmd);

        let mut done_cmd = command::<Texture>("a.png");
        done_cmd.status = LoadStatus::Finished;
        finished.push(done_cmd);

        let mut waiting = LoadCommands::new();
        waiting.collect_waiting(&mut finished);

        assert_eq!(waiting.count(), 1);
        assert_eq!(waiting.commands::<Technique>()[0].path(), "basic.tech");
        assert_eq!(finished.count(), 1);
        assert!(finished.all_have_status(LoadStatus::Finished));
    }

    #[test]
    fn test_status_queries() {
        let mut batch = LoadCommands::new();
        assert!(batch.all_have_status(LoadStatus::Finished));
        assert!(!batch.any_has_status(LoadStatus::Pending));

        batch.push(command::<Font>("a.ttf"));
        assert!(batch.any_has_status(LoadStatus::Pending));
        assert!(!batch.all_have_status(LoadStatus::Finished));

        batch.clear();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_take_outcome_leaves_finished_husk() {
        let mut cmd = command::<Shader>("a.vs");
        assert!(cmd.advance(LoadStatus::Loading));
        assert!(cmd.advance(LoadStatus::NotFound));
        cmd.error = Some(ResourceError::NotFound {
            path: "a.vs".to_string(),
        });

        let taken = cmd.take_outcome();
        assert_eq!(taken.status(), LoadStatus::NotFound);
        assert!(taken.error.is_some());
        assert_eq!(cmd.status(), LoadStatus::Finished);
        assert!(cmd.error.is_none());
        assert!(taken.target().ptr_eq(cmd.target()));
    }
}
