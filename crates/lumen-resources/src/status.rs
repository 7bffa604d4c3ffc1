//! Load command state machine.

use std::fmt;

/// Where a [`LoadCommand`](crate::LoadCommand) is in the pipeline.
///
/// ```text
/// Pending -> Loading -> {NotFound, ErrorReading, Loaded} -> Finished
/// Finished -> WaitingDependencies -> Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStatus {
    /// Queued, not yet picked up by the worker.
    Pending,
    /// The worker is reading or decoding it.
    Loading,
    /// Decoded payload is ready for finalization.
    Loaded,
    /// The source path did not exist.
    NotFound,
    /// Reading or decoding failed.
    ErrorReading,
    /// Finalized on the frame thread.
    Finished,
    /// Finalized, but waiting for dependency handles to settle.
    WaitingDependencies,
}

impl LoadStatus {
    /// Whether `self -> next` is a forward transition.
    pub fn can_advance_to(self, next: LoadStatus) -> bool {
        use LoadStatus::*;
        matches!(
            (self, next),
            (Pending, Loading)
                | (Loading, NotFound | ErrorReading | Loaded)
                | (NotFound | ErrorReading | Loaded, Finished)
                | (Finished, WaitingDependencies)
                | (WaitingDependencies, Finished)
        )
    }

    /// The worker has produced its outcome and will not touch the command again.
    pub fn is_worker_done(self) -> bool {
        matches!(
            self,
            LoadStatus::Loaded | LoadStatus::NotFound | LoadStatus::ErrorReading
        )
    }

    pub fn is_failure(self) -> bool {
        matches!(self, LoadStatus::NotFound | LoadStatus::ErrorReading)
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::LoadStatus::*;
    use super::*;

    const ALL: [LoadStatus; 7] = [
        Pending,
        Loading,
        Loaded,
        NotFound,
        ErrorReading,
        Finished,
        WaitingDependencies,
    ];

    #[test]
    fn test_forward_transitions() {
        assert!(Pending.can_advance_to(Loading));
        assert!(Loading.can_advance_to(NotFound));
        assert!(Loading.can_advance_to(ErrorReading));
        assert!(Loading.can_advance_to(Loaded));
        assert!(Loaded.can_advance_to(Finished));
        assert!(Finished.can_advance_to(WaitingDependencies));
        assert!(WaitingDependencies.can_advance_to(Finished));
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!Loaded.can_advance_to(Loading));
        assert!(!Loading.can_advance_to(Pending));
        assert!(!Finished.can_advance_to(Loaded));
        assert!(!NotFound.can_advance_to(Loaded));
        assert!(!Pending.can_advance_to(Finished));
        for status in ALL {
            assert!(!status.can_advance_to(status), "{status} -> {status}");
        }
    }

    #[test]
    fn test_worker_done() {
        let done: Vec<_> = ALL.into_iter().filter(|s| s.is_worker_done()).collect();
        assert_eq!(done, vec![Loaded, NotFound, ErrorReading]);
        assert!(NotFound.is_failure());
        assert!(!Loaded.is_failure());
    }
}
