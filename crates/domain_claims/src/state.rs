//! View state shared by the directory and the attachment manager
//!
//! Each piece of state is `{data, phase, last_error}` and is only ever
//! changed through a tracked request. Every request is tagged with a
//! generation; a response whose generation is no longer the latest is
//! discarded instead of applied.
//!
//! ```text
//! Idle --begin--> Loading --settle(Ok)--> Ready
//!                    |
//!                    +--settle(Err) / dropped--> Failed
//! ```

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{FailureKind, Notice, ValidationError};

/// Notice recorded when a request future is dropped before it resolves
const INTERRUPTED: &str = "Request was interrupted before it completed";

/// Phase of one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Monotonic request tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Renderable state of one component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState<T> {
    pub data: T,
    pub phase: LoadPhase,
    pub last_error: Option<Notice>,
}

impl<T: Default> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            phase: LoadPhase::Idle,
            last_error: None,
        }
    }
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }
}

/// Result of an operation, ready to render without further interpretation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The operation finished and its result was applied
    Completed(T),
    /// The operation failed; prior state is intact except where documented
    Failed(Notice),
    /// The operation was refused before any network call
    Rejected(ValidationError),
    /// The response arrived after the view moved on and was dropped
    Stale,
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// Message to show the user, if the operation did not complete
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Outcome::Completed(_) | Outcome::Stale => None,
            Outcome::Failed(notice) => Some(notice.clone()),
            Outcome::Rejected(reason) => {
                Some(Notice::new(FailureKind::Validation, reason.to_string()))
            }
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::Failed(notice) => Outcome::Failed(notice),
            Outcome::Rejected(reason) => Outcome::Rejected(reason),
            Outcome::Stale => Outcome::Stale,
        }
    }
}

impl<T: Default> Outcome<T> {
    /// The completed value, or the empty default a failed fetch degrades to
    pub fn value_or_default(self) -> T {
        self.completed().unwrap_or_default()
    }
}

/// A view state plus the generation of its newest request
#[derive(Debug)]
pub(crate) struct Tracked<T> {
    pub(crate) view: ViewState<T>,
    latest: Generation,
}

impl<T: Default> Default for Tracked<T> {
    fn default() -> Self {
        Self {
            view: ViewState::default(),
            latest: Generation::default(),
        }
    }
}

impl<T: Default> Tracked<T> {
    /// Starts a request, superseding any in flight
    pub(crate) fn begin(&mut self) -> Generation {
        self.latest = self.latest.next();
        self.view.phase = LoadPhase::Loading;
        self.latest
    }

    /// Applies a response if it is still the newest request.
    ///
    /// A failure degrades the data to its empty default.
    pub(crate) fn settle(&mut self, generation: Generation, result: Result<T, Notice>) -> bool {
        if generation != self.latest {
            return false;
        }
        match result {
            Ok(data) => {
                self.view.data = data;
                self.view.phase = LoadPhase::Ready;
                self.view.last_error = None;
            }
            Err(notice) => {
                self.view.data = T::default();
                self.view.phase = LoadPhase::Failed;
                self.view.last_error = Some(notice);
            }
        }
        true
    }

    /// Drops all data and makes every outstanding response stale
    pub(crate) fn invalidate(&mut self) {
        self.latest = self.latest.next();
        self.view = ViewState::default();
    }

    fn abandon(&mut self, generation: Generation) {
        if generation == self.latest && self.view.phase == LoadPhase::Loading {
            self.view.phase = LoadPhase::Failed;
            self.view.last_error = Some(Notice::new(FailureKind::Transport, INTERRUPTED));
        }
    }
}

/// Locks component state, recovering the data if a holder panicked
pub(crate) fn lock<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Guarantees a terminal phase for one tracked request.
///
/// Dropping the guard without settling (for example when the awaiting future
/// is dropped) marks the request failed, so `Loading` cannot outlive it.
pub(crate) struct RequestGuard<'a, S, T: Default> {
    state: &'a Mutex<S>,
    project: fn(&mut S) -> &mut Tracked<T>,
    generation: Generation,
    settled: bool,
}

impl<'a, S, T: Default> RequestGuard<'a, S, T> {
    pub(crate) fn begin(state: &'a Mutex<S>, project: fn(&mut S) -> &mut Tracked<T>) -> Self {
        let generation = project(&mut lock(state)).begin();
        Self::started(state, project, generation)
    }

    /// Starts the request only if `admit` agrees, checked under the same lock
    pub(crate) fn try_begin(
        state: &'a Mutex<S>,
        project: fn(&mut S) -> &mut Tracked<T>,
        admit: impl FnOnce(&mut S) -> bool,
    ) -> Option<Self> {
        let generation = {
            let mut guard = lock(state);
            if !admit(&mut guard) {
                return None;
            }
            project(&mut guard).begin()
        };
        Some(Self::started(state, project, generation))
    }

    fn started(
        state: &'a Mutex<S>,
        project: fn(&mut S) -> &mut Tracked<T>,
        generation: Generation,
    ) -> Self {
        Self {
            state,
            project,
            generation,
            settled: false,
        }
    }

    pub(crate) fn generation(&self) -> Generation {
        self.generation
    }

    /// Applies the response; returns false when it was stale
    pub(crate) fn settle(mut self, result: Result<T, Notice>) -> bool {
        self.settled = true;
        let mut state = lock(self.state);
        (self.project)(&mut state).settle(self.generation, result)
    }
}

impl<S, T: Default> Drop for RequestGuard<'_, S, T> {
    fn drop(&mut self) {
        if !self.settled {
            let mut state = lock(self.state);
            (self.project)(&mut state).abandon(self.generation);
        }
    }
}
