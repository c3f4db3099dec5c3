//! Per-query fetch state with stale-response suppression.

use std::sync::Arc;

use crate::error::{DirectoryError, Result};

/// Outcome of one query. Exactly one variant holds at a time.
#[derive(Debug, Clone)]
pub enum FetchState<T> {
    NotRequested,
    Loading,
    Loaded(T),
    Errored(Arc<DirectoryError>),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::NotRequested
    }
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&DirectoryError> {
        match self {
            Self::Errored(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.error().is_some_and(DirectoryError::is_not_found)
    }

    pub fn map<U>(&self, f: impl FnOnce(&T) -> U) -> FetchState<U> {
        match self {
            Self::NotRequested => FetchState::NotRequested,
            Self::Loading => FetchState::Loading,
            Self::Loaded(value) => FetchState::Loaded(f(value)),
            Self::Errored(e) => FetchState::Errored(Arc::clone(e)),
        }
    }
}

/// Proof that a fetch was issued for a particular generation of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Ticket(u64);

/// One query slot: the current request descriptor, its generation and state.
///
/// The descriptor is compared by value; re-requesting the same descriptor is
/// a no-op. Any other request bumps the generation, so results carrying an
/// older [`Ticket`] are refused by [`Resource::settle`].
#[derive(Debug, Clone)]
pub struct Resource<T> {
    key: Option<String>,
    generation: u64,
    state: FetchState<T>,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self {
            key: None,
            generation: 0,
            state: FetchState::NotRequested,
        }
    }
}

impl<T> Resource<T> {
    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    /// Current request descriptor, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Point the slot at a new descriptor.
    ///
    /// Returns a ticket when a fetch must be issued. `None` as the key clears
    /// the slot back to `NotRequested` and orphans any in-flight fetch.
    pub(crate) fn request(&mut self, key: Option<String>) -> Option<Ticket> {
        if key == self.key {
            return None;
        }
        self.key = key;
        self.generation += 1;
        match self.key {
            Some(_) => {
                self.state = FetchState::Loading;
                Some(Ticket(self.generation))
            }
            None => {
                self.state = FetchState::NotRequested;
                None
            }
        }
    }

    /// Re-issue the current descriptor even though it did not change.
    pub(crate) fn reissue(&mut self) -> Option<Ticket> {
        self.key.as_ref()?;
        self.generation += 1;
        self.state = FetchState::Loading;
        Some(Ticket(self.generation))
    }

    /// Apply a result if its ticket is still current. Returns whether it was applied.
    pub(crate) fn settle(&mut self, ticket: Ticket, result: Result<T>) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        self.state = match result {
            Ok(value) => FetchState::Loaded(value),
            Err(e) => FetchState::Errored(Arc::new(e)),
        };
        true
    }
}
