//! State owned by the coordinator for the tracked field

use crate::platform::{FieldId, FieldRef};
use std::fmt;
use tokio::time::Instant;

/// The field currently being tracked. Its cached text lives and dies with it.
pub struct FocusSession {
    pub(crate) field: FieldRef,
    pub(crate) cached_text: String,
    /// Set after a fallback paste, whose result is never read back. The cache
    /// is refreshed from the field before it is used again.
    pub(crate) cache_stale: bool,
}

impl FocusSession {
    pub(crate) fn new(field: FieldRef, cached_text: String) -> Self {
        Self {
            field,
            cached_text,
            cache_stale: false,
        }
    }

    pub fn field_id(&self) -> FieldId {
        self.field.id()
    }

    pub fn cached_text(&self) -> &str {
        &self.cached_text
    }

    pub fn is_cache_stale(&self) -> bool {
        self.cache_stale
    }
}

impl fmt::Debug for FocusSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusSession")
            .field("field", &self.field.id())
            .field("cached_text", &self.cached_text)
            .field("cache_stale", &self.cache_stale)
            .finish()
    }
}

/// A debounced request waiting for its timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    /// Debounce ticket that will fulfil this request
    pub ticket: u64,
    /// When the last edit re-armed the timer
    pub armed_at: Instant,
    /// Session generation the request belongs to
    pub generation: u64,
}

/// A suggestion together with the generation it was requested under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub generation: u64,
}

/// Running counters, mostly for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    pub requests_issued: u64,
    pub suggestions_shown: u64,
    pub stale_discarded: u64,
    pub direct_writes: u64,
    pub fallback_injections: u64,
}

/// Read-only view of the coordinator's state
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub field: Option<FieldId>,
    pub cached_text: Option<String>,
    pub cache_stale: bool,
    pub generation: u64,
    pub pending: Option<PendingRequest>,
    pub debounce_armed: bool,
    pub displayed: Option<Suggestion>,
    pub stats: CoordinatorStats,
}
