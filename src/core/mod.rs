//! Autocomplete coordination: focus tracking, debounce, staleness and merge

pub mod coordinator;
pub mod debounce;
pub mod merge;
pub mod session;

pub use coordinator::{AutocompleteCoordinator, Collaborators, CoordinatorEvent, CoordinatorHandle};
pub use debounce::DebounceScheduler;
pub use merge::MergePolicy;
pub use session::{CoordinatorStats, FocusSession, PendingRequest, SessionSnapshot, Suggestion};
