//! Autocompleter - inline text suggestions for desktop text fields
//!
//! Platform adapters report focus and edit activity for the focused text
//! control. The coordinator debounces edits, asks a suggestion backend for a
//! completion, shows it in an overlay near the field and merges accepted
//! suggestions back into the field.

pub mod config;
pub mod core;
pub mod llm;
pub mod overlay;
pub mod platform;
pub mod utils;

// Re-export commonly used types and traits
pub use config::{Config, ConfigManager, CoordinatorConfig};
pub use crate::core::{AutocompleteCoordinator, Collaborators, CoordinatorHandle, MergePolicy, SessionSnapshot};
pub use llm::{BackendFactory, LlmError, SuggestionBackend, SuggestionRequest};
pub use overlay::{ConsoleOverlay, OverlayPort};
pub use platform::{FallbackInjector, FieldId, FieldRole, FocusNotification, TextChangeNotification, TextFieldHandle};
pub use utils::errors::{AutocompleteError, ConfigError};

/// The main result type used throughout the application
pub type Result<T> = std::result::Result<T, AutocompleteError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "autocompleter";
