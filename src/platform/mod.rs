//! Platform adapter boundary
//!
//! The coordinator never sees accessibility-framework objects directly. A
//! platform adapter wraps the focused control in a [`TextFieldHandle`] and
//! reports focus and edit activity through the notification types in
//! [`events`]. Text injection for controls that refuse direct writes goes
//! through a [`FallbackInjector`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod clipboard;
pub mod events;
pub mod memory;
pub mod replay;

pub use clipboard::ClipboardPasteInjector;
pub use events::{FocusNotification, TextChangeKind, TextChangeNotification};
pub use memory::MemoryField;
pub use replay::{ReplayDriver, ReplayStep, ReplayScript};

/// Errors reported by a platform adapter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    #[error("Field is no longer available")]
    FieldGone,

    #[error("Operation not supported by field: {operation}")]
    Unsupported { operation: String },

    #[error("Adapter failure: {message}")]
    Adapter { message: String },
}

impl PlatformError {
    pub fn unsupported<S: Into<String>>(operation: S) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    pub fn adapter<S: Into<String>>(message: S) -> Self {
        Self::Adapter {
            message: message.into(),
        }
    }
}

/// Opaque identity of a control, stable for the control's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldId(pub u64);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field#{}", self.0)
    }
}

/// Classification of a focused control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    /// Editable text that may receive suggestions
    Text,
    /// Editable but protected content, such as a password entry
    Protected,
    /// Anything that does not accept text
    Other,
}

/// Screen-space rectangle of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Bottom-left corner, where the overlay is anchored
    pub fn anchor(&self) -> (i32, i32) {
        (self.x, self.y + self.height)
    }
}

/// Handle to the currently focused editable control.
///
/// All calls are synchronous and must report failure as a [`PlatformError`]
/// rather than panicking across the boundary.
pub trait TextFieldHandle: Send + Sync {
    /// Identity used to match notifications against the tracked field
    fn id(&self) -> FieldId;

    /// The adapter's own classification of the control
    fn role(&self) -> Result<FieldRole, PlatformError>;

    /// Full text content of the control
    fn read_text(&self) -> Result<String, PlatformError>;

    /// Overwrite the full text content. `Ok(false)` means the control
    /// declined the write.
    fn set_text(&self, text: &str) -> Result<bool, PlatformError>;

    /// On-screen bounds of the control
    fn bounding_box(&self) -> Result<BoundingBox, PlatformError>;

    /// Optional label passed to the backend as context (field name, window title)
    fn context_label(&self) -> Option<String> {
        None
    }
}

/// Shared reference to a field handle, owned by the adapter
pub type FieldRef = Arc<dyn TextFieldHandle>;

/// OS-level text injection used when a control rejects direct writes
#[async_trait]
pub trait FallbackInjector: Send + Sync {
    /// Whether the injection path can run on this system
    async fn is_available(&self) -> bool;

    /// Insert `text` into whatever control currently has keyboard focus
    async fn inject(&self, text: &str) -> crate::Result<()>;
}
