//! Notification types delivered by a platform adapter

use super::{FieldId, FieldRef, FieldRole};
use std::fmt;

/// Keyboard focus moved onto or away from a control
#[derive(Clone)]
pub enum FocusNotification {
    /// Focus entered `field`. `role_hint` carries the adapter's classification
    /// when it already has one; otherwise the handle is asked.
    Gained {
        field: FieldRef,
        role_hint: Option<FieldRole>,
    },
    /// Focus left the control identified by `field`
    Lost { field: FieldId },
}

/// Kind of text edit reported by the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextChangeKind {
    Insert,
    Delete,
}

/// Text inside a control changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChangeNotification {
    pub kind: TextChangeKind,
    pub source: FieldId,
}

impl FocusNotification {
    /// Focus gained with no classification hint
    pub fn gained(field: FieldRef) -> Self {
        Self::Gained {
            field,
            role_hint: None,
        }
    }

    /// Focus gained with a role supplied by the adapter
    pub fn gained_as(field: FieldRef, role: FieldRole) -> Self {
        Self::Gained {
            field,
            role_hint: Some(role),
        }
    }

    pub fn lost(field: FieldId) -> Self {
        Self::Lost { field }
    }

    /// Identity of the control the notification refers to
    pub fn field_id(&self) -> FieldId {
        match self {
            Self::Gained { field, .. } => field.id(),
            Self::Lost { field } => *field,
        }
    }
}

impl fmt::Debug for FocusNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gained { field, role_hint } => f
                .debug_struct("Gained")
                .field("field", &field.id())
                .field("role_hint", role_hint)
                .finish(),
            Self::Lost { field } => f.debug_struct("Lost").field("field", field).finish(),
        }
    }
}

impl TextChangeNotification {
    pub fn insert(source: FieldId) -> Self {
        Self {
            kind: TextChangeKind::Insert,
            source,
        }
    }

    pub fn delete(source: FieldId) -> Self {
        Self {
            kind: TextChangeKind::Delete,
            source,
        }
    }
}
