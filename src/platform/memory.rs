//! In-process text field used by the replay adapter and tests

use super::{BoundingBox, FieldId, FieldRole, PlatformError, TextFieldHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A text control whose state lives in memory
#[derive(Debug)]
pub struct MemoryField {
    id: FieldId,
    role: FieldRole,
    text: Mutex<String>,
    bounds: BoundingBox,
    label: Option<String>,
    writable: AtomicBool,
    detached: AtomicBool,
}

impl MemoryField {
    /// Create a writable text field with the given identity
    pub fn new(id: u64) -> Self {
        Self {
            id: FieldId(id),
            role: FieldRole::Text,
            text: Mutex::new(String::new()),
            bounds: BoundingBox::default(),
            label: None,
            writable: AtomicBool::new(true),
            detached: AtomicBool::new(false),
        }
    }

    pub fn with_role(mut self, role: FieldRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        *self.text.lock().unwrap_or_else(|e| e.into_inner()) = text.into();
        self
    }

    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Make the field decline direct writes
    pub fn read_only(self) -> Self {
        self.writable.store(false, Ordering::SeqCst);
        self
    }

    /// Simulate the user editing the control. The adapter is expected to
    /// send a text-change notification afterwards.
    pub fn type_text(&self, text: &str) {
        self.lock_text().push_str(text);
    }

    /// Replace the content as the user would (select-all + type)
    pub fn replace_text(&self, text: &str) {
        *self.lock_text() = text.to_string();
    }

    /// Remove `count` characters from the end
    pub fn backspace(&self, count: usize) {
        let mut text = self.lock_text();
        for _ in 0..count {
            if text.pop().is_none() {
                break;
            }
        }
    }

    /// Current content regardless of detachment
    pub fn text(&self) -> String {
        self.lock_text().clone()
    }

    /// Make every subsequent call fail as if the control were destroyed
    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    fn lock_text(&self) -> std::sync::MutexGuard<'_, String> {
        self.text.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_attached(&self) -> Result<(), PlatformError> {
        if self.detached.load(Ordering::SeqCst) {
            Err(PlatformError::FieldGone)
        } else {
            Ok(())
        }
    }
}

impl TextFieldHandle for MemoryField {
    fn id(&self) -> FieldId {
        self.id
    }

    fn role(&self) -> Result<FieldRole, PlatformError> {
        self.ensure_attached()?;
        Ok(self.role)
    }

    fn read_text(&self) -> Result<String, PlatformError> {
        self.ensure_attached()?;
        Ok(self.text())
    }

    fn set_text(&self, text: &str) -> Result<bool, PlatformError> {
        self.ensure_attached()?;
        if !self.writable.load(Ordering::SeqCst) {
            return Ok(false);
        }
        *self.lock_text() = text.to_string();
        Ok(true)
    }

    fn bounding_box(&self) -> Result<BoundingBox, PlatformError> {
        self.ensure_attached()?;
        Ok(self.bounds)
    }

    fn context_label(&self) -> Option<String> {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_helpers() {
        let field = MemoryField::new(1).with_text("Hello");
        field.type_text(" wor");
        assert_eq!(field.read_text().unwrap(), "Hello wor");

        field.backspace(4);
        assert_eq!(field.text(), "Hello");
        field.backspace(10);
        assert_eq!(field.text(), "");
    }

    #[test]
    fn test_read_only_declines_writes() {
        let field = MemoryField::new(2).with_text("draft").read_only();
        assert_eq!(field.set_text("final"), Ok(false));
        assert_eq!(field.text(), "draft");
    }

    #[test]
    fn test_detached_field_reports_gone() {
        let field = MemoryField::new(3);
        field.detach();
        assert_eq!(field.read_text(), Err(PlatformError::FieldGone));
        assert_eq!(field.role(), Err(PlatformError::FieldGone));
    }
}
