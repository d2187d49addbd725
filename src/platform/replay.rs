//! Scripted platform adapter
//!
//! Drives the coordinator from a JSON-lines script instead of a live
//! accessibility framework. Each non-empty line is one step:
//!
//! ```text
//! {"step": "focus", "field": 1, "label": "Subject"}
//! {"step": "type", "field": 1, "text": "Hello wor"}
//! {"step": "wait", "ms": 600}
//! {"step": "accept"}
//! ```
//!
//! Lines starting with `#` are comments.

use super::{BoundingBox, FieldId, FieldRef, FieldRole, FocusNotification, MemoryField, TextChangeNotification};
use crate::core::CoordinatorHandle;
use crate::overlay::ConsoleOverlay;
use crate::utils::errors::AutocompleteError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One scripted action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "lowercase")]
pub enum ReplayStep {
    /// Move focus to a field, creating it on first use
    Focus {
        field: u64,
        #[serde(default)]
        role: Option<FieldRole>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        bounds: Option<BoundingBox>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        read_only: bool,
    },
    /// Move focus away from a field
    Blur { field: u64 },
    /// Append text as the user would type it
    Type { field: u64, text: String },
    /// Delete characters from the end
    Backspace {
        field: u64,
        #[serde(default = "default_backspace")]
        count: usize,
    },
    /// Let time pass
    Wait { ms: u64 },
    /// Accept whatever the overlay is showing
    Accept,
    /// Dismiss the overlay without accepting
    Dismiss,
}

fn default_backspace() -> usize {
    1
}

/// A parsed script with the source line of every step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayScript {
    steps: Vec<(usize, ReplayStep)>,
}

impl ReplayScript {
    /// Parse JSON-lines. Errors carry the 1-based line number.
    pub fn parse(source: &str) -> Result<Self> {
        let mut steps = Vec::new();
        for (index, line) in source.lines().enumerate() {
            let line_number = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let step = serde_json::from_str(trimmed)
                .map_err(|e| AutocompleteError::replay(line_number, e.to_string()))?;
            steps.push((line_number, step));
        }
        Ok(Self { steps })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| AutocompleteError::file_system(path, e))?;
        Self::parse(&source)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> impl Iterator<Item = &ReplayStep> {
        self.steps.iter().map(|(_, step)| step)
    }
}

/// Plays a [`ReplayScript`] against a running coordinator
pub struct ReplayDriver {
    handle: CoordinatorHandle,
    overlay: Arc<ConsoleOverlay>,
    fields: BTreeMap<u64, Arc<MemoryField>>,
}

impl ReplayDriver {
    pub fn new(handle: CoordinatorHandle, overlay: Arc<ConsoleOverlay>) -> Self {
        Self {
            handle,
            overlay,
            fields: BTreeMap::new(),
        }
    }

    /// Run every step in order, then wait for the coordinator to catch up
    pub async fn run(&mut self, script: &ReplayScript) -> Result<()> {
        for (line, step) in &script.steps {
            debug!("Replay line {}: {:?}", line, step);
            self.apply(*line, step).await?;
        }
        self.handle.snapshot().await?;
        Ok(())
    }

    /// Fields created so far with their current text
    pub fn field_texts(&self) -> Vec<(FieldId, String)> {
        self.fields
            .iter()
            .map(|(id, field)| (FieldId(*id), field.text()))
            .collect()
    }

    pub fn field(&self, id: u64) -> Option<&Arc<MemoryField>> {
        self.fields.get(&id)
    }

    async fn apply(&mut self, line: usize, step: &ReplayStep) -> Result<()> {
        match step {
            ReplayStep::Focus {
                field,
                role,
                text,
                bounds,
                label,
                read_only,
            } => {
                let memory = match self.fields.get(field) {
                    Some(existing) => {
                        if let Some(text) = text {
                            existing.replace_text(text);
                        }
                        existing.clone()
                    }
                    None => {
                        let mut created = MemoryField::new(*field)
                            .with_role(role.unwrap_or(FieldRole::Text))
                            .with_bounds(bounds.unwrap_or_default());
                        if let Some(text) = text {
                            created = created.with_text(text.as_str());
                        }
                        if let Some(label) = label {
                            created = created.with_label(label.as_str());
                        }
                        if *read_only {
                            created = created.read_only();
                        }
                        let created = Arc::new(created);
                        self.fields.insert(*field, created.clone());
                        created
                    }
                };

                let handle: FieldRef = memory;
                let notification = match role {
                    Some(role) => FocusNotification::gained_as(handle, *role),
                    None => FocusNotification::gained(handle),
                };
                self.handle.on_focus_event(notification)
            }
            ReplayStep::Blur { field } => self.handle.on_focus_event(FocusNotification::lost(FieldId(*field))),
            ReplayStep::Type { field, text } => {
                let memory = self.known_field(line, *field)?;
                memory.type_text(text);
                self.handle
                    .on_text_change_event(TextChangeNotification::insert(FieldId(*field)))
            }
            ReplayStep::Backspace { field, count } => {
                let memory = self.known_field(line, *field)?;
                memory.backspace(*count);
                self.handle
                    .on_text_change_event(TextChangeNotification::delete(FieldId(*field)))
            }
            ReplayStep::Wait { ms } => {
                // Let earlier notifications land before time passes
                self.handle.snapshot().await?;
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(())
            }
            ReplayStep::Accept => match self.overlay.accept() {
                Some(text) => self.handle.accept_suggestion(text),
                None => {
                    warn!("Replay line {}: nothing to accept", line);
                    Ok(())
                }
            },
            ReplayStep::Dismiss => {
                self.overlay.dismiss();
                Ok(())
            }
        }
    }

    fn known_field(&self, line: usize, field: u64) -> Result<Arc<MemoryField>> {
        self.fields
            .get(&field)
            .cloned()
            .ok_or_else(|| AutocompleteError::replay(line, format!("field {} has never been focused", field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CoordinatorConfig, InjectorConfig};
    use crate::core::{AutocompleteCoordinator, Collaborators};
    use crate::llm::StubBackend;
    use crate::platform::ClipboardPasteInjector;
    use tokio_util::sync::CancellationToken;

    const HELLO: &str = r#"
# compose a greeting
{"step": "focus", "field": 1, "label": "Body"}
{"step": "type", "field": 1, "text": "Hello wor"}
{"step": "wait", "ms": 600}
{"step": "accept"}
"#;

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let script = ReplayScript::parse(HELLO).unwrap();
        assert_eq!(script.len(), 4);
        assert_eq!(script.steps().last(), Some(&ReplayStep::Accept));
        assert_eq!(
            script.steps().nth(1),
            Some(&ReplayStep::Type {
                field: 1,
                text: "Hello wor".to_string()
            })
        );
    }

    #[test]
    fn test_parse_reports_line_numbers() {
        let err = ReplayScript::parse("{\"step\": \"accept\"}\n\n{\"step\": \"jump\"}").unwrap_err();
        match err {
            AutocompleteError::Replay { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_backspace_defaults_to_one() {
        let script = ReplayScript::parse(r#"{"step": "backspace", "field": 2}"#).unwrap();
        assert_eq!(script.steps().next(), Some(&ReplayStep::Backspace { field: 2, count: 1 }));
    }

    fn start() -> (ReplayDriver, CancellationToken) {
        let overlay = Arc::new(ConsoleOverlay::new());
        let shutdown = CancellationToken::new();
        let collaborators = Collaborators {
            backend: Arc::new(StubBackend::new()),
            overlay: overlay.clone(),
            injector: Arc::new(ClipboardPasteInjector::new(&InjectorConfig::default())),
        };
        let (handle, _task) = AutocompleteCoordinator::spawn(CoordinatorConfig::default(), collaborators, shutdown.clone());
        (ReplayDriver::new(handle, overlay), shutdown)
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_accepts_stub_suggestion() {
        let (mut driver, shutdown) = start();
        driver.run(&ReplayScript::parse(HELLO).unwrap()).await.unwrap();

        assert_eq!(driver.field_texts(), vec![(FieldId(1), "Hello wor...".to_string())]);
        shutdown.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_into_unknown_field_fails() {
        let (mut driver, _shutdown) = start();
        let script = ReplayScript::parse(r#"{"step": "type", "field": 9, "text": "x"}"#).unwrap();

        let err = driver.run(&script).await.unwrap_err();
        assert!(matches!(err, AutocompleteError::Replay { line: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blur_then_accept_leaves_text_alone() {
        let (mut driver, _shutdown) = start();
        let script = ReplayScript::parse(
            r#"{"step": "focus", "field": 1, "text": "draft"}
{"step": "wait", "ms": 10}
{"step": "blur", "field": 1}
{"step": "accept"}"#,
        )
        .unwrap();

        driver.run(&script).await.unwrap();
        assert_eq!(driver.field(1).map(|f| f.text()).as_deref(), Some("draft"));
    }
}
