//! Suggestion overlay presentation
//!
//! The coordinator only calls [`OverlayPort::show`] and [`OverlayPort::hide`].
//! Accepting is owned by the presentation: it hides itself and hands the
//! displayed text back, which the caller forwards to
//! [`CoordinatorHandle::accept_suggestion`](crate::core::CoordinatorHandle::accept_suggestion).

use chrono::{DateTime, Local};
use colored::Colorize;
use std::sync::Mutex;

/// Surface that can display a suggestion near screen coordinates
pub trait OverlayPort: Send + Sync {
    /// Display `text` anchored at (`x`, `y`)
    fn show(&self, text: &str, x: i32, y: i32);

    /// Remove any visible suggestion
    fn hide(&self);
}

/// What the overlay is currently displaying
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedSuggestion {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub shown_at: DateTime<Local>,
}

/// Overlay that renders to the terminal
#[derive(Debug, Default)]
pub struct ConsoleOverlay {
    current: Mutex<Option<DisplayedSuggestion>>,
}

impl ConsoleOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suggestion currently on screen
    pub fn current(&self) -> Option<DisplayedSuggestion> {
        self.lock().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.lock().is_some()
    }

    /// Accept the visible suggestion: hides the overlay and returns the text
    /// verbatim, or `None` when nothing is shown.
    pub fn accept(&self) -> Option<String> {
        let accepted = self.lock().take()?;
        println!("{} {}", "✔ accepted".green().bold(), accepted.text);
        Some(accepted.text)
    }

    /// Dismiss the visible suggestion without accepting it
    pub fn dismiss(&self) {
        if self.lock().take().is_some() {
            println!("{}", "✖ dismissed".dimmed());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<DisplayedSuggestion>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl OverlayPort for ConsoleOverlay {
    fn show(&self, text: &str, x: i32, y: i32) {
        let shown = DisplayedSuggestion {
            text: text.to_string(),
            x,
            y,
            shown_at: Local::now(),
        };
        println!(
            "{} {} {}",
            format!("[{}]", shown.shown_at.format("%H:%M:%S%.3f")).dimmed(),
            "💡 suggestion".cyan().bold(),
            format!("@({}, {})", x, y).dimmed()
        );
        println!("   {}", text.bold());
        *self.lock() = Some(shown);
    }

    fn hide(&self) {
        if self.lock().take().is_some() {
            println!("{}", "   (overlay hidden)".dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_then_accept_hides() {
        let overlay = ConsoleOverlay::new();
        overlay.show("Hello world", 10, 44);

        let current = overlay.current().unwrap();
        assert_eq!(current.text, "Hello world");
        assert_eq!((current.x, current.y), (10, 44));

        assert_eq!(overlay.accept().as_deref(), Some("Hello world"));
        assert!(!overlay.is_visible());
        assert_eq!(overlay.accept(), None);
    }

    #[test]
    fn test_hide_and_dismiss() {
        let overlay = ConsoleOverlay::new();
        overlay.hide();
        overlay.show("draft", 0, 0);
        overlay.dismiss();
        assert!(!overlay.is_visible());

        overlay.show("again", 0, 0);
        overlay.hide();
        assert!(overlay.current().is_none());
    }
}
