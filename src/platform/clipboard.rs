//! Clipboard + simulated paste fallback for controls that refuse direct writes

use super::FallbackInjector;
use crate::config::InjectorConfig;
use crate::utils::errors::AutocompleteError;
use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// A clipboard command pair: how to write to and read from the clipboard
#[derive(Debug, Clone, Copy)]
struct ClipboardTool {
    copy: &'static [&'static str],
    paste: &'static [&'static str],
}

#[cfg(target_os = "macos")]
const CLIPBOARD_TOOLS: &[ClipboardTool] = &[ClipboardTool {
    copy: &["pbcopy"],
    paste: &["pbpaste"],
}];

#[cfg(not(target_os = "macos"))]
const CLIPBOARD_TOOLS: &[ClipboardTool] = &[
    ClipboardTool {
        copy: &["xclip", "-selection", "clipboard"],
        paste: &["xclip", "-selection", "clipboard", "-o"],
    },
    ClipboardTool {
        copy: &["xsel", "--clipboard", "--input"],
        paste: &["xsel", "--clipboard", "--output"],
    },
];

#[cfg(target_os = "macos")]
const DEFAULT_PASTE_COMMAND: &[&str] = &[
    "osascript",
    "-e",
    "tell application \"System Events\" to keystroke \"v\" using command down",
];

#[cfg(not(target_os = "macos"))]
const DEFAULT_PASTE_COMMAND: &[&str] = &["xdotool", "key", "--clearmodifiers", "ctrl+v"];

/// Inserts text by placing it on the clipboard and simulating a paste
/// keystroke. The previous clipboard content is restored afterwards.
pub struct ClipboardPasteInjector {
    paste_command: Vec<String>,
    settle: Duration,
    restore_clipboard: bool,
}

impl ClipboardPasteInjector {
    pub fn new(config: &InjectorConfig) -> Self {
        let paste_command = if config.paste_command.is_empty() {
            DEFAULT_PASTE_COMMAND.iter().map(|s| s.to_string()).collect()
        } else {
            config.paste_command.clone()
        };

        Self {
            paste_command,
            settle: Duration::from_millis(config.paste_settle_ms),
            restore_clipboard: config.restore_clipboard,
        }
    }

    /// Command used to simulate the paste keystroke
    pub fn paste_command(&self) -> &[String] {
        &self.paste_command
    }

    /// First clipboard tool whose binary is installed
    fn clipboard_tool(&self) -> Option<ClipboardTool> {
        CLIPBOARD_TOOLS
            .iter()
            .copied()
            .find(|tool| find_in_path(tool.copy[0]).is_some())
    }

    async fn read_clipboard(&self, tool: ClipboardTool) -> Result<String> {
        let output = Command::new(tool.paste[0])
            .args(&tool.paste[1..])
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| AutocompleteError::injection(format!("Failed to run {}: {}", tool.paste[0], e)))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(AutocompleteError::injection(format!("{} command failed", tool.paste[0])))
        }
    }

    async fn write_clipboard(&self, tool: ClipboardTool, text: &str) -> Result<()> {
        let mut child = Command::new(tool.copy[0])
            .args(&tool.copy[1..])
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| AutocompleteError::injection(format!("Failed to spawn {}: {}", tool.copy[0], e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AutocompleteError::injection(format!("{} has no stdin", tool.copy[0])))?;
        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|e| AutocompleteError::injection(format!("Failed to write to {}: {}", tool.copy[0], e)))?;
        stdin
            .flush()
            .await
            .map_err(|e| AutocompleteError::injection(format!("Failed to flush {}: {}", tool.copy[0], e)))?;

        drop(stdin); // Close stdin to signal end of input

        let status = child
            .wait()
            .await
            .map_err(|e| AutocompleteError::injection(format!("Failed to wait for {}: {}", tool.copy[0], e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(AutocompleteError::injection(format!("{} command failed", tool.copy[0])))
        }
    }

    async fn simulate_paste(&self) -> Result<()> {
        let (program, args) = self
            .paste_command
            .split_first()
            .ok_or_else(|| AutocompleteError::injection("Paste command is empty"))?;

        let status = Command::new(program)
            .args(args)
            .status()
            .await
            .map_err(|e| AutocompleteError::injection(format!("Failed to run {}: {}", program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(AutocompleteError::injection(format!("{} exited with {}", program, status)))
        }
    }
}

#[async_trait]
impl FallbackInjector for ClipboardPasteInjector {
    async fn is_available(&self) -> bool {
        let paste_ready = self
            .paste_command
            .first()
            .map(|program| find_in_path(program).is_some())
            .unwrap_or(false);

        paste_ready && self.clipboard_tool().is_some()
    }

    async fn inject(&self, text: &str) -> Result<()> {
        let tool = self
            .clipboard_tool()
            .ok_or_else(|| AutocompleteError::injection("No working clipboard command found"))?;

        let previous = if self.restore_clipboard {
            match self.read_clipboard(tool).await {
                Ok(content) => Some(content),
                Err(e) => {
                    debug!("Could not save clipboard before paste: {}", e);
                    Some(String::new())
                }
            }
        } else {
            None
        };

        self.write_clipboard(tool, text).await?;
        let pasted = self.simulate_paste().await;

        // Let the target application consume the paste before restoring
        tokio::time::sleep(self.settle).await;

        if let Some(previous) = previous {
            if let Err(e) = self.write_clipboard(tool, &previous).await {
                warn!("Failed to restore clipboard after paste: {}", e);
            }
        }

        pasted
    }
}

/// Locate an executable on `PATH`
fn find_in_path(program: &str) -> Option<PathBuf> {
    let candidate = PathBuf::from(program);
    if candidate.is_absolute() {
        return candidate.is_file().then_some(candidate);
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paste_command_used_when_unset() {
        let config = InjectorConfig {
            paste_command: Vec::new(),
            ..InjectorConfig::default()
        };
        let injector = ClipboardPasteInjector::new(&config);
        assert_eq!(injector.paste_command()[0], DEFAULT_PASTE_COMMAND[0]);
    }

    #[tokio::test]
    async fn test_unavailable_when_paste_binary_missing() {
        let config = InjectorConfig {
            paste_command: vec!["definitely-not-a-real-paste-tool".to_string()],
            ..InjectorConfig::default()
        };
        let injector = ClipboardPasteInjector::new(&config);
        assert!(!injector.is_available().await);
    }

    #[test]
    fn test_find_in_path_rejects_missing_absolute_path() {
        assert!(find_in_path("/nonexistent/bin/xclip").is_none());
    }
}
