//! How an accepted suggestion is merged into the field's text

use serde::{Deserialize, Serialize};

/// Merge policy applied on accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// A suggestion that restates the current text is the new full text.
    /// One that shares at least half of the current text as a prefix is also
    /// taken as full text, since the user kept typing past it. Anything else is
    /// a continuation and is appended.
    #[default]
    Complete,
    /// The suggestion always becomes the full text.
    Replace,
}

impl MergePolicy {
    /// Text the field should contain after accepting `suggestion`
    pub fn merge(&self, current: &str, suggestion: &str) -> String {
        match self {
            Self::Replace => suggestion.to_string(),
            Self::Complete if suggestion.starts_with(current) => suggestion.to_string(),
            Self::Complete => {
                let shared = shared_prefix_chars(current, suggestion);
                if shared > 0 && shared * 2 >= current.chars().count() {
                    suggestion.to_string()
                } else {
                    format!("{}{}", current, suggestion)
                }
            }
        }
    }
}

fn shared_prefix_chars(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}
