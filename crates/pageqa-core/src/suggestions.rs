//! Canned prompts offered to prefill the question input.
//!
//! The catalog is static configuration. Nothing here looks at the
//! conversation; the built-in lists can be replaced from the config file.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Short text shown on the button/hint.
    pub label: String,
    /// Text placed into the draft question.
    pub prompt: String,
}

impl Suggestion {
    pub fn new(label: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prompt: prompt.into(),
        }
    }

    /// A suggestion whose label is the prompt itself.
    pub fn verbatim(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        Self {
            label: prompt.clone(),
            prompt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionCatalog {
    /// Always offered.
    #[serde(default)]
    pub general: Vec<Suggestion>,
    /// Offered under every assistant answer.
    #[serde(default)]
    pub follow_up: Vec<Suggestion>,
}

impl Default for SuggestionCatalog {
    fn default() -> Self {
        Self {
            general: vec![
                Suggestion::verbatim("What is the purpose of this website?"),
                Suggestion::verbatim("What are the contact details?"),
                Suggestion::verbatim("What courses or programs are offered?"),
                Suggestion::verbatim("What are the fees and payment options?"),
            ],
            follow_up: vec![
                Suggestion::new("More details", "Can you provide more details about this?"),
                Suggestion::new("Requirements", "What are the requirements?"),
                Suggestion::new("How to apply", "How can I apply?"),
            ],
        }
    }
}
