pub mod config;
pub mod conversation;
pub mod logging;
pub mod service;
pub mod state;
pub mod suggestions;

// Re-export main types for convenience
pub use config::{Config, ConfigError, ServiceUrlSource};
pub use conversation::{Conversation, PendingQuestion, Settlement, SubmissionState};
pub use service::{QaClient, QaOutcome, QaService, TransportError};
pub use state::{ChatMessage, ChatRole, Session, Transcript};
pub use suggestions::{Suggestion, SuggestionCatalog};
