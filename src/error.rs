use thiserror::Error;

use crate::types::ActionKind;

/// Errors that can occur while executing a file action
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Request rejected by panel ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("{action} is not applicable to {name}: {reason}")]
    NotApplicable {
        action: ActionKind,
        name: String,
        reason: String,
    },

    #[error("Invalid dialog state: {message}")]
    InvalidState { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification used when an error is surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The panel could not be reached or answered with something unreadable
    Transport,
    /// The panel was reached but refused the operation
    Rejected,
    /// The action was never sent because it does not apply
    Precondition,
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::Network(_)
            | ActionError::Transport { .. }
            | ActionError::Io(_)
            | ActionError::Serialization(_) => ErrorKind::Transport,
            ActionError::Rejected { .. } => ErrorKind::Rejected,
            ActionError::NotApplicable { .. }
            | ActionError::InvalidState { .. }
            | ActionError::InvalidConfig { .. } => ErrorKind::Precondition,
        }
    }

    /// Whether a remote call was issued before this error occurred
    pub fn was_attempted(&self) -> bool {
        self.kind() != ErrorKind::Precondition
    }

    pub(crate) fn not_applicable(action: ActionKind, name: &str, reason: &str) -> Self {
        ActionError::NotApplicable {
            action,
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for file actions
pub type Result<T> = std::result::Result<T, ActionError>;
