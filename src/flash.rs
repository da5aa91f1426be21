use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{ActionError, ErrorKind};

/// Context tag used by every file action
pub const FILES_CONTEXT: &str = "files";

/// A user-facing error message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub context: String,
    pub kind: ErrorKind,
    /// False when the action was refused locally and never sent
    pub attempted: bool,
    pub message: String,
}

impl FlashMessage {
    pub fn from_error(context: &str, error: &ActionError) -> Self {
        Self {
            context: context.to_string(),
            kind: error.kind(),
            attempted: error.was_attempted(),
            message: error.to_string(),
        }
    }
}

/// Destination for errors shown to the user
#[async_trait]
pub trait ErrorChannel: Send + Sync {
    /// Drop whatever is shown for `context`
    async fn clear(&self, context: &str);

    /// Show `error` for `context`, replacing anything already there
    async fn report(&self, context: &str, error: &ActionError);
}

/// In-memory error channel holding the latest message per context
pub struct FlashStore {
    messages: Arc<RwLock<HashMap<String, FlashMessage>>>,
}

impl FlashStore {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn current(&self, context: &str) -> Option<FlashMessage> {
        self.messages.read().await.get(context).cloned()
    }
}

impl Default for FlashStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ErrorChannel for FlashStore {
    async fn clear(&self, context: &str) {
        self.messages.write().await.remove(context);
    }

    async fn report(&self, context: &str, error: &ActionError) {
        let message = FlashMessage::from_error(context, error);
        self.messages
            .write()
            .await
            .insert(context.to_string(), message);
    }
}
