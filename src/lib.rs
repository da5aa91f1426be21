pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod flash;
pub mod menu;
pub mod modal;
pub mod name_transform;
pub mod panel;
pub mod remote;
pub mod types;

pub use cache::{ListingCache, ListingTransform, MemoryListingCache};
pub use config::PanelConfig;
pub use controller::ActionController;
pub use error::{ActionError, ErrorKind, Result};
pub use flash::{ErrorChannel, FlashMessage, FlashStore, FILES_CONTEXT};
pub use menu::{available_actions, CapabilityGate, DeletePrompt, PermissionSet};
pub use modal::{ChmodTarget, Dialog, ModalCoordinator, ModalKind};
pub use panel::PanelClient;
pub use remote::FileRemote;
pub use types::{
    ActionKind, ActionOutcome, DirectoryContext, DirectoryListing, FileEntity, PendingAction,
    Reconciliation, RenamePair,
};
