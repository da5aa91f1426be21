use std::sync::Arc;

use tokio::{runtime::Handle, task::JoinHandle};
use tracing::debug;

use crate::{
    controller::ActionController,
    error::{ActionError, Result},
    menu::DeletePrompt,
    types::{ActionOutcome, DirectoryContext, FileEntity, RenamePair},
};

/// Dialogs that take follow-up input from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Rename,
    Move,
    Chmod,
}

/// An entry shown in the permissions dialog with its current bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChmodTarget {
    pub file: String,
    pub mode: String,
}

/// What the presentation layer should render for the open modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    /// Rename and move share one dialog
    RenameFile {
        files: Vec<String>,
        use_move_terminology: bool,
    },
    Chmod { files: Vec<ChmodTarget> },
}

/// Tracks which dialog is open for a listing row
///
/// At most one of rename, move and chmod can be open; asking for another
/// replaces the current one. The delete confirmation is tracked separately
/// and is only ever shown while no other dialog is open.
#[derive(Debug, Default)]
pub struct ModalCoordinator {
    modal: Option<ModalKind>,
    delete_confirmation: bool,
}

impl ModalCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The open dialog, if any
    pub fn state(&self) -> Option<ModalKind> {
        self.modal
    }

    pub fn is_delete_confirmation_visible(&self) -> bool {
        self.delete_confirmation
    }

    /// Open `kind`, replacing whatever dialog is open
    pub fn request_modal(&mut self, kind: ModalKind) -> Result<()> {
        if self.delete_confirmation {
            return Err(ActionError::InvalidState {
                message: format!("cannot open {:?} while a delete is awaiting confirmation", kind),
            });
        }
        if let Some(previous) = self.modal.replace(kind) {
            debug!(?previous, current = ?kind, "modal replaced");
        }
        Ok(())
    }

    pub fn dismiss(&mut self) {
        self.modal = None;
    }

    pub fn request_delete_confirmation(&mut self) -> Result<()> {
        if let Some(open) = self.modal {
            return Err(ActionError::InvalidState {
                message: format!("cannot confirm a delete while {:?} is open", open),
            });
        }
        self.delete_confirmation = true;
        Ok(())
    }

    pub fn cancel_delete_confirmation(&mut self) {
        self.delete_confirmation = false;
    }

    /// Start the delete and close the confirmation straight away
    ///
    /// The returned handle resolves once the server has answered; by then the
    /// listing has already been updated and any error reported. The delete runs
    /// on the current tokio runtime, so this must be called from within one.
    /// Refused with [`ActionError::InvalidState`] when no confirmation is
    /// showing or no runtime is available.
    pub fn confirm_delete(
        &mut self,
        controller: Arc<ActionController>,
        ctx: DirectoryContext,
        entity: FileEntity,
    ) -> Result<JoinHandle<ActionOutcome>> {
        if !self.delete_confirmation {
            return Err(ActionError::InvalidState {
                message: format!("no delete confirmation is showing for {}", entity.name),
            });
        }
        let runtime = Handle::try_current().map_err(|e| ActionError::InvalidState {
            message: format!("delete needs a tokio runtime: {}", e),
        })?;
        let handle = runtime.spawn(async move { controller.delete(&ctx, &entity).await });
        self.delete_confirmation = false;
        Ok(handle)
    }

    /// Dialog to render for `entity`, if one is open
    pub fn dialog(&self, entity: &FileEntity) -> Option<Dialog> {
        match self.modal? {
            ModalKind::Chmod => Some(Dialog::Chmod {
                files: vec![ChmodTarget {
                    file: entity.name.clone(),
                    mode: entity.mode_bits.clone(),
                }],
            }),
            kind => Some(Dialog::RenameFile {
                files: vec![entity.name.clone()],
                use_move_terminology: kind == ModalKind::Move,
            }),
        }
    }

    /// Confirmation text, if the delete confirmation is showing
    pub fn delete_prompt(&self, entity: &FileEntity) -> Option<DeletePrompt> {
        self.delete_confirmation.then(|| DeletePrompt::for_entity(entity))
    }

    /// Submit the rename/move dialog; it closes only if the rename went through
    pub async fn submit_rename(
        &mut self,
        controller: &ActionController,
        ctx: &DirectoryContext,
        entity: &FileEntity,
        target: &str,
    ) -> ActionOutcome {
        let outcome = controller
            .rename(ctx, &[RenamePair::new(&entity.name, target)])
            .await;
        if outcome.is_success() {
            self.dismiss();
        }
        outcome
    }

    /// Submit the permissions dialog; it closes only if the change went through
    pub async fn submit_chmod(
        &mut self,
        controller: &ActionController,
        ctx: &DirectoryContext,
        entity: &FileEntity,
        mode: &str,
    ) -> ActionOutcome {
        let outcome = controller.chmod(ctx, entity, mode).await;
        if outcome.is_success() {
            self.dismiss();
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_request_wins() {
        let mut modals = ModalCoordinator::new();
        assert_eq!(modals.state(), None);

        modals.request_modal(ModalKind::Rename).unwrap();
        modals.request_modal(ModalKind::Chmod).unwrap();
        assert_eq!(modals.state(), Some(ModalKind::Chmod));

        modals.dismiss();
        assert_eq!(modals.state(), None);
    }

    #[test]
    fn test_delete_confirmation_is_independent() {
        let mut modals = ModalCoordinator::new();
        modals.request_delete_confirmation().unwrap();
        assert!(modals.is_delete_confirmation_visible());
        assert_eq!(modals.state(), None);

        modals.cancel_delete_confirmation();
        assert!(!modals.is_delete_confirmation_visible());
        assert_eq!(modals.state(), None);
    }

    #[test]
    fn test_modal_blocked_during_delete_confirmation() {
        let mut modals = ModalCoordinator::new();
        modals.request_delete_confirmation().unwrap();

        let err = modals.request_modal(ModalKind::Move).unwrap_err();
        assert!(!err.was_attempted());
        assert_eq!(modals.state(), None);
        assert!(modals.is_delete_confirmation_visible());
    }

    #[test]
    fn test_delete_confirmation_blocked_during_modal() {
        let mut modals = ModalCoordinator::new();
        modals.request_modal(ModalKind::Rename).unwrap();

        assert!(modals.request_delete_confirmation().is_err());
        assert!(!modals.is_delete_confirmation_visible());
        assert_eq!(modals.state(), Some(ModalKind::Rename));
    }

    #[test]
    fn test_dialog_rendering() {
        let entity = FileEntity::file("server.properties").with_mode("-rw-------", "600");
        let mut modals = ModalCoordinator::new();
        assert_eq!(modals.dialog(&entity), None);

        modals.request_modal(ModalKind::Move).unwrap();
        assert_eq!(
            modals.dialog(&entity),
            Some(Dialog::RenameFile {
                files: vec!["server.properties".to_string()],
                use_move_terminology: true,
            })
        );

        modals.request_modal(ModalKind::Rename).unwrap();
        assert!(matches!(
            modals.dialog(&entity),
            Some(Dialog::RenameFile { use_move_terminology: false, .. })
        ));

        modals.request_modal(ModalKind::Chmod).unwrap();
        assert_eq!(
            modals.dialog(&entity),
            Some(Dialog::Chmod {
                files: vec![ChmodTarget {
                    file: "server.properties".to_string(),
                    mode: "600".to_string(),
                }],
            })
        );
    }

    #[test]
    fn test_delete_prompt_follows_visibility() {
        let entity = FileEntity::file("old.log");
        let mut modals = ModalCoordinator::new();
        assert!(modals.delete_prompt(&entity).is_none());
        modals.request_delete_confirmation().unwrap();
        assert_eq!(
            modals.delete_prompt(&entity).unwrap().title,
            "Delete this File?"
        );
    }
}
