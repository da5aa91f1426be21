use std::collections::HashSet;

use crate::{
    name_transform,
    types::{ActionKind, FileEntity},
};

/// Decides whether the current user may perform an action on an entity
pub trait CapabilityGate: Send + Sync {
    fn permits(&self, action: ActionKind, entity: &FileEntity) -> bool;
}

/// Gate backed by the user's permission strings for the server
///
/// `*` grants everything.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    permissions: HashSet<String>,
}

impl PermissionSet {
    pub fn new<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has(&self, permission: &str) -> bool {
        self.permissions.contains("*") || self.permissions.contains(permission)
    }
}

impl CapabilityGate for PermissionSet {
    fn permits(&self, action: ActionKind, _entity: &FileEntity) -> bool {
        action.required_permission().map_or(true, |p| self.has(p))
    }
}

/// Actions a listing row offers, in display order
pub fn available_actions(
    entity: &FileEntity,
    directory: &str,
    gate: &dyn CapabilityGate,
) -> Vec<ActionKind> {
    let mut candidates = vec![ActionKind::Rename, ActionKind::Move, ActionKind::Chmod];
    if entity.is_file {
        candidates.push(ActionKind::Copy);
    }
    candidates.push(entity.archive_action());
    if entity.is_file {
        candidates.push(ActionKind::Download);
    }
    candidates.push(ActionKind::Delete);
    if name_transform::is_toggle_applicable(entity, directory) {
        candidates.push(ActionKind::PluginToggle);
    }

    candidates
        .into_iter()
        .filter(|action| gate.permits(*action, entity))
        .collect()
}

/// Text of the delete confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub title: String,
    pub button_text: String,
    pub body: &'static str,
}

impl DeletePrompt {
    pub fn for_entity(entity: &FileEntity) -> Self {
        let noun = if entity.is_file { "File" } else { "Directory" };
        Self {
            title: format!("Delete this {}?", noun),
            button_text: format!("Yes, Delete {}", noun),
            body: "Deleting files is a permanent operation, you cannot undo this action.",
        }
    }
}
