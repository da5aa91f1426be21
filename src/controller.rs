use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    cache::{ListingCache, ListingTransform},
    error::{ActionError, Result},
    flash::{ErrorChannel, FILES_CONTEXT},
    name_transform,
    remote::FileRemote,
    types::{ActionKind, ActionOutcome, DirectoryContext, FileEntity, PendingAction, RenamePair},
};

/// Executes file actions against the remote and keeps the listing in step
///
/// Every action clears the `files` error context before doing anything else
/// and reports at most one error there. Actions never return an error to the
/// caller; the [`ActionOutcome`] only says how things ended.
///
/// Calls do not exclude each other: several actions may be in flight at once,
/// each owning its own [`PendingAction`].
pub struct ActionController {
    remote: Arc<dyn FileRemote>,
    cache: Arc<dyn ListingCache>,
    errors: Arc<dyn ErrorChannel>,
}

impl ActionController {
    pub fn new(
        remote: Arc<dyn FileRemote>,
        cache: Arc<dyn ListingCache>,
        errors: Arc<dyn ErrorChannel>,
    ) -> Self {
        Self {
            remote,
            cache,
            errors,
        }
    }

    /// Delete an entry, removing it from the listing before the server answers
    ///
    /// On failure the listing is re-fetched so the entry reappears.
    pub async fn delete(&self, ctx: &DirectoryContext, entity: &FileEntity) -> ActionOutcome {
        self.errors.clear(FILES_CONTEXT).await;
        let pending = self.begin(ActionKind::Delete, ctx, vec![entity.name.clone()]);

        if pending.kind.reconciliation().mutates_first() {
            let key = entity.key.clone();
            let remove: ListingTransform =
                Box::new(move |files: Vec<FileEntity>| -> Vec<FileEntity> {
                    files.into_iter().filter(|f| f.key != key).collect()
                });
            if let Err(e) = self.cache.mutate(remove, false).await {
                warn!(error = %e, "optimistic removal failed");
            }
        }

        let result = self
            .remote
            .delete(&ctx.server_id, &ctx.directory, &pending.names)
            .await;
        self.settle(&pending, result).await
    }

    /// Duplicate a file; the copy shows up after a refresh
    pub async fn copy(&self, ctx: &DirectoryContext, entity: &FileEntity) -> ActionOutcome {
        self.errors.clear(FILES_CONTEXT).await;
        if !entity.is_file {
            return self
                .refuse(ActionError::not_applicable(
                    ActionKind::Copy,
                    &entity.name,
                    "only files can be copied",
                ))
                .await;
        }

        let pending = self.begin(ActionKind::Copy, ctx, vec![entity.name.clone()]);
        let result = self.remote.copy(&ctx.server_id, &ctx.join(&entity.name)).await;
        self.settle(&pending, result).await
    }

    /// Resolve a signed download URL the caller should navigate to
    pub async fn download(&self, ctx: &DirectoryContext, entity: &FileEntity) -> ActionOutcome {
        self.errors.clear(FILES_CONTEXT).await;
        if !entity.is_file {
            return self
                .refuse(ActionError::not_applicable(
                    ActionKind::Download,
                    &entity.name,
                    "only files can be downloaded",
                ))
                .await;
        }

        let pending = self.begin(ActionKind::Download, ctx, vec![entity.name.clone()]);
        match self
            .remote
            .download_url(&ctx.server_id, &ctx.join(&entity.name))
            .await
        {
            Ok(url) => {
                debug!(names = ?pending.names, "download url issued");
                ActionOutcome::Redirect { url }
            }
            Err(e) => self.fail(&pending, e).await,
        }
    }

    /// Pack an entry into a new archive next to it
    pub async fn archive(&self, ctx: &DirectoryContext, entity: &FileEntity) -> ActionOutcome {
        self.errors.clear(FILES_CONTEXT).await;
        if entity.is_archive_type() {
            return self
                .refuse(ActionError::not_applicable(
                    ActionKind::Archive,
                    &entity.name,
                    "already an archive",
                ))
                .await;
        }

        let pending = self.begin(ActionKind::Archive, ctx, vec![entity.name.clone()]);
        let result = self
            .remote
            .compress(&ctx.server_id, &ctx.directory, &pending.names)
            .await;
        self.settle(&pending, result).await
    }

    /// Extract an archive into the current directory
    pub async fn unarchive(&self, ctx: &DirectoryContext, entity: &FileEntity) -> ActionOutcome {
        self.errors.clear(FILES_CONTEXT).await;
        if !entity.is_archive_type() {
            return self
                .refuse(ActionError::not_applicable(
                    ActionKind::Unarchive,
                    &entity.name,
                    "not an archive",
                ))
                .await;
        }

        let pending = self.begin(ActionKind::Unarchive, ctx, vec![entity.name.clone()]);
        let result = self
            .remote
            .decompress(&ctx.server_id, &ctx.directory, &entity.name)
            .await;
        self.settle(&pending, result).await
    }

    /// Switch a plugin on or off by renaming its jar
    ///
    /// The listing is refreshed whether or not the rename went through.
    pub async fn toggle_plugin(
        &self,
        ctx: &DirectoryContext,
        entity: &FileEntity,
    ) -> ActionOutcome {
        self.errors.clear(FILES_CONTEXT).await;
        if !name_transform::is_toggle_applicable(entity, &ctx.directory) {
            return self
                .refuse(ActionError::not_applicable(
                    ActionKind::PluginToggle,
                    &entity.name,
                    "not a plugin jar in a plugins or mods directory",
                ))
                .await;
        }
        let Some(target) = name_transform::toggled_name(&entity.name) else {
            return self
                .refuse(ActionError::not_applicable(
                    ActionKind::PluginToggle,
                    &entity.name,
                    "name has no .jar",
                ))
                .await;
        };

        let pending = self.begin(ActionKind::PluginToggle, ctx, vec![entity.name.clone()]);
        info!(from = %entity.name, to = %target, "toggling plugin");
        let result = self
            .remote
            .rename(&ctx.server_id, &ctx.directory, &[RenamePair::new(&entity.name, target)])
            .await;
        self.settle(&pending, result).await
    }

    /// Rename or move entries, as submitted from the rename dialog
    pub async fn rename(&self, ctx: &DirectoryContext, pairs: &[RenamePair]) -> ActionOutcome {
        self.errors.clear(FILES_CONTEXT).await;
        if let Err(e) = validate_renames(pairs) {
            return self.refuse(e).await;
        }

        let names = pairs.iter().map(|p| p.from.clone()).collect();
        let pending = self.begin(ActionKind::Rename, ctx, names);
        let result = self.remote.rename(&ctx.server_id, &ctx.directory, pairs).await;
        self.settle(&pending, result).await
    }

    /// Change an entry's permission bits, as submitted from the chmod dialog
    pub async fn chmod(
        &self,
        ctx: &DirectoryContext,
        entity: &FileEntity,
        mode: &str,
    ) -> ActionOutcome {
        self.errors.clear(FILES_CONTEXT).await;
        if !is_octal_mode(mode) {
            return self
                .refuse(ActionError::not_applicable(
                    ActionKind::Chmod,
                    &entity.name,
                    &format!("'{}' is not an octal mode", mode),
                ))
                .await;
        }

        let pending = self.begin(ActionKind::Chmod, ctx, vec![entity.name.clone()]);
        let result = self
            .remote
            .chmod(&ctx.server_id, &ctx.directory, &entity.name, mode)
            .await;
        self.settle(&pending, result).await
    }

    fn begin(
        &self,
        kind: ActionKind,
        ctx: &DirectoryContext,
        names: Vec<String>,
    ) -> PendingAction {
        let pending = PendingAction::new(kind, ctx, names);
        debug!(
            action = %pending.kind,
            server = %pending.server_id,
            directory = %pending.directory,
            names = ?pending.names,
            "issuing remote call"
        );
        pending
    }

    /// Bring the listing in line according to the action's reconciliation
    async fn settle(&self, pending: &PendingAction, result: Result<()>) -> ActionOutcome {
        let strategy = pending.kind.reconciliation();
        match result {
            Ok(()) => {
                debug!(action = %pending.kind, names = ?pending.names, "remote call succeeded");
                if strategy.refresh_on_success() {
                    self.refresh().await;
                }
                ActionOutcome::Completed
            }
            Err(e) => {
                if strategy.refresh_on_failure() {
                    self.refresh().await;
                }
                self.fail(pending, e).await
            }
        }
    }

    async fn fail(&self, pending: &PendingAction, error: ActionError) -> ActionOutcome {
        warn!(action = %pending.kind, names = ?pending.names, error = %error, "remote call failed");
        let kind = error.kind();
        self.errors.report(FILES_CONTEXT, &error).await;
        ActionOutcome::Failed { kind }
    }

    async fn refuse(&self, error: ActionError) -> ActionOutcome {
        warn!(error = %error, "action refused");
        let kind = error.kind();
        self.errors.report(FILES_CONTEXT, &error).await;
        ActionOutcome::Failed { kind }
    }

    async fn refresh(&self) {
        if let Err(e) = self.cache.refresh().await {
            warn!(error = %e, "listing refresh failed");
        }
    }
}

fn validate_renames(pairs: &[RenamePair]) -> Result<()> {
    if pairs.is_empty() {
        return Err(ActionError::not_applicable(ActionKind::Rename, "", "nothing to rename"));
    }
    for pair in pairs {
        if pair.to.trim().is_empty() {
            return Err(ActionError::not_applicable(
                ActionKind::Rename,
                &pair.from,
                "new name is empty",
            ));
        }
        if pair.to == pair.from {
            return Err(ActionError::not_applicable(
                ActionKind::Rename,
                &pair.from,
                "new name is unchanged",
            ));
        }
    }
    Ok(())
}

fn is_octal_mode(mode: &str) -> bool {
    (3..=4).contains(&mode.len()) && mode.chars().all(|c| ('0'..='7').contains(&c))
}
