use async_trait::async_trait;

use crate::{
    error::Result,
    types::{DirectoryListing, RenamePair},
};

/// Remote file operations for a game server
///
/// Implementors talk to the panel (or a stand-in for it). Every call may fail
/// with a transport error or a rejection; none of them retry.
#[async_trait]
pub trait FileRemote: Send + Sync {
    /// List the contents of a directory
    async fn list_directory(&self, server_id: &str, directory: &str) -> Result<DirectoryListing>;

    /// Delete the named entries inside `directory`
    async fn delete(&self, server_id: &str, directory: &str, names: &[String]) -> Result<()>;

    /// Duplicate a single file; the server picks the copy's name
    async fn copy(&self, server_id: &str, full_path: &str) -> Result<()>;

    /// Request a short-lived download URL for a file
    async fn download_url(&self, server_id: &str, full_path: &str) -> Result<String>;

    /// Pack the named entries into a new archive inside `directory`
    async fn compress(&self, server_id: &str, directory: &str, names: &[String]) -> Result<()>;

    /// Extract an archive in place
    async fn decompress(&self, server_id: &str, directory: &str, name: &str) -> Result<()>;

    /// Rename or move entries relative to `directory`
    async fn rename(&self, server_id: &str, directory: &str, pairs: &[RenamePair]) -> Result<()>;

    /// Change the permission bits of a single entry; `mode` is octal, e.g. `755`
    async fn chmod(&self, server_id: &str, directory: &str, name: &str, mode: &str) -> Result<()>;

    /// Get a human-readable identifier for this remote (for logging/debugging)
    fn identifier(&self) -> String;
}
