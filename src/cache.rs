use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    error::Result,
    remote::FileRemote,
    types::{DirectoryContext, DirectoryListing, FileEntity},
};

/// Whole-listing transformation applied by [`ListingCache::mutate`]
pub type ListingTransform = Box<dyn FnOnce(Vec<FileEntity>) -> Vec<FileEntity> + Send>;

/// Cached listing of the active directory
///
/// Every write replaces the listing as a whole, so concurrent writers simply
/// race and the most recent one wins.
#[async_trait]
pub trait ListingCache: Send + Sync {
    /// Snapshot of the current listing, if one has been loaded
    async fn listing(&self) -> Option<DirectoryListing>;

    /// Replace the cached entries with `transform(entries)`
    ///
    /// With `revalidate` set, a refresh follows the local write.
    async fn mutate(&self, transform: ListingTransform, revalidate: bool) -> Result<()>;

    /// Re-fetch the listing, discarding any local changes
    async fn refresh(&self) -> Result<()>;
}

/// In-memory listing cache fed by a [`FileRemote`]
pub struct MemoryListingCache {
    remote: Arc<dyn FileRemote>,
    context: RwLock<DirectoryContext>,
    store: Arc<RwLock<Option<DirectoryListing>>>,
}

impl MemoryListingCache {
    pub fn new(remote: Arc<dyn FileRemote>, context: DirectoryContext) -> Self {
        Self {
            remote,
            context: RwLock::new(context),
            store: Arc::new(RwLock::new(None)),
        }
    }

    /// Switch to another directory and load it
    pub async fn navigate(&self, directory: &str) -> Result<()> {
        {
            let mut context = self.context.write().await;
            context.directory = directory.to_string();
        }
        *self.store.write().await = None;
        self.refresh().await
    }

    pub async fn context(&self) -> DirectoryContext {
        self.context.read().await.clone()
    }
}

#[async_trait]
impl ListingCache for MemoryListingCache {
    async fn listing(&self) -> Option<DirectoryListing> {
        self.store.read().await.clone()
    }

    async fn mutate(&self, transform: ListingTransform, revalidate: bool) -> Result<()> {
        {
            let mut store = self.store.write().await;
            if let Some(listing) = store.as_mut() {
                let entries = std::mem::take(&mut listing.entries);
                listing.entries = transform(entries);
            }
        }

        if revalidate {
            self.refresh().await?;
        }
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        let context = self.context().await;
        let listing = self
            .remote
            .list_directory(&context.server_id, &context.directory)
            .await?;
        debug!(
            remote = %self.remote.identifier(),
            directory = %context.directory,
            entries = listing.entries.len(),
            "listing refreshed"
        );

        // Drop the result if the user navigated away while it was in flight.
        if self.context.read().await.directory == context.directory {
            *self.store.write().await = Some(listing);
        }
        Ok(())
    }
}
