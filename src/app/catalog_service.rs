//! The catalog service.
//!
//! Sits between the HTTP handlers and persistence. It is responsible for:
//! 1.  Writing uploaded images to the upload directory before the store is touched.
//! 2.  Turning loosely typed request fields into drafts and patches.
//! 3.  Running list/create/update/delete against the `ProductStore`.
//! 4.  Cleaning up upload files that end up unreferenced, when enabled.

use crate::domain::{Product, ProductInput};
use crate::storage::{IncomingFile, ProductStore, StoreError, StoredUpload, UploadError, UploadStore};
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::Store(StoreError::NotFound { .. }))
    }
}

pub struct CatalogService {
    store: Arc<dyn ProductStore>,
    uploads: UploadStore,
    /// Delete an upload once no product references it any more.
    reclaim_uploads: bool,
}

impl CatalogService {
    pub fn new(store: Arc<dyn ProductStore>, uploads: UploadStore) -> Self {
        Self {
            store,
            uploads,
            reclaim_uploads: false,
        }
    }

    pub fn with_reclaim_uploads(mut self, reclaim: bool) -> Self {
        self.reclaim_uploads = reclaim;
        self
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    pub async fn list(&self) -> Result<Vec<Product>> {
        Ok(self.store.list().await?)
    }

    /// Creates a product. The uploaded file, if any, wins over a body-supplied `img`.
    pub async fn create(&self, input: ProductInput, file: Option<IncomingFile>) -> Result<Product> {
        let upload = self.store_upload(file).await?;
        let draft = input.into_draft(upload.as_ref().map(|u| u.url.clone()));

        match self.store.create(draft).await {
            Ok(product) => {
                tracing::info!(product_id = product.id, img = %product.img, "product created");
                Ok(product)
            }
            Err(e) => {
                self.discard(upload).await;
                Err(e.into())
            }
        }
    }

    /// Overwrites the truthy fields of `input` on product `id`; `img` changes only with a file.
    pub async fn update(
        &self,
        id: u64,
        input: ProductInput,
        file: Option<IncomingFile>,
    ) -> Result<Product> {
        let upload = self.store_upload(file).await?;
        let patch = input.into_patch(upload.as_ref().map(|u| u.url.clone()));

        let change = match self.store.update(id, patch).await {
            Ok(change) => change,
            Err(e) => {
                self.discard(upload).await;
                return Err(e.into());
            }
        };

        tracing::info!(product_id = id, "product updated");
        if change.previous.img != change.current.img {
            self.reclaim(&[change.previous]).await;
        }
        Ok(change.current)
    }

    /// Removes product `id`. Unknown ids are a no-op.
    pub async fn delete(&self, id: u64) -> Result<()> {
        let removed = self.store.delete(id).await?;
        if removed.is_empty() {
            tracing::debug!(product_id = id, "delete of unknown product ignored");
            return Ok(());
        }

        tracing::info!(product_id = id, "product deleted");
        self.reclaim(&removed).await;
        Ok(())
    }

    async fn store_upload(&self, file: Option<IncomingFile>) -> Result<Option<StoredUpload>> {
        match file {
            Some(file) => Ok(Some(self.uploads.save(file).await?)),
            None => Ok(None),
        }
    }

    /// Removes an upload written for a request that then failed.
    async fn discard(&self, upload: Option<StoredUpload>) {
        let Some(upload) = upload else { return };
        if let Err(e) = self.uploads.remove_by_url(&upload.url).await {
            tracing::warn!(file = %upload.filename, error = %e, "failed to discard upload");
        }
    }

    /// Deletes the local uploads of `dropped` that no stored product points at any more.
    ///
    /// The reference check runs inside the store's write lock, so a create that
    /// reuses the same URL either lands first and keeps the file, or lands after
    /// the file is gone.
    async fn reclaim(&self, dropped: &[Product]) {
        if !self.reclaim_uploads {
            return;
        }
        let images: Vec<String> = dropped
            .iter()
            .filter_map(Product::img_url)
            .filter(|img| self.uploads.resolve_url(img).is_some())
            .map(str::to_owned)
            .collect();
        if images.is_empty() {
            return;
        }
        match self.store.reclaim_unreferenced(&images, &self.uploads).await {
            Ok(removed) => {
                for img in removed {
                    tracing::info!(img = %img, "reclaimed unreferenced upload");
                }
            }
            Err(e) => tracing::warn!(error = %e, "skipping upload reclaim, store unreadable"),
        }
    }
}
