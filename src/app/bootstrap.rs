//! Builds the catalog service from configuration.

use crate::app::CatalogService;
use crate::infra::config::{AppConfig, StoreKind};
use crate::storage::{InMemoryStore, JsonFileStore, ProductStore, UploadStore};
use anyhow::Context;
use std::sync::Arc;

pub fn build_store(config: &AppConfig) -> Arc<dyn ProductStore> {
    match config.store {
        StoreKind::File => Arc::new(JsonFileStore::new(config.data_file.clone())),
        StoreKind::Memory => Arc::new(InMemoryStore::new()),
    }
}

/// Opens the upload directory (creating it) and wires the configured store.
pub async fn build_catalog(config: &AppConfig) -> anyhow::Result<CatalogService> {
    let uploads = UploadStore::open(&config.upload_dir)
        .await
        .with_context(|| format!("opening upload dir {}", config.upload_dir.display()))?;

    Ok(CatalogService::new(build_store(config), uploads).with_reclaim_uploads(config.reclaim_uploads))
}
