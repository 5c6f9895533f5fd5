//! In-memory product store for ephemeral runs and tests.

use crate::domain::{Product, ProductDraft, ProductPatch};
use crate::storage::error::{Result, StoreError};
use crate::storage::store::{remove_unreferenced, IdAllocator, ProductChange, ProductStore};
use crate::storage::uploads::UploadStore;
use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    products: Vec<Product>,
    ids: IdAllocator,
}

/// Products live only as long as the process.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn list(&self) -> Result<Vec<Product>> {
        Ok(self.state.lock().await.products.clone())
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product> {
        let mut state = self.state.lock().await;
        let State { products, ids } = &mut *state;
        let product = draft.with_id(ids.allocate(products));
        products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: u64, patch: ProductPatch) -> Result<ProductChange> {
        let mut state = self.state.lock().await;
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound { id })?;
        let previous = product.clone();
        patch.apply(product);
        Ok(ProductChange {
            previous,
            current: product.clone(),
        })
    }

    async fn delete(&self, id: u64) -> Result<Vec<Product>> {
        let mut state = self.state.lock().await;
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut state.products).into_iter().partition(|p| p.id == id);
        state.products = kept;
        Ok(removed)
    }

    async fn reclaim_unreferenced(
        &self,
        images: &[String],
        uploads: &UploadStore,
    ) -> Result<Vec<String>> {
        let state = self.state.lock().await;
        Ok(remove_unreferenced(&state.products, images, uploads).await)
    }
}
