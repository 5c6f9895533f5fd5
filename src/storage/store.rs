//! The `ProductStore` contract shared by every backend.

use crate::domain::{Product, ProductDraft, ProductPatch};
use crate::storage::error::Result;
use crate::storage::uploads::UploadStore;
use async_trait::async_trait;

/// Before/after view of an updated product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductChange {
    pub previous: Product,
    pub current: Product,
}

/// Persistence for the product list.
///
/// Implementations must run each operation as one serialized read-modify-write
/// cycle and own id allocation, so concurrent callers never observe a lost
/// update or receive the same id.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products in insertion order.
    async fn list(&self) -> Result<Vec<Product>>;

    /// Assigns an id to `draft`, appends it and returns the stored product.
    async fn create(&self, draft: ProductDraft) -> Result<Product>;

    /// Applies `patch` to product `id`. Fails with `StoreError::NotFound` without writing.
    async fn update(&self, id: u64, patch: ProductPatch) -> Result<ProductChange>;

    /// Removes every product with `id` and returns them. Unknown ids yield an empty vec.
    async fn delete(&self, id: u64) -> Result<Vec<Product>>;

    /// Deletes each upload in `images` that no stored product references and returns
    /// the ones removed.
    ///
    /// The check and the deletion happen inside the write critical section, so a
    /// concurrent create cannot start referencing a file that is about to go.
    async fn reclaim_unreferenced(
        &self,
        images: &[String],
        uploads: &UploadStore,
    ) -> Result<Vec<String>>;
}

/// Removes the uploads in `images` that none of `products` points at.
///
/// Callers must hold their store's write lock. Failed removals are logged and skipped.
pub(crate) async fn remove_unreferenced(
    products: &[Product],
    images: &[String],
    uploads: &UploadStore,
) -> Vec<String> {
    let mut removed = Vec::new();
    for img in images {
        if products.iter().any(|p| p.img_url() == Some(img.as_str())) {
            continue;
        }
        match uploads.remove_by_url(img).await {
            Ok(true) => removed.push(img.clone()),
            Ok(false) => {}
            Err(e) => tracing::warn!(img = %img, error = %e, "failed to reclaim upload"),
        }
    }
    removed
}

/// Keeps ids unique across the process lifetime.
///
/// The counter is re-seeded from the stored maximum on every cycle, so ids never
/// collide with rows added behind the store's back.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub(crate) fn allocate(&mut self, existing: &[Product]) -> u64 {
        let floor = existing.iter().map(|p| p.id).max().map_or(1, |max| max + 1);
        let id = self.next.max(floor);
        self.next = id + 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: u64) -> Product {
        ProductDraft {
            name: None,
            category: None,
            price: Some(1.0),
            tag: None,
            img: serde_json::Value::String(String::new()),
        }
        .with_id(id)
    }

    #[test]
    fn first_id_is_one() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.allocate(&[]), 1);
    }

    #[test]
    fn continues_after_stored_maximum() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.allocate(&[product(4), product(9), product(2)]), 10);
    }

    #[test]
    fn does_not_reuse_ids_after_delete_of_maximum() {
        let mut ids = IdAllocator::default();
        let first = ids.allocate(&[product(1)]);
        assert_eq!(first, 2);
        // product 2 deleted again before the next create
        assert_eq!(ids.allocate(&[product(1)]), 3);
    }
}
