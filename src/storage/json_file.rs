//! Product store backed by a single pretty-printed JSON file.
//!
//! Every operation reads the whole document, modifies it in memory and writes it
//! back, all while holding one async mutex. Writes land in a sibling temp file
//! that is renamed over the original.

use crate::domain::{Product, ProductDraft, ProductPatch};
use crate::storage::error::{Result, StoreError};
use crate::storage::store::{remove_unreferenced, IdAllocator, ProductChange, ProductStore};
use crate::storage::uploads::UploadStore;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

pub struct JsonFileStore {
    path: PathBuf,
    /// Single-writer lock; also guards id allocation.
    ids: Mutex<IdAllocator>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ids: Mutex::new(IdAllocator::default()),
        }
    }

    async fn read_unlocked(&self) -> Result<Vec<Product>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "product store missing, creating empty list");
                self.write_unlocked(&[]).await?;
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StoreError::io(
                    format!("reading {}", self.path.display()),
                    e,
                ))
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_unlocked(&self, products: &[Product]) -> Result<()> {
        let content = serde_json::to_string_pretty(products).map_err(StoreError::Serialize)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(format!("creating {}", parent.display()), e))?;
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, content)
            .await
            .map_err(|e| StoreError::io(format!("writing {}", tmp.display()), e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(format!("replacing {}", self.path.display()), e))?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ProductStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<Product>> {
        let _guard = self.ids.lock().await;
        self.read_unlocked().await
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product> {
        let mut ids = self.ids.lock().await;
        let mut products = self.read_unlocked().await?;
        let product = draft.with_id(ids.allocate(&products));
        products.push(product.clone());
        self.write_unlocked(&products).await?;
        Ok(product)
    }

    async fn update(&self, id: u64, patch: ProductPatch) -> Result<ProductChange> {
        let _guard = self.ids.lock().await;
        let mut products = self.read_unlocked().await?;
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound { id })?;

        let previous = product.clone();
        patch.apply(product);
        let current = product.clone();

        self.write_unlocked(&products).await?;
        Ok(ProductChange { previous, current })
    }

    async fn delete(&self, id: u64) -> Result<Vec<Product>> {
        let _guard = self.ids.lock().await;
        let products = self.read_unlocked().await?;
        let (removed, kept): (Vec<_>, Vec<_>) = products.into_iter().partition(|p| p.id == id);
        self.write_unlocked(&kept).await?;
        Ok(removed)
    }

    async fn reclaim_unreferenced(
        &self,
        images: &[String],
        uploads: &UploadStore,
    ) -> Result<Vec<String>> {
        let _guard = self.ids.lock().await;
        let products = self.read_unlocked().await?;
        Ok(remove_unreferenced(&products, images, uploads).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductInput;
    use serde_json::json;
    use std::sync::Arc;

    fn draft(name: &str, price: &str) -> ProductDraft {
        let body = json!({ "name": name, "category": "Misc", "price": price, "tag": "t" });
        ProductInput::from_json_object(body.as_object().unwrap()).into_draft(None)
    }

    #[tokio::test]
    async fn creates_missing_file_with_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("produtos.json");
        let store = JsonFileStore::new(&path);

        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("produtos.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::new(&path);

        let err = store.list().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn sequential_creates_get_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("produtos.json"));

        let mut last = 0;
        for i in 0..5 {
            let p = store.create(draft(&format!("p{i}"), "1")).await.unwrap();
            assert!(p.id > last);
            last = p.id;
        }
        let ids: Vec<u64> = store.list().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn continues_from_existing_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("produtos.json");
        std::fs::write(
            &path,
            r#"[{"id":7,"name":"Old","category":"C","price":3,"tag":"x","img":""}]"#,
        )
        .unwrap();
        let store = JsonFileStore::new(&path);

        let p = store.create(draft("New", "2.5")).await.unwrap();
        assert_eq!(p.id, 8);
        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].price, Some(3.0));
    }

    #[tokio::test]
    async fn loads_files_with_non_string_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("produtos.json");
        std::fs::write(
            &path,
            r#"[{"id":1,"name":12,"category":"C","price":5,"tag":true,"img":""}]"#,
        )
        .unwrap();
        let store = JsonFileStore::new(&path);

        let all = store.list().await.unwrap();
        assert_eq!(all[0].name, Some(json!(12)));
        assert_eq!(all[0].tag, Some(json!(true)));

        let p = store.create(draft("New", "1")).await.unwrap();
        assert_eq!(p.id, 2);
        let stored: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored[0]["name"], json!(12));
        assert_eq!(stored[0]["tag"], json!(true));
    }

    #[tokio::test]
    async fn reclaim_keeps_referenced_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::open(dir.path().join("uploads")).await.unwrap();
        let kept = uploads
            .save(crate::storage::IncomingFile {
                original_name: "a.png".into(),
                data: b"a".to_vec(),
            })
            .await
            .unwrap();
        let dropped = uploads
            .save(crate::storage::IncomingFile {
                original_name: "b.png".into(),
                data: b"b".to_vec(),
            })
            .await
            .unwrap();
        let store = JsonFileStore::new(dir.path().join("produtos.json"));
        let body = json!({ "name": "A", "img": kept.url });
        store
            .create(ProductInput::from_json_object(body.as_object().unwrap()).into_draft(None))
            .await
            .unwrap();

        let removed = store
            .reclaim_unreferenced(&[kept.url.clone(), dropped.url.clone()], &uploads)
            .await
            .unwrap();
        assert_eq!(removed, vec![dropped.url]);
        assert!(uploads.resolve_url(&kept.url).unwrap().exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path().join("produtos.json")));

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(draft(&format!("p{i}"), "1")).await.unwrap().id
            }));
        }
        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
        assert_eq!(store.list().await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn update_of_missing_id_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("produtos.json");
        let store = JsonFileStore::new(&path);
        store.create(draft("A", "1")).await.unwrap();
        let before = std::fs::read(&path).unwrap();

        let patch = ProductPatch {
            name: Some("B".into()),
            ..ProductPatch::default()
        };
        let err = store.update(42, patch).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 42 }));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn update_returns_previous_and_current() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("produtos.json"));
        let created = store.create(draft("A", "1")).await.unwrap();

        let patch = ProductPatch {
            price: Some(Some(9.5)),
            ..ProductPatch::default()
        };
        let change = store.update(created.id, patch).await.unwrap();
        assert_eq!(change.previous, created);
        assert_eq!(change.current.price, Some(9.5));
        assert_eq!(change.current.name, Some(json!("A")));
        assert_eq!(store.list().await.unwrap(), vec![change.current]);
    }

    #[tokio::test]
    async fn delete_removes_and_ignores_unknown_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("produtos.json"));
        let a = store.create(draft("A", "1")).await.unwrap();
        let b = store.create(draft("B", "2")).await.unwrap();

        let removed = store.delete(a.id).await.unwrap();
        assert_eq!(removed, vec![a.clone()]);
        assert_eq!(store.list().await.unwrap(), vec![b.clone()]);

        assert!(store.delete(999).await.unwrap().is_empty());
        assert_eq!(store.list().await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn written_file_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("produtos.json");
        let store = JsonFileStore::new(&path);
        store.create(draft("A", "1")).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[\n  {\n    \"id\": 1,"), "{content}");
        assert!(!dir.path().join("produtos.json.tmp").exists());
    }
}
