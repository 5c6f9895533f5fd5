pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::CatalogService;
pub use domain::{Product, ProductInput};
pub use infra::config::AppConfig;
pub use storage::{InMemoryStore, JsonFileStore, ProductStore, UploadStore};
