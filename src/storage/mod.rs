pub mod error;
pub mod json_file;
pub mod memory;
pub mod store;
pub mod uploads;

pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;
pub use store::{ProductChange, ProductStore};
pub use uploads::{IncomingFile, StoredUpload, UploadError, UploadStore};
