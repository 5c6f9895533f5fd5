//! Upload directory: stores image files under generated names and maps them to `/uploads/...` URLs.

use chrono::Utc;
use rand::Rng;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// URL prefix under which the upload directory is served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

/// Multipart field that carries the product image.
pub const IMAGE_FIELD: &str = "image";

pub type Result<T> = std::result::Result<T, UploadError>;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// A file part arrived under a field other than `image`, or `image` was sent twice.
    #[error("Unexpected field")]
    UnexpectedField { field: String },

    #[error("IO error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// A file received from the client, not yet written to disk.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub data: Vec<u8>,
}

/// A file written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Uses `dir`, creating it if necessary.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|source| UploadError::Io {
            context: format!("creating {}", dir.display()),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `file` under a fresh generated name. Nothing is validated or deduplicated.
    pub async fn save(&self, file: IncomingFile) -> Result<StoredUpload> {
        let filename = generate_filename(&file.original_name);
        let path = self.dir.join(&filename);
        fs::write(&path, &file.data)
            .await
            .map_err(|source| UploadError::Io {
                context: format!("writing {}", path.display()),
                source,
            })?;

        tracing::debug!(
            file = %filename,
            original = %file.original_name,
            bytes = file.data.len(),
            "stored upload"
        );
        Ok(StoredUpload {
            url: format!("{UPLOADS_URL_PREFIX}{filename}"),
            filename,
        })
    }

    /// Deletes the file behind an `img` URL if it points into this directory.
    ///
    /// Returns `false` for external URLs, empty references and files already gone.
    pub async fn remove_by_url(&self, url: &str) -> Result<bool> {
        let Some(path) = self.resolve_url(url) else {
            return Ok(false);
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(UploadError::Io {
                context: format!("removing {}", path.display()),
                source,
            }),
        }
    }

    /// Maps `/uploads/<name>` to a path inside the directory. Anything else resolves to `None`.
    pub fn resolve_url(&self, url: &str) -> Option<PathBuf> {
        let name = url.strip_prefix(UPLOADS_URL_PREFIX)?;
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) => Some(self.dir.join(file)),
            _ => None,
        }
    }
}

/// `<millisecond timestamp>-<random 0..=1e9><.ext>`, the extension copied from the client name.
pub fn generate_filename(original_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let random: u32 = rand::thread_rng().gen_range(0..=1_000_000_000);
    format!("{millis}-{random}{}", extension_of(original_name))
}

/// Extension including the dot, or empty. Dotfiles like `.bashrc` have none.
fn extension_of(original_name: &str) -> String {
    // Client names may use either separator.
    let base = original_name.rsplit(['/', '\\']).next().unwrap_or("");
    match base.rfind('.') {
        Some(idx) if idx > 0 => {
            let ext = &base[idx..];
            if ext[1..].chars().all(|c| c.is_ascii_alphanumeric()) {
                ext.to_string()
            } else {
                String::new()
            }
        }
        _ => String::new(),
    }
}
