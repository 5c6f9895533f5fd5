//! Centralized configuration (environment variables + defaults).

use anyhow::Context;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_FILE: &str = "produtos.json";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Which `ProductStore` backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    File,
    Memory,
}

/// Everything the server needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub upload_dir: PathBuf,
    pub store: StoreKind,
    pub reclaim_uploads: bool,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Reads the configuration from the environment, loading `.env` first if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Ok(Self {
            bind_addr: bind_addr(),
            port: port()?,
            data_file: data_file(),
            upload_dir: upload_dir(),
            store: store_kind()?,
            reclaim_uploads: reclaim_uploads()?,
            max_upload_bytes: max_upload_bytes()?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Listen port (`PORT`, default 3000).
pub fn port() -> anyhow::Result<u16> {
    match var("PORT") {
        Some(v) => v
            .trim()
            .parse::<u16>()
            .with_context(|| format!("PORT must be a valid port number, got {v:?}")),
        None => Ok(DEFAULT_PORT),
    }
}

/// Listen address (`BIND_ADDR`, default all interfaces).
pub fn bind_addr() -> String {
    var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string())
}

/// Backing JSON file (`DATA_FILE`).
pub fn data_file() -> PathBuf {
    var("DATA_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

/// Upload directory (`UPLOAD_DIR`).
pub fn upload_dir() -> PathBuf {
    var("UPLOAD_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
}

/// Store backend (`CATALOG_STORE` = `file` | `memory`).
pub fn store_kind() -> anyhow::Result<StoreKind> {
    match var("CATALOG_STORE").map(|v| v.trim().to_lowercase()).as_deref() {
        None | Some("file") => Ok(StoreKind::File),
        Some("memory") => Ok(StoreKind::Memory),
        Some(other) => anyhow::bail!("CATALOG_STORE must be 'file' or 'memory', got {other:?}"),
    }
}

/// Delete replaced or orphaned uploads (`RECLAIM_UPLOADS`, default false).
pub fn reclaim_uploads() -> anyhow::Result<bool> {
    match var("RECLAIM_UPLOADS") {
        Some(v) => parse_bool(&v)
            .with_context(|| format!("RECLAIM_UPLOADS must be a boolean, got {v:?}")),
        None => Ok(false),
    }
}

/// Request body cap in bytes (`MAX_UPLOAD_BYTES`).
pub fn max_upload_bytes() -> anyhow::Result<usize> {
    match var("MAX_UPLOAD_BYTES") {
        Some(v) => v
            .trim()
            .parse::<usize>()
            .with_context(|| format!("MAX_UPLOAD_BYTES must be a byte count, got {v:?}")),
        None => Ok(DEFAULT_MAX_UPLOAD_BYTES),
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
