use product_catalog::app::bootstrap;
use product_catalog::infra::config::{AppConfig, StoreKind};
use product_catalog::storage::IncomingFile;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Reads the same env vars as api_server:\n\
           PORT, BIND_ADDR, DATA_FILE, UPLOAD_DIR, CATALOG_STORE, RECLAIM_UPLOADS, MAX_UPLOAD_BYTES\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    // Force-read config (nice error messages if invalid)
    let config = AppConfig::from_env()?;

    println!("> Preflight:");
    println!("  LISTEN={}", config.listen_addr());
    println!("  DATA_FILE={}", config.data_file.display());
    println!("  UPLOAD_DIR={}", config.upload_dir.display());
    println!("  CATALOG_STORE={:?}", config.store);
    println!("  RECLAIM_UPLOADS={}", config.reclaim_uploads);
    println!("  MAX_UPLOAD_BYTES={}", config.max_upload_bytes);

    let catalog = bootstrap::build_catalog(&config).await?;

    // Store readable (creates an empty file store if missing)
    let products = catalog
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Product store check failed: {}", e))?;
    if config.store == StoreKind::Memory {
        println!("  Memory store: products are lost on restart.");
    }
    println!("  Store readable: {} products.", products.len());

    // Upload dir writable
    let probe = catalog
        .uploads()
        .save(IncomingFile {
            original_name: "preflight.probe".to_string(),
            data: b"ok".to_vec(),
        })
        .await
        .map_err(|e| anyhow::anyhow!("Upload dir is not writable: {}", e))?;
    catalog.uploads().remove_by_url(&probe.url).await?;
    println!("  Upload dir writable.");

    println!("> Preflight OK.");
    Ok(())
}
