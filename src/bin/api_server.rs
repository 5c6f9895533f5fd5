// src/bin/api_server.rs

use product_catalog::app::bootstrap;
use product_catalog::infra::{config::AppConfig, logging};
use product_catalog::transport;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    logging::init();

    tracing::info!(
        data_file = %config.data_file.display(),
        upload_dir = %config.upload_dir.display(),
        store = ?config.store,
        reclaim_uploads = config.reclaim_uploads,
        "initializing catalog"
    );
    let catalog = bootstrap::build_catalog(&config).await?;

    // Surface a corrupt or unreadable store at startup rather than on the first request.
    match catalog.list().await {
        Ok(products) => tracing::info!(count = products.len(), "product store loaded"),
        Err(e) => tracing::warn!(error = %e, "product store is not readable"),
    }

    let app_state = transport::http::AppState::new(catalog);
    let app = transport::http::create_router(app_state).merge(
        SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
    );
    let app = transport::http::with_middleware(app, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    tracing::info!("server running on port {}", config.port);
    tracing::info!("swagger UI available at http://localhost:{}/swagger-ui", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("graceful shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
