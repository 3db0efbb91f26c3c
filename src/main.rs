use product_api::infrastructure::{config::find_config_file, logger::Logger};
use product_api::{create_router, load_config, AppState};
use tokio::{net::TcpListener, signal};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    Logger::init(&config.logging.level);

    match find_config_file() {
        Some(path) => info!("Loaded configuration from {}", path),
        None => info!("No config file found, using defaults"),
    }

    let addr = format!("{}:{}", config.http.bind_address, config.http.port);
    let state = AppState::from_config(config);
    info!("Product store initialized with {} products", state.products.len());

    let app = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server is running on http://{}", listener.local_addr()?);
    info!("📖 API endpoints:");
    info!("   GET    /api/products              - List products (?category=&search=&page=&limit=)");
    info!("   GET    /api/products/search?name= - Search products by name");
    info!("   GET    /api/products/stats        - Product count per category");
    info!("   GET    /api/products/:id          - Get product");
    info!("   POST   /api/products              - Create product (API key)");
    info!("   PUT    /api/products/:id          - Update product (API key)");
    info!("   DELETE /api/products/:id          - Delete product (API key)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
