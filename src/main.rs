use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use torneos::{api_router, AppState, FsRecordStore, ServerConfig, TokenConfig};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "torneos=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tournament catalog server");

    let config = ServerConfig::from_env();
    if config.uses_default_secret() {
        warn!(
            "JWT_SECRET is not set; using the insecure development default. \
             Set JWT_SECRET before deploying."
        );
    }

    let store = Arc::new(FsRecordStore::new(config.data_dir.clone()));
    let app_state = AppState::new(store, TokenConfig::new(config.jwt_secret.clone()));

    let app = api_router(app_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .unwrap();
    info!(
        port = config.port,
        data_dir = %config.data_dir.display(),
        "Server running"
    );
    axum::serve(listener, app).await.unwrap();
}
