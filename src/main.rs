use jumapel_backend::{config::AppConfig, routes::build_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,jumapel_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().expect("Invalid configuration");
    let bind_address = config.bind_address();
    let expected_chain_id = config.chain.chain_id;

    let state = AppState::from_config(config).expect("Failed to build application state");

    tracing::info!(
        pipeline = %state.ip_assets.pipeline(),
        commercial_rev_share = state.ip_assets.license_terms().commercial_rev_share,
        "Checking Story RPC chain id..."
    );
    match state.ip_assets.verify_chain().await {
        Ok(chain_id) => tracing::info!(chain_id, "Connected to Story RPC"),
        Err(e) => tracing::warn!(
            expected_chain_id,
            error = %e,
            "Story RPC check failed; minting will likely fail until it is fixed"
        ),
    }

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .expect("Failed to bind server address");

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
