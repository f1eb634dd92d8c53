use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod caching;
mod config;
mod docs;
mod error;
mod irristrat;
mod routes;
mod validation;

use config::Config;
use irristrat::client::IrristratClient;
use routes::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "station_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize irristrat client
    let irristrat = Arc::new(IrristratClient::new(config.clone())?);
    tracing::info!("Proxying irristrat at {}", config.irristrat_base_url);

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        config: Arc::new(config),
        irristrat,
    };

    let app = create_router(state).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server starting on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
