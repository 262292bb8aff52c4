use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::sync::Arc;

mod config;
mod gif;
mod holiday;
mod pipeline;
mod render;
mod routes;
mod upstream;
mod utils;

use config::Config;
use pipeline::RequestPipeline;
use routes::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "holiday_gif_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        country = %config.holiday_country,
        year = config.holiday_year,
        cache = %config.cache_path.display(),
        "configuration loaded"
    );

    let pipeline = Arc::new(RequestPipeline::new(&config));
    let bind_addr = config.bind_addr.clone();

    let state = AppState {
        config: Arc::new(config),
        pipeline,
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Now listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
