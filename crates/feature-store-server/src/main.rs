//! Feature Store HTTP Server
//!
//! Boots a `FeatureStore` facade (C7) over a CSV-backed raw data provider
//! and exposes it as a REST API.

mod api;
mod config;
mod error;
mod features;
mod raw_data;

use crate::config::{L2Backend, ServerConfig};
use crate::raw_data::CsvRawDataProvider;
use anyhow::Result;
use feature_store_sdk::FeatureStoreBuilder;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub type AppFeatureStore = feature_store_sdk::FeatureStore<CsvRawDataProvider>;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let config = ServerConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let store = Arc::new(init_store(&config).await?);
    info!(features = store.registry().len(), "feature store initialized");

    let app = api::create_router(store);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    info!("  Health check: http://{}/health", addr);
    info!("  Feature API:  http://{}/v1/features", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feature_store_server=info,feature_store_sdk=info,feature_store_runtime=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}

/// Build the `FeatureStore`: the built-in feature catalog, a CSV-backed raw
/// data provider rooted at `config.data_dir`, and whichever L2 backend the
/// config selects (in-memory by default, Postgres when configured and the
/// `postgres` feature is enabled).
async fn init_store(config: &ServerConfig) -> Result<AppFeatureStore> {
    let provider = CsvRawDataProvider::new(config.data_dir.clone());
    let mut builder = FeatureStoreBuilder::new(provider)
        .with_features(features::builtin_definitions())
        .with_config(config.feature_store.clone());

    builder = match &config.l2 {
        L2Backend::InMemory => builder,
        #[cfg(feature = "postgres")]
        L2Backend::Postgres { url } => {
            let pool = feature_store_repository::PostgresL2Store::connect(url).await?;
            builder.with_l2(Arc::new(pool))
        }
        #[cfg(not(feature = "postgres"))]
        L2Backend::Postgres { .. } => {
            anyhow::bail!("configured L2 backend is postgres, but this binary was built without the `postgres` feature");
        }
    };

    Ok(builder.build()?)
}
