//! Movies ETL Main Entry Point
//!
//! This is the main binary for the movies sync pipeline. It polls the
//! relational store for modified rows and indexes them into OpenSearch.

use dotenv::dotenv;
use movies_etl::{Dependencies, EtlError};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("movies_etl=info,movies_search_repository=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    info!(
        service_name = "movies-etl",
        service_version = env!("CARGO_PKG_VERSION"),
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), EtlError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    info!("Starting movies sync pipeline");

    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match deps.driver.run().await {
        Ok(()) => {
            info!("Sync pipeline stopped cleanly");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Sync pipeline failed");
            Err(e.into())
        }
    }
}
