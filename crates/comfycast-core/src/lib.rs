pub mod config;
pub mod error;

pub use config::{Config, ServerConfig, WeatherConfig};
pub use error::{AppError, CacheError, ComfortError};

use anyhow::Result;

/// Initialize logging for the process.
///
/// Call once from the binary before constructing any services.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Comfycast core initialized");
    Ok(())
}
