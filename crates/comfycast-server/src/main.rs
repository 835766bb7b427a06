//! Comfycast HTTP server binary.
//!
//! Wires configuration, the two upstream forecast sources, the day cache,
//! and the comfort scorer into one [`WeatherService`], then serves the
//! routes over axum.

use anyhow::{Context, Result};
use comfycast_comfort::{AdviceRules, ComfortCoefficients, ComfortScorer};
use comfycast_core::Config;
use comfycast_weather::{
    DayCache, JsonFileStore, OpenMeteoSource, OpenWeatherSource, WeatherService,
};
use std::sync::Arc;
use std::time::Duration;

mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    comfycast_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    let timeout = Duration::from_secs(config.weather.request_timeout_secs);

    let primary = Arc::new(OpenMeteoSource::new(timeout)?);
    let secondary = Arc::new(OpenWeatherSource::new(
        config.weather.openweather_api_key.clone(),
        timeout,
    )?);

    let cache = DayCache::new(Box::new(JsonFileStore::new(config.cache_path())));
    let coefficients = ComfortCoefficients::load_or_default(Config::coefficients_path()?);
    let rules = AdviceRules::load_or_default(Config::advice_rules_path()?);
    let scorer = ComfortScorer::new(coefficients, rules);

    let service = WeatherService::new(
        primary,
        secondary,
        cache,
        scorer,
        config.weather.forecast_days,
    );
    let context = Arc::new(routes::AppContext { service });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Comfycast listening on {}", addr);

    axum::serve(listener, routes::router(context))
        .await
        .context("Server error")?;

    Ok(())
}
