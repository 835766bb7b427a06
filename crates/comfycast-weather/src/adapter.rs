//! Contract every upstream forecast source implements.

use crate::types::DailyWeatherRecord;
use async_trait::async_trait;

/// A source of daily forecasts for a named city.
///
/// Implementations resolve the city to coordinates themselves and map the
/// provider's response onto [`DailyWeatherRecord`] with every missing field
/// defaulted. "No data" is an empty vector, never an error: a failed
/// geocode, an unreachable provider, or missing credentials all degrade to
/// empty so the other source can still supply records.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Short provider name, used in logs.
    fn name(&self) -> &'static str;

    /// Fetch up to `days` daily records for `city`.
    async fn fetch(&self, city: &str, days: usize) -> Vec<DailyWeatherRecord>;
}
