//! Orchestration of sources, merge, cache, and scoring.

use crate::adapter::ForecastSource;
use crate::cache::DayCache;
use crate::merge::merge_daily;
use crate::types::DailyWeatherRecord;
use chrono::{Local, NaiveDate};
use comfycast_comfort::{ComfortResult, ComfortScorer, DayWeather, Sex};
use comfycast_core::CacheError;
use std::sync::Arc;

/// Answers forecast and comfort queries by composing the two sources, the
/// merge step, the day cache, and the comfort scorer.
pub struct WeatherService {
    primary: Arc<dyn ForecastSource>,
    secondary: Arc<dyn ForecastSource>,
    cache: DayCache,
    scorer: ComfortScorer,
    forecast_days: usize,
}

impl WeatherService {
    pub fn new(
        primary: Arc<dyn ForecastSource>,
        secondary: Arc<dyn ForecastSource>,
        cache: DayCache,
        scorer: ComfortScorer,
        forecast_days: usize,
    ) -> Self {
        Self {
            primary,
            secondary,
            cache,
            scorer,
            forecast_days,
        }
    }

    /// Consecutive calendar days starting today on the service's own clock.
    pub fn target_dates(&self) -> Vec<NaiveDate> {
        let today = Local::now().date_naive();
        (0..self.forecast_days as u64)
            .map(|offset| today + chrono::Days::new(offset))
            .collect()
    }

    /// Daily forecast for `city`, one record per target date.
    ///
    /// Fully cached cities are answered without touching the network. On any
    /// missing day both sources are queried concurrently, reconciled, and the
    /// gaps filled; days neither source covered come back as defaulted
    /// records rather than holes.
    pub async fn forecast(&self, city: &str) -> Result<Vec<DailyWeatherRecord>, CacheError> {
        let dates = self.target_dates();

        if !self.cache.has_all(city, &dates) {
            tracing::info!("Cache incomplete for {}, querying sources", city);
            let (primary, secondary) = tokio::join!(
                self.primary.fetch(city, self.forecast_days),
                self.secondary.fetch(city, self.forecast_days)
            );
            tracing::debug!(
                "{} supplied {} records, {} supplied {}",
                self.primary.name(),
                primary.len(),
                self.secondary.name(),
                secondary.len()
            );

            let merged = merge_daily(&primary, &secondary, &dates);
            let outcome = self.cache.fill_missing(city, &merged)?;
            tracing::info!(
                "Cached {} new days for {} ({} already present)",
                outcome.created,
                city,
                outcome.kept
            );
        }

        self.cache.get_range(city, &dates)
    }

    /// Comfort evaluation for one cached day. Never fetches: a day that was
    /// not already cached by a forecast query is a not-found condition.
    pub fn comfort(
        &self,
        city: &str,
        date: NaiveDate,
        age: f64,
        height_cm: f64,
        weight_kg: f64,
        sex: Sex,
    ) -> Result<ComfortResult, CacheError> {
        let records = self.cache.get_range(city, &[date])?;
        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| CacheError::DayNotCached {
                city: city.to_string(),
                date: date.to_string(),
            })?;

        Ok(self
            .scorer
            .score(&DayWeather::from(&record), age, height_cm, weight_kg, sex))
    }
}
