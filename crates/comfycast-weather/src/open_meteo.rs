//! Open-Meteo forecast source. Free, no API key required.
//!
//! Geocodes the city via the Open-Meteo geocoding API, pulls a bounded daily
//! forecast, then enriches each day with a mean aerosol optical depth
//! bucketed from the air-quality API's hourly series. Air-quality failures
//! leave the aerosol field at zero rather than discarding the forecast.

use crate::adapter::ForecastSource;
use crate::types::{Coordinates, DailyWeatherRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

const DAILY_VARIABLES: &str = "temperature_2m_mean,relative_humidity_2m_mean,uv_index_max,\
                               precipitation_probability_max,wind_speed_10m_max,cloud_cover_mean";

#[derive(Debug, Deserialize)]
struct GeoResponse {
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    uv_index_max: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover_mean: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    aerosol_optical_depth: Vec<Option<f64>>,
}

fn value_at(series: &[Option<f64>], index: usize) -> f64 {
    series.get(index).copied().flatten().unwrap_or(0.0)
}

/// Primary forecast source backed by the Open-Meteo APIs.
#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    client: Arc<Client>,
    geocoding_url: String,
    forecast_url: String,
    air_quality_url: String,
}

impl OpenMeteoSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client: Arc::new(client),
            geocoding_url: GEOCODING_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
            air_quality_url: AIR_QUALITY_URL.to_string(),
        })
    }

    #[cfg(test)]
    fn new_with_base_url(base_url: &str) -> Self {
        Self {
            client: Arc::new(Client::new()),
            geocoding_url: format!("{}/v1/search", base_url),
            forecast_url: format!("{}/v1/forecast", base_url),
            air_quality_url: format!("{}/v1/air-quality", base_url),
        }
    }

    async fn geocode(&self, city: &str) -> Option<Coordinates> {
        let response = match self
            .client
            .get(&self.geocoding_url)
            .query(&[
                ("name", city),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Open-Meteo geocoding request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Open-Meteo geocoding returned status {}", response.status());
            return None;
        }

        let body: GeoResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Open-Meteo geocoding parse error: {}", e);
                return None;
            }
        };

        let first = body.results.unwrap_or_default().into_iter().next()?;
        Some(Coordinates {
            latitude: first.latitude,
            longitude: first.longitude,
        })
    }

    async fn fetch_daily(&self, coords: Coordinates, days: usize) -> Option<DailyBlock> {
        let response = match self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("timezone", "auto".to_string()),
                ("wind_speed_unit", "ms".to_string()),
                ("forecast_days", days.to_string()),
                ("daily", DAILY_VARIABLES.to_string()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Open-Meteo forecast request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Open-Meteo forecast returned status {}", response.status());
            return None;
        }

        match response.json::<ForecastResponse>().await {
            Ok(body) => body.daily,
            Err(e) => {
                tracing::warn!("Open-Meteo forecast parse error: {}", e);
                None
            }
        }
    }

    async fn fetch_air_quality(&self, coords: Coordinates) -> Option<HourlyBlock> {
        let response = match self
            .client
            .get(&self.air_quality_url)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("timezone", "auto".to_string()),
                ("hourly", "aerosol_optical_depth".to_string()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Air-quality request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Air-quality returned status {}", response.status());
            return None;
        }

        match response.json::<AirQualityResponse>().await {
            Ok(body) => body.hourly,
            Err(e) => {
                tracing::debug!("Air-quality parse error: {}", e);
                None
            }
        }
    }

    /// Average the hourly aerosol series per calendar day and write each
    /// day's mean into the matching record.
    async fn enrich_aod(&self, coords: Coordinates, records: &mut [DailyWeatherRecord]) {
        let Some(hourly) = self.fetch_air_quality(coords).await else {
            tracing::debug!("No air-quality data, aerosol optical depth stays 0");
            return;
        };

        let mut buckets: HashMap<&str, (f64, u32)> = HashMap::new();
        for (time, value) in hourly.time.iter().zip(hourly.aerosol_optical_depth.iter()) {
            // Hourly timestamps look like "2026-08-06T13:00"
            let day = time.split('T').next().unwrap_or(time.as_str());
            let bucket = buckets.entry(day).or_insert((0.0, 0));
            bucket.0 += value.unwrap_or(0.0);
            bucket.1 += 1;
        }

        for record in records.iter_mut() {
            let key = record.date.to_string();
            if let Some((sum, count)) = buckets.get(key.as_str()) {
                if *count > 0 {
                    record.aod = sum / f64::from(*count);
                }
            }
        }
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoSource {
    fn name(&self) -> &'static str {
        "open-meteo"
    }

    async fn fetch(&self, city: &str, days: usize) -> Vec<DailyWeatherRecord> {
        let Some(coords) = self.geocode(city).await else {
            tracing::warn!("Open-Meteo could not geocode {:?}, returning no data", city);
            return Vec::new();
        };

        let Some(daily) = self.fetch_daily(coords, days).await else {
            return Vec::new();
        };

        let mut records = Vec::new();
        for (i, raw_date) in daily.time.iter().take(days).enumerate() {
            let date = match raw_date.parse::<NaiveDate>() {
                Ok(d) => d,
                Err(e) => {
                    tracing::debug!("Skipping malformed forecast date {:?}: {}", raw_date, e);
                    continue;
                }
            };
            records.push(DailyWeatherRecord {
                date,
                temperature: value_at(&daily.temperature_2m_mean, i),
                humidity: value_at(&daily.relative_humidity_2m_mean, i),
                windspeed: value_at(&daily.wind_speed_10m_max, i),
                precipitation_probability: value_at(&daily.precipitation_probability_max, i),
                uv_index: value_at(&daily.uv_index_max, i) as i64,
                cloudcover: value_at(&daily.cloud_cover_mean, i),
                aod: 0.0,
            });
        }

        self.enrich_aod(coords, &mut records).await;

        tracing::info!("Open-Meteo returned {} records for {}", records.len(), city);
        records
    }
}
