//! OpenWeather forecast source.
//!
//! Geocodes via the OpenWeather direct geocoding endpoint and reads the
//! One Call daily forecast, preferring the 3.0 endpoint and falling back to
//! 2.5 when the key is not entitled to it. Day boundaries come from the
//! payload's own timezone offset so each record lands on the city's local
//! calendar day. Aerosol optical depth is not available from this provider
//! and stays zero.

use crate::adapter::ForecastSource;
use crate::types::{Coordinates, DailyWeatherRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const GEO_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";
const ONECALL_URLS: [&str; 2] = [
    "https://api.openweathermap.org/data/3.0/onecall",
    "https://api.openweathermap.org/data/2.5/onecall",
];

#[derive(Debug, Deserialize)]
struct GeoEntry {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    #[serde(default)]
    timezone_offset: i32,
    daily: Option<Vec<OneCallDay>>,
}

#[derive(Debug, Deserialize)]
struct OneCallDay {
    dt: i64,
    temp: Option<TempBlock>,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    /// Precipitation probability, 0 to 1.
    pop: Option<f64>,
    uvi: Option<f64>,
    clouds: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TempBlock {
    day: Option<f64>,
}

/// Secondary forecast source backed by the OpenWeather One Call API.
/// Requires an API key; without one every fetch degrades to no data.
#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    client: Arc<Client>,
    api_key: Option<String>,
    geo_url: String,
    onecall_urls: Vec<String>,
}

impl OpenWeatherSource {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client: Arc::new(client),
            api_key,
            geo_url: GEO_URL.to_string(),
            onecall_urls: ONECALL_URLS.iter().map(|u| (*u).to_string()).collect(),
        })
    }

    #[cfg(test)]
    fn new_with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_key,
            geo_url: format!("{}/geo/1.0/direct", base_url),
            onecall_urls: vec![
                format!("{}/data/3.0/onecall", base_url),
                format!("{}/data/2.5/onecall", base_url),
            ],
        }
    }

    async fn geocode(&self, city: &str, api_key: &str) -> Option<Coordinates> {
        let response = match self
            .client
            .get(&self.geo_url)
            .query(&[("q", city), ("limit", "1"), ("appid", api_key)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("OpenWeather geocoding request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "OpenWeather geocoding returned status {}",
                response.status()
            );
            return None;
        }

        let entries: Vec<GeoEntry> = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("OpenWeather geocoding parse error: {}", e);
                return None;
            }
        };

        let first = entries.into_iter().next()?;
        Some(Coordinates {
            latitude: first.lat,
            longitude: first.lon,
        })
    }

    /// Try the One Call endpoints in order. Unauthorized responses move to
    /// the next endpoint since 3.0 needs a separate subscription.
    async fn onecall_daily(&self, coords: Coordinates, api_key: &str) -> Option<OneCallResponse> {
        for url in &self.onecall_urls {
            let response = match self
                .client
                .get(url)
                .query(&[
                    ("lat", coords.latitude.to_string()),
                    ("lon", coords.longitude.to_string()),
                    ("exclude", "current,minutely,hourly,alerts".to_string()),
                    ("units", "metric".to_string()),
                    ("appid", api_key.to_string()),
                ])
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("OpenWeather request failed for {}: {}", url, e);
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                tracing::warn!("OpenWeather unauthorized ({}) for {}, trying fallback", status, url);
                continue;
            }
            if !status.is_success() {
                tracing::warn!("OpenWeather returned status {} for {}", status, url);
                continue;
            }

            match response.json::<OneCallResponse>().await {
                Ok(body) => return Some(body),
                Err(e) => {
                    tracing::warn!("OpenWeather parse error for {}: {}", url, e);
                    continue;
                }
            }
        }

        tracing::warn!("OpenWeather failed on all endpoints, relying on the other source");
        None
    }
}

#[async_trait]
impl ForecastSource for OpenWeatherSource {
    fn name(&self) -> &'static str {
        "openweather"
    }

    async fn fetch(&self, city: &str, days: usize) -> Vec<DailyWeatherRecord> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("OpenWeather API key not configured, returning no data");
            return Vec::new();
        };

        let Some(coords) = self.geocode(city, api_key).await else {
            tracing::warn!("OpenWeather could not geocode {:?}, returning no data", city);
            return Vec::new();
        };

        let Some(body) = self.onecall_daily(coords, api_key).await else {
            return Vec::new();
        };

        let tz = match FixedOffset::east_opt(body.timezone_offset) {
            Some(tz) => tz,
            None => {
                tracing::debug!("Invalid timezone offset {}, using UTC", body.timezone_offset);
                Utc.fix()
            }
        };

        let mut records = Vec::new();
        for day in body.daily.unwrap_or_default().into_iter().take(days) {
            let Some(moment) = DateTime::from_timestamp(day.dt, 0) else {
                tracing::debug!("Skipping out-of-range timestamp {}", day.dt);
                continue;
            };
            let date = moment.with_timezone(&tz).date_naive();
            records.push(DailyWeatherRecord {
                date,
                temperature: day.temp.and_then(|t| t.day).unwrap_or(0.0),
                humidity: day.humidity.unwrap_or(0.0),
                windspeed: day.wind_speed.unwrap_or(0.0),
                precipitation_probability: day.pop.unwrap_or(0.0) * 100.0,
                uv_index: day.uvi.unwrap_or(0.0).round() as i64,
                cloudcover: day.clouds.unwrap_or(0.0),
                aod: 0.0,
            });
        }

        tracing::info!("OpenWeather returned {} records for {}", records.len(), city);
        records
    }
}
