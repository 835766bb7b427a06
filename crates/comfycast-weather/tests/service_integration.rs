//! Integration tests for the weather service using stub sources.
//!
//! These tests verify the full forecast-then-comfort flow through the
//! public API, including cache persistence across a process restart.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use async_trait::async_trait;
use chrono::Local;
use comfycast_comfort::{AdviceRules, ComfortCoefficients, ComfortScorer, Sex};
use comfycast_weather::{
    DailyWeatherRecord, DayCache, ForecastSource, JsonFileStore, WeatherService,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct StubSource {
    label: &'static str,
    records: Vec<DailyWeatherRecord>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ForecastSource for StubSource {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn fetch(&self, _city: &str, days: usize) -> Vec<DailyWeatherRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records.iter().take(days).cloned().collect()
    }
}

/// Helper to build six populated records starting today.
fn six_days(base_temperature: f64) -> Vec<DailyWeatherRecord> {
    let today = Local::now().date_naive();
    (0..6u64)
        .map(|offset| {
            let mut record = DailyWeatherRecord::empty(today + chrono::Days::new(offset));
            record.temperature = base_temperature + offset as f64;
            record.humidity = 55.0;
            record
        })
        .collect()
}

fn service_at(
    cache_path: &Path,
    records: Vec<DailyWeatherRecord>,
    calls: Arc<AtomicUsize>,
) -> WeatherService {
    WeatherService::new(
        Arc::new(StubSource {
            label: "primary",
            records,
            calls,
        }),
        Arc::new(StubSource {
            label: "secondary",
            records: Vec::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }),
        DayCache::new(Box::new(JsonFileStore::new(cache_path))),
        ComfortScorer::new(ComfortCoefficients::default(), AdviceRules::default()),
        6,
    )
}

#[tokio::test]
async fn test_cache_survives_service_restart() {
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");
    let calls = Arc::new(AtomicUsize::new(0));

    let service = service_at(&cache_path, six_days(20.0), Arc::clone(&calls));
    let records = service.forecast("Kyiv").await.unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    drop(service);

    // A fresh service over the same cache file answers without fetching
    let restart_calls = Arc::new(AtomicUsize::new(0));
    let restarted = service_at(&cache_path, six_days(99.0), Arc::clone(&restart_calls));
    let records = restarted.forecast("Kyiv").await.unwrap();

    assert_eq!(restart_calls.load(Ordering::SeqCst), 0);
    assert_eq!(records[0].temperature, 20.0);
}

#[tokio::test]
async fn test_forecast_then_comfort_flow() {
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");
    let service = service_at(
        &cache_path,
        six_days(24.0),
        Arc::new(AtomicUsize::new(0)),
    );

    service.forecast("Lviv").await.unwrap();

    let today = Local::now().date_naive();
    let result = service
        .comfort("Lviv", today, 28.0, 182.0, 78.0, Sex::Male)
        .unwrap();
    assert!((0.0..=1.0).contains(&result.simple_avg));
    assert!((0.0..=1.0).contains(&result.weighted_avg));
}

#[tokio::test]
async fn test_comfort_for_unfetched_city_fails() {
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");
    let service = service_at(
        &cache_path,
        six_days(24.0),
        Arc::new(AtomicUsize::new(0)),
    );

    let today = Local::now().date_naive();
    assert!(service
        .comfort("Odesa", today, 28.0, 182.0, 78.0, Sex::Female)
        .is_err());
}
