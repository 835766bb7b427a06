//! Weather aggregation for Comfycast
//!
//! Merges two independent forecast providers into canonical per-day records,
//! caches them per city and day, and answers forecast and comfort queries.

pub mod adapter;
pub mod cache;
pub mod merge;
pub mod open_meteo;
pub mod open_weather;
pub mod service;
pub mod types;

pub use adapter::ForecastSource;
pub use cache::{DayCache, FillOutcome, JsonFileStore, KvStore};
pub use merge::merge_daily;
pub use open_meteo::OpenMeteoSource;
pub use open_weather::OpenWeatherSource;
pub use service::WeatherService;
pub use types::{Coordinates, DailyWeatherRecord};
