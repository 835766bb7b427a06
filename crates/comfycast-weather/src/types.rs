use chrono::NaiveDate;
use comfycast_comfort::DayWeather;
use serde::{Deserialize, Serialize};

/// Geographic coordinates resolved from a city name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Canonical per-day weather record, the unified shape used internally
/// regardless of which upstream supplied the data.
///
/// Every numeric field defaults to zero when a source omits it; the record
/// is never partially null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeatherRecord {
    pub date: NaiveDate,
    /// Mean temperature in degrees Celsius.
    #[serde(default)]
    pub temperature: f64,
    /// Mean relative humidity in percent.
    #[serde(default)]
    pub humidity: f64,
    /// Maximum wind speed in m/s.
    #[serde(default)]
    pub windspeed: f64,
    /// Maximum precipitation probability in percent (0 to 100).
    #[serde(default)]
    pub precipitation_probability: f64,
    /// Maximum UV index, rounded to an integer.
    #[serde(default)]
    pub uv_index: i64,
    /// Mean cloud cover in percent.
    #[serde(default)]
    pub cloudcover: f64,
    /// Mean aerosol optical depth, zero when unavailable.
    #[serde(default)]
    pub aod: f64,
}

impl DailyWeatherRecord {
    /// A record for `date` with every observation defaulted.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            temperature: 0.0,
            humidity: 0.0,
            windspeed: 0.0,
            precipitation_probability: 0.0,
            uv_index: 0,
            cloudcover: 0.0,
            aod: 0.0,
        }
    }

    /// True when no observation differs from its default. Used by the cache
    /// to decide whether an existing entry may be filled in.
    pub fn is_empty(&self) -> bool {
        self.temperature == 0.0
            && self.humidity == 0.0
            && self.windspeed == 0.0
            && self.precipitation_probability == 0.0
            && self.uv_index == 0
            && self.cloudcover == 0.0
            && self.aod == 0.0
    }
}

impl From<&DailyWeatherRecord> for DayWeather {
    fn from(record: &DailyWeatherRecord) -> Self {
        DayWeather {
            temperature: record.temperature,
            humidity: record.humidity,
            windspeed: record.windspeed,
            uv_index: record.uv_index,
            aod: record.aod,
        }
    }
}
