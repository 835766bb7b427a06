//! Field-level reconciliation of the two forecast sources.

use crate::types::DailyWeatherRecord;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

fn fill_f64(target: &mut f64, source: f64) {
    if *target == 0.0 {
        *target = source;
    }
}

fn fill_i64(target: &mut i64, source: i64) {
    if *target == 0 {
        *target = source;
    }
}

/// Merge the primary and secondary record sets over `target_dates`.
///
/// For each target date the primary record is the base when present; any
/// field still at its default is filled from the secondary record. A date
/// covered by neither source still yields a fully defaulted record, so the
/// result always has one entry per target date.
pub fn merge_daily(
    primary: &[DailyWeatherRecord],
    secondary: &[DailyWeatherRecord],
    target_dates: &[NaiveDate],
) -> BTreeMap<NaiveDate, DailyWeatherRecord> {
    let primary_by_date: HashMap<NaiveDate, &DailyWeatherRecord> =
        primary.iter().map(|r| (r.date, r)).collect();
    let secondary_by_date: HashMap<NaiveDate, &DailyWeatherRecord> =
        secondary.iter().map(|r| (r.date, r)).collect();

    let mut merged = BTreeMap::new();
    for &date in target_dates {
        let mut record = primary_by_date
            .get(&date)
            .map(|r| (*r).clone())
            .unwrap_or_else(|| DailyWeatherRecord::empty(date));

        if let Some(secondary) = secondary_by_date.get(&date) {
            fill_f64(&mut record.temperature, secondary.temperature);
            fill_f64(&mut record.humidity, secondary.humidity);
            fill_f64(&mut record.windspeed, secondary.windspeed);
            fill_f64(
                &mut record.precipitation_probability,
                secondary.precipitation_probability,
            );
            fill_i64(&mut record.uv_index, secondary.uv_index);
            fill_f64(&mut record.cloudcover, secondary.cloudcover);
            fill_f64(&mut record.aod, secondary.aod);
        }

        merged.insert(date, record);
    }

    merged
}
