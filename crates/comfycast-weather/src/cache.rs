//! Persistent per-city, per-day forecast cache.
//!
//! The store is a single JSON document: lowercased city name to a map from
//! ISO date string to one canonical record. Every mutation is a full
//! read-modify-write of the document, serialized through one process-wide
//! lock. Entries accumulate monotonically; a day that already holds a
//! non-empty record is never overwritten.

use crate::types::DailyWeatherRecord;
use chrono::NaiveDate;
use comfycast_core::CacheError;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Days cached for one city, keyed by ISO date string.
pub type CityDays = BTreeMap<String, DailyWeatherRecord>;

/// Minimal key-value surface over the persisted document, so the
/// whole-document file store can later be swapped for a real database
/// without touching cache callers.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<CityDays>, CacheError>;
    fn put(&self, key: &str, value: &CityDays) -> Result<(), CacheError>;
    fn list_keys(&self) -> Result<Vec<String>, CacheError>;
}

/// Whole-document JSON file store. Each operation loads the full document
/// and writes it back; a corrupt or missing file reads as empty and is
/// rebuilt on the next write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> HashMap<String, CityDays> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                tracing::warn!(
                    "Cache file {} unreadable ({}), treating as empty",
                    self.path.display(),
                    e
                );
                return HashMap::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(
                    "Cache file {} is corrupt ({}), treating as empty",
                    self.path.display(),
                    e
                );
                HashMap::new()
            }
        }
    }

    fn save(&self, doc: &HashMap<String, CityDays>) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CacheError::Storage(format!("create {}: {}", parent.display(), e)))?;
        }
        let contents = serde_json::to_string_pretty(doc)
            .map_err(|e| CacheError::Storage(format!("serialize cache: {}", e)))?;
        std::fs::write(&self.path, contents)
            .map_err(|e| CacheError::Storage(format!("write {}: {}", self.path.display(), e)))
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<CityDays>, CacheError> {
        Ok(self.load().remove(key))
    }

    fn put(&self, key: &str, value: &CityDays) -> Result<(), CacheError> {
        let mut doc = self.load();
        doc.insert(key.to_string(), value.clone());
        self.save(&doc)
    }

    fn list_keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys: Vec<String> = self.load().into_keys().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Counts from one fill pass, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOutcome {
    /// Entries inserted because the day was absent or empty.
    pub created: usize,
    /// Entries left untouched because a non-empty record was already there.
    pub kept: usize,
}

/// Day-granular cache over a [`KvStore`], serializing every read-modify-write
/// cycle behind one lock.
pub struct DayCache {
    store: Box<dyn KvStore>,
    lock: Mutex<()>,
}

impl DayCache {
    pub fn new(store: Box<dyn KvStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    fn city_key(city: &str) -> String {
        city.trim().to_lowercase()
    }

    /// True only if every requested date holds a non-empty record.
    pub fn has_all(&self, city: &str, dates: &[NaiveDate]) -> bool {
        let _guard = self.lock.lock();
        let days = match self.store.get(&Self::city_key(city)) {
            Ok(Some(days)) => days,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", city, e);
                return false;
            }
        };
        dates.iter().all(|date| {
            days.get(&date.to_string())
                .is_some_and(|record| !record.is_empty())
        })
    }

    /// Records for the requested dates in input order. Fails on the first
    /// date that was never cached; the comfort path relies on this instead
    /// of fetching on demand.
    pub fn get_range(
        &self,
        city: &str,
        dates: &[NaiveDate],
    ) -> Result<Vec<DailyWeatherRecord>, CacheError> {
        let _guard = self.lock.lock();
        let days = self
            .store
            .get(&Self::city_key(city))?
            .unwrap_or_default();

        dates
            .iter()
            .map(|date| {
                days.get(&date.to_string())
                    .cloned()
                    .ok_or_else(|| CacheError::DayNotCached {
                        city: city.to_string(),
                        date: date.to_string(),
                    })
            })
            .collect()
    }

    /// Insert each supplied record whose date is absent or empty for the
    /// city; existing non-empty days are left untouched.
    pub fn fill_missing(
        &self,
        city: &str,
        canonical: &BTreeMap<NaiveDate, DailyWeatherRecord>,
    ) -> Result<FillOutcome, CacheError> {
        let _guard = self.lock.lock();
        let key = Self::city_key(city);
        let mut days = self.store.get(&key)?.unwrap_or_default();

        let mut outcome = FillOutcome { created: 0, kept: 0 };
        for (date, record) in canonical {
            let date_key = date.to_string();
            match days.get(&date_key) {
                Some(existing) if !existing.is_empty() => outcome.kept += 1,
                _ => {
                    days.insert(date_key, record.clone());
                    outcome.created += 1;
                }
            }
        }

        if outcome.created > 0 {
            self.store.put(&key, &days)?;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use std::io::Write;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn populated(day: &str, temperature: f64) -> DailyWeatherRecord {
        let mut record = DailyWeatherRecord::empty(date(day));
        record.temperature = temperature;
        record
    }

    fn cache_in(dir: &tempfile::TempDir) -> DayCache {
        DayCache::new(Box::new(JsonFileStore::new(dir.path().join("cache.json"))))
    }

    fn canonical(records: &[DailyWeatherRecord]) -> BTreeMap<NaiveDate, DailyWeatherRecord> {
        records.iter().map(|r| (r.date, r.clone())).collect()
    }

    #[test]
    fn test_fill_then_get_range_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        let records = [populated("2026-08-07", 23.0), populated("2026-08-06", 21.0)];
        cache.fill_missing("Kyiv", &canonical(&records)).unwrap();

        let range = cache
            .get_range("Kyiv", &[date("2026-08-06"), date("2026-08-07")])
            .unwrap();
        assert_eq!(range[0].temperature, 21.0);
        assert_eq!(range[1].temperature, 23.0);
    }

    #[test]
    fn test_city_key_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        cache
            .fill_missing("KYIV", &canonical(&[populated("2026-08-06", 21.0)]))
            .unwrap();

        assert!(cache.has_all("kyiv", &[date("2026-08-06")]));
        assert!(cache.get_range("Kyiv", &[date("2026-08-06")]).is_ok());
    }

    #[test]
    fn test_has_all_requires_every_date_non_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        let records = [
            populated("2026-08-06", 21.0),
            DailyWeatherRecord::empty(date("2026-08-07")),
        ];
        cache.fill_missing("Kyiv", &canonical(&records)).unwrap();

        assert!(cache.has_all("Kyiv", &[date("2026-08-06")]));
        assert!(!cache.has_all("Kyiv", &[date("2026-08-06"), date("2026-08-07")]));
        assert!(!cache.has_all("Kyiv", &[date("2026-08-08")]));
        assert!(!cache.has_all("Lviv", &[date("2026-08-06")]));
    }

    #[test]
    fn test_get_range_fails_on_uncached_date() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        cache
            .fill_missing("Kyiv", &canonical(&[populated("2026-08-06", 21.0)]))
            .unwrap();

        let err = cache
            .get_range("Kyiv", &[date("2026-08-06"), date("2026-08-09")])
            .unwrap_err();
        assert!(matches!(err, CacheError::DayNotCached { .. }));
    }

    #[test]
    fn test_fill_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        let data = canonical(&[populated("2026-08-06", 21.0)]);

        let first = cache.fill_missing("Kyiv", &data).unwrap();
        assert_eq!(first, FillOutcome { created: 1, kept: 0 });

        let second = cache.fill_missing("Kyiv", &data).unwrap();
        assert_eq!(second, FillOutcome { created: 0, kept: 1 });
    }

    #[test]
    fn test_first_write_wins_per_day() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        cache
            .fill_missing("Kyiv", &canonical(&[populated("2026-08-06", 21.0)]))
            .unwrap();
        cache
            .fill_missing("Kyiv", &canonical(&[populated("2026-08-06", 99.0)]))
            .unwrap();

        let range = cache.get_range("Kyiv", &[date("2026-08-06")]).unwrap();
        assert_eq!(range[0].temperature, 21.0);
    }

    #[test]
    fn test_empty_day_is_refilled() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        cache
            .fill_missing(
                "Kyiv",
                &canonical(&[DailyWeatherRecord::empty(date("2026-08-06"))]),
            )
            .unwrap();
        let outcome = cache
            .fill_missing("Kyiv", &canonical(&[populated("2026-08-06", 21.0)]))
            .unwrap();

        assert_eq!(outcome, FillOutcome { created: 1, kept: 0 });
        let range = cache.get_range("Kyiv", &[date("2026-08-06")]).unwrap();
        assert_eq!(range[0].temperature, 21.0);
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{{ not json").unwrap();

        let cache = DayCache::new(Box::new(JsonFileStore::new(&path)));
        assert!(!cache.has_all("Kyiv", &[date("2026-08-06")]));

        // A write rebuilds the document from scratch
        cache
            .fill_missing("Kyiv", &canonical(&[populated("2026-08-06", 21.0)]))
            .unwrap();
        assert!(cache.has_all("Kyiv", &[date("2026-08-06")]));
    }

    #[test]
    fn test_store_lists_cities() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("cache.json"));
        let days: CityDays =
            [("2026-08-06".to_string(), populated("2026-08-06", 21.0))].into();
        store.put("kyiv", &days).unwrap();
        store.put("lviv", &days).unwrap();

        assert_eq!(store.list_keys().unwrap(), vec!["kyiv", "lviv"]);
        assert!(store.get("odesa").unwrap().is_none());
    }
}
