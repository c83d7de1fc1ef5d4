//! Persistent on-disk caching for the price sheet with TTL tracking.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::domain::PriceSheet;

const CACHE_DIR: &str = "fiber-cost-console";
const CACHE_FILENAME: &str = "price_sheet_cache.json";

/// Cache TTL: 7 days.
pub const PRICE_SHEET_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Cached price sheet along with where and when it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSheetCache {
    /// URL the sheet was fetched from.
    pub source: String,
    /// Seconds since the Unix epoch.
    pub cached_at: u64,
    pub sheet: PriceSheet,
}

impl PriceSheetCache {
    pub fn new(source: impl Into<String>, sheet: PriceSheet) -> Self {
        Self {
            source: source.into(),
            cached_at: unix_now(),
            sheet,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.age() > PRICE_SHEET_CACHE_TTL
    }

    /// Time since the sheet was written; zero if the clock went backwards.
    pub fn age(&self) -> Duration {
        Duration::from_secs(unix_now().saturating_sub(self.cached_at))
    }

    /// Largest whole unit of the age, e.g. "42s", "3h" or "7d".
    pub fn age_string(&self) -> String {
        const UNITS: [(u64, &str); 3] = [(86_400, "d"), (3_600, "h"), (60, "m")];
        let secs = self.age().as_secs();
        UNITS
            .iter()
            .find(|(size, _)| secs >= *size)
            .map(|(size, unit)| format!("{}{unit}", secs / size))
            .unwrap_or_else(|| format!("{secs}s"))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Cache file path in the local app data directory.
pub fn cache_path() -> PathBuf {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CACHE_DIR);

        let _ = fs::create_dir_all(&base);

        base.join(CACHE_FILENAME)
    })
    .clone()
}

/// Load the cached sheet from `path`. Missing, unreadable or corrupt files
/// are treated as no cache.
pub fn load_price_sheet_cache(path: &Path) -> Option<PriceSheetCache> {
    if !path.exists() {
        tracing::info!(target: "price_cache", path = %path.display(), "no price sheet cache found");
        return None;
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<PriceSheetCache>(&content) {
            Ok(cache) => {
                tracing::info!(
                    target: "price_cache",
                    source = %cache.source,
                    age = %cache.age_string(),
                    "loaded price sheet cache"
                );
                Some(cache)
            }
            Err(e) => {
                tracing::warn!(target: "price_cache", error = %e, "failed to parse price sheet cache");
                None
            }
        },
        Err(e) => {
            tracing::warn!(target: "price_cache", error = %e, "failed to read price sheet cache");
            None
        }
    }
}

pub fn save_price_sheet_cache(path: &Path, cache: &PriceSheetCache) -> Result<(), io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(cache)?;
    fs::write(path, content)?;
    tracing::info!(
        target: "price_cache",
        source = %cache.source,
        path = %path.display(),
        "saved price sheet cache"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CACHE_FILENAME);
        let cache = PriceSheetCache::new("https://prices.example/sheet.json", PriceSheet::builtin());

        save_price_sheet_cache(&path, &cache).unwrap();
        let loaded = load_price_sheet_cache(&path).unwrap();

        assert_eq!(loaded.source, cache.source);
        assert_eq!(loaded.sheet, cache.sheet);
        assert!(!loaded.is_expired());
    }

    #[test]
    fn corrupt_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CACHE_FILENAME);
        fs::write(&path, "{ not json").unwrap();
        assert!(load_price_sheet_cache(&path).is_none());
        assert!(load_price_sheet_cache(&dir.path().join("missing.json")).is_none());
    }

    #[test]
    fn old_cache_expires() {
        let mut cache = PriceSheetCache::new("local", PriceSheet::builtin());
        cache.cached_at = unix_now() - PRICE_SHEET_CACHE_TTL.as_secs() - 60;
        assert!(cache.is_expired());
        assert_eq!(cache.age_string(), "7d");
    }
}
