//! Thin asynchronous client for a published price sheet.
//!
//! - Fetches a JSON [`PriceSheet`] from a configured URL.
//! - Keeps a 60-minute in-memory cache and a 7-day disk cache, falling back
//!   to stale copies when the network is unavailable.
//! - Without a URL it serves the builtin sheet.

use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, SystemTime},
};

use reqwest::{Client, Url};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::PriceSheet;
use crate::infra::cache::{
    cache_path, load_price_sheet_cache, save_price_sheet_cache, PriceSheetCache,
};
use crate::util::version::user_agent;

const MEMORY_TTL: Duration = Duration::from_secs(60 * 60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum PriceSourceError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode price sheet: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Builtin,
    Fresh,
    Cached,
    Stale,
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    fn new(data: T, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

#[derive(Clone)]
pub struct PriceSheetClient {
    http: Client,
    url: Option<Url>,
    cache: Arc<Mutex<Option<Cached<PriceSheet>>>>,
    disk_path: PathBuf,
}

impl PriceSheetClient {
    /// Client that never touches the network.
    pub fn builtin() -> Result<Self, PriceSourceError> {
        Self::build(None)
    }

    pub fn with_url(url: &str) -> Result<Self, PriceSourceError> {
        Self::build(Some(Url::parse(url)?))
    }

    fn build(url: Option<Url>) -> Result<Self, PriceSourceError> {
        let http = Client::builder()
            .user_agent(user_agent())
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            url,
            cache: Arc::new(Mutex::new(None)),
            disk_path: cache_path(),
        })
    }

    pub fn with_disk_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.disk_path = path.into();
        self
    }

    pub async fn get_sheet(&self) -> Result<CachedPayload<PriceSheet>, PriceSourceError> {
        let Some(url) = self.url.clone() else {
            return Ok(CachedPayload::new(
                PriceSheet::builtin(),
                SystemTime::now(),
                CacheStatus::Builtin,
            ));
        };

        if let Some(payload) = self.cached_fresh().await {
            tracing::debug!(url = %url, "serving price sheet from memory");
            return Ok(payload);
        }

        if let Some(disk) = self.disk_cache_for(&url) {
            if !disk.is_expired() {
                tracing::info!(url = %url, age = %disk.age_string(), "disk price sheet cache valid");
                let fetched_at = SystemTime::now() - disk.age();
                *self.cache.lock().await = Some(Cached::new(disk.sheet.clone(), fetched_at));
                return Ok(CachedPayload::new(disk.sheet, fetched_at, CacheStatus::Cached));
            }
            tracing::info!(url = %url, age = %disk.age_string(), "disk price sheet cache expired, refreshing");
        }

        match self.fetch(&url).await {
            Ok(sheet) => Ok(self.store(&url, sheet).await),
            Err(error) => {
                tracing::warn!(url = %url, error = %error, "price sheet request failed");
                if let Some(stale) = self.cached_stale().await {
                    return Ok(stale);
                }
                if let Some(disk) = self.disk_cache_for(&url) {
                    tracing::warn!(age = %disk.age_string(), "falling back to expired disk cache");
                    let fetched_at = SystemTime::now() - disk.age();
                    return Ok(CachedPayload::new(disk.sheet, fetched_at, CacheStatus::Stale));
                }
                Err(error)
            }
        }
    }

    async fn fetch(&self, url: &Url) -> Result<PriceSheet, PriceSourceError> {
        tracing::info!(url = %url, "fetching price sheet");
        let body = self
            .http
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let sheet: PriceSheet =
            serde_json::from_str(&body).map_err(|err| PriceSourceError::Decode(err.to_string()))?;
        tracing::info!(
            connectors = sheet.connectors.len(),
            cables = sheet.cables.len(),
            "fetched price sheet"
        );
        Ok(sheet)
    }

    fn disk_cache_for(&self, url: &Url) -> Option<PriceSheetCache> {
        load_price_sheet_cache(&self.disk_path).filter(|cache| cache.source == url.as_str())
    }

    async fn cached_fresh(&self) -> Option<CachedPayload<PriceSheet>> {
        let cache = self.cache.lock().await;
        cache.as_ref().and_then(|entry| entry.if_fresh(MEMORY_TTL))
    }

    async fn cached_stale(&self) -> Option<CachedPayload<PriceSheet>> {
        let cache = self.cache.lock().await;
        cache.as_ref().map(Cached::stale)
    }

    async fn store(&self, url: &Url, sheet: PriceSheet) -> CachedPayload<PriceSheet> {
        let fetched_at = SystemTime::now();
        let disk = PriceSheetCache::new(url.as_str(), sheet.clone());
        if let Err(e) = save_price_sheet_cache(&self.disk_path, &disk) {
            tracing::warn!(error = %e, "failed to save price sheet cache");
        }
        *self.cache.lock().await = Some(Cached::new(sheet.clone(), fetched_at));
        CachedPayload::new(sheet, fetched_at, CacheStatus::Fresh)
    }
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedPayload::new(
                self.value.clone(),
                self.fetched_at,
                CacheStatus::Cached,
            ))
        } else {
            None
        }
    }

    fn stale(&self) -> CachedPayload<T> {
        CachedPayload::new(self.value.clone(), self.fetched_at, CacheStatus::Stale)
    }
}
