//! Thin asynchronous client for the OpenCage forward-geocoding API.
//!
//! - Turns free-text queries into ranked [`AddressCandidate`]s.
//! - Keeps a small in-memory cache per (language, query) with stale fallback
//!   when the network is unavailable.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::{AddressCandidate, AddressResolver, Coordinate, Language, ResolveError};
use crate::util::version::user_agent;

pub const DEFAULT_BASE_URL: &str = "https://api.opencagedata.com/";
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);
const RESULT_LIMIT: &str = "5";
/// Expired entries stay available as stale fallback for this many TTLs.
const STALE_RETENTION: u32 = 6;
const MAX_CACHE_ENTRIES: usize = 256;

#[derive(Debug, Error)]
pub enum GeocoderError {
    #[error("no geocoder API key configured")]
    MissingApiKey,
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed geocoder response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("api error {code}: {message}")]
    Api { code: u16, message: String },
}

impl From<GeocoderError> for ResolveError {
    fn from(error: GeocoderError) -> Self {
        match error {
            GeocoderError::MissingApiKey | GeocoderError::InvalidUrl(_) => {
                ResolveError::Configuration(error.to_string())
            }
            GeocoderError::Http(err) => ResolveError::Request(err.without_url().to_string()),
            GeocoderError::Decode(err) => ResolveError::Decode(err.to_string()),
            GeocoderError::Api { .. } => ResolveError::Api(error.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
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

type CacheKey = (Language, String);

#[derive(Clone)]
pub struct OpenCageClient {
    http: Client,
    base_url: Url,
    api_key: String,
    cache: Arc<Mutex<HashMap<CacheKey, Cached<Vec<AddressCandidate>>>>>,
    ttl: Duration,
}

impl OpenCageClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, GeocoderError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    pub fn with_base_url(base: &str, api_key: impl Into<String>) -> Result<Self, GeocoderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GeocoderError::MissingApiKey);
        }
        let base_url = Url::parse(base)?;
        let http = Client::builder().user_agent(user_agent()).build()?;
        Ok(Self {
            http,
            base_url,
            api_key,
            cache: Arc::new(Mutex::new(HashMap::new())),
            ttl: DEFAULT_TTL,
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Geocodes `query`, serving a fresh cache entry when available and an
    /// expired one if the request fails.
    pub async fn geocode(
        &self,
        query: &str,
        language: Language,
    ) -> Result<CachedPayload<Vec<AddressCandidate>>, GeocoderError> {
        let key = cache_key(query, language);
        if let Some(payload) = self.cached(&key).await {
            debug!(query, "serving cached geocode");
            return Ok(payload);
        }

        match self.fetch(query, language).await {
            Ok(candidates) => {
                debug!(query, count = candidates.len(), "geocoder returned candidates");
                Ok(self.store(key, candidates).await)
            }
            Err(error) => {
                if let Some(stale) = self.cached_stale(&key).await {
                    warn!(query, %error, "geocoder failed, serving stale suggestions");
                    return Ok(stale);
                }
                warn!(query, %error, "geocoder request failed");
                Err(error)
            }
        }
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    async fn fetch(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<AddressCandidate>, GeocoderError> {
        // The request URL carries the API key; keep it out of errors and logs.
        let url = self.search_url(query, language)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        parse_response(status, &body)
    }

    fn search_url(&self, query: &str, language: Language) -> Result<Url, GeocoderError> {
        let mut url = self.base_url.join("geocode/v1/json")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("key", &self.api_key)
            .append_pair("language", language.code())
            .append_pair("limit", RESULT_LIMIT)
            .append_pair("no_annotations", "1");
        Ok(url)
    }

    async fn cached(&self, key: &CacheKey) -> Option<CachedPayload<Vec<AddressCandidate>>> {
        let cache = self.cache.lock().await;
        cache.get(key).and_then(|entry| entry.if_fresh(self.ttl))
    }

    async fn cached_stale(&self, key: &CacheKey) -> Option<CachedPayload<Vec<AddressCandidate>>> {
        let cache = self.cache.lock().await;
        cache.get(key).map(Cached::stale)
    }

    async fn store(
        &self,
        key: CacheKey,
        data: Vec<AddressCandidate>,
    ) -> CachedPayload<Vec<AddressCandidate>> {
        let fetched_at = SystemTime::now();
        let payload = CachedPayload::new(data.clone(), fetched_at, CacheStatus::Fresh);

        let mut cache = self.cache.lock().await;
        let retention = self.ttl.saturating_mul(STALE_RETENTION);
        cache.retain(|_, entry| entry.younger_than(retention));
        if cache.len() >= MAX_CACHE_ENTRIES && !cache.contains_key(&key) {
            let oldest = cache
                .iter()
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(stored, _)| stored.clone());
            if let Some(oldest) = oldest {
                cache.remove(&oldest);
            }
        }
        cache.insert(key, Cached::new(data, fetched_at));
        payload
    }
}

impl AddressResolver for OpenCageClient {
    async fn resolve(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<AddressCandidate>, ResolveError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let payload = self.geocode(query.trim(), language).await?;
        Ok(payload.data)
    }
}

fn cache_key(query: &str, language: Language) -> CacheKey {
    (language, query.trim().to_lowercase())
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn younger_than(&self, age: Duration) -> bool {
        self.fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= age)
            .unwrap_or(false)
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self.younger_than(ttl) {
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

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResultDto>,
    #[serde(default)]
    status: Option<StatusDto>,
}

#[derive(Debug, Deserialize)]
struct StatusDto {
    code: u16,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResultDto {
    formatted: String,
    geometry: GeometryDto,
}

#[derive(Debug, Deserialize)]
struct GeometryDto {
    lat: f64,
    lng: f64,
}

impl GeocodeResultDto {
    fn into_candidate(self) -> Option<AddressCandidate> {
        match Coordinate::new(self.geometry.lat, self.geometry.lng) {
            Ok(coordinate) => Some(AddressCandidate {
                formatted: self.formatted,
                coordinate,
            }),
            Err(err) => {
                debug!(formatted = %self.formatted, %err, "dropping geocode result");
                None
            }
        }
    }
}

/// Decodes a geocoder body. A non-success HTTP status or a non-200
/// `status.code` in the body is reported as an API error.
fn parse_response(
    http_status: StatusCode,
    body: &str,
) -> Result<Vec<AddressCandidate>, GeocoderError> {
    let response = match serde_json::from_str::<GeocodeResponse>(body) {
        Ok(response) => response,
        Err(_) if !http_status.is_success() => {
            return Err(GeocoderError::Api {
                code: http_status.as_u16(),
                message: http_status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            })
        }
        Err(err) => return Err(err.into()),
    };

    let (code, message) = match response.status {
        Some(StatusDto { code, message }) => (code, message),
        None => (http_status.as_u16(), String::new()),
    };
    if !http_status.is_success() || code != 200 {
        return Err(GeocoderError::Api {
            code,
            message: if message.is_empty() {
                http_status.to_string()
            } else {
                message
            },
        });
    }

    Ok(response
        .results
        .into_iter()
        .filter_map(GeocodeResultDto::into_candidate)
        .collect())
}
