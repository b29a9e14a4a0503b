//! Snapshot fetching and the background refresh loop.
//!
//! Every dashboard reads a pre-generated JSON document from a static file
//! host. Fetches are cache-busted with a millisecond timestamp parameter; a
//! failed or unchanged fetch leaves the currently installed snapshot alone.

use std::env;
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{info, warn};

use crate::snapshot::{snapshot_fingerprint, SnapshotSet, SnapshotStore};

pub const SALES_FILE: &str = "sales_data.json";
pub const REPORT_FILE: &str = "report_data.json";
pub const ADS_FILE: &str = "ads_data.json";
pub const REVIEW_FILE: &str = "review_data.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Base URL the snapshot files are served under, without trailing slash.
    pub base_url: String,
    pub timeout_ms: u64,
    pub refresh_interval_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 10_000,
            refresh_interval_ms: 300_000,
        }
    }
}

pub fn loader_config_from_env() -> LoaderConfig {
    let mut config = LoaderConfig::default();

    if let Ok(base_url) = env::var("STOREBOARD_DATA_URL") {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            config.base_url = trimmed.to_string();
        }
    }

    if let Ok(refresh) = env::var("STOREBOARD_REFRESH_MS") {
        if let Ok(parsed) = refresh.trim().parse::<u64>() {
            if parsed > 0 {
                config.refresh_interval_ms = parsed;
            }
        }
    }

    config
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("HTTP client build error: {0}")]
    HttpClientBuild(String),
    #[error("request failed for {url}: {message}")]
    Request { url: String, message: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed snapshot {file}: {source}")]
    Parse {
        file: &'static str,
        source: serde_json::Error,
    },
    #[error("refresh thread spawn failed: {0}")]
    Spawn(String),
}

/// Cache-busted URL for one snapshot file.
pub fn snapshot_url(base_url: &str, file: &str, now_ms: i64) -> String {
    format!("{base_url}/{file}?t={now_ms}")
}

/// Parse a raw payload and install it, returning `true` when the store was
/// actually replaced. A parse failure leaves the store untouched.
pub fn install_payload<T>(
    store: &SnapshotStore<T>,
    file: &'static str,
    raw: &[u8],
) -> Result<bool, LoadError>
where
    T: DeserializeOwned + Clone,
{
    let parsed: T = serde_json::from_slice(raw).map_err(|source| LoadError::Parse { file, source })?;
    let fingerprint = snapshot_fingerprint(raw);
    Ok(store.replace(parsed, Some(fingerprint)))
}

pub struct SnapshotLoader {
    client: reqwest::blocking::Client,
    config: LoaderConfig,
}

impl SnapshotLoader {
    pub fn new(config: LoaderConfig) -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| LoadError::HttpClientBuild(err.to_string()))?;
        Ok(Self { client, config })
    }

    fn fetch_raw(&self, file: &'static str) -> Result<Vec<u8>, LoadError> {
        let url = snapshot_url(
            &self.config.base_url,
            file,
            chrono::Utc::now().timestamp_millis(),
        );
        let response = self.client.get(&url).send().map_err(|err| LoadError::Request {
            url: url.clone(),
            message: err.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().map_err(|err| LoadError::Request {
            url,
            message: err.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    fn refresh_one<T>(&self, store: &SnapshotStore<T>, file: &'static str) -> bool
    where
        T: DeserializeOwned + Clone,
    {
        let outcome = self
            .fetch_raw(file)
            .and_then(|raw| install_payload(store, file, &raw));
        match outcome {
            Ok(true) => {
                info!(component = "loader", event = "loader.fetch.ok", file, "snapshot installed");
                true
            }
            Ok(false) => {
                info!(
                    component = "loader",
                    event = "loader.fetch.unchanged",
                    file,
                    "snapshot unchanged, kept current"
                );
                true
            }
            Err(err) => {
                warn!(
                    component = "loader",
                    event = "loader.fetch.error",
                    file,
                    error = %err,
                    "snapshot fetch failed, keeping previous"
                );
                false
            }
        }
    }

    /// Refresh all four snapshots. Each file fails independently; the
    /// return value is the number of files that refreshed cleanly.
    pub fn refresh_all(&self, set: &SnapshotSet) -> usize {
        let mut ok = 0;
        ok += usize::from(self.refresh_one(&set.sales, SALES_FILE));
        ok += usize::from(self.refresh_one(&set.report, REPORT_FILE));
        ok += usize::from(self.refresh_one(&set.ads, ADS_FILE));
        ok += usize::from(self.refresh_one(&set.reviews, REVIEW_FILE));
        ok
    }

    /// Start the periodic refresh loop on a dedicated thread and hand back
    /// the snapshot set it feeds.
    pub fn spawn_refresh(config: LoaderConfig) -> Result<SnapshotSet, LoadError> {
        let loader = Self::new(config)?;
        let set = SnapshotSet::default();
        let thread_set = set.clone();
        let interval = Duration::from_millis(loader.config.refresh_interval_ms);
        std::thread::Builder::new()
            .name("snapshot-refresh".to_string())
            .spawn(move || loop {
                let ok = loader.refresh_all(&thread_set);
                info!(
                    component = "loader",
                    event = "loader.refresh.done",
                    ok,
                    total = 4usize,
                    "refresh cycle finished"
                );
                std::thread::sleep(interval);
            })
            .map_err(|err| LoadError::Spawn(err.to_string()))?;
        Ok(set)
    }
}
