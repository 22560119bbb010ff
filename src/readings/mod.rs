//! Readings Service
//!
//! Fetches a device's external feed and reduces it to what the dashboard shows:
//!
//! - **locator**: device locator to feed URL
//! - **source**: the fetch seam and its HTTP implementation
//! - **snapshot**: feed parsing, chart window and status bands

pub mod locator;
pub mod snapshot;
pub mod source;

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ReadingsConfig;

pub use locator::{normalize_locator, SourcePolicy};
pub use snapshot::{
    derive_snapshot, AirQuality, Band, ChartPoint, FeedResponse, LatestStatus, RawRow, Reading,
    ReadingsSnapshot, MAX_WINDOW,
};
pub use source::{HttpReadingSource, ReadingSource, ReadingsError};

const UNKNOWN_SOURCE_ERROR: &str = "Unknown error from server";

/// Resolves, fetches and summarizes device feeds
#[derive(Clone)]
pub struct ReadingsService {
    source: Arc<dyn ReadingSource>,
    policy: SourcePolicy,
    config: ReadingsConfig,
}

impl ReadingsService {
    pub fn new(source: Arc<dyn ReadingSource>, config: ReadingsConfig) -> Self {
        Self {
            source,
            policy: SourcePolicy::from_config(&config),
            config,
        }
    }

    /// Service backed by [`HttpReadingSource`]
    pub fn http(config: ReadingsConfig) -> Result<Self, ReadingsError> {
        let source = HttpReadingSource::new(
            Duration::from_millis(config.request_timeout_ms),
            config.max_response_bytes,
            SourcePolicy::from_config(&config),
        )?;
        Ok(Self::new(Arc::new(source), config))
    }

    pub fn config(&self) -> &ReadingsConfig {
        &self.config
    }

    /// Fetch the feed behind `locator` and derive a snapshot.
    ///
    /// `window` falls back to the configured default and is clamped to
    /// `1..=MAX_WINDOW`.
    pub async fn snapshot(
        &self,
        locator: &str,
        window: Option<usize>,
    ) -> Result<ReadingsSnapshot, ReadingsError> {
        let url = self.policy.resolve(locator)?;
        let window = window.unwrap_or(self.config.default_window);

        tracing::debug!(url = %url, window, "Fetching readings");

        let feed = self.source.fetch(&url).await?;
        if !feed.success {
            let message = feed
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| UNKNOWN_SOURCE_ERROR.to_string());
            tracing::warn!(url = %url, error = %message, "Readings source reported failure");
            return Err(ReadingsError::SourceFailed(message));
        }

        Ok(derive_snapshot(locator.trim(), &feed.data, window, Utc::now()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process source for tests

    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays a canned feed and records requested URLs
    pub struct StaticSource {
        feed: Option<FeedResponse>,
        delay: Option<Duration>,
        pub requested: Mutex<Vec<String>>,
    }

    impl StaticSource {
        pub fn new(feed: FeedResponse) -> Self {
            Self {
                feed: Some(feed),
                delay: None,
                requested: Mutex::new(Vec::new()),
            }
        }

        /// A source that is never reachable
        pub fn unavailable() -> Self {
            Self {
                feed: None,
                delay: None,
                requested: Mutex::new(Vec::new()),
            }
        }

        /// Answers with `feed` only after `delay`
        pub fn slow(feed: FeedResponse, delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new(feed)
            }
        }
    }

    #[async_trait]
    impl ReadingSource for StaticSource {
        async fn fetch(&self, url: &str) -> Result<FeedResponse, ReadingsError> {
            self.requested.lock().unwrap().push(url.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.feed.clone().ok_or(ReadingsError::Unavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StaticSource;
    use super::*;
    use serde_json::json;

    fn feed(rows: usize) -> FeedResponse {
        let data = (0..rows)
            .map(|i| {
                serde_json::from_value(json!({
                    "DateTime": "2024-05-01T08:00:00Z",
                    "Temperature": i,
                    "humidity": 40,
                    "tvoc": 120,
                    "eco2": 450,
                    "airquality": 1,
                }))
                .unwrap()
            })
            .collect();

        FeedResponse {
            success: true,
            data,
            error: None,
        }
    }

    #[tokio::test]
    async fn test_snapshot_uses_default_window() {
        let source = Arc::new(StaticSource::new(feed(40)));
        let service = ReadingsService::new(source.clone(), ReadingsConfig::default());

        let snapshot = service.snapshot("AKfycbExample", None).await.unwrap();

        assert_eq!(snapshot.chart.len(), 24);
        assert_eq!(snapshot.source, "AKfycbExample");
        assert_eq!(
            source.requested.lock().unwrap().as_slice(),
            ["https://script.google.com/macros/s/AKfycbExample/exec"]
        );
    }

    #[tokio::test]
    async fn test_explicit_window() {
        let service =
            ReadingsService::new(Arc::new(StaticSource::new(feed(40))), ReadingsConfig::default());

        let snapshot = service.snapshot("abc", Some(5)).await.unwrap();
        assert_eq!(snapshot.chart.len(), 5);
        assert_eq!(snapshot.latest.unwrap().temperature, 39.0);
    }

    #[tokio::test]
    async fn test_source_failure_message() {
        let failing = FeedResponse {
            success: false,
            data: Vec::new(),
            error: Some("Sheet not found".to_string()),
        };
        let service =
            ReadingsService::new(Arc::new(StaticSource::new(failing)), ReadingsConfig::default());

        let err = service.snapshot("abc", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Sheet not found");

        let silent = ReadingsService::new(
            Arc::new(StaticSource::new(FeedResponse::default())),
            ReadingsConfig::default(),
        );
        let err = silent.snapshot("abc", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown error from server");
    }

    #[tokio::test]
    async fn test_disallowed_host_is_not_fetched() {
        let source = Arc::new(StaticSource::new(feed(1)));
        let service = ReadingsService::new(source.clone(), ReadingsConfig::default());

        let err = service
            .snapshot("http://127.0.0.1:8080/internal", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ReadingsError::DisallowedSource(ref host) if host == "127.0.0.1"));
        assert!(source.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_source_is_reported() {
        let service =
            ReadingsService::new(Arc::new(StaticSource::unavailable()), ReadingsConfig::default());

        assert!(matches!(
            service.snapshot("abc", None).await,
            Err(ReadingsError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_empty_locator_is_not_fetched() {
        let source = Arc::new(StaticSource::new(feed(1)));
        let service = ReadingsService::new(source.clone(), ReadingsConfig::default());

        assert!(matches!(
            service.snapshot("  ", None).await,
            Err(ReadingsError::InvalidLocator)
        ));
        assert!(source.requested.lock().unwrap().is_empty());
    }
}
