//! Readings sources
//!
//! A source answers one GET with a `{success, data, error}` feed document.

use async_trait::async_trait;
use reqwest::{redirect, Client, Response};
use std::time::Duration;
use thiserror::Error;

use crate::readings::locator::SourcePolicy;
use crate::readings::snapshot::FeedResponse;

const MAX_REDIRECTS: usize = 10;

/// Fetches raw feed documents
#[async_trait]
pub trait ReadingSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FeedResponse, ReadingsError>;
}

/// Fetches feeds over HTTP.
///
/// Redirects are followed only to hosts the policy allows, and bodies larger
/// than `max_body_bytes` are refused.
pub struct HttpReadingSource {
    client: Client,
    max_body_bytes: usize,
}

impl HttpReadingSource {
    pub fn new(
        timeout: Duration,
        max_body_bytes: usize,
        policy: SourcePolicy,
    ) -> Result<Self, ReadingsError> {
        let redirects = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else if policy.permits(attempt.url()) {
                attempt.follow()
            } else {
                tracing::warn!(target_url = %attempt.url(), "Refusing redirect to disallowed host");
                attempt.stop()
            }
        });

        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirects)
            .build()?;

        Ok(Self {
            client,
            max_body_bytes,
        })
    }
}

#[async_trait]
impl ReadingSource for HttpReadingSource {
    async fn fetch(&self, url: &str) -> Result<FeedResponse, ReadingsError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ReadingsError::Timeout
            } else if e.is_connect() {
                ReadingsError::Unavailable
            } else {
                ReadingsError::Request(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReadingsError::Status(status.as_u16()));
        }

        let body = read_limited(response, self.max_body_bytes).await?;
        let feed: FeedResponse = serde_json::from_slice(&body)?;
        Ok(feed)
    }
}

/// Read a response body, failing as soon as it exceeds `limit` bytes
async fn read_limited(mut response: Response, limit: usize) -> Result<Vec<u8>, ReadingsError> {
    if let Some(length) = response.content_length() {
        if length > limit as u64 {
            return Err(ReadingsError::TooLarge(limit));
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(ReadingsError::TooLarge(limit));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Errors from fetching or interpreting a readings feed
#[derive(Error, Debug)]
pub enum ReadingsError {
    #[error("Device has no readings source")]
    InvalidLocator,

    #[error("Readings source host is not allowed: {0}")]
    DisallowedSource(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("Readings response exceeds {0} bytes")]
    TooLarge(usize),

    #[error("Malformed readings response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    SourceFailed(String),

    #[error("Readings source unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one raw HTTP response on a local port and return the feed URL
    async fn serve_once(response: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{}/exec", addr)
    }

    fn local_source(max_body_bytes: usize) -> HttpReadingSource {
        HttpReadingSource::new(
            Duration::from_secs(5),
            max_body_bytes,
            SourcePolicy::new("http://127.0.0.1", &[]),
        )
        .unwrap()
    }

    fn http_response(headers: &str, body: &[u8]) -> Vec<u8> {
        let mut raw = format!("HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n{}\r\n", headers)
            .into_bytes();
        raw.extend_from_slice(body);
        raw
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ReadingsError::Status(503).to_string(), "HTTP error! status: 503");
        assert_eq!(
            ReadingsError::SourceFailed("Sheet not found".into()).to_string(),
            "Sheet not found"
        );
    }

    #[tokio::test]
    async fn test_unreachable_source() {
        let source = local_source(1024);
        // Port 9 (discard) on localhost is not expected to be listening
        let result = source.fetch("http://127.0.0.1:9/exec").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_reads_small_feed() {
        let body = br#"{"success":true,"data":[{"Temperature":21}]}"#;
        let url = serve_once(http_response(
            &format!("Content-Length: {}\r\n", body.len()),
            body,
        ))
        .await;

        let feed = local_source(1024).fetch(&url).await.unwrap();
        assert!(feed.success);
        assert_eq!(feed.data.len(), 1);
    }

    #[tokio::test]
    async fn test_declared_oversized_body_is_refused() {
        let body = vec![b' '; 4096];
        let url = serve_once(http_response(
            &format!("Content-Length: {}\r\n", body.len()),
            &body,
        ))
        .await;

        let result = local_source(1024).fetch(&url).await;
        assert!(matches!(result, Err(ReadingsError::TooLarge(1024))));
    }

    #[tokio::test]
    async fn test_undeclared_oversized_body_is_refused() {
        let mut body = br#"{"success":true,"data":["#.to_vec();
        body.extend(std::iter::repeat(b' ').take(4096));
        body.extend_from_slice(b"]}");
        let url = serve_once(http_response("Connection: close\r\n", &body)).await;

        let result = local_source(1024).fetch(&url).await;
        assert!(matches!(result, Err(ReadingsError::TooLarge(1024))));
    }

    #[tokio::test]
    async fn test_redirect_to_disallowed_host_is_not_followed() {
        let url = serve_once(
            b"HTTP/1.1 302 Found\r\nLocation: http://169.254.169.254/latest/meta-data/\r\nContent-Length: 0\r\n\r\n"
                .to_vec(),
        )
        .await;

        let result = local_source(1024).fetch(&url).await;
        assert!(matches!(result, Err(ReadingsError::Status(302))));
    }
}
