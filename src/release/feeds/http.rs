//! JSON-over-HTTP release feed implementation

use std::time::Duration;

use reqwest::{Response, StatusCode, header::RETRY_AFTER};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{HTTP_TIMEOUT_SECS, USER_AGENT};
use crate::release::error::FeedError;
use crate::release::feed::ReleaseFeed;
use crate::release::types::ReleaseRecord;

/// Feeds publish either a bare array or an object with a `releases` array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedResponse {
    List(Vec<ReleaseRecord>),
    Wrapped { releases: Vec<ReleaseRecord> },
}

impl FeedResponse {
    fn into_records(self) -> Vec<ReleaseRecord> {
        match self {
            FeedResponse::List(records) | FeedResponse::Wrapped { releases: records } => records,
        }
    }
}

/// Release feed served as a JSON document at a fixed URL
pub struct HttpReleaseFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpReleaseFeed {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            url: url.to_string(),
        }
    }

    /// Map non-success statuses onto feed errors
    async fn check_status(response: Response, url: &str) -> Result<Response, FeedError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::NOT_FOUND => Err(FeedError::NotFound(url.to_string())),
            StatusCode::TOO_MANY_REQUESTS => Err(FeedError::RateLimited {
                retry_after_secs: retry_after_secs(&response),
            }),
            _ => {
                let body = response.text().await.unwrap_or_default();
                warn!("Release feed returned status {} for {}", status, url);
                Err(FeedError::InvalidResponse(format!(
                    "Unexpected status: {}: {}",
                    status, body
                )))
            }
        }
    }
}

/// Delay in seconds from a `Retry-After` header; HTTP-date values are ignored
fn retry_after_secs(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[async_trait::async_trait]
impl ReleaseFeed for HttpReleaseFeed {
    async fn fetch_releases(&self) -> Result<Vec<ReleaseRecord>, FeedError> {
        debug!("Fetching release feed from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let response = Self::check_status(response, &self.url).await?;

        let feed: FeedResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse release feed response: {}", e);
            FeedError::InvalidResponse(e.to_string())
        })?;

        let records = feed.into_records();
        debug!("Release feed returned {} records", records.len());

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn fetch_releases_parses_array_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/macos.json")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"version": "14.2.1", "build": "23C71", "released": true, "releaseDate": "2023-12-19"},
                    {"version": "14.3 beta 2", "build": "23D5043d", "released": true, "beta": true}
                ]"#,
            )
            .create_async()
            .await;

        let feed = HttpReleaseFeed::new(&format!("{}/macos.json", server.url()));
        let records = feed.fetch_releases().await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            records,
            vec![
                ReleaseRecord {
                    release_date: Some("2023-12-19".to_string()),
                    ..ReleaseRecord::released("14.2.1", "23C71")
                },
                ReleaseRecord {
                    beta: true,
                    ..ReleaseRecord::released("14.3 beta 2", "23D5043d")
                },
            ]
        );
    }

    #[tokio::test]
    async fn fetch_releases_parses_wrapped_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"releases": [{"version": "13.6.4", "build": "22G513", "released": true}]}"#)
            .create_async()
            .await;

        let feed = HttpReleaseFeed::new(&format!("{}/feed", server.url()));
        let records = feed.fetch_releases().await.unwrap();

        mock.assert_async().await;
        assert_eq!(records, vec![ReleaseRecord::released("13.6.4", "22G513")]);
    }

    #[tokio::test]
    async fn fetch_releases_returns_not_found_for_404() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/missing.json")
            .with_status(404)
            .create_async()
            .await;

        let feed = HttpReleaseFeed::new(&format!("{}/missing.json", server.url()));
        let result = feed.fetch_releases().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FeedError::NotFound(_))));
    }

    #[tokio::test]
    async fn fetch_releases_returns_rate_limited_for_429() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/feed")
            .with_status(429)
            .with_header("retry-after", "120")
            .create_async()
            .await;

        let feed = HttpReleaseFeed::new(&format!("{}/feed", server.url()));
        let result = feed.fetch_releases().await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(FeedError::RateLimited {
                retry_after_secs: Some(120)
            })
        ));
    }

    #[tokio::test]
    async fn fetch_releases_returns_invalid_response_for_server_error() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/feed")
            .with_status(503)
            .create_async()
            .await;

        let feed = HttpReleaseFeed::new(&format!("{}/feed", server.url()));
        let result = feed.fetch_releases().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FeedError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn fetch_releases_rate_limit_without_usable_retry_after() {
        let mut server = Server::new_async().await;

        let _bare = server
            .mock("GET", "/bare")
            .with_status(429)
            .create_async()
            .await;
        let _dated = server
            .mock("GET", "/dated")
            .with_status(429)
            .with_header("retry-after", "Wed, 21 Oct 2026 07:28:00 GMT")
            .create_async()
            .await;

        for path in ["/bare", "/dated"] {
            let feed = HttpReleaseFeed::new(&format!("{}{}", server.url(), path));
            let result = feed.fetch_releases().await;

            assert!(
                matches!(
                    result,
                    Err(FeedError::RateLimited {
                        retry_after_secs: None
                    })
                ),
                "{path}"
            );
        }
    }

    #[tokio::test]
    async fn fetch_releases_includes_body_in_unexpected_status_error() {
        let mut server = Server::new_async().await;

        let _mock = server
            .mock("GET", "/feed")
            .with_status(502)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let feed = HttpReleaseFeed::new(&format!("{}/feed", server.url()));
        let result = feed.fetch_releases().await;

        assert!(
            matches!(result, Err(FeedError::InvalidResponse(msg)) if msg.contains("502") && msg.contains("upstream unavailable"))
        );
    }

    #[tokio::test]
    async fn fetch_releases_returns_invalid_response_for_malformed_json() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"unexpected": true}"#)
            .create_async()
            .await;

        let feed = HttpReleaseFeed::new(&format!("{}/feed", server.url()));
        let result = feed.fetch_releases().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FeedError::InvalidResponse(_))));
    }
}
