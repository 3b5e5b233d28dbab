//! reqwest-backed [`PageFetcher`] implementation.
//!
//! The fetcher holds two pooled clients: one that verifies TLS certificates
//! and one that does not. Requests pick a client from
//! [`FetchOptions::verify_ssl`], since reqwest fixes certificate policy at
//! client construction time.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use super::{FetchError, FetchOptions, FetchResponse, PageFetcher, ProbeResult};
use crate::user_agent;

/// HTTP fetcher with connection pooling, shared by every component of a run.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    insecure_client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the HTTP client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    /// Creates a fetcher with explicit connect and default request timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the HTTP client cannot be built.
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        request_timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let client = build_client(connect_timeout_secs, request_timeout_secs, true)?;
        let insecure_client = build_client(connect_timeout_secs, request_timeout_secs, false)?;
        Ok(Self {
            client,
            insecure_client,
        })
    }

    fn request(&self, method: &str, url: &str, options: &FetchOptions) -> RequestBuilder {
        let client = if options.verify_ssl {
            &self.client
        } else {
            &self.insecure_client
        };
        let mut request = match method {
            "HEAD" => client.head(url),
            _ => client.get(url),
        };
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        request
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self, options), fields(url = %url))]
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResponse, FetchError> {
        validate_url(url)?;
        let response = self
            .request("GET", url, options)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        debug!(status, bytes = body.len(), "fetch complete");
        Ok(FetchResponse { status, body })
    }

    #[instrument(skip(self, options), fields(url = %url))]
    async fn probe(&self, url: &str, options: &FetchOptions) -> Result<ProbeResult, FetchError> {
        validate_url(url)?;
        let response = self
            .request("HEAD", url, options)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        let status = response.status().as_u16();
        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        debug!(status, ?content_length, "probe complete");
        Ok(ProbeResult {
            status,
            content_length,
        })
    }
}

fn validate_url(url: &str) -> Result<(), FetchError> {
    if url.trim().is_empty() {
        return Err(FetchError::invalid_url(url));
    }
    Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
    Ok(())
}

fn build_client(
    connect_timeout_secs: u64,
    request_timeout_secs: u64,
    verify_ssl: bool,
) -> Result<Client, FetchError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(request_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
        .danger_accept_invalid_certs(!verify_ssl)
        .build()
        .map_err(|e| FetchError::client_build(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[tokio::test]
    async fn test_http_fetcher_fetch_returns_body_and_status() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/dataset/salud"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let url = format!("{}/dataset/salud", mock_server.uri());
        let response = fetcher.fetch(&url, &FetchOptions::default()).await.unwrap();

        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(response.text_lossy(), "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_http_fetcher_error_status_is_not_transport_failure() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let url = format!("{}/missing", mock_server.uri());
        let response = fetcher.fetch(&url, &FetchOptions::default()).await.unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_http_fetcher_sends_custom_headers() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/api"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let url = format!("{}/api", mock_server.uri());
        let options = FetchOptions::default().with_header("Accept", "application/json");
        let response = fetcher.fetch(&url, &options).await.unwrap();

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_http_fetcher_probe_reads_content_length() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("HEAD"))
            .and(path("/big.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 1000]))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let url = format!("{}/big.csv", mock_server.uri());
        let probe = fetcher.probe(&url, &FetchOptions::default()).await.unwrap();

        assert_eq!(probe.status, 200);
        assert_eq!(probe.content_length, Some(1000));
    }

    #[tokio::test]
    async fn test_http_fetcher_rejects_empty_url_without_network() {
        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch("", &FetchOptions::default()).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_http_fetcher_unreachable_host_is_transport_failure() {
        let fetcher = HttpFetcher::new().unwrap();
        let options = FetchOptions::default().with_timeout(Duration::from_secs(2));
        let result = fetcher.fetch("http://127.0.0.1:1/unreachable", &options).await;
        assert!(
            matches!(
                result,
                Err(FetchError::Network { .. } | FetchError::Timeout { .. })
            ),
            "Expected transport failure, got: {result:?}"
        );
    }

    #[test]
    fn test_build_client_accepts_both_tls_modes() {
        assert!(build_client(5, 10, true).is_ok());
        assert!(build_client(5, 10, false).is_ok());
    }

    #[tokio::test]
    async fn test_http_fetcher_insecure_option_uses_working_client() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };

        Mock::given(method("GET"))
            .and(path("/plain"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::with_timeouts(5, 10).unwrap();
        let url = format!("{}/plain", mock_server.uri());
        let options = FetchOptions::default().with_verify_ssl(false);
        let response = fetcher.fetch(&url, &options).await.unwrap();

        assert_eq!(response.text_lossy(), "ok");
    }
}
