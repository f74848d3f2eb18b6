use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{ApiError, CoreError};

use super::super::types::ApiRequest;
use super::super::Transport;
use super::connection::parse_api_root;
use super::protocol::{decode_success_body, is_success_status, parse_error_body, query_pairs};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// BlockCypher REST client over HTTP(S).
///
/// Every [`ApiRequest`] becomes exactly one HTTP request against
/// `api_root + path`. No retries are attempted; timeouts are the client's
/// connect/request timeouts.
pub struct HttpTransport {
    client: reqwest::Client,
    api_root: String,
    limiter: Option<DirectRateLimiter>,
}

impl HttpTransport {
    /// Create a transport for `api_root` (`http://` or `https://`).
    ///
    /// If `requests_per_second` is set, outbound requests are throttled
    /// client-side. The public API limits requests per token, so this keeps
    /// bursts from turning into 429s.
    pub fn new(api_root: &str, requests_per_second: Option<u32>) -> Result<Self, CoreError> {
        let api_root = parse_api_root(api_root)?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(ApiError::Transport)?;

        let limiter = match requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    CoreError::InvalidConfig("requests_per_second must be at least 1".to_owned())
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            api_root,
            limiter,
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, CoreError> {
        self.wait_for_rate_limit().await;

        let ApiRequest {
            method,
            path,
            query,
            body,
        } = request;
        debug!(
            http.method = %method,
            http.path = %path,
            http.query = query.len(),
            http.has_body = body.is_some(),
            "api request"
        );

        let url = format!("{}{}", self.api_root, path);
        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(header::CONTENT_TYPE, "application/json");
        if !query.is_empty() {
            builder = builder.query(&query_pairs(&query));
        }
        if let Some(body) = &body {
            let encoded = serde_json::to_vec(body).map_err(|e| {
                ApiError::InvalidResponse(format!("encode request body: {e}"))
            })?;
            builder = builder.body(encoded);
        }

        let response = builder.send().await.map_err(ApiError::Transport)?;
        let status = response.status();

        let text = response.text().await.map_err(ApiError::Transport)?;
        debug!(http.method = %method, http.path = %path, %status, body_len = text.len(), "api response");
        trace!(http.method = %method, http.path = %path, body = %text, "api response body");

        if is_success_status(&method, status) {
            decode_success_body(&text)
        } else {
            Err(parse_error_body(status, &text).into())
        }
    }
}
