use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::common::{ApiErrorResponse, ApiResource, Service};
use super::error::ApiError;

/// Default BastionZero API host
pub const DEFAULT_HOST: &str = "https://cloud.bastionzero.com";

const API_BASE_PATH: &str = "/api/v2";
const API_KEY_HEADER: &str = "X-API-KEY";

/// BastionZero API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    api_secret: String,
    retry_config: RetryConfig,
}

#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 250,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(endpoint: &str, api_secret: &str) -> Result<Self, ApiError> {
        Self::with_config(endpoint, api_secret, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration
    pub fn with_config(
        endpoint: &str,
        api_secret: &str,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidEndpoint(format!(
                "{}: scheme must be http or https",
                endpoint
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(
                "terraform-provider-bastionzero/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(retry_config.timeout_seconds))
            .build()?;

        let base_url = format!("{}{}", endpoint.trim_end_matches('/'), API_BASE_PATH);

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                api_secret: api_secret.to_string(),
                retry_config,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Typed operations for any API object type
    pub fn service<T: ApiResource>(&self) -> Service<'_, T> {
        Service::new(self)
    }

    /// Environments API operations
    pub fn environments(&self) -> Service<'_, crate::api::environments::Environment> {
        self.service()
    }

    /// Policies API operations
    pub fn policies(&self) -> crate::api::policies::PoliciesApi<'_> {
        crate::api::policies::PoliciesApi::new(self)
    }

    /// Targets API operations
    pub fn targets(&self) -> crate::api::targets::TargetsApi<'_> {
        crate::api::targets::TargetsApi::new(self)
    }

    /// Users API operations
    pub fn users(&self) -> Service<'_, crate::api::users::User> {
        self.service()
    }

    /// Service accounts API operations
    pub fn service_accounts(&self) -> Service<'_, crate::api::service_accounts::ServiceAccount> {
        self.service()
    }

    /// Organization groups API operations
    pub fn groups(&self) -> Service<'_, crate::api::groups::Group> {
        self.service()
    }

    /// Execute a GET request with retry logic
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute_with_retry(
            || async {
                let url = format!("{}{}", self.inner.base_url, path);

                tracing::debug!("GET request to: {}", url);

                self.inner
                    .http_client
                    .get(&url)
                    .header(API_KEY_HEADER, &self.inner.api_secret)
                    .send()
                    .await
            },
            path,
            true,
        )
        .await
    }

    /// Execute a POST request. A create may already have happened when the
    /// server fails or the request times out, so only rate limiting and
    /// refused connections are retried.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute_with_retry(
            || async {
                let url = format!("{}{}", self.inner.base_url, path);

                tracing::debug!("POST request to: {}", url);

                self.inner
                    .http_client
                    .post(&url)
                    .header(API_KEY_HEADER, &self.inner.api_secret)
                    .json(body)
                    .send()
                    .await
            },
            path,
            false,
        )
        .await
    }

    /// Execute a PATCH request with retry logic
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute_with_retry(
            || async {
                let url = format!("{}{}", self.inner.base_url, path);

                tracing::debug!("PATCH request to: {}", url);

                self.inner
                    .http_client
                    .patch(&url)
                    .header(API_KEY_HEADER, &self.inner.api_secret)
                    .json(body)
                    .send()
                    .await
            },
            path,
            true,
        )
        .await
    }

    /// Execute a DELETE request with retry logic
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute_with_retry(
            || async {
                let url = format!("{}{}", self.inner.base_url, path);

                tracing::debug!("DELETE request to: {}", url);

                self.inner
                    .http_client
                    .delete(&url)
                    .header(API_KEY_HEADER, &self.inner.api_secret)
                    .send()
                    .await
            },
            path,
            true,
        )
        .await
    }

    /// Execute request with retry logic. Requests that are not idempotent
    /// are only retried when the server cannot have acted on them.
    async fn execute_with_retry<F, Fut, T>(
        &self,
        request_fn: F,
        path: &str,
        idempotent: bool,
    ) -> Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
        T: DeserializeOwned,
    {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.inner.retry_config.max_retries {
            if attempt > 0 {
                let backoff = std::cmp::min(
                    self.inner.retry_config.initial_backoff_ms * (2_u64.pow(attempt - 1)),
                    self.inner.retry_config.max_backoff_ms,
                );
                tracing::debug!(
                    "Retrying request to {} after {}ms (attempt {})",
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return self.parse_success_response(response).await;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ApiError::AuthError);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() && idempotent {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return self.handle_error_response(response).await;
                    }
                }
                Err(e) => {
                    if e.is_connect() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else if e.is_timeout() && !idempotent {
                        return Err(ApiError::Timeout(self.inner.retry_config.timeout_seconds));
                    } else if e.is_timeout() {
                        last_error =
                            Some(ApiError::Timeout(self.inner.retry_config.timeout_seconds));
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                }
            }

            attempt += 1;
        }

        tracing::warn!("Giving up on request to {} after {} attempts", path, attempt);
        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    /// Parse successful response. An empty body reads as JSON null.
    async fn parse_success_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::trace!("API response body: {}", text);

        let body = if text.trim().is_empty() {
            "null"
        } else {
            text.as_str()
        };

        serde_json::from_str::<T>(body).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    /// Handle error response
    async fn handle_error_response<T>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let message = serde_json::from_str::<ApiErrorResponse>(&text)
            .ok()
            .and_then(|body| body.describe())
            .unwrap_or(text);

        Err(ApiError::ApiError { status, message })
    }
}

#[cfg(test)]
#[path = "./client_test.rs"]
mod client_test;
