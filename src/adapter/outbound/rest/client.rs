//! reqwest-backed [`ClientFactory`] for the spot REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use super::dto::{ApiErrorBody, AvgPrice, Depth, Empty, ExchangeInfo, ServerTime};
use crate::domain::{ErrorSignal, RunConfiguration};
use crate::error::Result;
use crate::infrastructure::config::server::ServerConfig;
use crate::port::outbound::client::ClientFactory;

/// Header carrying the API key on authenticated configurations.
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

pub mod endpoint {
    pub const PING: &str = "/api/v3/ping";
    pub const SERVER_TIME: &str = "/api/v3/time";
    pub const EXCHANGE_INFO: &str = "/api/v3/exchangeInfo";
    pub const AVG_PRICE: &str = "/api/v3/avgPrice";
    pub const DEPTH: &str = "/api/v3/depth";
}

#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    request_timeout: Duration,
    max_attempts: u32,
    backoff: Duration,
}

/// Builds one [`RestClient`] per run configuration over a shared connection pool.
pub struct RestClientFactory {
    http: HttpClient,
    base_url: Url,
    retry: RetryPolicy,
}

impl RestClientFactory {
    /// # Errors
    ///
    /// Returns an error if `base_url` does not parse or the HTTP client
    /// cannot be built with the configured timeout.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let http = HttpClient::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url,
            retry: RetryPolicy {
                request_timeout: config.request_timeout(),
                max_attempts: config.retry_max_attempts,
                backoff: config.retry_backoff(),
            },
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl ClientFactory for RestClientFactory {
    type Client = RestClient;

    async fn connect(
        &self,
        configuration: &RunConfiguration,
    ) -> std::result::Result<RestClient, ErrorSignal> {
        let api_key = match configuration.credential() {
            None => None,
            Some(credential) => {
                if let Some(path) = credential.key_path() {
                    match tokio::fs::metadata(path).await {
                        Ok(meta) if meta.is_file() => {}
                        Ok(_) => {
                            return Err(ErrorSignal::transport(format!(
                                "client setup failed: private key path {} is not a file",
                                path.display()
                            )))
                        }
                        Err(err) => {
                            return Err(ErrorSignal::transport(format!(
                                "client setup failed: cannot read private key {}: {err}",
                                path.display()
                            )))
                        }
                    }
                }
                Some(credential.api_key().to_string())
            }
        };

        debug!(
            configuration = configuration.name(),
            base_url = %self.base_url,
            "REST client ready"
        );
        Ok(RestClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            api_key,
            retry: self.retry,
        })
    }
}

/// Spot REST client bound to one configuration.
///
/// Every failure comes back as an [`ErrorSignal`] so unit bodies can
/// propagate it unchanged.
#[derive(Clone)]
pub struct RestClient {
    http: HttpClient,
    base_url: Url,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl RestClient {
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn ping(&self) -> std::result::Result<(), ErrorSignal> {
        self.get::<Empty>(endpoint::PING, &[]).await.map(|_| ())
    }

    pub async fn server_time(&self) -> std::result::Result<ServerTime, ErrorSignal> {
        self.get(endpoint::SERVER_TIME, &[]).await
    }

    /// Exchange rules, for every symbol or just `symbol`.
    pub async fn exchange_info(
        &self,
        symbol: Option<&str>,
    ) -> std::result::Result<ExchangeInfo, ErrorSignal> {
        match symbol {
            Some(symbol) => {
                self.get(endpoint::EXCHANGE_INFO, &[("symbol", symbol.to_string())]).await
            }
            None => self.get(endpoint::EXCHANGE_INFO, &[]).await,
        }
    }

    pub async fn avg_price(&self, symbol: &str) -> std::result::Result<AvgPrice, ErrorSignal> {
        self.get(endpoint::AVG_PRICE, &[("symbol", symbol.to_string())]).await
    }

    pub async fn depth(&self, symbol: &str, limit: u16) -> std::result::Result<Depth, ErrorSignal> {
        self.get(
            endpoint::DEPTH,
            &[("symbol", symbol.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// GET `path` and decode the JSON body into `T`.
    ///
    /// Connect errors and timeouts are retried up to the configured attempt
    /// count; HTTP error statuses are returned as-is.
    pub async fn get<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<T, ErrorSignal>
    where
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path).map_err(|err| {
            ErrorSignal::transport(format!("invalid endpoint url {path}: {err}"))
        })?;

        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        let response = loop {
            attempt += 1;
            let mut request = self.http.get(url.clone()).query(query);
            if let Some(key) = &self.api_key {
                request = request.header(API_KEY_HEADER, key);
            }
            match request.send().await {
                Ok(response) => break response,
                Err(err) => {
                    if attempt >= max_attempts || !Self::should_retry(&err) {
                        return Err(self.transport_signal(&err));
                    }
                    self.backoff(attempt, max_attempts, &err).await;
                }
            }
        };

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| self.transport_signal(&err))?;

        if !(200..300).contains(&status) {
            debug!(path, status, "Endpoint returned error status");
            return Err(error_signal(status, body));
        }

        match serde_json::from_str::<T>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(err) => {
                debug!(path, status, error = %err, "Response did not match expected shape");
                Err(ErrorSignal::undecodable(Some(status)).with_body(body))
            }
        }
    }

    fn should_retry(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    fn transport_signal(&self, err: &reqwest::Error) -> ErrorSignal {
        if err.is_timeout() {
            ErrorSignal::timeout(self.retry.request_timeout)
        } else {
            ErrorSignal::transport(err.to_string())
        }
    }

    async fn backoff(&self, attempt: u32, max_attempts: u32, err: &reqwest::Error) {
        warn!(
            attempt,
            max_attempts,
            error = %err,
            "HTTP request failed, retrying"
        );
        let delay = self.retry.backoff * 2u32.saturating_pow(attempt.saturating_sub(1));
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

/// Map an error status and its body to a signal.
///
/// Structured `{code, msg}` bodies become API errors; anything else means the
/// response could not be interpreted.
fn error_signal(status: u16, body: String) -> ErrorSignal {
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(api) => ErrorSignal::api(status, api.msg)
            .with_code(api.code)
            .with_body(body),
        Err(_) => ErrorSignal::undecodable(Some(status)).with_body(body),
    }
}
