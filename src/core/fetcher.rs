use crate::domain::model::{FetchOutcome, Filter, Record};
use crate::domain::ports::{ConfigProvider, Sleeper, TokioSleeper};
use crate::utils::error::{FetchError, Result};
use crate::utils::shutdown::{self, Shutdown};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://beta.alarmeringdroid.nl/api2/find/";

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retry and timeout knobs for the fetcher. The timeout is per attempt
/// and covers connecting through reading the full response body.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub endpoint: String,
    pub retries: u32,
    pub timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retries: DEFAULT_RETRIES,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FetchSettings {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            endpoint: config.endpoint().to_string(),
            retries: config.retries(),
            timeout: config.timeout(),
        }
    }
}

/// How a single attempt's result should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Retryable,
    Permanent,
    Proceed,
}

/// Timeouts and 408/429/5xx are worth another attempt; other 4xx statuses
/// will not get better by retrying. Redirect statuses land in `Proceed`:
/// the redirect response itself is the response, it is never chased.
fn classify_status(status: StatusCode) -> Disposition {
    let code = status.as_u16();
    if code == 408 || code == 429 || code >= 500 {
        Disposition::Retryable
    } else if code >= 400 {
        Disposition::Permanent
    } else {
        Disposition::Proceed
    }
}

/// Fetches the most recent notification matching a filter from the
/// alarmeringdroid find endpoint.
///
/// Idempotent: no observable state changes between calls, so the
/// periodic driver can invoke it on every tick. Calls with independent
/// filters may run concurrently.
pub struct Fetcher<S: Sleeper = TokioSleeper> {
    client: Client,
    settings: FetchSettings,
    sleeper: S,
}

impl Fetcher<TokioSleeper> {
    /// Builds a dedicated client with redirects disabled.
    pub fn new(settings: FetchSettings) -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self::with_client(client, settings))
    }

    /// Wraps a shared client session. The caller keeps ownership of the
    /// connection pool; the fetcher never closes or reconfigures it. The
    /// client should have redirects disabled.
    pub fn with_client(client: Client, settings: FetchSettings) -> Self {
        Self {
            client,
            settings,
            sleeper: TokioSleeper,
        }
    }
}

impl<S: Sleeper> Fetcher<S> {
    pub fn with_sleeper(client: Client, settings: FetchSettings, sleeper: S) -> Self {
        Self {
            client,
            settings,
            sleeper,
        }
    }

    /// Fetch without an external cancellation signal.
    pub async fn fetch(&self, filter: &Filter) -> FetchOutcome {
        let (handle, mut never) = shutdown::channel();
        let outcome = self.fetch_with_shutdown(filter, &mut never).await;
        drop(handle);
        outcome
    }

    /// Fetch, retrying transient failures with linear backoff.
    ///
    /// Attempts are strictly sequential. The shutdown signal interrupts
    /// both the in-flight request and any pending backoff sleep, turning
    /// the call into `Failure(CancelledError)` promptly.
    pub async fn fetch_with_shutdown(
        &self,
        filter: &Filter,
        shutdown: &mut Shutdown,
    ) -> FetchOutcome {
        // The filter rides in the path as a raw JSON object; the endpoint
        // does not take a conventional query string.
        let url = format!("{}{}", self.settings.endpoint, filter.to_query());
        let retries = self.settings.retries;

        for attempt in 1..=retries {
            tracing::debug!("API request attempt {}/{}: {}", attempt, retries, url);

            let request = self.client.get(&url).timeout(self.settings.timeout);

            let response = tokio::select! {
                _ = shutdown.recv() => {
                    return FetchOutcome::Failure(FetchError::CancelledError);
                }
                response = request.send() => response,
            };

            match response {
                Err(err) => {
                    tracing::warn!("API transport error (attempt {}/{}): {}", attempt, retries, err);
                }
                Ok(response) => {
                    let status = response.status();
                    tracing::debug!("API response status: {}", status);

                    match classify_status(status) {
                        Disposition::Permanent => {
                            tracing::error!("Non-retryable HTTP status: {}", status);
                            return FetchOutcome::Failure(FetchError::StatusError {
                                status: status.as_u16(),
                            });
                        }
                        Disposition::Retryable => {
                            tracing::warn!(
                                "Retryable HTTP status {} (attempt {}/{})",
                                status,
                                attempt,
                                retries
                            );
                        }
                        Disposition::Proceed => {
                            let text = tokio::select! {
                                _ = shutdown.recv() => {
                                    return FetchOutcome::Failure(FetchError::CancelledError);
                                }
                                text = response.text() => text,
                            };

                            match text {
                                Ok(text) => return self.decode_body(&text),
                                Err(err) => {
                                    tracing::warn!(
                                        "Response body read failed (attempt {}/{}): {}",
                                        attempt,
                                        retries,
                                        err
                                    );
                                }
                            }
                        }
                    }
                }
            }

            if attempt < retries {
                let delay = Duration::from_secs(u64::from(attempt) * 2);
                tracing::debug!("Retrying in {:?}", delay);

                tokio::select! {
                    _ = shutdown.recv() => {
                        return FetchOutcome::Failure(FetchError::CancelledError);
                    }
                    _ = self.sleeper.sleep(delay) => {}
                }
            }
        }

        tracing::error!("API request failed after {} attempts", retries);
        FetchOutcome::Failure(FetchError::ExhaustedError { attempts: retries })
    }

    /// Decode failures are terminal, not retried: the endpoint delivered
    /// a complete body, so another attempt would fetch the same payload.
    fn decode_body(&self, text: &str) -> FetchOutcome {
        let body: Value = match serde_json::from_str(text) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(
                    "JSON decode failed at line {} column {}: {}",
                    err.line(),
                    err.column(),
                    err
                );
                let preview: String = text.chars().take(500).collect();
                tracing::debug!("Raw response (first 500 chars): {}", preview);
                return FetchOutcome::Failure(FetchError::DecodeError(err));
            }
        };

        match first_notification(body) {
            Some(raw) => FetchOutcome::Success(Record { data: raw }.normalized()),
            None => {
                tracing::debug!("No notifications found in API response");
                FetchOutcome::Empty
            }
        }
    }
}

/// First element of the `meldingen` array, when the response carries a
/// keyed mapping there. Anything else (missing field, null, non-array,
/// empty array, scalar first element) means there is nothing to report.
fn first_notification(body: Value) -> Option<Map<String, Value>> {
    let Value::Object(mut top) = body else {
        return None;
    };

    match top.remove("meldingen") {
        Some(Value::Array(items)) => match items.into_iter().next() {
            Some(Value::Object(first)) => Some(first),
            _ => None,
        },
        _ => None,
    }
}
