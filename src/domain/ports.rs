use crate::domain::model::{Filter, Record};
use crate::utils::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// Backoff sleep primitive. The fetcher never sleeps directly, so tests
/// can observe and control retry pacing without wall-clock delays.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn filter(&self) -> Filter;
    fn retries(&self) -> u32;
    fn timeout(&self) -> Duration;
    fn poll_interval(&self) -> Duration;
}

/// Consumer side of the polling loop. `Empty` and `Failure` outcomes are
/// surfaced separately so the consumer can keep prior state on "nothing
/// matched" while treating "could not determine" differently.
#[async_trait]
pub trait OutcomeHandler: Send + Sync {
    async fn on_record(&self, record: &Record);

    async fn on_empty(&self) {}

    async fn on_failure(&self, _error: &FetchError) {}
}
