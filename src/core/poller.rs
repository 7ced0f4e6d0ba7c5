use crate::core::fetcher::Fetcher;
use crate::domain::model::{FetchOutcome, Filter};
use crate::domain::ports::{OutcomeHandler, Sleeper};
use crate::utils::shutdown::Shutdown;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Periodic driver around the fetcher: one fetch in flight at a time,
/// outcomes handed to the consumer, prompt exit on shutdown.
pub struct Poller<S: Sleeper, H: OutcomeHandler> {
    fetcher: Fetcher<S>,
    filter: Filter,
    interval: Duration,
    handler: H,
}

impl<S: Sleeper, H: OutcomeHandler> Poller<S, H> {
    pub fn new(fetcher: Fetcher<S>, filter: Filter, interval: Duration, handler: H) -> Self {
        Self {
            fetcher,
            filter,
            interval,
            handler,
        }
    }

    /// Fetch on every tick until the shutdown signal fires. The first
    /// fetch happens immediately; a tick that lands while a fetch is
    /// still running is delayed, never stacked.
    pub async fn run(&self, shutdown: &mut Shutdown) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Poller stopping on shutdown signal");
                    return;
                }
                _ = ticker.tick() => {}
            }

            tracing::debug!("Fetching with filter: {}", self.filter.to_query());
            let outcome = self.fetcher.fetch_with_shutdown(&self.filter, shutdown).await;

            match outcome {
                FetchOutcome::Success(record) => {
                    tracing::debug!("Fetched notification {:?}", record.id());
                    self.handler.on_record(&record).await;
                }
                FetchOutcome::Empty => {
                    self.handler.on_empty().await;
                }
                FetchOutcome::Failure(err) => {
                    if shutdown.is_shutdown() {
                        tracing::info!("Poller stopping on shutdown signal");
                        return;
                    }
                    tracing::warn!("Fetch failed: {}", err);
                    self.handler.on_failure(&err).await;
                }
            }
        }
    }
}
