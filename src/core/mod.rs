pub mod fetcher;
pub mod poller;

pub use crate::domain::model::{FetchOutcome, Filter, Record};
pub use crate::domain::ports::{ConfigProvider, OutcomeHandler, Sleeper, TokioSleeper};
pub use crate::utils::error::Result;
