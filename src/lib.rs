pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;
pub use crate::config::file::FileConfig;

pub use crate::core::fetcher::{FetchSettings, Fetcher, DEFAULT_ENDPOINT};
pub use crate::core::poller::Poller;
pub use crate::domain::model::{FetchOutcome, Filter, Record};
pub use crate::utils::error::{FetchError, Result};
