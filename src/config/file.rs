use crate::core::fetcher::{DEFAULT_ENDPOINT, DEFAULT_RETRIES, DEFAULT_TIMEOUT};
use crate::core::poller::DEFAULT_POLL_INTERVAL;
use crate::domain::model::Filter;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{FetchError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// TOML configuration surface, the declarative alternative to the CLI
/// arguments. Missing keys fall back to the fetcher defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub fetch: Option<FetchSection>,
    pub poll: Option<PollSection>,
    pub filter: FilterSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSection {
    pub endpoint: Option<String>,
    pub retries: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSection {
    pub interval_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSection {
    pub gemeenten: Option<Vec<String>>,
    pub capcodes: Option<Vec<String>>,
    pub regios: Option<Vec<String>>,
    pub disciplines: Option<String>,
    pub flags: Option<BTreeMap<String, bool>>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FetchError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| FetchError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }
}

impl ConfigProvider for FileConfig {
    fn endpoint(&self) -> &str {
        self.fetch
            .as_ref()
            .and_then(|fetch| fetch.endpoint.as_deref())
            .unwrap_or(DEFAULT_ENDPOINT)
    }

    fn filter(&self) -> Filter {
        Filter {
            gemeenten: self.filter.gemeenten.clone().unwrap_or_default(),
            capcodes: self.filter.capcodes.clone().unwrap_or_default(),
            regios: self.filter.regios.clone().unwrap_or_default(),
            disciplines: self.filter.disciplines.clone(),
            flags: self.filter.flags.clone().unwrap_or_default(),
        }
    }

    fn retries(&self) -> u32 {
        self.fetch
            .as_ref()
            .and_then(|fetch| fetch.retries)
            .unwrap_or(DEFAULT_RETRIES)
    }

    fn timeout(&self) -> Duration {
        self.fetch
            .as_ref()
            .and_then(|fetch| fetch.timeout_seconds)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    fn poll_interval(&self) -> Duration {
        self.poll
            .as_ref()
            .and_then(|poll| poll.interval_seconds)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }
}

impl Validate for FileConfig {
    fn validate(&self) -> Result<()> {
        validate_url("fetch.endpoint", self.endpoint())?;
        validate_positive_number("fetch.retries", u64::from(self.retries()), 1)?;
        validate_range("fetch.timeout_seconds", self.timeout().as_secs(), 1, 300)?;
        validate_positive_number("poll.interval_seconds", self.poll_interval().as_secs(), 5)?;
        if let Some(disciplines) = &self.filter.disciplines {
            validate_non_empty_string("filter.disciplines", disciplines)?;
        }
        Ok(())
    }
}
