use crate::core::fetcher::DEFAULT_ENDPOINT;
use crate::domain::model::Filter;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "p2000-fetch")]
#[command(about = "Polls the alarmeringdroid P2000 feed for dispatch notifications")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Municipality names, comma separated
    #[arg(long, value_delimiter = ',')]
    pub gemeenten: Vec<String>,

    /// Pager capcodes, comma separated
    #[arg(long, value_delimiter = ',')]
    pub capcodes: Vec<String>,

    /// Safety region identifiers, comma separated
    #[arg(long, value_delimiter = ',')]
    pub regios: Vec<String>,

    /// Service discipline (e.g. Brandweer, Ambulance)
    #[arg(long)]
    pub disciplines: Option<String>,

    #[arg(long, default_value = "3")]
    pub retries: u32,

    #[arg(long, default_value = "10")]
    pub timeout_seconds: u64,

    #[arg(long, default_value = "30")]
    pub interval_seconds: u64,

    /// TOML config file; replaces the filter and fetch arguments above
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn filter(&self) -> Filter {
        Filter {
            gemeenten: self.gemeenten.clone(),
            capcodes: self.capcodes.clone(),
            regios: self.regios.clone(),
            disciplines: self.disciplines.clone(),
            flags: Default::default(),
        }
    }

    fn retries(&self) -> u32 {
        self.retries
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("endpoint", &self.endpoint)?;
        validate_positive_number("retries", u64::from(self.retries), 1)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
        validate_positive_number("interval_seconds", self.interval_seconds, 5)?;
        if let Some(disciplines) = &self.disciplines {
            validate_non_empty_string("disciplines", disciplines)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_delimited_lists() {
        let config = CliConfig::parse_from([
            "p2000-fetch",
            "--gemeenten",
            "Utrecht,Amersfoort",
            "--capcodes",
            "1420059",
            "--disciplines",
            "Brandweer",
        ]);

        let filter = config.filter();
        assert_eq!(filter.gemeenten, vec!["Utrecht", "Amersfoort"]);
        assert_eq!(filter.capcodes, vec!["1420059"]);
        assert_eq!(filter.disciplines.as_deref(), Some("Brandweer"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_match_the_upstream_contract() {
        let config = CliConfig::parse_from(["p2000-fetch"]);

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.retries, 3);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert!(config.filter().is_empty());
    }

    #[test]
    fn rejects_zero_retries() {
        let config = CliConfig::parse_from(["p2000-fetch", "--retries", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let config = CliConfig::parse_from(["p2000-fetch", "--endpoint", "ftp://example.com"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_blank_disciplines() {
        let config = CliConfig::parse_from(["p2000-fetch", "--disciplines", "  "]);
        assert!(config.validate().is_err());
    }
}
