use clap::Parser;
use p2000_fetch::core::fetcher::FetchSettings;
use p2000_fetch::domain::ports::{ConfigProvider, OutcomeHandler};
use p2000_fetch::utils::{logger, shutdown, validation::Validate};
use p2000_fetch::{CliConfig, FetchError, Fetcher, FileConfig, Poller, Record};

/// Writes each outcome to the log, with the notification id as the
/// headline value.
struct LogHandler;

#[async_trait::async_trait]
impl OutcomeHandler for LogHandler {
    async fn on_record(&self, record: &Record) {
        let id = record.id().unwrap_or_else(|| "?".to_string());
        let melding = record.get_str_or("melding", "(no message)");
        let dienst = record.get_str_or("dienst", "?");
        let plaats = record.get_str_or("plaats", "?");
        let when = record
            .timestamp()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "?".to_string());

        tracing::info!("📟 [{}] {} | {} | {} | {}", id, melding, dienst, plaats, when);

        if record.get_str_or("prio1", "0") == "1" {
            tracing::warn!("🚨 Priority 1 dispatch in {}", plaats);
        }
    }

    async fn on_empty(&self) {
        tracing::debug!("No notifications matched the filter");
    }

    async fn on_failure(&self, error: &FetchError) {
        tracing::error!("❌ Fetch failed: {}", error);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting p2000-fetch");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // A config file replaces the CLI filter/fetch arguments wholesale.
    let (settings, filter, interval) = match &cli.config {
        Some(path) => {
            let file = FileConfig::from_file(path)?;
            if let Err(e) = file.validate() {
                tracing::error!("❌ Configuration validation failed: {}", e);
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
            (
                FetchSettings::from_config(&file),
                file.filter(),
                file.poll_interval(),
            )
        }
        None => {
            if let Err(e) = cli.validate() {
                tracing::error!("❌ Configuration validation failed: {}", e);
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
            (
                FetchSettings::from_config(&cli),
                cli.filter(),
                cli.poll_interval(),
            )
        }
    };

    if filter.is_empty() {
        tracing::warn!("Empty filter: every notification in the feed will match");
    }
    tracing::info!("Polling {} every {:?}", settings.endpoint, interval);

    let fetcher = Fetcher::new(settings)?;
    let poller = Poller::new(fetcher, filter, interval, LogHandler);

    let (handle, mut shutdown) = shutdown::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Ctrl-C received, shutting down"),
            Err(err) => tracing::error!("Failed to listen for ctrl-c: {}", err),
        }
        handle.shutdown();
    });

    poller.run(&mut shutdown).await;
    tracing::info!("✅ Poller stopped");

    Ok(())
}
