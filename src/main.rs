//! Crypto news relay: binary entrypoint.
//! One invocation runs one batch (flash or digest) and exits; scheduling is external (cron/CI).

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crypto_news_relay::ai_adapter::build_llm_client;
use crypto_news_relay::notify::{DiscordWebhook, DryRunNotifier, Notifier};
use crypto_news_relay::pipeline::{run_digest, run_flash, sources_from_config, RunContext};
use crypto_news_relay::{AppConfig, RelayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Breaking news from the last few minutes, each item delivered once.
    Flash,
    /// Roundup of the last day.
    Digest,
}

#[derive(Debug, Parser)]
#[command(name = "crypto-news-relay", version, about = "Relay fresh crypto/macro news to a Discord webhook")]
struct Cli {
    #[arg(value_enum, default_value_t = Mode::Flash)]
    mode: Mode,

    /// Print messages instead of posting them; the ledger is not updated.
    #[arg(long)]
    dry_run: bool,
}

/// Logs go to stderr so `--dry-run` output stays clean on stdout.
/// `RUST_LOG` filters (default `info`); `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<(), RelayError> {
    let cfg = AppConfig::load()?;

    let notifier: Arc<dyn Notifier> = if cli.dry_run {
        Arc::new(DryRunNotifier)
    } else {
        // Destination is checked before any fetching happens.
        let url = match cli.mode {
            Mode::Flash => cfg.flash_webhook()?,
            Mode::Digest => cfg.digest_webhook()?,
        };
        Arc::new(DiscordWebhook::new(url, cfg.http_timeout()).map_err(|e| RelayError::Config(format!("{e:#}")))?)
    };

    let llm = build_llm_client(&cfg.llm).map_err(|e| RelayError::Config(format!("{e:#}")))?;
    let sources = sources_from_config(&cfg);
    tracing::info!(
        mode = ?cli.mode,
        dry_run = cli.dry_run,
        feeds = sources.len(),
        llm = llm.provider_name(),
        "run starting"
    );

    let ctx = RunContext {
        cfg,
        sources,
        llm,
        notifier,
        record_deliveries: !cli.dry_run,
    };
    let now = chrono::Utc::now();
    let report = match cli.mode {
        Mode::Flash => run_flash(&ctx, now).await?,
        Mode::Digest => run_digest(&ctx, now).await?,
    };

    tracing::info!(
        fetched = report.fetched,
        delivered = report.delivered,
        chunks = report.chunks_sent,
        enrich_failures = report.enrich_failures,
        ledger_size = ?report.ledger_size,
        "run finished"
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
