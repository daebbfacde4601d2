mod api;
mod jobs;
mod notify;
#[cfg(test)]
mod testing;

use chrono::Utc;
use clap::{Parser, Subcommand};
use kaizen_core::{
    config::{self, Config},
    traits::Mailer,
};
use kaizen_mailer::ResendMailer;
use kaizen_store::Store;
use notify::Notifier;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "kaizen-notify",
    version,
    about = "Kaizen Focus: overdue-task nudges and report-card emails"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml", env = "KAIZEN_CONFIG")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server for the external scheduler.
    Serve,
    /// Scan for overdue tasks once and send reminders.
    ScanOverdue,
    /// Check which report cards are due and send them.
    CheckReports,
    /// Check configuration and store reachability.
    Status,
}

/// Build the mail provider from config.
fn build_mailer(cfg: &Config) -> anyhow::Result<Arc<dyn Mailer>> {
    match cfg.mailer.provider.as_str() {
        "resend" => Ok(Arc::new(ResendMailer::from_config(&cfg.mailer)?)),
        other => anyhow::bail!("unsupported mailer provider: {other}"),
    }
}

/// Store and notifier for the commands that send mail.
async fn build_services(cfg: &Config) -> anyhow::Result<(Store, Notifier)> {
    let store = Store::new(&cfg.store).await?;
    let mailer = build_mailer(cfg)?;
    Ok((store, Notifier::new(mailer, &cfg.mailer)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.kaizen.log_level)),
        )
        .init();

    match cli.command {
        Commands::Serve => {
            if cfg.mailer.api_key.is_empty() {
                anyhow::bail!(
                    "mailer api_key is empty. Set it in config.toml or the RESEND_API_KEY env var."
                );
            }
            let (store, notifier) = build_services(&cfg).await?;
            println!(
                "{} notification service starting (mailer: {})...",
                cfg.kaizen.name,
                notifier.mailer_name()
            );
            let state = api::AppState::new(
                store,
                notifier,
                &cfg.api.cron_secret,
                cfg.jobs.concurrency,
            );
            api::serve(&cfg.api, state).await?;
        }
        Commands::ScanOverdue => {
            let (store, notifier) = build_services(&cfg).await?;
            let summary =
                jobs::check_overdue_tasks(&store, &notifier, cfg.jobs.concurrency, Utc::now())
                    .await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::CheckReports => {
            let (store, notifier) = build_services(&cfg).await?;
            let summary =
                jobs::check_report_due(&store, &notifier, cfg.jobs.concurrency, Utc::now())
                    .await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Status => {
            println!("{} notification service: status check\n", cfg.kaizen.name);
            println!("Config: {}", cli.config);
            println!("API: {}:{}", cfg.api.host, cfg.api.port);
            println!(
                "  cron secret: {}",
                if cfg.api.cron_secret.is_empty() {
                    "missing (all /functions requests will be rejected)"
                } else {
                    "configured"
                }
            );
            println!();

            match Store::new(&cfg.store).await {
                Ok(store) => match store.ping().await {
                    Ok(()) => println!("  store ({}): reachable", cfg.store.db_path),
                    Err(e) => println!("  store ({}): {e}", cfg.store.db_path),
                },
                Err(e) => println!("  store ({}): {e}", cfg.store.db_path),
            }

            match build_mailer(&cfg) {
                Ok(mailer) => println!(
                    "  mailer: {} ({})",
                    mailer.name(),
                    if cfg.mailer.api_key.is_empty() {
                        "missing api_key"
                    } else {
                        "configured"
                    }
                ),
                Err(e) => println!("  mailer: {e}"),
            }
            println!("  sender: {}", cfg.mailer.from);
            println!("  app url: {}", cfg.mailer.app_url);
            println!("  concurrency: {}", cfg.jobs.concurrency);
        }
    }

    Ok(())
}
