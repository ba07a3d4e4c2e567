use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use parcel_daemon::config::DaemonConfig;
use parcel_daemon::dispatch::{self, Inbound};
use parcel_daemon::http;
use parcel_daemon::telegram::TelegramClient;
use parcel_session::access::AdminSet;
use parcel_session::db::Store;
use parcel_session::desk::OrderDesk;

/// Pause after a failed poll before trying again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "parcel-daemon", about = "Runs the parcel order desk as a Telegram bot")]
struct Cli {
    /// Path to config file (default: ~/.config/parcel/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Environment profile to use (prod or dev)
    #[arg(long)]
    env: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load config
    let config = DaemonConfig::load(cli.config.as_ref(), cli.env.as_deref())?;
    info!(
        env = %config.env,
        db = %config.db_path.display(),
        admins = config.admin_ids.len(),
        "loaded config"
    );

    let store = Store::open(&config.db_path)
        .with_context(|| format!("failed to open order database at {}", config.db_path.display()))?;
    let client = Arc::new(TelegramClient::new(
        &config.api_url,
        &config.bot_token,
        config.poll_timeout_secs,
    )?);
    let desk = OrderDesk::new(
        store,
        client.clone(),
        AdminSet::from(config.admin_ids.clone()),
    );

    let cancel = CancellationToken::new();
    let http_handle = http::spawn_http_server(config.http_port, cancel.clone()).await?;

    info!("daemon started, entering main loop");

    // Updates are handled one at a time, in the order Telegram delivers them.
    let mut offset = 0;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("shutdown signal received");
                break;
            }

            _ = tokio::signal::ctrl_c() => {
                info!("received ctrl-c, shutting down");
                cancel.cancel();
                break;
            }

            result = client.get_updates(offset, config.poll_timeout_secs) => {
                match result {
                    Ok(updates) => {
                        for update in updates {
                            offset = update.update_id + 1;
                            let Some(inbound) = Inbound::from_update(update) else {
                                continue;
                            };
                            dispatch::dispatch(&desk, &*client, inbound).await;
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "polling for updates failed");
                        tokio::select! {
                            _ = cancel.cancelled() => {}
                            _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                        }
                    }
                }
            }
        }
    }

    // Clean shutdown
    cancel.cancel();
    if let Err(e) = http_handle.await {
        error!(error = %e, "HTTP server task failed");
    }
    info!("daemon stopped");
    Ok(())
}
