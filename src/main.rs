use anyhow::Result;
use stadtwohnung_watcher::{AppConfig, Watcher};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stadtwohnung_watcher=info".parse()?),
        )
        .init();

    info!("Starting apartment scraper...");

    let config = AppConfig::from_env()?;
    let watcher = Watcher::from_config(&config).await?;

    let summary = match watcher.run_once().await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Run aborted: {}", e);
            watcher.store().close().await;
            return Err(e.into());
        }
    };
    watcher.store().close().await;

    info!(
        fetched = summary.fetched,
        new = summary.new,
        sent = summary.sent,
        failed = summary.failed,
        "Run finished"
    );

    Ok(())
}
