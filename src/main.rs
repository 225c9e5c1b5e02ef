//! Keeps the club's MySQL mirror and Notion workspace in step.

use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lesa_sync::config::Config;
use lesa_sync::notion::NotionClient;
use lesa_sync::sync;
use lesa_sync::util::connect_to_db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let pool = connect_to_db(&config.database_url).await?;
    let notion = NotionClient::new(config.notion_token.clone());

    info!(interval = ?config.sync_interval, "scheduler started");
    sync::run(&notion, &config, &pool).await;

    Ok(())
}
