//! Dumps every page of a document-store database to stdout.
//!
//! Handy for eyeballing property names after someone reshapes a database:
//! `dump [database-id]`, defaulting to the events database.

use dotenv::dotenv;

use lesa_sync::config::Config;
use lesa_sync::notion::{fetch_all_pages, NotionClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;
    let database_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.events_database_id.clone());
    let notion = NotionClient::new(config.notion_token.clone());

    let pages = fetch_all_pages(&notion, &database_id).await?;
    println!("Retrieved {} pages", pages.len());
    for (number, page) in pages.iter().enumerate() {
        println!("\nPage #{}:\n{:#?}", number + 1, page);
    }

    Ok(())
}
