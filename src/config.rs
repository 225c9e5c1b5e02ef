use std::time::Duration;

use anyhow::Context as _;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Everything the service reads from the environment, gathered once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the document store's API
    pub notion_token: String,
    /// The events database mirrored into the relational store
    pub events_database_id: String,
    /// The members database mirrored from the relational store; deployments
    /// without one sync events only
    pub members_database_id: Option<String>,
    /// MySQL connection string
    pub database_url: String,
    /// How often a sync cycle runs
    pub sync_interval: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let sync_interval = match std::env::var("SYNC_INTERVAL_MINUTES") {
            Ok(minutes) => {
                let minutes: u64 = minutes
                    .parse()
                    .context("SYNC_INTERVAL_MINUTES must be a whole number of minutes")?;
                Duration::from_secs(60 * minutes)
            }
            Err(_) => DEFAULT_INTERVAL,
        };

        Ok(Self {
            notion_token: std::env::var("NOTION_TOKEN").context("No document store token provided")?,
            events_database_id: std::env::var("NOTION_EVENTS_DB_ID")
                .context("No events database id provided")?,
            members_database_id: std::env::var("NOTION_MEMBERS_DB_ID").ok(),
            database_url: std::env::var("DATABASE_URL").context("No database URL provided")?,
            sync_interval,
        })
    }
}
