//! Document store → relational store: the event mirror.

use sqlx::MySqlPool;
use tracing::info;

use crate::config::Config;
use crate::error::SyncResult;
use crate::models::event::Event;
use crate::notion::{fetch_all_pages, DocumentStore, Page};

/// Mirrors every non-cancelled event into the relational store.
///
/// Every row is rewritten wholesale each cycle; at this cardinality that is
/// cheaper than diffing, and a cycle that dies partway leaves rows the next
/// cycle repairs. A failed upsert aborts the rest of the batch.
pub async fn sync_events(
    store: &dyn DocumentStore,
    config: &Config,
    pool: &MySqlPool,
) -> SyncResult<usize> {
    let pages = fetch_all_pages(store, &config.events_database_id).await?;
    let events = collect_events(&pages);
    info!(fetched = pages.len(), mapped = events.len(), "syncing events");

    for event in &events {
        event.upsert(pool).await?;
    }

    Ok(events.len())
}

/// Drops cancelled pages, maps the rest in source order.
pub fn collect_events(pages: &[Page]) -> Vec<Event> {
    pages
        .iter()
        .filter(|page| !Event::is_cancelled(page))
        .map(Event::from_page)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::mock::PageBuilder;

    #[test]
    fn cancelled_pages_never_reach_the_output() {
        let pages = vec![
            PageBuilder::new("evt-1")
                .number("ID", 1.0)
                .title("Name", "Kept")
                .build(),
            PageBuilder::new("evt-2")
                .number("ID", 2.0)
                .title("Name", "Dropped")
                .select("Status", "Cancelled")
                .build(),
            PageBuilder::new("evt-3")
                .number("ID", 3.0)
                .title("Name", "Also Kept")
                .select("Status", "Confirmed")
                .build(),
        ];

        let events = collect_events(&pages);
        let names: Vec<&str> = events.iter().map(|event| event.name.as_str()).collect();
        assert_eq!(names, vec!["Kept", "Also Kept"]);
    }

    #[test]
    fn mapping_is_deterministic() {
        let pages = vec![PageBuilder::new("evt-1")
            .number("ID", 1.0)
            .title("Name", "Taco Night")
            .date("Date", "2024-05-01T18:00:00Z", Some("2024-05-01T20:00:00Z"))
            .build()];

        // The upsert is a blind overwrite, so identical mappings mean a second
        // run writes exactly what the first wrote.
        assert_eq!(collect_events(&pages), collect_events(&pages));
    }
}
