//! Relational store → document store: member records.

use std::collections::HashMap;

use sqlx::MySqlPool;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{SyncError, SyncResult};
use crate::models::member::{Member, STUDENT_NUMBER};
use crate::notion::{fetch_all_pages, DocumentStore, Page};

#[derive(Debug, Default, PartialEq)]
pub struct MemberSyncOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Brings the members database up to date with the relational rows.
///
/// Fails only if the bulk read or the paging fails; individual member records
/// are on their own. The store behind this is rate limited and flaky in ways
/// that must not take down the rest of the batch.
pub async fn sync_members(
    store: &dyn DocumentStore,
    config: &Config,
    pool: &MySqlPool,
) -> SyncResult<MemberSyncOutcome> {
    let database_id = config
        .members_database_id
        .as_deref()
        .ok_or(SyncError::MissingConfig("NOTION_MEMBERS_DB_ID"))?;

    let members = Member::all(pool).await?;
    let pages = fetch_all_pages(store, database_id).await?;
    info!(rows = members.len(), pages = pages.len(), "syncing members");
    let index = index_by_student_number(pages);

    Ok(reconcile(store, database_id, &members, &index).await)
}

/// Pages keyed by student number; later pages win on duplicates.
pub fn index_by_student_number(pages: Vec<Page>) -> HashMap<String, Page> {
    pages
        .into_iter()
        .filter_map(|page| Some((page.plain_text(STUDENT_NUMBER)?, page)))
        .collect()
}

/// Insert-if-absent, update-if-changed, one row at a time. A failure on one
/// record is logged and counted; the loop keeps going.
pub async fn reconcile(
    store: &dyn DocumentStore,
    database_id: &str,
    members: &[Member],
    index: &HashMap<String, Page>,
) -> MemberSyncOutcome {
    let mut outcome = MemberSyncOutcome::default();

    for member in members {
        match index.get(&member.student_number) {
            None => match store.create(database_id, member.properties()).await {
                Ok(()) => {
                    info!(student = %member.student_number, "created member record");
                    outcome.inserted += 1;
                }
                Err(err) => {
                    warn!(
                        student = %member.student_number,
                        error = %err,
                        "failed to create member record"
                    );
                    outcome.skipped += 1;
                }
            },
            Some(page) => {
                let changes = member.diff(page);
                if changes.is_empty() {
                    outcome.skipped += 1;
                    continue;
                }

                let summary = changes
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                info!(student = %member.student_number, changes = %summary, "member record changed");

                match store.update(&page.id, member.properties()).await {
                    Ok(()) => outcome.updated += 1,
                    Err(err) => {
                        warn!(
                            student = %member.student_number,
                            error = %err,
                            "failed to update member record"
                        );
                        outcome.skipped += 1;
                    }
                }
            }
        }
    }

    outcome
}
