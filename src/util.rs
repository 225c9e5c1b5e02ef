//! Extra utilities for use elsewhere in the sync service.

use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use tracing::warn;

use crate::error::SyncResult;

const SQL_DATETIME: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const DATE_ONLY: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub async fn connect_to_db(url: &str) -> SyncResult<MySqlPool> {
    MySqlPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .map_err(Into::into)
}

/// Parses an instant in any of the shapes the two stores hand back: RFC 3339,
/// a bare SQL datetime (assumed UTC), or a date with no time (midnight UTC).
pub fn parse_instant(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(instant);
    }
    if let Ok(datetime) = PrimitiveDateTime::parse(raw, SQL_DATETIME) {
        return Some(datetime.assume_utc());
    }
    if let Ok(date) = Date::parse(raw, DATE_ONLY) {
        return Some(date.midnight().assume_utc());
    }

    None
}

/// Normalizes the many shapes a member timestamp has accumulated over the
/// years. `NULL`, empty strings, `"0"`, the zero-date, and epoch zero all
/// mean "never set"; all-digit values are epoch seconds.
pub fn normalize_timestamp(raw: Option<&str>) -> Option<OffsetDateTime> {
    let raw = raw?.trim();
    if raw.is_empty() || raw.starts_with("0000-00-00") {
        return None;
    }

    if raw.bytes().all(|byte| byte.is_ascii_digit()) {
        let seconds: i64 = raw.parse().ok()?;
        if seconds == 0 {
            return None;
        }
        return OffsetDateTime::from_unix_timestamp(seconds).ok();
    }

    match parse_instant(raw) {
        Some(instant) => Some(instant),
        None => {
            warn!(value = raw, "member row has an unparseable timestamp");
            None
        }
    }
}

pub fn format_instant(instant: OffsetDateTime) -> String {
    instant.format(&Rfc3339).unwrap_or_default()
}
