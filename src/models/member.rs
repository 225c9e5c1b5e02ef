use std::fmt;

use sqlx::MySqlPool;
use time::OffsetDateTime;

use crate::error::SyncResult;
use crate::notion::{DateValue, Page, Properties, PropertyValue};
use crate::util::{format_instant, normalize_timestamp, parse_instant};

// Property names in the members database.
const TITLE: &str = "Name";
const FIRST_NAME: &str = "First Name";
const LAST_NAME: &str = "Last Name";
const PREFERRED_NAME: &str = "Preferred Name";
const EMAIL: &str = "Email";
const STATUS: &str = "Student Status";
const FACULTY: &str = "Faculty";
const COLLEGE: &str = "College";
const PROGRAM: &str = "Program";
const YEAR_OF_STUDY: &str = "Year of Study";
const COUNTRY: &str = "Country";
const REGISTRATION_DATE: &str = "Registration Date";
const LAST_UPDATE: &str = "Last Update";

/// The natural key used to match rows to pages.
pub const STUDENT_NUMBER: &str = "Student Number";

/// Owned by the registration app, never included in a write payload.
pub const EVENTS_REGISTERED: &str = "Events Registered";

/// A member row from the relational store, which owns this data.
///
/// The descriptive columns are nullable in the live table and two decades of
/// registration forms have left the timestamps in several shapes, so they are
/// fetched as raw text and normalized on the way out.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Member {
    pub id: i64,
    /// The member's student number, stable across both stores
    pub student_number: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// The member's nick name
    pub preferred_name: Option<String>,
    pub email: Option<String>,
    /// Undergrad/grad/alumni standing
    pub status: Option<String>,
    pub faculty: Option<String>,
    pub college: Option<String>,
    pub program: Option<String>,
    pub year_of_study: Option<String>,
    pub country: Option<String>,
    pub registration_date: Option<String>,
    pub last_update: Option<String>,
}

/// One field the change detector found out of step, with both sides for the
/// log line.
#[derive(Debug)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: Option<String>,
    pub new: Option<String>,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?} -> {:?}", self.field, self.old, self.new)
    }
}

impl Member {
    pub async fn all(pool: &MySqlPool) -> SyncResult<Vec<Self>> {
        sqlx::query_as(
            "SELECT id, CAST(student_number AS CHAR) AS student_number,
                 first_name, last_name, preferred_name, email,
                 status, faculty, college, program,
                 CAST(year_of_study AS CHAR) AS year_of_study, country,
                 CAST(registration_date AS CHAR) AS registration_date,
                 CAST(last_update AS CHAR) AS last_update
             FROM members ORDER BY id",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// The member's full name
    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or_default();
        let last = self.last_name.as_deref().unwrap_or_default();

        format!("{} {}", non_empty(&self.preferred_name).unwrap_or(first), last)
    }

    pub fn registered_at(&self) -> Option<OffsetDateTime> {
        normalize_timestamp(self.registration_date.as_deref())
    }

    /// When the row last changed; a member never updated since registration
    /// falls back to their registration date.
    pub fn effective_last_update(&self) -> Option<OffsetDateTime> {
        normalize_timestamp(self.last_update.as_deref()).or_else(|| self.registered_at())
    }

    /// The write payload for this member's page.
    ///
    /// Select, number, date, and email values that would be empty are left out
    /// of the payload entirely; the store's API mishandles some null variants
    /// for those kinds.
    pub fn properties(&self) -> Properties {
        let mut props = Properties::new();

        props.insert(TITLE.to_owned(), PropertyValue::title(&self.full_name()));
        props.insert(
            STUDENT_NUMBER.to_owned(),
            PropertyValue::text(&self.student_number),
        );
        props.insert(
            FIRST_NAME.to_owned(),
            PropertyValue::text(self.first_name.as_deref().unwrap_or_default()),
        );
        props.insert(
            LAST_NAME.to_owned(),
            PropertyValue::text(self.last_name.as_deref().unwrap_or_default()),
        );
        props.insert(
            PREFERRED_NAME.to_owned(),
            PropertyValue::text(self.preferred_name.as_deref().unwrap_or_default()),
        );

        if let Some(email) = non_empty(&self.email) {
            props.insert(EMAIL.to_owned(), PropertyValue::email(email));
        }
        for (name, value) in [
            (STATUS, &self.status),
            (FACULTY, &self.faculty),
            (COLLEGE, &self.college),
            (PROGRAM, &self.program),
            (YEAR_OF_STUDY, &self.year_of_study),
            (COUNTRY, &self.country),
        ] {
            if let Some(value) = non_empty(value) {
                props.insert(name.to_owned(), PropertyValue::select(value));
            }
        }
        if let Some(registered) = self.registered_at() {
            props.insert(
                REGISTRATION_DATE.to_owned(),
                PropertyValue::date(format_instant(registered)),
            );
        }
        if let Some(updated) = self.effective_last_update() {
            props.insert(
                LAST_UPDATE.to_owned(),
                PropertyValue::date(format_instant(updated)),
            );
        }

        props
    }

    /// Compares this row against its page, field by field, through the same
    /// normalization the write path uses.
    pub fn diff(&self, page: &Page) -> Vec<FieldChange> {
        let mut changes = Vec::new();

        text_change(&mut changes, "first name", FIRST_NAME, &self.first_name, page);
        text_change(&mut changes, "last name", LAST_NAME, &self.last_name, page);
        text_change(
            &mut changes,
            "preferred name",
            PREFERRED_NAME,
            &self.preferred_name,
            page,
        );

        scalar_change(&mut changes, "email", non_empty(&self.email), page.email(EMAIL));
        scalar_change(
            &mut changes,
            "student status",
            non_empty(&self.status),
            page.select(STATUS),
        );
        scalar_change(
            &mut changes,
            "faculty",
            non_empty(&self.faculty),
            page.select(FACULTY),
        );
        scalar_change(
            &mut changes,
            "college",
            non_empty(&self.college),
            page.select(COLLEGE),
        );
        scalar_change(
            &mut changes,
            "program",
            non_empty(&self.program),
            page.select(PROGRAM),
        );
        scalar_change(
            &mut changes,
            "year of study",
            non_empty(&self.year_of_study),
            page.select(YEAR_OF_STUDY),
        );
        scalar_change(
            &mut changes,
            "nationality",
            non_empty(&self.country),
            page.select(COUNTRY),
        );

        date_change(
            &mut changes,
            "registration date",
            self.registered_at(),
            page.date(REGISTRATION_DATE),
        );
        date_change(
            &mut changes,
            "last update",
            self.effective_last_update(),
            page.date(LAST_UPDATE),
        );

        changes
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

/// Rich-text fields are always written, so an empty expectation counts as a
/// difference against a populated page.
fn text_change(
    changes: &mut Vec<FieldChange>,
    field: &'static str,
    property: &str,
    expected: &Option<String>,
    page: &Page,
) {
    let expected = non_empty(expected);
    let actual = page.plain_text(property);

    if expected != actual.as_deref() {
        changes.push(FieldChange {
            field,
            old: actual,
            new: expected.map(str::to_owned),
        });
    }
}

/// Kinds that are omitted from writes when empty can only change while the
/// expected value is present; an absent expectation is unwritable.
fn scalar_change(
    changes: &mut Vec<FieldChange>,
    field: &'static str,
    expected: Option<&str>,
    actual: Option<&str>,
) {
    if let Some(expected) = expected {
        if actual != Some(expected) {
            changes.push(FieldChange {
                field,
                old: actual.map(str::to_owned),
                new: Some(expected.to_owned()),
            });
        }
    }
}

fn date_change(
    changes: &mut Vec<FieldChange>,
    field: &'static str,
    expected: Option<OffsetDateTime>,
    actual: Option<&DateValue>,
) {
    if let Some(expected) = expected {
        let actual = actual.and_then(|date| parse_instant(&date.start));
        if actual != Some(expected) {
            changes.push(FieldChange {
                field,
                old: actual.map(format_instant),
                new: Some(format_instant(expected)),
            });
        }
    }
}
