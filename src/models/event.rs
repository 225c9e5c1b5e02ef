use sqlx::MySqlPool;

use crate::error::SyncResult;
use crate::notion::{DateValue, Page};
use crate::util::parse_instant;

// Property names in the events database.
const ID: &str = "ID";
const NAME: &str = "Name";
const DATE: &str = "Date";
const DESCRIPTION: &str = "Description";
const LOCATION: &str = "Location";
const TYPE: &str = "Type";
const ORGANIZATION: &str = "Organization";
const PRICE: &str = "Price";
const STATUS: &str = "Status";
const REGISTRATION_REQUIRED: &str = "Registration Required";
const REGISTRATION_KIND: &str = "Registration";
const REGISTRATION_LINK: &str = "Registration Link";
const CALENDAR_LINK: &str = "Calendar Link";
const CPSIF_FUNDED: &str = "CPSIF Funded";

const CANCELLED: &str = "Cancelled";
const IN_APP_REGISTRATION: &str = "In-App Form";
const DEFAULT_TYPE: &str = "LESA Event";

pub struct RegistrationLink;

impl RegistrationLink {
    /// No registration needed to attend
    pub const NOT_REQUIRED: &'static str = "0";
    /// Registration needed, but nowhere to link to
    pub const NO_LINK: &'static str = "1";
    /// Registration goes through the in-app form
    pub const IN_APP: &'static str = "2";
}

/// A row of the `events` mirror table the website reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Assigned in the events database; the upsert key here
    pub id: i64,
    /// The name of the event
    pub name: String,
    /// The emoji shown next to the event, from the page icon
    pub emoji: String,
    /// General information or details about the event
    pub description: String,
    /// Where the event will be held
    pub location: String,
    /// The kind of event
    pub r#type: String,
    /// The partner organization, if any
    pub organization: Option<String>,
    /// Day of month; 0 means multi-day or open-ended, so only month/year apply
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub start_hour: i32,
    pub start_minute: i32,
    pub end_hour: i32,
    pub end_minute: i32,
    /// Ticket price, 0 when free
    pub price: f64,
    /// `"0"`/`"1"`/`"2"` markers or a literal URL (see [`RegistrationLink`])
    pub link: String,
    /// Calendar URL, or `"NONE"`
    pub calendar_link: String,
    pub is_cpsif_funded: bool,
}

/// The seven temporal columns, derived from the page's date range.
#[derive(Debug, Default, PartialEq)]
pub struct EventTimes {
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub start_hour: i32,
    pub start_minute: i32,
    pub end_hour: i32,
    pub end_minute: i32,
}

impl EventTimes {
    /// Single-day events keep their times; anything without an end instant on
    /// the same calendar date is rendered date-less downstream, with `day = 0`
    /// as the discriminator.
    pub fn derive(date: Option<&DateValue>) -> Self {
        let start = match date.and_then(|range| parse_instant(&range.start)) {
            Some(start) => start,
            None => return Self::default(),
        };
        let end = date
            .and_then(|range| range.end.as_deref())
            .and_then(parse_instant);

        match end {
            Some(end) if end.date() == start.date() => Self {
                day: start.day() as i32,
                month: u8::from(start.month()) as i32,
                year: start.year(),
                start_hour: start.hour() as i32,
                start_minute: start.minute() as i32,
                end_hour: end.hour() as i32,
                end_minute: end.minute() as i32,
            },
            _ => Self {
                day: 0,
                month: u8::from(start.month()) as i32,
                year: start.year(),
                ..Self::default()
            },
        }
    }
}

impl Event {
    pub fn is_cancelled(page: &Page) -> bool {
        page.select(STATUS) == Some(CANCELLED)
    }

    /// Maps a page into a mirror row. Absent fields get their placeholder;
    /// nothing maps to a dropped record.
    pub fn from_page(page: &Page) -> Self {
        let times = EventTimes::derive(page.date(DATE));

        Event {
            id: page.number(ID).unwrap_or_default() as i64,
            name: page
                .plain_text(NAME)
                .unwrap_or_else(|| "NO NAME".to_owned()),
            emoji: page.emoji().unwrap_or_default().to_owned(),
            description: page
                .plain_text(DESCRIPTION)
                .unwrap_or_else(|| "NONE".to_owned()),
            location: page.plain_text(LOCATION).unwrap_or_else(|| "TBA".to_owned()),
            r#type: page.select(TYPE).unwrap_or(DEFAULT_TYPE).to_owned(),
            organization: page.plain_text(ORGANIZATION),
            day: times.day,
            month: times.month,
            year: times.year,
            start_hour: times.start_hour,
            start_minute: times.start_minute,
            end_hour: times.end_hour,
            end_minute: times.end_minute,
            price: page.number(PRICE).unwrap_or_default(),
            link: Self::derive_link(page),
            calendar_link: page.url(CALENDAR_LINK).unwrap_or("NONE").to_owned(),
            is_cpsif_funded: page.checkbox(CPSIF_FUNDED),
        }
    }

    fn derive_link(page: &Page) -> String {
        if !page.checkbox(REGISTRATION_REQUIRED) {
            return RegistrationLink::NOT_REQUIRED.to_owned();
        }
        if page.select(REGISTRATION_KIND) == Some(IN_APP_REGISTRATION) {
            return RegistrationLink::IN_APP.to_owned();
        }

        match page.url(REGISTRATION_LINK) {
            Some(url) => url.to_owned(),
            None => RegistrationLink::NO_LINK.to_owned(),
        }
    }

    /// Writes every non-key column unconditionally. The mirror has no
    /// lifecycle of its own, so there is nothing to diff against.
    pub async fn upsert(&self, pool: &MySqlPool) -> SyncResult<()> {
        sqlx::query(
            "INSERT INTO events
                 (id, name, emoji, description, location, `type`, organization,
                  `day`, `month`, `year`, startHour, startMinute, endHour, endMinute,
                  price, link, calendarLink, isCpsifFunded)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON DUPLICATE KEY UPDATE
                 name = VALUES(name), emoji = VALUES(emoji),
                 description = VALUES(description), location = VALUES(location),
                 `type` = VALUES(`type`), organization = VALUES(organization),
                 `day` = VALUES(`day`), `month` = VALUES(`month`), `year` = VALUES(`year`),
                 startHour = VALUES(startHour), startMinute = VALUES(startMinute),
                 endHour = VALUES(endHour), endMinute = VALUES(endMinute),
                 price = VALUES(price), link = VALUES(link),
                 calendarLink = VALUES(calendarLink), isCpsifFunded = VALUES(isCpsifFunded)",
        )
        .bind(self.id)
        .bind(self.name.as_str())
        .bind(self.emoji.as_str())
        .bind(self.description.as_str())
        .bind(self.location.as_str())
        .bind(self.r#type.as_str())
        .bind(self.organization.as_deref())
        .bind(self.day)
        .bind(self.month)
        .bind(self.year)
        .bind(self.start_hour)
        .bind(self.start_minute)
        .bind(self.end_hour)
        .bind(self.end_minute)
        .bind(self.price)
        .bind(self.link.as_str())
        .bind(self.calendar_link.as_str())
        .bind(self.is_cpsif_funded)
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::mock::PageBuilder;

    #[test]
    fn single_day_events_keep_their_times() {
        let page = PageBuilder::new("evt")
            .date(DATE, "2000-03-04T17:30:00Z", Some("2000-03-04T19:45:00Z"))
            .build();

        assert_eq!(
            EventTimes::derive(page.date(DATE)),
            EventTimes {
                day: 4,
                month: 3,
                year: 2000,
                start_hour: 17,
                start_minute: 30,
                end_hour: 19,
                end_minute: 45,
            }
        );
    }

    #[test]
    fn cross_day_ranges_lose_day_and_times() {
        let page = PageBuilder::new("evt")
            .date(DATE, "2000-03-04T17:30:00Z", Some("2000-03-05T01:00:00Z"))
            .build();

        assert_eq!(
            EventTimes::derive(page.date(DATE)),
            EventTimes {
                day: 0,
                month: 3,
                year: 2000,
                ..EventTimes::default()
            }
        );
    }

    #[test]
    fn open_ended_ranges_lose_day_and_times() {
        let page = PageBuilder::new("evt")
            .date(DATE, "2000-03-04T17:30:00Z", None)
            .build();

        let times = EventTimes::derive(page.date(DATE));
        assert_eq!(times.day, 0);
        assert_eq!((times.month, times.year), (3, 2000));
        assert_eq!(times.start_hour, 0);
    }

    #[test]
    fn no_date_means_all_zeroes() {
        let page = PageBuilder::new("evt").build();
        assert_eq!(EventTimes::derive(page.date(DATE)), EventTimes::default());
    }

    #[test]
    fn link_derivation() {
        let not_required = PageBuilder::new("evt").build();
        assert_eq!(
            Event::from_page(&not_required).link,
            RegistrationLink::NOT_REQUIRED
        );

        let in_app = PageBuilder::new("evt")
            .checkbox(REGISTRATION_REQUIRED, true)
            .select(REGISTRATION_KIND, IN_APP_REGISTRATION)
            .url(REGISTRATION_LINK, "https://example.com/form")
            .build();
        assert_eq!(Event::from_page(&in_app).link, RegistrationLink::IN_APP);

        let external = PageBuilder::new("evt")
            .checkbox(REGISTRATION_REQUIRED, true)
            .url(REGISTRATION_LINK, "https://example.com/form")
            .build();
        assert_eq!(Event::from_page(&external).link, "https://example.com/form");

        let no_link = PageBuilder::new("evt")
            .checkbox(REGISTRATION_REQUIRED, true)
            .build();
        assert_eq!(Event::from_page(&no_link).link, RegistrationLink::NO_LINK);
    }

    #[test]
    fn missing_fields_get_placeholders() {
        let event = Event::from_page(&PageBuilder::new("evt").build());

        assert_eq!(event.id, 0);
        assert_eq!(event.name, "NO NAME");
        assert_eq!(event.emoji, "");
        assert_eq!(event.description, "NONE");
        assert_eq!(event.location, "TBA");
        assert_eq!(event.r#type, DEFAULT_TYPE);
        assert_eq!(event.organization, None);
        assert_eq!(event.price, 0.0);
        assert_eq!(event.calendar_link, "NONE");
        assert!(!event.is_cpsif_funded);
    }

    #[test]
    fn mapped_fields_come_through() {
        let page = PageBuilder::new("evt")
            .number(ID, 42.0)
            .title(NAME, "Taco Night")
            .emoji("🌮")
            .text(DESCRIPTION, "Tacos in the lounge")
            .text(LOCATION, "ME 3380")
            .select(TYPE, "Social")
            .text(ORGANIZATION, "EngSoc")
            .number(PRICE, 5.0)
            .url(CALENDAR_LINK, "https://cal.example.com/taco")
            .checkbox(CPSIF_FUNDED, true)
            .build();

        let event = Event::from_page(&page);
        assert_eq!(event.id, 42);
        assert_eq!(event.name, "Taco Night");
        assert_eq!(event.emoji, "🌮");
        assert_eq!(event.organization.as_deref(), Some("EngSoc"));
        assert_eq!(event.price, 5.0);
        assert_eq!(event.calendar_link, "https://cal.example.com/taco");
        assert!(event.is_cpsif_funded);
    }

    #[test]
    fn cancelled_status_is_detected() {
        let cancelled = PageBuilder::new("evt").select(STATUS, CANCELLED).build();
        let confirmed = PageBuilder::new("evt").select(STATUS, "Confirmed").build();

        assert!(Event::is_cancelled(&cancelled));
        assert!(!Event::is_cancelled(&confirmed));
    }
}
