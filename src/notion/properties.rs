//! Typed property values for the document store's wire format.
//!
//! Notion represents every page property as a small JSON object keyed by its
//! kind. Each kind this service reads or writes gets its own variant; anything
//! else (relations, rollups, formulas) falls through to [`PropertyValue::Other`]
//! and is carried untouched, never written back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type Properties = BTreeMap<String, PropertyValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Title { title: Vec<RichText> },
    RichText { rich_text: Vec<RichText> },
    Number { number: Option<f64> },
    Select { select: Option<SelectOption> },
    Date { date: Option<DateValue> },
    Checkbox { checkbox: bool },
    Url { url: Option<String> },
    Email { email: Option<String> },
    Other(serde_json::Value),
}

impl PropertyValue {
    pub fn title(text: &str) -> Self {
        PropertyValue::Title {
            title: vec![RichText::plain(text)],
        }
    }

    /// An empty string becomes an empty segment list, which clears the field.
    pub fn text(text: &str) -> Self {
        let rich_text = if text.is_empty() {
            vec![]
        } else {
            vec![RichText::plain(text)]
        };

        PropertyValue::RichText { rich_text }
    }

    pub fn number(value: f64) -> Self {
        PropertyValue::Number {
            number: Some(value),
        }
    }

    pub fn select(name: &str) -> Self {
        PropertyValue::Select {
            select: Some(SelectOption {
                name: name.to_owned(),
            }),
        }
    }

    pub fn date(start: String) -> Self {
        PropertyValue::Date {
            date: Some(DateValue { start, end: None }),
        }
    }

    pub fn checkbox(value: bool) -> Self {
        PropertyValue::Checkbox { checkbox: value }
    }

    pub fn url(value: &str) -> Self {
        PropertyValue::Url {
            url: Some(value.to_owned()),
        }
    }

    pub fn email(value: &str) -> Self {
        PropertyValue::Email {
            email: Some(value.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    pub text: TextContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<String>,
}

impl RichText {
    pub fn plain(content: &str) -> Self {
        Self {
            text: TextContent {
                content: content.to_owned(),
            },
            plain_text: None,
        }
    }

    pub fn as_str(&self) -> &str {
        self.plain_text.as_deref().unwrap_or(&self.text.content)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Icon {
    Emoji { emoji: String },
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub properties: Properties,
}

impl Page {
    /// The joined segments of a title or rich-text property, `None` when the
    /// property is missing, empty, or of another kind.
    pub fn plain_text(&self, name: &str) -> Option<String> {
        let segments = match self.properties.get(name)? {
            PropertyValue::Title { title } => title,
            PropertyValue::RichText { rich_text } => rich_text,
            _ => return None,
        };
        let text: String = segments.iter().map(RichText::as_str).collect();

        (!text.is_empty()).then(|| text)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.properties.get(name)? {
            PropertyValue::Number { number } => *number,
            _ => None,
        }
    }

    pub fn select(&self, name: &str) -> Option<&str> {
        match self.properties.get(name)? {
            PropertyValue::Select { select } => select.as_ref().map(|option| option.name.as_str()),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<&DateValue> {
        match self.properties.get(name)? {
            PropertyValue::Date { date } => date.as_ref(),
            _ => None,
        }
    }

    pub fn checkbox(&self, name: &str) -> bool {
        matches!(
            self.properties.get(name),
            Some(PropertyValue::Checkbox { checkbox: true })
        )
    }

    pub fn url(&self, name: &str) -> Option<&str> {
        match self.properties.get(name)? {
            PropertyValue::Url { url } => url.as_deref(),
            _ => None,
        }
    }

    pub fn email(&self, name: &str) -> Option<&str> {
        match self.properties.get(name)? {
            PropertyValue::Email { email } => email.as_deref(),
            _ => None,
        }
    }

    pub fn emoji(&self) -> Option<&str> {
        match &self.icon {
            Some(Icon::Emoji { emoji }) => Some(emoji),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_the_api_page_shape() {
        let page: Page = serde_json::from_value(json!({
            "object": "page",
            "id": "abc-123",
            "icon": { "type": "emoji", "emoji": "🌎" },
            "properties": {
                "Name": {
                    "id": "title",
                    "type": "title",
                    "title": [{
                        "type": "text",
                        "text": { "content": "Taco Night", "link": null },
                        "plain_text": "Taco Night",
                        "href": null
                    }]
                },
                "Price": { "id": "a1", "type": "number", "number": 5.0 },
                "Status": { "id": "b2", "type": "select", "select": { "id": "x", "name": "Confirmed", "color": "green" } },
                "Date": { "id": "c3", "type": "date", "date": { "start": "2024-05-01", "end": null } },
                "Registration Required": { "id": "d4", "type": "checkbox", "checkbox": true },
                "Calendar Link": { "id": "e5", "type": "url", "url": null }
            }
        }))
        .unwrap();

        assert_eq!(page.plain_text("Name").as_deref(), Some("Taco Night"));
        assert_eq!(page.number("Price"), Some(5.0));
        assert_eq!(page.select("Status"), Some("Confirmed"));
        assert_eq!(page.date("Date").map(|date| date.start.as_str()), Some("2024-05-01"));
        assert!(page.checkbox("Registration Required"));
        assert_eq!(page.url("Calendar Link"), None);
        assert_eq!(page.emoji(), Some("🌎"));
    }

    #[test]
    fn foreign_kinds_fall_through_to_other() {
        let page: Page = serde_json::from_value(json!({
            "id": "abc-123",
            "properties": {
                "Events Registered": {
                    "id": "f6",
                    "type": "relation",
                    "relation": [{ "id": "evt-1" }],
                    "has_more": false
                }
            }
        }))
        .unwrap();

        assert!(matches!(
            page.properties.get("Events Registered"),
            Some(PropertyValue::Other(_))
        ));
        assert_eq!(page.plain_text("Events Registered"), None);
    }

    #[test]
    fn write_shapes_match_the_api() {
        assert_eq!(
            serde_json::to_value(PropertyValue::select("Alumni")).unwrap(),
            json!({ "select": { "name": "Alumni" } })
        );
        assert_eq!(
            serde_json::to_value(PropertyValue::text("Ada")).unwrap(),
            json!({ "rich_text": [{ "text": { "content": "Ada" } }] })
        );
        assert_eq!(
            serde_json::to_value(PropertyValue::text("")).unwrap(),
            json!({ "rich_text": [] })
        );
        assert_eq!(
            serde_json::to_value(PropertyValue::date("2024-05-13T11:33:20Z".to_owned())).unwrap(),
            json!({ "date": { "start": "2024-05-13T11:33:20Z" } })
        );
    }
}
