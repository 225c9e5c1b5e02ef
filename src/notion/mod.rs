//! Client for the document store's HTTP API, behind the [`DocumentStore`]
//! seam so reconcilers never talk to the network directly.

pub mod properties;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::{SyncError, SyncResult};

pub use properties::{DateValue, Icon, Page, Properties, PropertyValue, RichText, SelectOption};

pub const NOTION_VERSION: &str = "2022-06-28";
pub const PAGE_SIZE: u32 = 100;

const BASE_URL: &str = "https://api.notion.com/v1";

/// One page of query results.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryPage {
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn query(&self, database_id: &str, cursor: Option<String>) -> SyncResult<QueryPage>;

    async fn create(&self, database_id: &str, properties: Properties) -> SyncResult<()>;

    async fn update(&self, page_id: &str, properties: Properties) -> SyncResult<()>;
}

/// Follows the cursor until the store reports no more results.
pub async fn fetch_all_pages(
    store: &dyn DocumentStore,
    database_id: &str,
) -> SyncResult<Vec<Page>> {
    let mut pages = Vec::new();
    let mut cursor = None;

    loop {
        let batch = store.query(database_id, cursor.take()).await?;
        let has_more = batch.has_more;
        let next_cursor = batch.next_cursor;
        pages.extend(batch.results);

        match next_cursor.filter(|_| has_more) {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(pages)
}

pub struct NotionClient {
    http: reqwest::Client,
    token: String,
}

impl NotionClient {
    pub fn new(token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> SyncResult<reqwest::Response> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(SyncError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl DocumentStore for NotionClient {
    async fn query(&self, database_id: &str, cursor: Option<String>) -> SyncResult<QueryPage> {
        let mut body = json!({ "page_size": PAGE_SIZE });
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }

        let url = format!("{}/databases/{}/query", BASE_URL, database_id);
        let response = self.send(self.http.post(url).json(&body)).await?;

        response.json().await.map_err(Into::into)
    }

    async fn create(&self, database_id: &str, properties: Properties) -> SyncResult<()> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });
        self.send(self.http.post(format!("{}/pages", BASE_URL)).json(&body))
            .await?;

        Ok(())
    }

    async fn update(&self, page_id: &str, properties: Properties) -> SyncResult<()> {
        let body = json!({ "properties": properties });
        self.send(
            self.http
                .patch(format!("{}/pages/{}", BASE_URL, page_id))
                .json(&body),
        )
        .await?;

        Ok(())
    }
}
