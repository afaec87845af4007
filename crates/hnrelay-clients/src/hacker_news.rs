//! Hacker News content source
//!
//! Reads the public Firebase API: `topstories.json` for candidate ids and
//! `item/<id>.json` for details.
//!
//! # Examples
//!
//! ```no_run
//! use hnrelay_clients::HackerNewsClient;
//!
//! let client = HackerNewsClient::new("https://hacker-news.firebaseio.com/v0").unwrap();
//! ```

use crate::{http_client, truncate, ClientError, DEFAULT_TIMEOUT_SECS};
use async_trait::async_trait;
use hnrelay_domain::{CandidateItem, ContentSource, ItemId, SourceError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default Hacker News API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://hacker-news.firebaseio.com/v0";

/// Client for the Hacker News Firebase API
pub struct HackerNewsClient {
    endpoint: String,
    client: reqwest::Client,
}

/// Item as returned by `item/<id>.json`
#[derive(Debug, Deserialize)]
struct HnItem {
    id: i64,
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    descendants: i64,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    dead: bool,
}

impl From<HnItem> for CandidateItem {
    fn from(item: HnItem) -> Self {
        CandidateItem {
            id: item.id,
            url: item.url,
            title: item.title,
            score: item.score,
            descendants: item.descendants,
            kind: item.kind,
        }
    }
}

/// Firebase returns a filtered array either as a plain array or as an
/// object keyed by index
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdList {
    Array(Vec<Option<ItemId>>),
    Keyed(BTreeMap<String, ItemId>),
}

impl IdList {
    fn into_ids(self) -> Vec<ItemId> {
        match self {
            IdList::Array(ids) => ids.into_iter().flatten().collect(),
            IdList::Keyed(map) => {
                let mut entries: Vec<(u64, ItemId)> = map
                    .into_iter()
                    .filter_map(|(key, id)| key.parse::<u64>().ok().map(|index| (index, id)))
                    .collect();
                entries.sort_by_key(|(index, _)| *index);
                entries.into_iter().map(|(_, id)| id).collect()
            }
        }
    }
}

impl HackerNewsClient {
    /// Create a client for the given API endpoint
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with an explicit request timeout
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Ok(Self {
            endpoint,
            client: http_client(timeout)?,
        })
    }

    /// Create a client for the public API
    pub fn default_endpoint() -> Result<Self, ClientError> {
        Self::new(DEFAULT_ENDPOINT)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::Transport(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(format!("Reading body from {} failed: {}", url, e)))?;

        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| SourceError::Decode(format!("Failed to parse {}: {}", url, e)))
    }
}

#[async_trait]
impl ContentSource for HackerNewsClient {
    async fn top_ids(&self, limit: usize) -> Result<Vec<ItemId>, SourceError> {
        let url = format!("{}/topstories.json", self.endpoint);
        let query = [
            ("orderBy", "\"$key\"".to_string()),
            ("limitToFirst", limit.to_string()),
        ];

        let ids: IdList = self.get_json(&url, &query).await?;
        let mut ids = ids.into_ids();
        ids.truncate(limit);
        Ok(ids)
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Option<CandidateItem>, SourceError> {
        let url = format!("{}/item/{}.json", self.endpoint, id);

        let item: Option<HnItem> = self.get_json(&url, &[]).await?;
        match item {
            Some(item) if item.deleted || item.dead => {
                tracing::debug!(item_id = id, "Item is deleted or dead");
                Ok(None)
            }
            Some(item) => Ok(Some(item.into())),
            None => Ok(None),
        }
    }
}
