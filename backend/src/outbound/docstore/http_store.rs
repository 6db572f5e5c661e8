//! Reqwest-backed document-store adapter.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP error mapping, and JSON decoding into domain records. It never
//! retries; every failure surfaces as a [`ConfessionStoreError`] carrying
//! its cause.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::{Client, StatusCode, header};
use url::Url;

use super::dto::{ArchivedPatchDto, NewConfessionDto, ReadPatchDto, StoredConfessionDto};
use crate::domain::ports::{ConfessionStore, ConfessionStoreError, LIST_CAP};
use crate::domain::{Confession, ConfessionId};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const API_KEY_HEADER: &str = "x-api-key";

/// Document-store adapter performing HTTP calls against one collection URL.
pub struct HttpConfessionStore {
    client: Client,
    collection: Url,
    api_key: String,
    clock: Arc<dyn Clock>,
}

impl HttpConfessionStore {
    /// Build an adapter with the default request timeout.
    ///
    /// `collection` is the full URL of the confessions collection, e.g.
    /// `https://store.example/v1/confessions`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        collection: Url,
        api_key: String,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, reqwest::Error> {
        Self::with_timeout(collection, api_key, DEFAULT_REQUEST_TIMEOUT, clock)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        collection: Url,
        api_key: String,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            collection,
            api_key,
            clock,
        })
    }

    fn document_url(&self, id: &ConfessionId) -> Result<Url, ConfessionStoreError> {
        let mut url = self.collection.clone();
        url.path_segments_mut()
            .map_err(|()| ConfessionStoreError::query("collection URL cannot hold documents"))?
            .push(id.as_str());
        Ok(url)
    }

    async fn expect_success(
        &self,
        response: reqwest::Response,
        missing_id_is_ok: bool,
    ) -> Result<(), ConfessionStoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if missing_id_is_ok && status == StatusCode::NOT_FOUND {
            // Store-defined no-op: updates and deletes of missing ids are
            // silent at this layer.
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

#[async_trait]
impl ConfessionStore for HttpConfessionStore {
    async fn create(&self, content: &str) -> Result<(), ConfessionStoreError> {
        if content.trim().is_empty() {
            return Ok(());
        }
        let body = NewConfessionDto {
            content,
            created_at: self.clock.utc(),
            read: false,
            archived: false,
        };
        let response = self
            .client
            .post(self.collection.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;
        self.expect_success(response, false).await
    }

    async fn list(&self) -> Result<Vec<Confession>, ConfessionStoreError> {
        let response = self
            .client
            .get(self.collection.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .header(header::ACCEPT, "application/json")
            .query(&[
                ("orderBy", "createdAt"),
                ("direction", "desc"),
                ("limit", "100"),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_rows(body.as_ref(), self.clock.utc())
    }

    async fn set_read(&self, id: &ConfessionId, value: bool) -> Result<(), ConfessionStoreError> {
        let response = self
            .client
            .patch(self.document_url(id)?)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&ReadPatchDto { read: value })
            .send()
            .await
            .map_err(map_transport_error)?;
        self.expect_success(response, true).await
    }

    async fn set_archived(
        &self,
        id: &ConfessionId,
        value: bool,
    ) -> Result<(), ConfessionStoreError> {
        let response = self
            .client
            .patch(self.document_url(id)?)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&ArchivedPatchDto { archived: value })
            .send()
            .await
            .map_err(map_transport_error)?;
        self.expect_success(response, true).await
    }

    async fn delete(&self, id: &ConfessionId) -> Result<(), ConfessionStoreError> {
        let response = self
            .client
            .delete(self.document_url(id)?)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;
        self.expect_success(response, true).await
    }
}

fn parse_rows(
    body: &[u8],
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Vec<Confession>, ConfessionStoreError> {
    let rows: Vec<StoredConfessionDto> = serde_json::from_slice(body)
        .map_err(|error| ConfessionStoreError::decode(format!("invalid store payload: {error}")))?;

    // Any unmappable row fails the whole page; partial results are never
    // returned.
    let mut records = rows
        .into_iter()
        .map(|row| row.into_confession(now))
        .collect::<Result<Vec<_>, _>>()
        .map_err(ConfessionStoreError::decode)?;
    records.truncate(LIST_CAP);
    Ok(records)
}

fn map_transport_error(error: reqwest::Error) -> ConfessionStoreError {
    if error.is_timeout() {
        ConfessionStoreError::connection(format!("request timed out: {error}"))
    } else {
        ConfessionStoreError::connection(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ConfessionStoreError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };
    ConfessionStoreError::query(message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
