//! PostgREST client for the hosted backend.
//!
//! Counts use `HEAD` with `Prefer: count=exact` and read the total from the
//! `Content-Range` header; writes use `PATCH` with
//! `Prefer: return=representation` so the updated row comes back.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{Backend, BackendError, CountQuery, NotificationSink, Result, Table};
use crate::models::{
    ContentItem, ContentKind, ContentStatus, Notification, Profile, ProfileUpdate, Role,
};

#[derive(Debug, Deserialize)]
struct ContentRow {
    id: String,
    user_id: String,
    #[serde(default)]
    title: Option<String>,
    status: ContentStatus,
    #[serde(default)]
    rejection_reason: Option<String>,
}

impl ContentRow {
    fn into_item(self, kind: ContentKind) -> ContentItem {
        ContentItem {
            id: self.id,
            kind,
            owner_id: self.user_id,
            title: self.title.unwrap_or_default(),
            status: self.status,
            rejection_reason: self.rejection_reason,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default = "default_role")]
    role: Role,
    #[serde(default)]
    banned: bool,
}

fn default_role() -> Role {
    Role::User
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            display_name: row.display_name.unwrap_or_default(),
            role: row.role,
            banned: row.banned,
        }
    }
}

// == REST Backend ==
/// Backend client speaking the PostgREST dialect of the hosted Postgres.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    /// e.g. `https://project.example.co/rest/v1`
    rest_url: String,
}

impl RestBackend {
    /// Builds a client for `base_url` authenticated with `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|e| BackendError::Request(format!("invalid api key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| BackendError::Request(format!("invalid api key: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}", self.rest_url, table.as_str())
    }

    fn by_id(&self, builder: RequestBuilder, id: &str) -> RequestBuilder {
        builder.query(&[("id", format!("eq.{}", id))])
    }

    async fn fetch_one<T: DeserializeOwned>(&self, table: Table, id: &str) -> Result<Option<T>> {
        let request = self.by_id(self.client.get(self.table_url(table)), id);
        let rows: Vec<T> = send(request).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn patch_one<T: DeserializeOwned>(
        &self,
        table: Table,
        id: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let request = self
            .by_id(self.client.patch(self.table_url(table)), id)
            .header("Prefer", "return=representation")
            .json(&body);

        let rows: Vec<T> = send(request).await?.json().await?;
        rows.into_iter().next().ok_or_else(|| BackendError::NotFound {
            table,
            id: id.to_string(),
        })
    }
}

/// Sends a request and turns non-2xx answers into [`BackendError::Status`].
async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Extracts the total from a `Content-Range` value such as `0-24/3573` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

fn profile_patch(update: &ProfileUpdate) -> serde_json::Value {
    match update {
        ProfileUpdate::Ban { reason } => json!({ "banned": true, "ban_reason": reason }),
        ProfileUpdate::Unban => json!({ "banned": false, "ban_reason": null }),
        ProfileUpdate::ChangeRole(role) => json!({ "role": role }),
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn count(&self, query: &CountQuery) -> Result<u64> {
        let mut request = self
            .client
            .head(self.table_url(query.table))
            .query(&[("select", "id")])
            .header("Prefer", "count=exact");
        if let Some((column, value)) = &query.filter {
            request = request.query(&[(*column, format!("eq.{}", value))]);
        }

        let response = send(request).await?;
        let header = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| BackendError::Decode("missing Content-Range header".to_string()))?;

        let total = parse_content_range_total(header)
            .ok_or_else(|| BackendError::Decode(format!("unparseable Content-Range '{}'", header)))?;
        debug!(query = %query, total, "count query answered");
        Ok(total)
    }

    async fn fetch_content(&self, kind: ContentKind, id: &str) -> Result<Option<ContentItem>> {
        let row: Option<ContentRow> = self.fetch_one(kind.table(), id).await?;
        Ok(row.map(|r| r.into_item(kind)))
    }

    async fn update_content_status(
        &self,
        kind: ContentKind,
        id: &str,
        status: ContentStatus,
        rejection_reason: Option<&str>,
    ) -> Result<ContentItem> {
        let body = json!({ "status": status, "rejection_reason": rejection_reason });
        let row: ContentRow = self.patch_one(kind.table(), id, body).await?;
        Ok(row.into_item(kind))
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let row: Option<ProfileRow> = self.fetch_one(Table::Profiles, user_id).await?;
        Ok(row.map(Profile::from))
    }

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<Profile> {
        let row: ProfileRow = self
            .patch_one(Table::Profiles, user_id, profile_patch(update))
            .await?;
        Ok(row.into())
    }
}

#[async_trait]
impl NotificationSink for RestBackend {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let request = self
            .client
            .post(self.table_url(Table::Notifications))
            .header("Prefer", "return=minimal")
            .json(notification);

        send(request).await?;
        Ok(())
    }
}
