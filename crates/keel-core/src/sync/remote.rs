//! Remote collection protocol.
//!
//! The sync engine consumes this trait; the HTTP implementation speaks a
//! PostgREST-style API (select-all, upsert-by-id, exact counts). Partition
//! isolation for the task collections is enforced server-side by the bearer
//! identity; the client only narrows the My Day pull window by date.

use std::marker::PhantomData;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::error::{Error, Result};
use crate::models::{snapshot_of, EntityKind, Snapshot, SyncRecord};
use crate::util::{compact_text, is_http_url, normalize_text_option};

/// Remote store operations for one collection.
#[allow(async_fn_in_trait)]
pub trait RemoteCollection<R: SyncRecord> {
    /// Fetch every record visible to the current identity.
    async fn pull(&self, owner_id: &str) -> Result<Snapshot<R>>;

    /// Upsert records by id. Repeating a push is a no-op, which is what
    /// makes retry-after-failure safe.
    async fn push(&self, owner_id: &str, records: &[R]) -> Result<()>;

    /// Read-only record count for an owner partition, used to verify a
    /// candidate namespace before switching into it.
    async fn count(&self, owner_id: &str) -> Result<usize>;
}

/// Connection settings for the remote API.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let base_url = normalize_endpoint(base_url.into())?;
        let api_key = normalize_text_option(Some(api_key.into()))
            .ok_or_else(|| Error::InvalidInput("API key must not be empty".to_string()))?;
        Ok(Self { base_url, api_key })
    }
}

/// HTTP-backed remote collection for one entity kind.
pub struct HttpRemote<R> {
    config: RemoteConfig,
    client: reqwest::Client,
    kind: EntityKind,
    day_window: Option<u32>,
    _record: PhantomData<fn() -> R>,
}

impl<R> HttpRemote<R> {
    pub fn new(config: RemoteConfig, kind: EntityKind) -> Result<Self> {
        Ok(Self {
            config,
            client: reqwest::Client::builder().build()?,
            kind,
            day_window: None,
            _record: PhantomData,
        })
    }

    /// Bound pulls to the trailing `days_back` days (My Day collection).
    #[must_use]
    pub const fn with_day_window(mut self, days_back: u32) -> Self {
        self.day_window = Some(days_back);
        self
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, self.kind.table())
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.config.api_key)
            .header("apikey", &self.config.api_key)
            .header("Accept", "application/json")
    }
}

impl<R> RemoteCollection<R> for HttpRemote<R>
where
    R: SyncRecord + Serialize + DeserializeOwned,
{
    async fn pull(&self, _owner_id: &str) -> Result<Snapshot<R>> {
        let mut query: Vec<(String, String)> = vec![("select".to_string(), "*".to_string())];
        if let Some(days_back) = self.day_window {
            let start = clock::window_start(clock::today(), days_back);
            query.push(("pinned_on".to_string(), format!("gte.{}", clock::day_key(start))));
        }

        let response = self
            .authed(self.client.get(self.table_url()))
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }

        let records = response.json::<Vec<R>>().await?;
        Ok(snapshot_of(records))
    }

    async fn push(&self, _owner_id: &str, records: &[R]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let response = self
            .authed(self.client.post(self.table_url()))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(records)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }
        Ok(())
    }

    async fn count(&self, owner_id: &str) -> Result<usize> {
        let owner_filter = format!("eq.{owner_id}");
        let response = self
            .authed(self.client.get(self.table_url()))
            .query(&[("select", "id"), ("owner_id", owner_filter.as_str())])
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(remote_error(response).await);
        }

        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();

        content_range
            .as_deref()
            .and_then(parse_content_range_total)
            .or_else(|| {
                // Servers without range counting still return the rows.
                serde_json::from_str::<Vec<serde_json::Value>>(&body)
                    .ok()
                    .map(|rows| rows.len())
            })
            .ok_or_else(|| Error::Remote("response carried no usable record count".to_string()))
    }
}

/// Total from a `Content-Range` header such as `0-0/42` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<usize> {
    value.rsplit('/').next()?.trim().parse().ok()
}

async fn remote_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Error::Remote(parse_api_error(status, &body))
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<RemoteErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", compact_text(trimmed), status.as_u16())
    }
}

fn normalize_endpoint(raw: String) -> Result<String> {
    let endpoint = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::InvalidInput("endpoint must not be empty".to_string()))?;
    if is_http_url(&endpoint) {
        Ok(endpoint.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "endpoint must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_config_rejects_invalid_endpoint() {
        assert!(RemoteConfig::new("", "key").is_err());
        assert!(RemoteConfig::new("api.example.com", "key").is_err());
        assert!(RemoteConfig::new("https://api.example.com", "  ").is_err());
    }

    #[test]
    fn remote_config_trims_trailing_slash() {
        let config = RemoteConfig::new("https://api.example.com/", "key").unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn remote_config_debug_redacts_key() {
        let config = RemoteConfig::new("https://api.example.com", "secret-key").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn parse_content_range_total_handles_shapes() {
        assert_eq!(parse_content_range_total("0-0/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn parse_api_error_prefers_json_message() {
        let rendered = parse_api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"JWT expired"}"#,
        );
        assert_eq!(rendered, "JWT expired (401)");
    }

    #[test]
    fn parse_api_error_falls_back_to_body_text() {
        let rendered = parse_api_error(StatusCode::BAD_GATEWAY, "upstream died");
        assert_eq!(rendered, "upstream died (502)");
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "  "), "HTTP 502");
    }
}
