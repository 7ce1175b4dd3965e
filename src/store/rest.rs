//! REST entity store client.
//!
//! Talks to the production-tracking server's JSON API:
//!
//! - `POST {base}/api/v1/entity/{type}/_search` with `{"filters", "fields"}`
//!   returns `{"data": [record, ...]}`.
//! - `POST {base}/api/v1/entity/{type}` with the field map returns
//!   `{"data": record}`.
//! - `POST {base}/api/v1/entity/{type}/{id}/_upload/image` with
//!   `{"path": source}` attaches a thumbnail.
//!
//! Requests are rate limited client-side via [`governor`] and never retried.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shotsync_common::{EntityStore, Record, ScopeFilter, StoreError};
use tracing::debug;

use crate::config::StoreConfig;
use crate::hierarchy::ThumbnailUploader;

const API_PREFIX: &str = "api/v1/entity";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    filters: &'a [ScopeFilter],
    fields: &'a [String],
}

#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    path: &'a str,
}

#[derive(Debug, Deserialize)]
struct DataResponse<T> {
    data: T,
}

/// Entity store backed by the tracking server's REST API.
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl RestStore {
    /// Create a client for `base_url`.
    ///
    /// `requests_per_second` of zero is treated as one.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
        requests_per_second: u32,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::http(e.to_string()))?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(rate);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            rate_limiter: RateLimiter::direct(quota),
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::new(
            &config.url,
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
            config.requests_per_second,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{API_PREFIX}/{path}", self.base_url)
    }

    /// POST `body` to `path` and decode the `data` envelope.
    async fn post<B, T>(&self, operation: &str, path: &str, body: &B) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.rate_limiter.until_ready().await;

        let url = self.url(path);
        debug!(operation, url = %url, "store request");

        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| StoreError::http(format!("{operation}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let envelope: DataResponse<T> = resp
            .json()
            .await
            .map_err(|e| StoreError::decode(format!("{operation}: {e}")))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl EntityStore for RestStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn find(
        &self,
        entity_type: &str,
        filters: &[ScopeFilter],
        fields: &[String],
    ) -> Result<Vec<Record>, StoreError> {
        let body = SearchRequest { filters, fields };
        self.post("find", &format!("{entity_type}/_search"), &body)
            .await
    }

    async fn create(&self, entity_type: &str, data: &Record) -> Result<Record, StoreError> {
        self.post("create", entity_type, data).await
    }
}

#[async_trait]
impl ThumbnailUploader for RestStore {
    async fn upload(&self, entity: &Record, source: &str) -> Result<(), StoreError> {
        let (Some(entity_type), Some(id)) = (entity.entity_type(), entity.id()) else {
            return Err(StoreError::decode("thumbnail target has no type or id"));
        };
        let _: serde_json::Value = self
            .post(
                "upload",
                &format!("{entity_type}/{id}/_upload/image"),
                &UploadRequest { path: source },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let store = RestStore::new(
            "https://tracker.example.com/",
            None,
            Duration::from_secs(5),
            4,
        )
        .unwrap();
        assert_eq!(store.base_url(), "https://tracker.example.com");
        assert_eq!(
            store.url("Shot/_search"),
            "https://tracker.example.com/api/v1/entity/Shot/_search"
        );
    }

    #[test]
    fn test_search_body_shape() {
        let filters = vec![ScopeFilter::is("code", "SH010")];
        let fields = vec!["code".to_string()];
        let body = serde_json::to_value(SearchRequest {
            filters: &filters,
            fields: &fields,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"filters": [["code", "is", "SH010"]], "fields": ["code"]})
        );
    }

    #[test]
    fn test_zero_rate_is_clamped() {
        assert!(RestStore::new("http://localhost", None, Duration::from_secs(1), 0).is_ok());
    }
}
