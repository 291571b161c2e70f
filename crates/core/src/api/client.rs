use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::session::AuthSession;
use crate::errors::CoreError;
use crate::transport::traits::{HttpMethod, HttpRequest, HttpTransport};

use super::depreciation::DepreciationApi;
use super::dimension::DimensionApi;
use super::equipment::EquipmentApi;
use super::investment::InvestmentApi;

/// Thin JSON client for the console backend.
///
/// Every request carries `Content-Type: application/json` and the session's
/// auth header. Non-2xx responses become [`CoreError::Api`]; transport failures
/// surface as [`CoreError::Network`]. Nothing is retried.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    session: Arc<AuthSession>,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        session: Arc<AuthSession>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            session,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    /// Absolute URL for `path` under the API root, with the given query pairs
    /// percent-encoded. Pairs whose value is `None` are left out.
    pub fn endpoint(&self, path: &str, query: &[(&str, Option<&str>)]) -> Result<String, CoreError> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&raw)
            .map_err(|e| CoreError::InvalidRequest(format!("Bad URL {raw}: {e}")))?;
        let present: Vec<(&str, &str)> = query
            .iter()
            .filter_map(|(k, v)| v.map(|v| (*k, v)))
            .collect();
        if !present.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in present {
                pairs.append_pair(k, v);
            }
        }
        Ok(url.to_string())
    }

    /// Send one request and decode the JSON reply.
    ///
    /// An empty 2xx body decodes to `Value::Null`.
    pub async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, CoreError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        headers.extend(self.session.auth_headers());

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| CoreError::Serialization(e.to_string()))?;

        debug!(%method, %url, "api request");
        let resp = self
            .transport
            .send(HttpRequest {
                method,
                url: url.to_string(),
                headers,
                body,
            })
            .await?;

        if !resp.is_success() {
            let message = serde_json::from_str::<Value>(&resp.body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string));
            let err = CoreError::api(resp.status, message);
            warn!(%method, %url, status = resp.status, "api request failed: {err}");
            return Err(err);
        }

        if resp.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&resp.body).map_err(|e| {
            CoreError::Deserialization(format!("Invalid JSON from {method} {url}: {e}"))
        })
    }

    pub async fn get(&self, url: &str) -> Result<Value, CoreError> {
        self.request(HttpMethod::Get, url, None).await
    }

    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Value, CoreError> {
        self.request(HttpMethod::Post, url, body).await
    }

    pub async fn put(&self, url: &str, body: &Value) -> Result<Value, CoreError> {
        self.request(HttpMethod::Put, url, Some(body)).await
    }

    pub async fn delete(&self, url: &str) -> Result<Value, CoreError> {
        self.request(HttpMethod::Delete, url, None).await
    }

    // ── Endpoint groups ─────────────────────────────────────────────

    pub fn equipment(&self) -> EquipmentApi<'_> {
        EquipmentApi::new(self)
    }

    pub fn investments(&self) -> InvestmentApi<'_> {
        InvestmentApi::new(self)
    }

    pub fn depreciation(&self) -> DepreciationApi<'_> {
        DepreciationApi::new(self)
    }

    pub fn dimensions(&self) -> DimensionApi<'_> {
        DimensionApi::new(self)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("transport", &self.transport.name())
            .field("session", &self.session)
            .finish()
    }
}
