// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP implementation of the Sensibo Sky API.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::capabilities::Capabilities;
use crate::error::{Error, ParseError, ProtocolError};
use crate::protocol::{PodSummary, SkyApi};
use crate::state::{AcState, Measurements};
use crate::types::PodId;

// ============================================================================
// HttpConfig
// ============================================================================

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use sensibo_lib::protocol::HttpConfig;
/// use std::time::Duration;
///
/// // Defaults
/// let config = HttpConfig::new("my-api-key");
///
/// // With all options
/// let config = HttpConfig::new("my-api-key")
///     .with_base_url("http://localhost:8080/api/v2")
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct HttpConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl HttpConfig {
    /// Default API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://home.sensibo.com/api/v2";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom API endpoint.
    ///
    /// A trailing slash is ignored.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the API endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] if the API key or the base
    /// URL is unusable, or [`ProtocolError::Http`] if the HTTP client cannot
    /// be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        if self.api_key.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress("API key is empty".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProtocolError::InvalidAddress(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient {
            base_url: self.base_url,
            api_key: self.api_key,
            client,
        })
    }
}

impl std::fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// HttpClient
// ============================================================================

/// HTTP client for the Sensibo Sky REST API.
///
/// Every request carries the API key as the `apiKey` query parameter.
/// Responses are wrapped in a `{"status": ..., "result": ...}` envelope.
///
/// # Examples
///
/// ```no_run
/// use sensibo_lib::protocol::{HttpClient, SkyApi};
///
/// # async fn example() -> sensibo_lib::Result<()> {
/// let api = HttpClient::new("my-api-key")?;
/// for pod in api.list_pods().await? {
///     println!("{} ({})", pod.name(), pod.id);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    result: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcStateRecord {
    ac_state: AcState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteCapabilitiesRecord {
    remote_capabilities: Capabilities,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductModelRecord {
    product_model: String,
}

#[derive(Deserialize)]
struct DeviceRecord {
    #[serde(default)]
    device: DeviceInfo,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DeviceInfo {
    #[serde(default)]
    firmware_version: Option<String>,
}

impl HttpClient {
    /// Creates a client for the default endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty or the HTTP client cannot be
    /// created.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProtocolError> {
        HttpConfig::new(api_key).into_client()
    }

    /// Returns the API endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn pod_path(pod: &PodId, rest: &str) -> String {
        let id = urlencoding::encode(pod.as_str());
        if rest.is_empty() {
            format!("pods/{id}")
        } else {
            format!("pods/{id}/{rest}")
        }
    }

    /// Sends a request and returns the envelope's `result`.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> crate::Result<Value> {
        let url = format!("{}/{path}", self.base_url);

        tracing::debug!(method = %method, url = %url, query = ?query, "Sending API request");

        let mut request = self
            .client
            .request(method, &url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ProtocolError::Http)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProtocolError::AuthenticationFailed.into());
        }
        if !status.is_success() {
            return Err(ProtocolError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            }
            .into());
        }

        let body = response.text().await.map_err(ProtocolError::Http)?;

        tracing::debug!(body = %body, "Received API response");

        let envelope: Envelope = serde_json::from_str(&body).map_err(ParseError::Json)?;
        if let Some(status) = envelope.status.as_deref()
            && status != "success"
        {
            return Err(ParseError::UnexpectedFormat(format!("response status {status:?}")).into());
        }
        envelope
            .result
            .ok_or_else(|| ParseError::MissingField("result".to_string()).into())
    }

    /// GETs a resource and decodes the first result record.
    async fn get_first<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> crate::Result<T> {
        let result = self.request(Method::GET, path, query, None).await?;
        let record = match result {
            Value::Array(items) => items
                .into_iter()
                .next()
                .ok_or_else(|| ParseError::MissingField("result[0]".to_string()))?,
            other => other,
        };
        Ok(serde_json::from_value(record).map_err(ParseError::Json)?)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SkyApi for HttpClient {
    async fn list_pods(&self) -> crate::Result<Vec<PodSummary>> {
        let result = self
            .request(Method::GET, "users/me/pods", &[("fields", "id,room")], None)
            .await?;
        Ok(serde_json::from_value(result).map_err(ParseError::Json)?)
    }

    async fn fetch_state(&self, pod: &PodId) -> crate::Result<AcState> {
        let record: AcStateRecord = self
            .get_first(
                &Self::pod_path(pod, "acStates"),
                &[("limit", "1"), ("fields", "status,reason,acState")],
            )
            .await?;
        Ok(record.ac_state)
    }

    async fn fetch_measurements(&self, pod: &PodId) -> crate::Result<Measurements> {
        let path = Self::pod_path(pod, "measurements");
        let full: crate::Result<Measurements> = self
            .get_first(&path, &[("fields", "batteryVoltage,temperature,humidity,time")])
            .await;

        match full {
            Err(Error::Protocol(ProtocolError::Status { status, .. })) => {
                tracing::debug!(
                    pod = %pod,
                    status,
                    "Measurements rejected with battery voltage, retrying without"
                );
                self.get_first(&path, &[("fields", "temperature,humidity,time")])
                    .await
            }
            other => other,
        }
    }

    async fn fetch_capabilities(&self, pod: &PodId) -> crate::Result<Capabilities> {
        let record: RemoteCapabilitiesRecord = self
            .get_first(&Self::pod_path(pod, ""), &[("fields", "remoteCapabilities")])
            .await?;
        Ok(record.remote_capabilities)
    }

    async fn fetch_model(&self, pod: &PodId) -> crate::Result<String> {
        let record: ProductModelRecord = self
            .get_first(&Self::pod_path(pod, ""), &[("fields", "productModel")])
            .await?;
        Ok(record.product_model)
    }

    async fn fetch_firmware_version(&self, pod: &PodId) -> crate::Result<Option<String>> {
        let record: DeviceRecord = self
            .get_first(
                &Self::pod_path(pod, "acStates"),
                &[("limit", "1"), ("fields", "device")],
            )
            .await?;
        Ok(record.device.firmware_version)
    }

    async fn set_property(
        &self,
        pod: &PodId,
        property: &str,
        current: &AcState,
        value: Value,
    ) -> crate::Result<()> {
        let body = serde_json::json!({
            "currentAcState": current,
            "newValue": value,
        });
        let path = Self::pod_path(pod, &format!("acStates/{}", urlencoding::encode(property)));
        self.request(Method::PATCH, &path, &[], Some(&body)).await?;
        Ok(())
    }
}
