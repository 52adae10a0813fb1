use crate::{LinkMeta, PreviewError};
use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

/// Body returned by the metadata endpoint: `{success: 0|1, meta?: {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EndpointResponse {
    #[serde(default, deserialize_with = "truthy")]
    pub success: bool,
    #[serde(default)]
    pub meta: Option<LinkMeta>,
}

impl EndpointResponse {
    pub fn success(meta: LinkMeta) -> Self {
        Self {
            success: true,
            meta: Some(meta),
        }
    }

    pub fn failure() -> Self {
        Self::default()
    }
}

// The endpoint signals success with 0/1; booleans are accepted as well.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        _ => false,
    })
}

/// Anything that can resolve link metadata for a URL.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_metadata(&self, endpoint: &str, url: &str)
        -> Result<EndpointResponse, PreviewError>;
}

/// HTTP client for the backend metadata endpoint.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

pub struct FetcherConfig {
    pub user_agent: String,
    /// No timeout unless one is set explicitly.
    pub timeout: Option<Duration>,
    pub headers: Option<HeaderMap>,
    pub no_proxy: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "link_preview_block/0.1.0".to_string(),
            timeout: None,
            headers: None,
            no_proxy: false,
        }
    }
}

impl Fetcher {
    pub fn new() -> Result<Self, PreviewError> {
        debug!("Fetcher initialized with default configuration");
        Self::new_with_config(FetcherConfig::default())
    }

    pub fn new_with_config(config: FetcherConfig) -> Result<Self, PreviewError> {
        let mut client_builder = Client::builder().user_agent(config.user_agent);

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(headers) = config.headers {
            client_builder = client_builder.default_headers(headers);
        }

        if config.no_proxy {
            client_builder = client_builder.no_proxy();
        }

        let client = client_builder.build().map_err(|e| {
            error!(error = %e, "Failed to create HTTP client");
            PreviewError::ConfigError(format!("Failed to initialize HTTP client: {e}"))
        })?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Builds `<endpoint>?url=<target>`, keeping any query the endpoint
    /// already carries.
    pub fn request_url(endpoint: &str, url: &str) -> Result<Url, PreviewError> {
        let mut request_url = Url::parse(endpoint)?;
        request_url.query_pairs_mut().append_pair("url", url);
        Ok(request_url)
    }

    #[instrument(level = "debug", skip(self), err)]
    pub async fn fetch(&self, endpoint: &str, url: &str) -> Result<EndpointResponse, PreviewError> {
        let request_url = Self::request_url(endpoint, url)?;
        debug!(request = %request_url, "Requesting link metadata");

        let response = self.client.get(request_url).send().await.map_err(|e| {
            error!(error = %e, url = %url, "Failed to send metadata request");
            PreviewError::FetchError(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreviewError::ServerError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string(),
            });
        }

        let body = response.text().await.map_err(|e| {
            error!(error = %e, url = %url, "Failed to read response body");
            PreviewError::FetchError(e.to_string())
        })?;

        let decoded: EndpointResponse = serde_json::from_str(&body)
            .map_err(|e| PreviewError::InvalidResponse(e.to_string()))?;

        debug!(
            url = %url,
            success = decoded.success,
            has_meta = decoded.meta.is_some(),
            "Received metadata response"
        );
        Ok(decoded)
    }
}

#[async_trait]
impl MetadataSource for Fetcher {
    async fn fetch_metadata(
        &self,
        endpoint: &str,
        url: &str,
    ) -> Result<EndpointResponse, PreviewError> {
        self.fetch(endpoint, url).await
    }
}
