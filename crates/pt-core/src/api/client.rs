//! HTTP client for the panel's client API

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::models::{ErrorBody, Item, List, WebsocketResponse};
use crate::config::PanelConfig;
use crate::error::{ApiError, PtError};
use crate::traits::DescriptorSource;
use crate::types::{PowerSignal, ResourceUsage, ServerId, ServerSummary, SessionDescriptor};

/// Media type the panel expects on every client API request
pub const ACCEPT_HEADER: &str = "application/vnd.pterodactyl.v1+json";

/// Upper bound on server list pages fetched in one call
const MAX_LIST_PAGES: u32 = 50;

/// Client for the panel's client API
#[derive(Debug, Clone)]
pub struct PanelClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PanelClient {
    /// Create a client from panel configuration
    pub fn new(config: &PanelConfig) -> Result<Self, PtError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("paneltty/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Panel base URL (no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List every server the API key can access
    pub async fn list_servers(&self) -> Result<Vec<ServerSummary>, ApiError> {
        let mut servers = Vec::new();
        let mut page = 1;

        loop {
            let list: List<ServerSummary> = self
                .send_json(
                    self.request(Method::GET, "")
                        .query(&[("page", page.to_string())]),
                )
                .await?;
            let has_next = list.has_next_page();
            servers.extend(list.into_attributes());

            if !has_next || page >= MAX_LIST_PAGES {
                break;
            }
            page += 1;
        }

        tracing::debug!("Listed {} servers", servers.len());
        Ok(servers)
    }

    /// Fetch power state and resource usage
    pub async fn resources(&self, server: &ServerId) -> Result<ResourceUsage, ApiError> {
        let item: Item<ResourceUsage> = self
            .send_json(self.request(Method::GET, &server_path(server, "/resources")))
            .await?;
        Ok(item.attributes)
    }

    /// Send a power signal
    pub async fn power(&self, server: &ServerId, signal: PowerSignal) -> Result<(), ApiError> {
        tracing::info!("Sending power signal {} to {}", signal, server);
        self.send(
            self.request(Method::POST, &server_path(server, "/power"))
                .json(&json!({ "signal": signal })),
        )
        .await?;
        Ok(())
    }

    /// Run a single console command without opening a session
    pub async fn send_command(&self, server: &ServerId, command: &str) -> Result<(), ApiError> {
        self.send(
            self.request(Method::POST, &server_path(server, "/command"))
                .json(&json!({ "command": command })),
        )
        .await?;
        Ok(())
    }

    /// Build a request against `/api/client{path}` with auth headers
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/api/client{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header(ACCEPT, ACCEPT_HEADER)
    }

    /// Plain GET without panel auth (signed URLs)
    pub(crate) fn get_unauthenticated(&self, url: &str) -> RequestBuilder {
        self.http.get(url)
    }

    /// Send a request, mapping transport failures and non-success statuses
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::UpstreamUnavailable(format!("Request timed out: {e}"))
            } else {
                ApiError::UpstreamUnavailable(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.first_detail())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });

        tracing::debug!("Panel answered {}: {}", status, detail);
        Err(ApiError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }

    /// Send a request and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("Failed to parse panel response: {e}")))
    }
}

#[async_trait]
impl DescriptorSource for PanelClient {
    async fn acquire_descriptor(&self, server: &ServerId) -> Result<SessionDescriptor, ApiError> {
        let response: WebsocketResponse = self
            .send_json(self.request(Method::GET, &server_path(server, "/websocket")))
            .await
            .map_err(|e| match e {
                ApiError::UpstreamUnavailable(_) => e,
                other => ApiError::UpstreamUnavailable(other.to_string()),
            })?;

        let credentials = response.data;
        if credentials.token.is_empty() || credentials.socket.is_empty() {
            return Err(ApiError::UpstreamUnavailable(
                "Panel returned an empty console descriptor".to_string(),
            ));
        }

        tracing::debug!("Acquired console descriptor for {}", server);
        Ok(SessionDescriptor {
            endpoint: credentials.socket,
            token: credentials.token,
        })
    }
}

/// `/servers/{id}{suffix}`
pub(crate) fn server_path(server: &ServerId, suffix: &str) -> String {
    format!("/servers/{}{}", server.as_str(), suffix)
}
