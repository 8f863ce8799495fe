//! Resource manager REST client
//!
//! [`ArmClient`] implements [`GatewayStore`] over HTTP:
//!
//! ```text
//! GET|PUT {api_url}/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/expressRouteGateways/{name}?api-version={v}
//! ```
//!
//! A PUT that answers with an `Azure-AsyncOperation` (or `Location`) header is
//! treated as a long-running operation and polled to completion before the
//! gateway is read back.

use crate::error::{CoreError, Result};
use crate::gateway::{AutoScaleBounds, Connection, Gateway, Tags};
use crate::progress::{OperationStatus, ProgressCallback, poll_operation};
use crate::resource_id::ResourceIdentifier;
use crate::store::{ApiError, GatewayStore};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, trace};
use url::Url;

/// User agent string for gatewayctl HTTP requests
const GATEWAYCTL_USER_AGENT: &str = concat!("gatewayctl/", env!("CARGO_PKG_VERSION"));

const ASYNC_OPERATION_HEADER: &str = "azure-asyncoperation";

/// Settings for an [`ArmClient`]
#[derive(Debug, Clone)]
pub struct ArmClientConfig {
    pub api_url: String,
    pub subscription_id: String,
    pub access_token: Option<String>,
    pub api_version: String,
    pub operation_timeout: Duration,
    pub poll_interval: Duration,
}

impl ArmClientConfig {
    /// Config with default endpoint, API version and polling settings
    #[must_use]
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            api_url: crate::config::DEFAULT_API_URL.to_string(),
            subscription_id: subscription_id.into(),
            access_token: None,
            api_version: crate::config::DEFAULT_API_VERSION.to_string(),
            operation_timeout: Duration::from_secs(crate::config::DEFAULT_OPERATION_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(crate::config::DEFAULT_POLL_INTERVAL_SECS),
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}

/// HTTP client for express route gateways
#[derive(Clone)]
pub struct ArmClient {
    http: reqwest::Client,
    base_url: Url,
    config: ArmClientConfig,
    on_progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClient")
            .field("base_url", &self.base_url.as_str())
            .field("subscription_id", &self.config.subscription_id)
            .field("api_version", &self.config.api_version)
            .finish_non_exhaustive()
    }
}

impl ArmClient {
    /// Create a client, validating the endpoint URL
    pub fn new(config: ArmClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.api_url).map_err(|e| {
            CoreError::Validation(format!("invalid API URL '{}': {e}", config.api_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CoreError::Validation(format!(
                "invalid API URL '{}': not a base URL",
                config.api_url
            )));
        }
        if config.subscription_id.trim().is_empty() {
            return Err(CoreError::Validation(
                "subscription id must not be empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .user_agent(GATEWAYCTL_USER_AGENT)
            .build()
            .map_err(|e| CoreError::Validation(format!("failed to build HTTP client: {e}")))?;

        debug!(api_url = %base_url, subscription = %config.subscription_id, "Created ARM client");
        Ok(Self {
            http,
            base_url,
            config,
            on_progress: None,
        })
    }

    /// Report long-running operation progress to `callback`
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    fn gateway_url(&self, resource_group_name: &str, name: &str) -> std::result::Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidResponse("API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend([
                "subscriptions",
                self.config.subscription_id.as_str(),
                "resourceGroups",
                resource_group_name,
                "providers",
                "Microsoft.Network",
                "expressRouteGateways",
                name,
            ]);
        url.query_pairs_mut()
            .append_pair("api-version", &self.config.api_version);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> std::result::Result<Response, ApiError> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| ApiError::ConnectionError(e.to_string()))
    }

    async fn get_gateway_at(
        &self,
        resource_group_name: &str,
        name: &str,
    ) -> std::result::Result<Option<Gateway>, ApiError> {
        let url = self.gateway_url(resource_group_name, name)?;
        debug!(%url, "GET express route gateway");

        let response = self.send(self.http.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(resource_group = resource_group_name, gateway = name, "Gateway does not exist");
            return Ok(None);
        }
        let response = check_status(response).await?;
        let resource: GatewayResource = parse_json(response).await?;
        Ok(Some(resource.into_gateway(resource_group_name, name)))
    }

    async fn operation_status(&self, operation_url: &str) -> std::result::Result<OperationStatus, ApiError> {
        trace!(operation_url, "Polling operation");
        let response = self.send(self.http.get(operation_url)).await?;
        if response.status() == StatusCode::ACCEPTED {
            return Ok(OperationStatus::InProgress("Accepted".to_string()));
        }
        let response = check_status(response).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(OperationStatus::Succeeded);
        }

        let body: OperationStatusBody = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("operation status: {e}")))?;
        match body.status {
            Some(status) => Ok(OperationStatus::from_status(
                &status,
                body.error.map(|e| e.to_string()),
            )),
            None => Ok(OperationStatus::Succeeded),
        }
    }
}

#[async_trait]
impl GatewayStore for ArmClient {
    async fn fetch_gateway(
        &self,
        resource_group_name: &str,
        name: &str,
    ) -> std::result::Result<Option<Gateway>, ApiError> {
        self.get_gateway_at(resource_group_name, name).await
    }

    async fn create_or_update_gateway(
        &self,
        resource_group_name: &str,
        name: &str,
        gateway: &Gateway,
        tags: Option<&Tags>,
    ) -> std::result::Result<Gateway, ApiError> {
        let url = self.gateway_url(resource_group_name, name)?;
        let body = GatewayResource::from_gateway(gateway, tags);
        debug!(%url, "PUT express route gateway");
        trace!(body = ?body, "Request body");

        let response = self.send(self.http.put(url).json(&body)).await?;
        let response = check_status(response).await?;

        let Some(operation_url) = async_operation_url(response.headers()) else {
            let resource: GatewayResource = parse_json(response).await?;
            return Ok(resource.into_gateway(resource_group_name, name));
        };

        info!(
            resource_group = resource_group_name,
            gateway = name,
            "Waiting for long-running update to finish"
        );
        poll_operation(
            &operation_url,
            self.config.operation_timeout,
            self.config.poll_interval,
            self.on_progress.as_ref(),
            || self.operation_status(&operation_url),
        )
        .await?;

        self.get_gateway_at(resource_group_name, name)
            .await?
            .ok_or_else(|| ApiError::NotFound {
                message: format!(
                    "gateway '{name}' in resource group '{resource_group_name}' disappeared after update"
                ),
            })
    }
}

fn async_operation_url(headers: &HeaderMap) -> Option<String> {
    headers
        .get(ASYNC_OPERATION_HEADER)
        .or_else(|| headers.get(LOCATION))
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn check_status(response: Response) -> std::result::Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|body| body.error.to_string())
        .unwrap_or_else(|_| {
            if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text
            }
        });
    debug!(status = status.as_u16(), %message, "Request failed");
    Err(ApiError::from_status(status.as_u16(), message))
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: Response,
) -> std::result::Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{code}: {message}"),
            (None, Some(message)) => write!(f, "{message}"),
            (Some(code), None) => write!(f, "{code}"),
            (None, None) => write!(f, "unknown error"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OperationStatusBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

// Wire format. Bounds and connections sit under `properties`; the resource
// group is not part of the body and comes from the id.

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<Tags>,
    #[serde(default)]
    properties: GatewayProperties,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auto_scale_configuration: Option<AutoScaleConfiguration>,
    #[serde(default)]
    express_route_connections: Vec<ConnectionResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    virtual_hub: Option<SubResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provisioning_state: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AutoScaleConfiguration {
    #[serde(default)]
    bounds: WireBounds,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireBounds {
    #[serde(default)]
    min: Option<i32>,
    #[serde(default)]
    max: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    properties: ConnectionProperties,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    express_route_circuit_peering: Option<SubResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    authorization_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    routing_weight: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provisioning_state: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubResource {
    id: String,
}

impl GatewayResource {
    fn from_gateway(gateway: &Gateway, tags: Option<&Tags>) -> Self {
        Self {
            id: gateway.id.clone(),
            name: Some(gateway.name.clone()),
            resource_type: gateway.resource_type.clone(),
            location: gateway.location.clone(),
            etag: gateway.etag.clone(),
            tags: Some(tags.cloned().unwrap_or_else(|| gateway.tags.clone())),
            properties: GatewayProperties {
                auto_scale_configuration: Some(AutoScaleConfiguration {
                    bounds: WireBounds {
                        min: Some(gateway.auto_scale_bounds.min),
                        max: Some(gateway.auto_scale_bounds.max),
                    },
                }),
                express_route_connections: gateway
                    .connections
                    .iter()
                    .map(ConnectionResource::from_connection)
                    .collect(),
                virtual_hub: gateway
                    .virtual_hub
                    .as_ref()
                    .map(|id| SubResource { id: id.clone() }),
                provisioning_state: None,
            },
        }
    }

    fn into_gateway(self, resource_group_name: &str, name: &str) -> Gateway {
        let resource_group_name = self
            .id
            .as_deref()
            .and_then(|id| ResourceIdentifier::parse(id).ok())
            .map(|id| id.resource_group_name)
            .unwrap_or_else(|| resource_group_name.to_string());
        let bounds = self
            .properties
            .auto_scale_configuration
            .map(|c| AutoScaleBounds {
                min: c.bounds.min.unwrap_or_default(),
                max: c.bounds.max.unwrap_or_default(),
            })
            .unwrap_or_default();

        Gateway {
            resource_group_name,
            name: self.name.unwrap_or_else(|| name.to_string()),
            id: self.id,
            resource_type: self.resource_type,
            location: self.location,
            etag: self.etag,
            provisioning_state: self.properties.provisioning_state,
            virtual_hub: self.properties.virtual_hub.map(|r| r.id),
            auto_scale_bounds: bounds,
            connections: self
                .properties
                .express_route_connections
                .into_iter()
                .map(ConnectionResource::into_connection)
                .collect(),
            tags: self.tags.unwrap_or_default(),
        }
    }
}

impl ConnectionResource {
    fn from_connection(connection: &Connection) -> Self {
        Self {
            id: connection.id.clone(),
            name: connection.name.clone(),
            properties: ConnectionProperties {
                express_route_circuit_peering: connection
                    .express_route_circuit_peering
                    .as_ref()
                    .map(|id| SubResource { id: id.clone() }),
                authorization_key: connection.authorization_key.clone(),
                routing_weight: connection.routing_weight,
                provisioning_state: None,
            },
        }
    }

    fn into_connection(self) -> Connection {
        Connection {
            name: self.name,
            id: self.id,
            express_route_circuit_peering: self
                .properties
                .express_route_circuit_peering
                .map(|r| r.id),
            authorization_key: self.properties.authorization_key,
            routing_weight: self.properties.routing_weight,
            provisioning_state: self.properties.provisioning_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(api_url: &str) -> ArmClient {
        ArmClient::new(ArmClientConfig::new("sub-1").with_api_url(api_url)).unwrap()
    }

    #[test]
    fn test_gateway_url_layout() {
        let url = client("https://management.example.com")
            .gateway_url("rg1", "gw1")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://management.example.com/subscriptions/sub-1/resourceGroups/rg1/providers/Microsoft.Network/expressRouteGateways/gw1?api-version=2018-08-01"
        );
    }

    #[test]
    fn test_gateway_url_handles_trailing_slash_and_escaping() {
        let url = client("http://localhost:8080/")
            .gateway_url("rg 1", "gw/1")
            .unwrap();
        assert!(url.path().ends_with("/resourceGroups/rg%201/providers/Microsoft.Network/expressRouteGateways/gw%2F1"));
        assert!(url.path().starts_with("/subscriptions/"));
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(ArmClient::new(ArmClientConfig::new("sub").with_api_url("not a url")).is_err());
        assert!(ArmClient::new(ArmClientConfig::new("sub").with_api_url("mailto:a@b")).is_err());
        assert!(ArmClient::new(ArmClientConfig::new("  ")).is_err());
    }

    #[test]
    fn test_wire_mapping_from_resource() {
        let resource: GatewayResource = serde_json::from_value(json!({
            "id": "/subscriptions/s/resourceGroups/RG-From-Id/providers/Microsoft.Network/expressRouteGateways/gw1",
            "name": "gw1",
            "type": "Microsoft.Network/expressRouteGateways",
            "location": "westus",
            "etag": "W/\"1\"",
            "tags": {"env": "prod"},
            "properties": {
                "autoScaleConfiguration": {"bounds": {"min": 1, "max": 5}},
                "expressRouteConnections": [{
                    "id": "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Network/expressRouteGateways/gw1/expressRouteConnections/c1",
                    "name": "c1",
                    "properties": {
                        "expressRouteCircuitPeering": {"id": "/peering/1"},
                        "routingWeight": 10,
                        "provisioningState": "Succeeded"
                    }
                }],
                "virtualHub": {"id": "/hub/1"},
                "provisioningState": "Succeeded"
            }
        }))
        .unwrap();

        let gateway = resource.into_gateway("fallback", "fallback");
        assert_eq!(gateway.resource_group_name, "RG-From-Id");
        assert_eq!(gateway.name, "gw1");
        assert_eq!(gateway.auto_scale_bounds, AutoScaleBounds { min: 1, max: 5 });
        assert_eq!(gateway.virtual_hub.as_deref(), Some("/hub/1"));
        assert_eq!(gateway.connections.len(), 1);
        assert_eq!(gateway.connections[0].express_route_circuit_peering.as_deref(), Some("/peering/1"));
        assert_eq!(gateway.connections[0].routing_weight, Some(10));
        assert_eq!(gateway.tags["env"], "prod");
    }

    #[test]
    fn test_wire_mapping_uses_fallback_identity() {
        let resource: GatewayResource = serde_json::from_value(json!({"properties": {}})).unwrap();
        let gateway = resource.into_gateway("rg1", "gw1");
        assert_eq!(gateway.resource_group_name, "rg1");
        assert_eq!(gateway.name, "gw1");
        assert_eq!(gateway.auto_scale_bounds, AutoScaleBounds::default());
    }

    #[test]
    fn test_request_body_shape() {
        let gateway = Gateway::new("rg1", "gw1")
            .with_bounds(2, 10)
            .with_location("westus")
            .with_virtual_hub("/hub/1")
            .with_tag("env", "prod")
            .with_connections(vec![Connection::new("c1").with_circuit_peering("/peering/1")]);

        let body = serde_json::to_value(GatewayResource::from_gateway(&gateway, None)).unwrap();
        assert_eq!(body["properties"]["autoScaleConfiguration"]["bounds"]["min"], 2);
        assert_eq!(body["properties"]["autoScaleConfiguration"]["bounds"]["max"], 10);
        assert_eq!(body["properties"]["expressRouteConnections"][0]["name"], "c1");
        assert_eq!(
            body["properties"]["expressRouteConnections"][0]["properties"]["expressRouteCircuitPeering"]["id"],
            "/peering/1"
        );
        assert_eq!(body["properties"]["virtualHub"]["id"], "/hub/1");
        assert_eq!(body["tags"]["env"], "prod");
        assert!(body["properties"].get("provisioningState").is_none());
    }

    #[test]
    fn test_request_body_tags_override() {
        let gateway = Gateway::new("rg1", "gw1").with_tag("env", "prod");
        let mut tags = Tags::new();
        tags.insert("team".to_string(), "net".to_string());

        let body = serde_json::to_value(GatewayResource::from_gateway(&gateway, Some(&tags))).unwrap();
        assert_eq!(body["tags"], json!({"team": "net"}));
    }

    #[test]
    fn test_error_detail_display() {
        let detail: ErrorDetail =
            serde_json::from_value(json!({"code": "InvalidBounds", "message": "bad"})).unwrap();
        assert_eq!(detail.to_string(), "InvalidBounds: bad");
    }
}
