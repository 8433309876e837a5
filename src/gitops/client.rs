// ABOUTME: Minimal HTTP client for the Argo CD-style reconciliation API.
// ABOUTME: Speaks http1 to a port-forwarded or in-cluster API endpoint.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use snafu::{ResultExt, Snafu};
use tokio::net::TcpStream;

use super::types::{HealthState, SyncState, UnitStatus};
use crate::types::UnitName;

/// Error talking to the reconciliation API.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(display("invalid API endpoint {endpoint}: {reason}"))]
    InvalidEndpoint { endpoint: String, reason: String },

    #[snafu(display("failed to connect to {endpoint}: {source}"))]
    Connect {
        endpoint: String,
        source: std::io::Error,
    },

    #[snafu(display("HTTP transport error: {source}"))]
    Transport { source: hyper::Error },

    #[snafu(display("failed to build request: {source}"))]
    Request { source: hyper::http::Error },

    #[snafu(display("API returned {status}: {message}"))]
    Rejected { status: u16, message: String },

    #[snafu(display("failed to decode API response: {source}"))]
    Decode { source: serde_json::Error },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The endpoint string could not be used.
    InvalidEndpoint,
    /// The API could not be reached at all.
    Unreachable,
    /// The API answered with a non-success status.
    Rejected,
    /// The API answered with a body we could not decode.
    Decode,
}

impl ApiError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::InvalidEndpoint { .. } => ApiErrorKind::InvalidEndpoint,
            ApiError::Connect { .. } | ApiError::Transport { .. } | ApiError::Request { .. } => {
                ApiErrorKind::Unreachable
            }
            ApiError::Rejected { .. } => ApiErrorKind::Rejected,
            ApiError::Decode { .. } => ApiErrorKind::Decode,
        }
    }
}

/// Application resource as returned by the API, reduced to the fields the
/// orchestrator reads.
#[derive(Debug, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub status: ApplicationStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationStatus {
    #[serde(default)]
    pub sync: SyncStatusInfo,
    #[serde(default)]
    pub health: HealthStatusInfo,
    #[serde(default, rename = "operationState")]
    pub operation_state: Option<OperationState>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncStatusInfo {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HealthStatusInfo {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct OperationState {
    #[serde(default)]
    pub phase: String,
}

impl Application {
    /// Reduce the API's status fields to the orchestrator's state pair.
    ///
    /// A running operation takes precedence over the comparison result: the
    /// comparison can still say `Synced` from before the operation started.
    pub fn unit_status(&self) -> UnitStatus {
        let sync = match self.status.operation_state.as_ref().map(|op| op.phase.as_str()) {
            Some("Running") => SyncState::Syncing,
            Some("Failed") | Some("Error") => SyncState::SyncFailed,
            _ => match self.status.sync.status.as_str() {
                "Synced" => SyncState::Synced,
                "OutOfSync" => SyncState::OutOfSync,
                _ => SyncState::Registered,
            },
        };

        let health = match self.status.health.status.as_str() {
            "Healthy" => HealthState::Healthy,
            "Progressing" => HealthState::Progressing,
            "Degraded" => HealthState::Degraded,
            _ => HealthState::Unknown,
        };

        UnitStatus { sync, health }
    }
}

/// Client for the reconciliation API.
///
/// Only plaintext `http://` endpoints are supported; the expected setup is a
/// port-forwarded API service (the usual CI arrangement), which keeps TLS at
/// the forwarding layer.
#[derive(Debug, Clone)]
pub struct ArgoApi {
    host: String,
    port: u16,
    authority: String,
    token: Option<String>,
}

impl ArgoApi {
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self, ApiError> {
        let Some(rest) = endpoint.strip_prefix("http://") else {
            let reason = if endpoint.starts_with("https://") {
                "TLS endpoints are not supported; port-forward the API service and use http"
            } else {
                "endpoint must start with http://"
            };
            return InvalidEndpointSnafu { endpoint, reason }.fail();
        };

        let authority = rest.trim_end_matches('/').to_string();
        if authority.is_empty() {
            return InvalidEndpointSnafu {
                endpoint,
                reason: "endpoint has no host",
            }
            .fail();
        }

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port_str)) => {
                let Ok(port) = port_str.parse() else {
                    return InvalidEndpointSnafu {
                        endpoint,
                        reason: format!("invalid port '{port_str}'"),
                    }
                    .fail();
                };
                (host.to_string(), port)
            }
            None => (authority.clone(), 80),
        };

        Ok(Self {
            host,
            port,
            authority,
            token,
        })
    }

    /// Fetch an application by name. Returns `None` for 404: a unit the
    /// system does not know about yet is a legitimate transient state.
    pub async fn get_application(&self, name: &UnitName) -> Result<Option<Application>, ApiError> {
        let path = format!(
            "/api/v1/applications/{}",
            urlencoding::encode(name.as_str())
        );
        let (status, body) = self.send("GET", &path, None).await?;

        if status == 404 {
            return Ok(None);
        }
        if !(200..300).contains(&status) {
            return Err(rejected(status, &body));
        }

        let app = serde_json::from_slice(&body).context(DecodeSnafu)?;
        Ok(Some(app))
    }

    /// Request a sync of the application's declared state. Success means the
    /// request was accepted, not that reconciliation completed.
    pub async fn sync_application(&self, name: &UnitName) -> Result<(), ApiError> {
        let path = format!(
            "/api/v1/applications/{}/sync",
            urlencoding::encode(name.as_str())
        );
        let body = serde_json::json!({ "prune": false });
        let (status, resp) = self.send("POST", &path, Some(&body)).await?;

        if !(200..300).contains(&status) {
            return Err(rejected(status, &resp));
        }
        Ok(())
    }

    /// Merge-patch the application resource.
    pub async fn patch_application(
        &self,
        name: &UnitName,
        patch: &serde_json::Value,
    ) -> Result<(), ApiError> {
        let path = format!(
            "/api/v1/applications/{}",
            urlencoding::encode(name.as_str())
        );
        let body = serde_json::json!({
            "name": name.as_str(),
            "patch": patch.to_string(),
            "patchType": "merge",
        });
        let (status, resp) = self.send("PATCH", &path, Some(&body)).await?;

        if !(200..300).contains(&status) {
            return Err(rejected(status, &resp));
        }
        Ok(())
    }

    /// Create or update an application resource.
    pub async fn upsert_application(&self, app: &serde_json::Value) -> Result<(), ApiError> {
        let (status, resp) = self
            .send("POST", "/api/v1/applications?upsert=true", Some(app))
            .await?;

        if !(200..300).contains(&status) {
            return Err(rejected(status, &resp));
        }
        Ok(())
    }

    async fn send(
        &self,
        method: &str,
        path_and_query: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<(u16, Bytes), ApiError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .context(ConnectSnafu {
                endpoint: self.authority.clone(),
            })?;
        let io = TokioIo::new(stream);

        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .context(TransportSnafu)?;

        // Drive the connection until the request completes.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("API connection closed with error: {}", e);
            }
        });

        let payload = match body {
            Some(value) => Bytes::from(value.to_string()),
            None => Bytes::new(),
        };

        let mut builder = hyper::Request::builder()
            .method(method)
            .uri(path_and_query)
            .header("Host", &self.authority)
            .header("Content-Type", "application/json");
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let req = builder.body(Full::new(payload)).context(RequestSnafu)?;

        let resp = sender.send_request(req).await.context(TransportSnafu)?;

        let status = resp.status().as_u16();
        let collected = resp.into_body().collect().await.context(TransportSnafu)?;

        Ok((status, collected.to_bytes()))
    }
}

fn rejected(status: u16, body: &Bytes) -> ApiError {
    // API errors come back as {"error": "...", "message": "..."} JSON; fall
    // back to the raw body when they don't.
    let message = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());

    RejectedSnafu { status, message }.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_json(json: serde_json::Value) -> Application {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn endpoint_without_port_defaults_to_80() {
        let api = ArgoApi::new("http://argocd.example.com", None).unwrap();
        assert_eq!(api.host, "argocd.example.com");
        assert_eq!(api.port, 80);
    }

    #[test]
    fn endpoint_with_port_and_trailing_slash() {
        let api = ArgoApi::new("http://localhost:8080/", None).unwrap();
        assert_eq!(api.host, "localhost");
        assert_eq!(api.port, 8080);
    }

    #[test]
    fn https_endpoint_is_rejected() {
        let err = ArgoApi::new("https://argocd.example.com", None).unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::InvalidEndpoint);
        assert!(err.to_string().contains("port-forward"));
    }

    #[test]
    fn synced_healthy_app_converges() {
        let app = app_json(serde_json::json!({
            "status": {
                "sync": { "status": "Synced" },
                "health": { "status": "Healthy" }
            }
        }));
        assert!(app.unit_status().converged());
    }

    #[test]
    fn running_operation_overrides_sync_status() {
        let app = app_json(serde_json::json!({
            "status": {
                "sync": { "status": "Synced" },
                "health": { "status": "Progressing" },
                "operationState": { "phase": "Running" }
            }
        }));
        let status = app.unit_status();
        assert_eq!(status.sync, SyncState::Syncing);
        assert_eq!(status.health, HealthState::Progressing);
    }

    #[test]
    fn failed_operation_maps_to_sync_failed() {
        let app = app_json(serde_json::json!({
            "status": {
                "sync": { "status": "OutOfSync" },
                "health": { "status": "Degraded" },
                "operationState": { "phase": "Failed" }
            }
        }));
        assert_eq!(app.unit_status().sync, SyncState::SyncFailed);
    }

    #[test]
    fn empty_status_maps_to_registered_unknown() {
        let app = app_json(serde_json::json!({}));
        let status = app.unit_status();
        assert_eq!(status.sync, SyncState::Registered);
        assert_eq!(status.health, HealthState::Unknown);
    }
}
