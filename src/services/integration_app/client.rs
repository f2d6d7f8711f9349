use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::errors::ConnectionError;
use crate::config::IntegrationSettings;

#[derive(Debug, Deserialize)]
pub struct CreatedConnection {
    pub id: String,
}

/// One page of flow runs. Older API versions name the list `flowRuns`.
#[derive(Debug, Default, Deserialize)]
pub struct FlowRunPage {
    #[serde(default, alias = "flowRuns")]
    pub items: Vec<Value>,
}

/// Result of a call whose failure must never affect the caller's outcome.
#[derive(Debug)]
pub enum PostActionOutcome {
    Completed(Value),
    Failed(String),
}

impl PostActionOutcome {
    pub fn log(&self, action: &str) {
        match self {
            PostActionOutcome::Completed(result) => {
                info!(action, result = %result, "post-action completed")
            }
            PostActionOutcome::Failed(reason) => {
                warn!(action, %reason, "post-action failed; ignoring")
            }
        }
    }
}

/// Bearer-authenticated handle to the integration platform API.
#[derive(Clone)]
pub struct IntegrationAppClient {
    http: Client,
    settings: IntegrationSettings,
    token: Option<String>,
}

impl IntegrationAppClient {
    pub fn new(http: Client, settings: IntegrationSettings, token: Option<String>) -> Self {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self {
            http,
            settings,
            token,
        }
    }

    pub fn settings(&self) -> &IntegrationSettings {
        &self.settings
    }

    pub fn api_uri(&self) -> &str {
        let trimmed = self.settings.api_uri.trim();
        if trimmed.is_empty() {
            crate::config::DEFAULT_INTEGRATION_API_URI
        } else {
            trimmed
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn build_url(&self, path: &str) -> String {
        let trimmed_base = self.api_uri().trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        format!("{}/{}", trimmed_base, trimmed_path)
    }

    fn build_request(&self, token: &str, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.build_url(path))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// `POST /connections` with the client's token as the connection credential.
    pub async fn create_connection(&self) -> Result<CreatedConnection, ConnectionError> {
        let token = self.token().ok_or(ConnectionError::MissingToken)?;
        let payload = json!({
            "integrationId": self.settings.token_extract_integration_id,
            "credentials": {
                "MembraneToken": token,
            },
        });

        info!(
            integration_id = %self.settings.token_extract_integration_id,
            "creating integration connection"
        );

        let response = self
            .build_request(token, Method::POST, "/connections")
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ConnectionError::Upstream {
                status,
                message: upstream_error_message(&body, status, "Failed to create connection"),
            });
        }

        serde_json::from_str::<CreatedConnection>(&body)
            .map_err(|err| ConnectionError::InvalidResponse(err.to_string()))
    }

    /// `GET /flow-runs` for the caller's tenant.
    pub async fn list_flow_runs(&self) -> Result<FlowRunPage, ConnectionError> {
        let token = self.token().ok_or(ConnectionError::MissingToken)?;
        let response = self
            .build_request(token, Method::GET, "/flow-runs")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            warn!(%status, "listing flow runs failed");
            return Err(ConnectionError::Upstream {
                status,
                message: upstream_error_message(&body, status, "Failed to list flow runs"),
            });
        }

        serde_json::from_str::<FlowRunPage>(&body)
            .map_err(|err| ConnectionError::InvalidResponse(err.to_string()))
    }

    /// Runs a connection-layer flow. Never fails; see [`PostActionOutcome`].
    pub async fn run_flow(&self, flow_key: &str, integration_key: &str) -> PostActionOutcome {
        let Some(token) = self.token() else {
            return PostActionOutcome::Failed(ConnectionError::MissingToken.to_string());
        };
        let path = format!("/flows/{}/run", urlencoding::encode(flow_key));
        let response = self
            .build_request(token, Method::POST, &path)
            .query(&[("layer", "connection"), ("integrationKey", integration_key)])
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => return PostActionOutcome::Failed(err.to_string()),
        };
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return PostActionOutcome::Failed(format!("{}: {}", status, body.trim()));
        }
        PostActionOutcome::Completed(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

/// The `error` field of a JSON body, the raw text of a non-JSON body, else
/// `context` with the status text.
fn upstream_error_message(body: &str, status: reqwest::StatusCode, context: &str) -> String {
    let from_body = match serde_json::from_str::<Value>(body) {
        Ok(parsed) => match parsed.get("error") {
            Some(Value::String(msg)) => Some(msg.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        },
        Err(_) => Some(body.trim().to_string()),
    };
    from_body
        .map(|msg| msg.trim().to_string())
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| {
            format!(
                "{}: {}",
                context,
                status.canonical_reason().unwrap_or(status.as_str())
            )
        })
}
