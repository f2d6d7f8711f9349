use serde::{Deserialize, Serialize};

/// A third-party system definition on the integration platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Integration {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub connection: Option<Connection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub archived_at: Option<String>,
}

impl Connection {
    /// The connection id, treating an empty string as missing.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// The archival timestamp, treating a blank string as never archived.
    pub fn archived_at(&self) -> Option<&str> {
        self.archived_at
            .as_deref()
            .filter(|at| !at.trim().is_empty())
    }

    /// Archived connections are never reused, even when otherwise intact.
    pub fn is_valid(&self) -> bool {
        self.id().is_some() && self.archived_at().is_none()
    }

    pub fn is_archived(&self) -> bool {
        self.id().is_some() && self.archived_at().is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    pub message: String,
}

impl ConnectionResult {
    pub fn succeeded(connection_id: impl Into<String>, message: &str) -> Self {
        Self {
            success: true,
            connection_id: Some(connection_id.into()),
            message: message.to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            connection_id: None,
            message: message.into(),
        }
    }
}
