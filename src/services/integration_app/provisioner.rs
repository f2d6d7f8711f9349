//! Ensures the customer has a usable token-extract connection on the
//! integration platform, creating one when none exists or the existing one
//! has been archived.

use tracing::{error, info};

use super::client::{IntegrationAppClient, PostActionOutcome};
use super::errors::ConnectionError;
use crate::models::integration::{ConnectionResult, Integration};

pub const CONNECTION_EXISTS_MESSAGE: &str = "Connection already exists and is valid";
pub const CONNECTION_CREATED_MESSAGE: &str = "Connection created successfully";

fn is_token_extract(client: &IntegrationAppClient, integration: &Integration) -> bool {
    integration.key == client.settings().token_extract_key
}

/// True when `integration` is the token-extract integration and carries a
/// connection that has an id and is not archived.
pub fn has_valid_connection(
    client: &IntegrationAppClient,
    integration: Option<&Integration>,
) -> bool {
    match integration {
        Some(integration) if is_token_extract(client, integration) => integration
            .connection
            .as_ref()
            .is_some_and(|conn| conn.is_valid()),
        _ => false,
    }
}

/// Creates a connection and, for the token-extract integration, kicks off
/// the retrieve-token flow. Errors are folded into the returned result.
pub async fn create_connection(
    client: &IntegrationAppClient,
    integration_key: &str,
) -> ConnectionResult {
    match try_create_connection(client, integration_key).await {
        Ok((connection_id, post_action)) => {
            if let Some(outcome) = post_action {
                outcome.log(&client.settings().retrieve_token_flow_key);
            }
            ConnectionResult::succeeded(connection_id, CONNECTION_CREATED_MESSAGE)
        }
        Err(err) => {
            error!(error = %err, status = ?err.status(), "error creating connection");
            ConnectionResult::failed(err.to_string())
        }
    }
}

async fn try_create_connection(
    client: &IntegrationAppClient,
    integration_key: &str,
) -> Result<(String, Option<PostActionOutcome>), ConnectionError> {
    let created = client.create_connection().await?;
    info!(connection_id = %created.id, "connection created");

    let settings = client.settings();
    let post_action = if integration_key == settings.token_extract_key {
        Some(
            client
                .run_flow(&settings.retrieve_token_flow_key, &settings.token_extract_key)
                .await,
        )
    } else {
        None
    };

    Ok((created.id, post_action))
}

/// Never returns an error: every path resolves to a [`ConnectionResult`].
pub async fn ensure_connection(
    client: &IntegrationAppClient,
    integration: Option<&Integration>,
) -> ConnectionResult {
    let integration = match integration {
        Some(integration) if is_token_extract(client, integration) => integration,
        _ => {
            return ConnectionResult::failed(format!(
                "{} integration not found",
                client.settings().token_extract_key
            ))
        }
    };

    if has_valid_connection(client, Some(integration)) {
        if let Some(connection_id) = integration.connection.as_ref().and_then(|c| c.id()) {
            info!(%connection_id, "token-extract connection already exists and is valid");
            return ConnectionResult::succeeded(connection_id, CONNECTION_EXISTS_MESSAGE);
        }
    }

    if let Some(conn) = integration.connection.as_ref().filter(|c| c.is_archived()) {
        info!(
            connection_id = ?conn.id(),
            archived_at = ?conn.archived_at(),
            "token-extract connection exists but is archived, will create new one"
        );
    }

    create_connection(client, &integration.key).await
}
