pub mod client;
pub mod errors;
pub mod provisioner;

pub use client::{FlowRunPage, IntegrationAppClient, PostActionOutcome};
pub use errors::ConnectionError;
pub use provisioner::{create_connection, ensure_connection, has_valid_connection};
