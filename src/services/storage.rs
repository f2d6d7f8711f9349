//! Mock presigned object URLs. Nothing here talks to an object store; the
//! credential and signature are fixed placeholders shaped like SigV4 output.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::ObjectStorageSettings;

const MOCK_CREDENTIAL: &str = "psxhOChwgnquTBDy3ja1";
const MOCK_SIGNATURE: &str = "b7b732ffb50015466e1e4bc501ad24577c6f0ac79085d2b9ff156d29346ffce2";
const MOCK_REGION: &str = "us-east-1";
const DEFAULT_OBJECT_PREFIX: &str = "200";
pub const PRESIGNED_URL_EXPIRES_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("ID parameter is required")]
    MissingId,
}

/// Bare file names live under the default prefix; ids with a `/` are used as-is.
pub fn object_path(id: &str) -> String {
    if id.contains('/') {
        id.to_string()
    } else {
        format!("{}/{}", DEFAULT_OBJECT_PREFIX, id)
    }
}

pub fn mock_presigned_url(
    settings: &ObjectStorageSettings,
    id: &str,
    now: DateTime<Utc>,
) -> Result<String, StorageError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(StorageError::MissingId);
    }

    let date = now.format("%Y%m%d").to_string();
    let timestamp = now.format("%Y%m%dT%H%M%S").to_string();
    let credential = format!("{MOCK_CREDENTIAL}/{date}/{MOCK_REGION}/s3/aws4_request");
    let expires = PRESIGNED_URL_EXPIRES_SECS.to_string();

    let params = [
        ("X-Amz-Algorithm", "AWS4-HMAC-SHA256"),
        ("X-Amz-Credential", credential.as_str()),
        ("X-Amz-Date", timestamp.as_str()),
        ("X-Amz-Expires", expires.as_str()),
        ("X-Amz-SignedHeaders", "host"),
        ("X-Amz-Signature", MOCK_SIGNATURE),
    ];
    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "http://{}:{}/{}/{}?{}",
        settings.endpoint,
        settings.port,
        settings.bucket_name,
        object_path(id),
        query
    ))
}
