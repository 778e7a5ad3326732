//! Workspace client for named id-list objects (genome/feature groups).
//!
//! A group is a workspace object whose JSON payload carries an `id_list`
//! map from an id field name to the member identifiers. This client fetches
//! one object by path and extracts that list; everything else about the
//! workspace stays behind the service.

use serde::Deserialize;
use serde_json::Value;
use std::env;

use crate::error::{WorkspaceError, WorkspaceResult};

/// Workspace service endpoint used when no override is configured.
pub const DEFAULT_WORKSPACE_URL: &str = "https://p3.theseed.org/services/Workspace";

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: String,
}

/// HTTP client for the workspace service.
#[derive(Clone)]
pub struct WorkspaceClient {
    url: String,
    token: String,
}

impl WorkspaceClient {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
        }
    }

    /// Create a client from `GENOTAB_WORKSPACE_URL` / `GENOTAB_API_TOKEN`.
    ///
    /// Workspace access always needs credentials; a missing token is an
    /// authentication failure up front rather than a 401 later.
    pub fn from_env() -> WorkspaceResult<Self> {
        let _ = dotenvy::dotenv();
        let url =
            env::var("GENOTAB_WORKSPACE_URL").unwrap_or_else(|_| DEFAULT_WORKSPACE_URL.to_string());
        let token = env::var("GENOTAB_API_TOKEN")
            .map_err(|_| WorkspaceError::AuthFailed("GENOTAB_API_TOKEN not set".to_string()))?;
        Ok(Self { url, token })
    }

    /// Fetch the object at `path` and return its id list for `id_field`.
    pub async fn id_list(&self, path: &str, id_field: &str) -> WorkspaceResult<Vec<String>> {
        let request_body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "Workspace.get",
            "params": [{ "objects": [path] }],
        });

        let client = reqwest::Client::new();
        let response = client
            .post(&self.url)
            .header("Authorization", self.token.clone())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| WorkspaceError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(WorkspaceError::AuthFailed(
                "workspace rejected the supplied token".to_string(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| WorkspaceError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(WorkspaceError::RequestFailed(format!(
                "HTTP {}: {}",
                status,
                clip(&body, 500)
            )));
        }

        let envelope: RpcEnvelope = serde_json::from_str(&body)
            .map_err(|e| WorkspaceError::InvalidPayload(e.to_string()))?;
        if let Some(rpc_error) = envelope.error {
            return Err(WorkspaceError::RequestFailed(rpc_error.message));
        }
        let payload = envelope
            .result
            .as_ref()
            .and_then(extract_object_data)
            .ok_or_else(|| WorkspaceError::NotFound(path.to_string()))?;
        parse_id_list(&payload, id_field)
    }
}

/// Clip an error body for a diagnostic, backing up to a char boundary so
/// multibyte text never splits mid-character.
fn clip(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Pull the object data string out of a `Workspace.get` result.
///
/// The result nests the object as `[0][0]`, a tuple of metadata plus the
/// JSON-encoded payload text in its second slot.
fn extract_object_data(result: &Value) -> Option<String> {
    result
        .get(0)?
        .get(0)?
        .get(1)?
        .as_str()
        .map(str::to_string)
}

/// Decode a group payload and pull out its member ids.
fn parse_id_list(payload: &str, id_field: &str) -> WorkspaceResult<Vec<String>> {
    let object: Value = serde_json::from_str(payload)
        .map_err(|e| WorkspaceError::InvalidPayload(format!("object data is not JSON: {}", e)))?;

    let ids = object
        .get("id_list")
        .and_then(|lists| lists.get(id_field))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            WorkspaceError::InvalidPayload(format!("object has no '{}' id list", id_field))
        })?;

    Ok(ids
        .iter()
        .map(|id| match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect())
}
