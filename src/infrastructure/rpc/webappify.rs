//! Typed calls to the `webappify` API.

use super::{RequestBatch, RpcClient, RpcError};
use crate::domain::types::AppDraft;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

pub const WEBAPPIFY_API: &str = "webappify";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum WebappifyError {
    #[error(transparent)]
    Rpc(#[from] RpcError),
    /// The backend answered with `success: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("Unexpected result: {0}")]
    Malformed(String),
}

impl WebappifyError {
    fn rejected(result: Value) -> Self {
        match result {
            Value::String(message) => Self::Rejected(message),
            other => Self::Rejected(other.to_string()),
        }
    }
}

/// Result of `webappify/create`. `sources` and `docker` are base64 archives.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CreatedApp {
    pub id: String,
    #[serde(default)]
    pub sources: Option<String>,
    #[serde(default)]
    pub docker: Option<String>,
}

impl CreatedApp {
    pub fn url(&self, apps_url: &str) -> String {
        format!("{apps_url}{}", self.id)
    }
}

/// Parses the result of `webappify/list`.
pub fn parse_templates(result: Value) -> Result<Vec<String>, WebappifyError> {
    serde_json::from_value(result).map_err(|e| WebappifyError::Malformed(e.to_string()))
}

#[derive(Clone)]
pub struct WebappifyApi {
    rpc: RpcClient,
}

impl WebappifyApi {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    /// Asks the backend to build `draft`.
    pub async fn create(&self, draft: &AppDraft) -> Result<CreatedApp, WebappifyError> {
        let parameters =
            serde_json::to_value(draft).map_err(|e| WebappifyError::Malformed(e.to_string()))?;
        let reply = self.rpc.send(WEBAPPIFY_API, "create", parameters).await?;
        if !reply.success {
            return Err(WebappifyError::rejected(reply.result));
        }

        let app: CreatedApp = serde_json::from_value(reply.result)
            .map_err(|e| WebappifyError::Malformed(e.to_string()))?;
        tracing::info!(
            "Created app {} (sources: {} bytes, docker: {} bytes)",
            app.id,
            app.sources.as_ref().map_or(0, String::len),
            app.docker.as_ref().map_or(0, String::len)
        );
        Ok(app)
    }

    /// Fetches the template list, handing the outcome to `callback` exactly once.
    pub async fn list_with<F>(&self, callback: F)
    where
        F: FnOnce(bool, Value),
    {
        self.rpc
            .send_with_callback(WEBAPPIFY_API, "list", json!({}), RequestBatch::new(), callback)
            .await
    }
}
