//! # RPC Client
//!
//! Calls named APIs on the backend through a single form field, `api`, whose value is a
//! JSON object keyed by API name:
//!
//! ```text
//! request:  {"webappify": {"action": "list", "parameters": {}}}
//! response: {"webappify": {"success": true, "result": ["Basic", "Game"]}}
//! ```
//!
//! Several APIs can be layered into one request with [`RequestBatch`]; the reply is decoded
//! for the API the call was made for.

pub mod http;
pub mod webappify;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single RPC. Display strings are shown to users verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcError {
    #[error("{0}")]
    Network(String),
    #[error("timeout")]
    Timeout,
    #[error("API result isn't JSON")]
    Decode,
    #[error("API not found")]
    ApiNotFound,
    #[error("API parameters not found")]
    ApiParametersNotFound,
    #[error("failed to encode API call: {0}")]
    Encode(String),
}

/// One `{action, parameters}` entry of the request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCall {
    pub action: String,
    pub parameters: Value,
}

/// Request envelope: API name -> call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestBatch {
    calls: BTreeMap<String, ApiCall>,
}

impl RequestBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a call unless one is already registered under `api`; the first call wins.
    pub fn add_call(mut self, api: &str, action: &str, parameters: Value) -> Self {
        self.hook(api, action, parameters);
        self
    }

    /// In-place form of [`RequestBatch::add_call`]. Returns false when `api` was already taken.
    pub fn hook(&mut self, api: &str, action: &str, parameters: Value) -> bool {
        if self.calls.contains_key(api) {
            return false;
        }
        self.calls.insert(
            api.to_string(),
            ApiCall {
                action: action.to_string(),
                parameters,
            },
        );
        true
    }

    #[cfg(test)]
    pub fn get(&self, api: &str) -> Option<&ApiCall> {
        self.calls.get(api)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn to_json(&self) -> Result<String, RpcError> {
        serde_json::to_string(self).map_err(|e| RpcError::Encode(e.to_string()))
    }
}

/// Decoded `{success, result}` pair for one API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub success: bool,
    pub result: Value,
}

/// Extracts the reply for `api` from a raw response body.
pub fn decode_reply(api: &str, body: &str) -> Result<ApiReply, RpcError> {
    let json: Value = serde_json::from_str(body).map_err(|_| RpcError::Decode)?;
    let nested = json
        .as_object()
        .and_then(|map| map.get(api))
        .ok_or(RpcError::ApiNotFound)?;
    let fields = nested
        .as_object()
        .ok_or(RpcError::ApiParametersNotFound)?;

    match (fields.get("success"), fields.get("result")) {
        (Some(success), Some(result)) => Ok(ApiReply {
            success: *success == Value::Bool(true),
            result: result.clone(),
        }),
        _ => Err(RpcError::ApiParametersNotFound),
    }
}

/// Moves an encoded envelope to the backend and returns the raw response body.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn exchange(&self, envelope: &str) -> Result<String, RpcError>;
}

#[derive(Clone)]
pub struct RpcClient {
    transport: Arc<dyn ApiTransport>,
    timeout: Option<Duration>,
}

impl RpcClient {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            timeout: None,
        }
    }

    /// Bounds every call; an expired call fails with [`RpcError::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn send(&self, api: &str, action: &str, parameters: Value) -> Result<ApiReply, RpcError> {
        self.send_layered(api, action, parameters, RequestBatch::new())
            .await
    }

    /// Sends `batch` with this call layered on top of it.
    pub async fn send_layered(
        &self,
        api: &str,
        action: &str,
        parameters: Value,
        batch: RequestBatch,
    ) -> Result<ApiReply, RpcError> {
        let batch = batch.add_call(api, action, parameters);
        let envelope = batch.to_json()?;
        tracing::debug!("RPC {}/{} ({} call(s) in envelope)", api, action, batch.len());

        let exchange = self.transport.exchange(&envelope);
        let body = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| RpcError::Timeout)??,
            None => exchange.await?,
        };

        let reply = decode_reply(api, &body);
        if let Err(e) = &reply {
            tracing::warn!("RPC {}/{} failed: {}", api, action, e);
        }
        reply
    }

    /// Callback form of [`RpcClient::send_layered`].
    ///
    /// `callback` runs exactly once with `(success, result)`; errors arrive as
    /// `(false, "<message>")`. A panicking callback is logged and swallowed.
    pub async fn send_with_callback<F>(
        &self,
        api: &str,
        action: &str,
        parameters: Value,
        batch: RequestBatch,
        callback: F,
    ) where
        F: FnOnce(bool, Value),
    {
        let (success, result) = match self.send_layered(api, action, parameters, batch).await {
            Ok(reply) => (reply.success, reply.result),
            Err(e) => (false, Value::String(e.to_string())),
        };
        invoke_guarded(api, callback, success, result);
    }
}

fn invoke_guarded<F>(api: &str, callback: F, success: bool, result: Value)
where
    F: FnOnce(bool, Value),
{
    if panic::catch_unwind(AssertUnwindSafe(|| callback(success, result))).is_err() {
        tracing::error!("Callback for API '{}' panicked; ignoring", api);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn test_hook_first_call_wins() {
        let mut batch = RequestBatch::new();
        assert!(batch.hook("webappify", "list", json!({})));
        assert!(!batch.hook("webappify", "create", json!({"flavor": "Basic"})));

        let call = batch.get("webappify").unwrap();
        assert_eq!(call.action, "list");
        assert_eq!(call.parameters, json!({}));
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_layered_envelope_encoding() {
        let batch = RequestBatch::new()
            .add_call("authenticate", "authenticate", json!({"token": "t"}))
            .add_call("webappify", "list", json!({}));
        let encoded: Value = serde_json::from_str(&batch.to_json().unwrap()).unwrap();
        assert_eq!(
            encoded,
            json!({
                "authenticate": {"action": "authenticate", "parameters": {"token": "t"}},
                "webappify": {"action": "list", "parameters": {}}
            })
        );
    }

    #[test]
    fn test_decode_success() {
        let reply = decode_reply(
            "webappify",
            r#"{"webappify":{"success":true,"result":{"id":"42"}}}"#,
        )
        .unwrap();
        assert!(reply.success);
        assert_eq!(reply.result, json!({"id": "42"}));
    }

    #[test]
    fn test_decode_success_must_be_literal_true() {
        let reply =
            decode_reply("webappify", r#"{"webappify":{"success":"yes","result":"Bad"}}"#).unwrap();
        assert!(!reply.success);
        assert_eq!(reply.result, json!("Bad"));
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            decode_reply("webappify", r#"{"other":{"success":true,"result":1}}"#),
            Err(RpcError::ApiNotFound)
        );
        assert_eq!(decode_reply("webappify", "[1, 2]"), Err(RpcError::ApiNotFound));
        assert_eq!(
            decode_reply("webappify", "<html>502 Bad Gateway</html>"),
            Err(RpcError::Decode)
        );
        assert_eq!(
            decode_reply("webappify", r#"{"webappify":{"success":true}}"#),
            Err(RpcError::ApiParametersNotFound)
        );
        assert_eq!(
            decode_reply("webappify", r#"{"webappify":{}}"#),
            Err(RpcError::ApiParametersNotFound)
        );
        assert_eq!(
            decode_reply("webappify", r#"{"webappify":"ok"}"#),
            Err(RpcError::ApiParametersNotFound)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(RpcError::Decode.to_string(), "API result isn't JSON");
        assert_eq!(RpcError::ApiNotFound.to_string(), "API not found");
        assert_eq!(
            RpcError::ApiParametersNotFound.to_string(),
            "API parameters not found"
        );
        assert_eq!(RpcError::Timeout.to_string(), "timeout");
    }

    #[tokio::test]
    async fn test_send_posts_envelope() {
        let transport = FakeTransport::replying(r#"{"webappify":{"success":true,"result":["Basic"]}}"#);
        let client = transport.client();

        let reply = client.send("webappify", "list", json!({})).await.unwrap();
        assert!(reply.success);
        assert_eq!(reply.result, json!(["Basic"]));

        let sent = transport.envelopes();
        assert_eq!(sent.len(), 1);
        let envelope: Value = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(envelope, json!({"webappify": {"action": "list", "parameters": {}}}));
    }

    #[tokio::test]
    async fn test_send_layered_keeps_existing_call() {
        let transport = FakeTransport::replying(r#"{"webappify":{"success":true,"result":[]}}"#);
        let client = transport.client();
        let batch = RequestBatch::new().add_call("webappify", "list", json!({}));

        client
            .send_layered("webappify", "create", json!({"flavor": "Basic"}), batch)
            .await
            .unwrap();

        let envelope: Value = serde_json::from_str(&transport.envelopes()[0]).unwrap();
        assert_eq!(envelope["webappify"]["action"], "list");
    }

    #[tokio::test]
    async fn test_callback_receives_outcome_once() {
        let calls = Mutex::new(Vec::new());

        let client = FakeTransport::replying(r#"{"webappify":{"success":true,"result":{"id":"42"}}}"#)
            .client();
        client
            .send_with_callback("webappify", "create", json!({}), RequestBatch::new(), |s, r| {
                calls.lock().unwrap().push((s, r))
            })
            .await;

        let client = FakeTransport::replying(r#"{"other":{}}"#).client();
        client
            .send_with_callback("webappify", "create", json!({}), RequestBatch::new(), |s, r| {
                calls.lock().unwrap().push((s, r))
            })
            .await;

        let client = FakeTransport::replying("not json").client();
        client
            .send_with_callback("webappify", "list", json!({}), RequestBatch::new(), |s, r| {
                calls.lock().unwrap().push((s, r))
            })
            .await;

        let client =
            FakeTransport::failing(RpcError::Network("connection refused".to_string())).client();
        client
            .send_with_callback("webappify", "list", json!({}), RequestBatch::new(), |s, r| {
                calls.lock().unwrap().push((s, r))
            })
            .await;

        assert_eq!(
            calls.into_inner().unwrap(),
            vec![
                (true, json!({"id": "42"})),
                (false, json!("API not found")),
                (false, json!("API result isn't JSON")),
                (false, json!("connection refused")),
            ]
        );
    }

    #[tokio::test]
    async fn test_callback_panic_is_swallowed() {
        let client =
            FakeTransport::replying(r#"{"webappify":{"success":true,"result":[]}}"#).client();
        let mut invocations = 0;
        client
            .send_with_callback("webappify", "list", json!({}), RequestBatch::new(), |_, _| {
                invocations += 1;
                panic!("handler bug");
            })
            .await;
        assert_eq!(invocations, 1);
    }

    #[tokio::test]
    async fn test_timeout() {
        let transport = FakeTransport::replying(r#"{"webappify":{"success":true,"result":[]}}"#)
            .with_delay(Duration::from_secs(5));
        let client = transport.client().with_timeout(Duration::from_millis(20));

        assert_eq!(
            client.send("webappify", "list", json!({})).await,
            Err(RpcError::Timeout)
        );
    }
}
