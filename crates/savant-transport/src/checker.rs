//! Client for the checker/interpreter service.
//!
//! The service exposes two endpoints:
//! - `POST /contract/check` — type-check source, returning the parsed ABI
//!   (`contract_info`) on success or a structural/type error message.
//! - `POST /contract/call` — execute one transition against a supplied
//!   code/init/state/blockchain/message payload, metered by a gas limit.
//!
//! The wire format stringifies the nested payload fields (init, blockchain,
//! state, message are JSON-encoded strings inside the JSON body); this module
//! keeps that quirk contained so callers deal in typed values only.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use savant_types::{Abi, ParamValue};

/// Default request timeout for checker calls.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Outcome of a source check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckResult {
    /// Source passed; ABI parsed from `contract_info`.
    Valid(Abi),
    /// Source failed the type-check; the service's message, verbatim.
    Invalid(String),
}

/// Parsed response of a transition execution.
#[derive(Debug, Clone, Deserialize)]
pub struct CallOutput {
    /// Gas left after execution, as reported by the interpreter. Kept as a
    /// string: malformed values must surface as errors, not default to zero.
    pub gas_remaining: String,
    /// The contract's full new state.
    #[serde(default)]
    pub states: Vec<ParamValue>,
    /// Events emitted during execution, in emission order.
    #[serde(default)]
    pub events: Vec<Value>,
    /// Outgoing message, when the transition sent one.
    #[serde(default)]
    pub message: Option<Value>,
}

/// Everything the interpreter needs to execute one transition.
#[derive(Debug, Clone)]
pub struct ExecutionPayload {
    pub code: String,
    pub init: Vec<ParamValue>,
    pub blockchain: Vec<ParamValue>,
    pub state: Vec<ParamValue>,
    pub message: Value,
    pub gas_limit: u64,
}

/// The checker/interpreter boundary.
#[async_trait]
pub trait CheckerApi: Send + Sync {
    /// Type-check contract source.
    async fn check(&self, code: &str) -> Result<CheckResult>;

    /// Execute one transition call.
    async fn call_execution(&self, payload: ExecutionPayload) -> Result<CallOutput>;
}

/// HTTP client for the checker service.
#[derive(Clone)]
pub struct HttpCheckerClient {
    base_url: Arc<str>,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    result: String,
    #[serde(default)]
    message: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CallResponse {
    message: CallOutput,
}

impl HttpCheckerClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self {
            base_url: Arc::from(base_url.trim_end_matches('/')),
            agent,
        }
    }

    fn post_json(&self, path: &str, body: Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let resp = match self.agent.post(&url).send_json(body) {
            Ok(resp) => resp,
            // The service reports check failures with error statuses too;
            // keep the body so the caller can read the message.
            Err(ureq::Error::Status(code, resp)) => {
                debug!(url = %url, code, "checker service returned error status");
                resp
            }
            Err(e) => return Err(anyhow!("checker service unreachable at {}: {}", url, e)),
        };
        resp.into_json::<Value>()
            .with_context(|| format!("invalid JSON from checker service at {}", url))
    }
}

/// Parse the `message` field of a successful check into an ABI.
///
/// The service double-encodes it: `message` is a JSON string whose content
/// is a JSON object carrying `contract_info`.
pub fn parse_contract_info(message: &Value) -> Result<Abi> {
    let inner: Value = match message {
        Value::String(s) => serde_json::from_str(s).context("checker message is not valid JSON")?,
        other => other.clone(),
    };
    let info = inner
        .get("contract_info")
        .ok_or_else(|| anyhow!("checker message carries no contract_info"))?;
    serde_json::from_value(info.clone()).context("malformed contract_info in checker message")
}

#[async_trait]
impl CheckerApi for HttpCheckerClient {
    async fn check(&self, code: &str) -> Result<CheckResult> {
        let client = self.clone();
        let body = serde_json::json!({ "code": code });
        let raw = tokio::task::spawn_blocking(move || client.post_json("/contract/check", body))
            .await
            .context("checker request task failed")??;

        let resp: CheckResponse =
            serde_json::from_value(raw).context("unexpected check response shape")?;
        match resp.result.as_str() {
            "success" => {
                let message = resp
                    .message
                    .ok_or_else(|| anyhow!("ABI could not be parsed."))?;
                Ok(CheckResult::Valid(parse_contract_info(&message)?))
            }
            _ => {
                let msg = match resp.message {
                    Some(Value::String(s)) => s,
                    Some(other) => other.to_string(),
                    None => "type-check failed".to_string(),
                };
                Ok(CheckResult::Invalid(msg))
            }
        }
    }

    async fn call_execution(&self, payload: ExecutionPayload) -> Result<CallOutput> {
        let client = self.clone();
        // The call endpoint expects the nested fields JSON-encoded as strings.
        let body = serde_json::json!({
            "code": payload.code,
            "init": serde_json::to_string(&payload.init)?,
            "blockchain": serde_json::to_string(&payload.blockchain)?,
            "state": serde_json::to_string(&payload.state)?,
            "message": serde_json::to_string(&payload.message)?,
            "gaslimit": payload.gas_limit,
        });
        let raw = tokio::task::spawn_blocking(move || client.post_json("/contract/call", body))
            .await
            .context("interpreter request task failed")??;

        // An error reply has no `message.states`; surface its message field.
        if raw.get("result").and_then(Value::as_str) == Some("error") {
            let msg = raw
                .get("message")
                .map(|m| match m {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| "transition execution failed".to_string());
            return Err(anyhow!(msg));
        }

        let resp: CallResponse =
            serde_json::from_value(raw).context("unexpected call response shape")?;
        Ok(resp.message)
    }
}
