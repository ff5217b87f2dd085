//! Terminal results reported by the deploy/call orchestrator.
//!
//! Every orchestration run ends in exactly one `RunnerResult`, delivered
//! through the request's completion channel. Failures never cross the
//! orchestrator boundary as panics or raw errors; they are folded into the
//! result (and a parallel failure event on the state store).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal status of one orchestration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failure,
}

/// Failure classes surfaced by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Source failed the type-check; user corrects and retries.
    Validation,
    /// Transaction rejected by the chain or interpreter.
    Submission,
    /// Locally-computed state would be inconsistent (negative balance,
    /// malformed gas accounting). Never silently clamped.
    Consistency,
    /// The persistent store write failed after remote execution.
    Persistence,
    /// Target contract or caller account is unknown.
    NotFound,
}

/// A classified, human-readable orchestration failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerError {
    pub kind: FailureKind,
    pub message: String,
}

impl RunnerError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RunnerError {}

/// The terminal report for one deploy or call run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerResult {
    pub status: RunStatus,
    /// Deploy: the transaction id; call: the target address. Empty on a
    /// deploy failure.
    pub address: String,
    #[serde(rename = "gasUsed")]
    pub gas_used: u64,
    #[serde(rename = "gasPrice")]
    pub gas_price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RunnerError>,
}

impl RunnerResult {
    pub fn success(address: impl Into<String>, gas_used: u64, gas_price: u64) -> Self {
        Self {
            status: RunStatus::Success,
            address: address.into(),
            gas_used,
            gas_price,
            error: None,
        }
    }

    pub fn failure(address: impl Into<String>, gas_price: u64, error: RunnerError) -> Self {
        Self {
            status: RunStatus::Failure,
            address: address.into(),
            gas_used: 0,
            gas_price,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_kind_and_message() {
        let r = RunnerResult::failure(
            "",
            1,
            RunnerError::new(FailureKind::Validation, "Parse error"),
        );
        assert_eq!(r.status, RunStatus::Failure);
        assert_eq!(r.gas_used, 0);
        let err = r.error.unwrap();
        assert_eq!(err.kind, FailureKind::Validation);
        assert_eq!(err.to_string(), "Parse error");
    }

    #[test]
    fn serde_uses_camel_case_gas_keys() {
        let json = serde_json::to_value(RunnerResult::success("abc", 10, 1)).unwrap();
        assert_eq!(json["gasUsed"], 10);
        assert_eq!(json["gasPrice"], 1);
        assert_eq!(json["status"], "success");
        assert!(json.get("error").is_none());
    }
}
