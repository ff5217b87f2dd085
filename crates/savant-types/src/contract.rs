//! Contract records and the parsed ABI.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value::ParamValue;

/// Whether a contract runs against the embedded simulator or a real network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    Local,
    Live,
}

impl Default for ContractKind {
    fn default() -> Self {
        ContractKind::Local
    }
}

/// A typed parameter in the ABI (contract init parameter or transition
/// parameter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiParam {
    pub vname: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// A named, parameterized entry point of a deployed contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub vname: String,
    #[serde(default)]
    pub params: Vec<AbiParam>,
}

/// Parsed description of a contract's callable surface, as reported by the
/// checker's `contract_info` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Abi {
    /// Contract name.
    pub vname: String,
    /// Deploy-time init parameters.
    #[serde(default)]
    pub params: Vec<AbiParam>,
    /// Callable transitions.
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

/// A deployed contract record.
///
/// Owned by the application state store after creation; the orchestrator
/// replaces whole records rather than mutating them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Canonical lowercase 40-hex address.
    pub address: String,
    /// Contract source text.
    pub code: String,
    /// Parsed ABI; absent until the source has passed the checker.
    #[serde(default)]
    pub abi: Option<Abi>,
    /// Immutable deploy-time parameters (includes the synthesized
    /// `_scilla_version` field).
    #[serde(default)]
    pub init: Vec<ParamValue>,
    /// Result of the most recent successful call, or the deploy seed.
    #[serde(default)]
    pub state: Vec<ParamValue>,
    /// Append-only history of prior states, one entry per successful call.
    #[serde(default, rename = "previousStates")]
    pub previous_states: Vec<Vec<ParamValue>>,
    /// Append-only log of emitted events.
    #[serde(default, rename = "eventLog")]
    pub event_log: Vec<Value>,
    /// Append-only log of outgoing messages.
    #[serde(default, rename = "messageLog")]
    pub message_log: Vec<Value>,
    /// Simulator-only vs. real-network contract.
    #[serde(default)]
    pub kind: ContractKind,
    /// Network endpoint for live contracts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

impl Contract {
    /// The ABI contract name, or an empty string when unchecked.
    pub fn abi_name(&self) -> &str {
        self.abi.as_ref().map(|a| a.vname.as_str()).unwrap_or("")
    }

    /// Look up a transition signature by name.
    pub fn transition(&self, name: &str) -> Option<&Transition> {
        self.abi
            .as_ref()
            .and_then(|a| a.transitions.iter().find(|t| t.vname == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Contract {
        Contract {
            address: "7bb3b0e8a59f3f61d9bff038f4aeb42cae2ecce8".to_string(),
            code: "contract HelloWorld".to_string(),
            abi: Some(Abi {
                vname: "HelloWorld".to_string(),
                params: vec![],
                transitions: vec![Transition {
                    vname: "setHello".to_string(),
                    params: vec![AbiParam {
                        vname: "msg".to_string(),
                        ty: "String".to_string(),
                    }],
                }],
            }),
            init: vec![],
            state: vec![ParamValue::new("_balance", "Uint128", "0")],
            previous_states: vec![],
            event_log: vec![],
            message_log: vec![],
            kind: ContractKind::Local,
            network: None,
        }
    }

    #[test]
    fn serde_uses_camel_case_log_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("previousStates").is_some());
        assert!(json.get("eventLog").is_some());
        assert!(json.get("messageLog").is_some());
        assert_eq!(json["kind"], "local");
    }

    #[test]
    fn transition_lookup_by_name() {
        let c = sample();
        assert!(c.transition("setHello").is_some());
        assert!(c.transition("getHello").is_none());
        assert_eq!(c.abi_name(), "HelloWorld");
    }

    #[test]
    fn missing_abi_defaults() {
        let raw = serde_json::json!({
            "address": "7bb3b0e8a59f3f61d9bff038f4aeb42cae2ecce8",
            "code": "x",
        });
        let c: Contract = serde_json::from_value(raw).unwrap();
        assert!(c.abi.is_none());
        assert_eq!(c.abi_name(), "");
        assert_eq!(c.kind, ContractKind::Local);
        assert!(c.previous_states.is_empty());
    }
}
