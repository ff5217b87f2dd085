//! Transient deploy/call request objects.
//!
//! A request exists only for the duration of one orchestration run. The
//! completion channel is a `oneshot`: the result is delivered exactly once,
//! and a caller that has gone away (dropped its receiver) simply discards
//! the result — no cooperative cancellation of in-flight external calls.

use tokio::sync::oneshot;

use savant_types::{ContractKind, ParamValue, RunnerResult};

/// A request accepted by the listener loop.
pub enum Request {
    /// Explicit initialization signal; triggers the persisted-contract load.
    Init,
    Deploy(DeployRequest),
    Call(CallRequest),
}

/// One contract deploy.
pub struct DeployRequest {
    /// Contract source text.
    pub code: String,
    /// User-supplied init parameters (the language version field is
    /// synthesized by the orchestrator, never by the caller).
    pub init: Vec<ParamValue>,
    /// Amount transferred to the contract at deploy, decimal string.
    pub amount: String,
    pub gas_limit: u64,
    pub gas_price: u64,
    /// Signer credential; the deployer address is derived from it.
    pub private_key: String,
    /// Simulator or live network.
    pub kind: ContractKind,
    /// Network endpoint, for live deploys.
    pub network: Option<String>,
    /// Completion callback.
    pub done: oneshot::Sender<RunnerResult>,
}

/// One transition call against a deployed contract.
pub struct CallRequest {
    /// Target contract address (canonical lowercase hex).
    pub address: String,
    /// Transition name.
    pub transition: String,
    /// Transition parameters.
    pub params: Vec<ParamValue>,
    /// Amount transferred with the call; `None` means zero.
    pub amount: Option<String>,
    /// Caller account address (must exist in application state).
    pub caller_address: String,
    pub gas_limit: u64,
    pub gas_price: u64,
    /// Completion callback.
    pub done: oneshot::Sender<RunnerResult>,
}
