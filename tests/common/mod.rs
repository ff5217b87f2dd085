//! Shared fixtures for orchestrator integration tests: scripted checker and
//! chain doubles, plus context builders.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use savant_core::{ChainFactory, Config, OrchestratorCtx, StateHandle};
use savant_store::{ContractStore, MemoryContractStore};
use savant_transport::{
    CallOutput, ChainApi, CheckResult, CheckerApi, DeployReceipt, ExecutionPayload,
};
use savant_types::{Abi, Contract, ContractKind, ParamValue, Transition};

pub const CALLER: &str = "7bb3b0e8a59f3f61d9bff038f4aeb42cae2ecce8";
pub const CONTRACT_ADDR: &str = "1234567890123456789012345678901234567890";
pub const TX_ID: &str = "f8a2c7660ecb321ad7c7b00e14e871b9b7e5e01b32c7f7d6e9c1a3b4d5e6f708";

/// Scripted checker/interpreter double. `call_execution` pops scripted
/// outputs in order and records the payloads it saw.
pub struct MockChecker {
    check: Mutex<Option<CheckResult>>,
    outputs: Mutex<VecDeque<Result<CallOutput>>>,
    pub payloads: Mutex<Vec<ExecutionPayload>>,
    /// Artificial latency per execution, to widen interleaving windows.
    pub delay: Option<Duration>,
}

impl MockChecker {
    pub fn valid(abi: Abi) -> Self {
        Self::with_check(CheckResult::Valid(abi))
    }

    pub fn invalid(message: &str) -> Self {
        Self::with_check(CheckResult::Invalid(message.to_string()))
    }

    /// A checker whose `check` endpoint errors out (service unreachable).
    pub fn unreachable() -> Self {
        Self {
            check: Mutex::new(None),
            outputs: Mutex::new(VecDeque::new()),
            payloads: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    fn with_check(check: CheckResult) -> Self {
        Self {
            check: Mutex::new(Some(check)),
            outputs: Mutex::new(VecDeque::new()),
            payloads: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn script_output(&self, output: CallOutput) {
        self.outputs.lock().unwrap().push_back(Ok(output));
    }

    pub fn script_failure(&self, message: &str) {
        self.outputs
            .lock()
            .unwrap()
            .push_back(Err(anyhow!("{}", message)));
    }
}

#[async_trait]
impl CheckerApi for MockChecker {
    async fn check(&self, _code: &str) -> Result<CheckResult> {
        self.check
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("checker unreachable"))
    }

    async fn call_execution(&self, payload: ExecutionPayload) -> Result<CallOutput> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.payloads.lock().unwrap().push(payload);
        self.outputs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted execution output")))
    }
}

/// Chain double with a fixed deployer address and scripted receipt.
pub struct MockChain {
    pub address: String,
    receipt: Mutex<Result<DeployReceipt>>,
}

impl MockChain {
    pub fn accepting(gas: u64) -> Self {
        Self {
            address: CALLER.to_string(),
            receipt: Mutex::new(Ok(DeployReceipt {
                transaction_id: Some(TX_ID.to_string()),
                cumulative_gas: gas,
            })),
        }
    }

    pub fn without_tx_id() -> Self {
        Self {
            address: CALLER.to_string(),
            receipt: Mutex::new(Ok(DeployReceipt {
                transaction_id: None,
                cumulative_gas: 0,
            })),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            address: CALLER.to_string(),
            receipt: Mutex::new(Err(anyhow!("{}", message))),
        }
    }
}

#[async_trait]
impl ChainApi for MockChain {
    async fn deploy(
        &self,
        _code: &str,
        _init: &[ParamValue],
        _amount: &str,
        _gas_limit: u64,
        _gas_price: u64,
        _private_key: &str,
    ) -> Result<DeployReceipt> {
        let mut slot = self.receipt.lock().unwrap();
        std::mem::replace(&mut *slot, Err(anyhow!("receipt already consumed")))
    }

    fn address_from_private_key(&self, _private_key: &str) -> Result<String> {
        Ok(self.address.clone())
    }
}

pub struct MockChainFactory {
    chain: Arc<MockChain>,
}

impl MockChainFactory {
    pub fn new(chain: MockChain) -> Self {
        Self {
            chain: Arc::new(chain),
        }
    }
}

impl ChainFactory for MockChainFactory {
    fn chain_for(
        &self,
        _kind: ContractKind,
        _network: Option<&str>,
    ) -> Result<Arc<dyn ChainApi>> {
        Ok(self.chain.clone())
    }
}

/// Store whose writes fail, for persistence-error paths.
#[derive(Default)]
pub struct FailingStore {
    pub writes_attempted: AtomicBool,
}

#[async_trait]
impl ContractStore for FailingStore {
    async fn get_all(&self) -> Result<Vec<Contract>> {
        Ok(vec![])
    }

    async fn set(&self, _address: &str, _contract: &Contract) -> Result<()> {
        self.writes_attempted.store(true, Ordering::SeqCst);
        Err(anyhow!("disk full"))
    }
}

pub fn hello_abi() -> Abi {
    Abi {
        vname: "HelloWorld".to_string(),
        params: vec![],
        transitions: vec![Transition {
            vname: "setHello".to_string(),
            params: vec![],
        }],
    }
}

pub fn deployed_contract(address: &str, balance: &str) -> Contract {
    Contract {
        address: address.to_string(),
        code: "contract HelloWorld".to_string(),
        abi: Some(hello_abi()),
        init: vec![ParamValue::new("_scilla_version", "Uint32", "0")],
        state: vec![ParamValue::new("_balance", "Uint128", balance)],
        previous_states: vec![],
        event_log: vec![],
        message_log: vec![],
        kind: ContractKind::Local,
        network: None,
    }
}

/// Execution output spending `gas_used` of `gas_limit`, replacing state.
pub fn call_output(gas_limit: u64, gas_used: u64, states: Vec<ParamValue>) -> CallOutput {
    CallOutput {
        gas_remaining: (gas_limit - gas_used).to_string(),
        states,
        events: vec![],
        message: None,
    }
}

pub fn ctx(
    checker: Arc<MockChecker>,
    chain: MockChain,
    store: Arc<dyn ContractStore>,
    state: StateHandle,
) -> OrchestratorCtx {
    OrchestratorCtx::new(
        checker,
        Arc::new(MockChainFactory::new(chain)),
        store,
        state,
        Config::default(),
    )
}

/// Context with an in-memory store, returning the store for inspection.
pub fn ctx_with_memory_store(
    checker: Arc<MockChecker>,
    chain: MockChain,
    state: StateHandle,
) -> (OrchestratorCtx, Arc<MemoryContractStore>) {
    let store = Arc::new(MemoryContractStore::new());
    let ctx = ctx(checker, chain, store.clone() as Arc<dyn ContractStore>, state);
    (ctx, store)
}
