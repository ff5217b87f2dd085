//! Application state store.
//!
//! A single normalized in-memory aggregate (accounts, contracts, block
//! number) owned by [`StateHandle`]. The only mutation path is
//! [`StateHandle::publish`]: the event is applied to the aggregate under the
//! write lock and then broadcast to subscribers (the UI layer). Nothing else
//! may write Account or Contract records.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use savant_types::{Account, Contract, RunnerError};

/// Broadcast channel depth for state events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Events emitted by the orchestrator.
///
/// These are the only state transitions the aggregate accepts.
#[derive(Debug, Clone)]
pub enum StateEvent {
    /// Initial contract set, loaded from the persistent store at bootstrap.
    Initialized(Vec<Contract>),
    DeploySuccess(Contract),
    DeployError(RunnerError),
    CallSuccess {
        address: String,
        contract: Contract,
    },
    CallError {
        address: String,
        error: RunnerError,
    },
    /// One emitted contract event, tagged with the contract's ABI name.
    EventAdded {
        address: String,
        abi_name: String,
        event: Value,
    },
    AccountUpdated(Account),
}

/// The normalized state tree.
#[derive(Debug, Default)]
pub struct AppState {
    pub accounts: HashMap<String, Account>,
    pub contracts: HashMap<String, Contract>,
    pub block_num: u64,
    /// Most recent orchestration failure, for global error-state tracking.
    pub last_error: Option<RunnerError>,
}

/// Shared handle over the application state aggregate.
#[derive(Clone)]
pub struct StateHandle {
    inner: Arc<RwLock<AppState>>,
    events: broadcast::Sender<StateEvent>,
}

impl StateHandle {
    pub fn new(block_num: u64) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(AppState {
                block_num,
                ..AppState::default()
            })),
            events,
        }
    }

    /// Apply an event to the aggregate, then broadcast it.
    pub fn publish(&self, event: StateEvent) {
        {
            let mut state = self.inner.write();
            state.apply(&event);
        }
        // No subscribers is fine; the aggregate is already updated.
        let _ = self.events.send(event);
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    /// Snapshot a contract record by address.
    pub fn contract(&self, address: &str) -> Option<Contract> {
        self.inner.read().contracts.get(address).cloned()
    }

    /// Snapshot an account record by address.
    pub fn account(&self, address: &str) -> Option<Account> {
        self.inner.read().accounts.get(address).cloned()
    }

    /// Snapshot every contract, in no particular order.
    pub fn contracts(&self) -> Vec<Contract> {
        self.inner.read().contracts.values().cloned().collect()
    }

    pub fn block_num(&self) -> u64 {
        self.inner.read().block_num
    }

    /// Advance the simulated block height.
    pub fn set_block_num(&self, block_num: u64) {
        self.inner.write().block_num = block_num;
    }

    /// Most recent orchestration failure, if any.
    pub fn last_error(&self) -> Option<RunnerError> {
        self.inner.read().last_error.clone()
    }

    /// Seed a simulator account. Goes through the event path so the
    /// single-mutation-path rule holds.
    pub fn create_account(&self, address: &str, balance: &str) {
        self.publish(StateEvent::AccountUpdated(Account::new(address, balance)));
    }
}

impl AppState {
    fn apply(&mut self, event: &StateEvent) {
        match event {
            StateEvent::Initialized(contracts) => {
                debug!(count = contracts.len(), "hydrating contract set");
                self.contracts = contracts
                    .iter()
                    .map(|c| (c.address.clone(), c.clone()))
                    .collect();
            }
            StateEvent::DeploySuccess(contract) => {
                self.contracts
                    .insert(contract.address.clone(), contract.clone());
            }
            StateEvent::DeployError(error) => {
                self.last_error = Some(error.clone());
            }
            StateEvent::CallSuccess { address, contract } => {
                self.contracts.insert(address.clone(), contract.clone());
            }
            StateEvent::CallError { error, .. } => {
                self.last_error = Some(error.clone());
            }
            // Notification only; the event is already on the contract's log.
            StateEvent::EventAdded { .. } => {}
            StateEvent::AccountUpdated(account) => {
                self.accounts.insert(account.address.clone(), account.clone());
            }
        }
    }
}
