//! Collaborator bundle handed to every orchestration run.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use savant_store::ContractStore;
use savant_transport::{ChainApi, CheckerApi, HttpChainGateway, LocalSimulator};
use savant_types::ContractKind;

use crate::config::Config;
use crate::state::StateHandle;

/// Picks a chain client for a deploy target.
///
/// Local deploys go to the embedded simulator; live deploys get a gateway
/// client for the requested network endpoint.
pub trait ChainFactory: Send + Sync {
    fn chain_for(&self, kind: ContractKind, network: Option<&str>) -> Result<Arc<dyn ChainApi>>;
}

/// Default factory: one shared simulator, one gateway per network endpoint.
pub struct DefaultChainFactory {
    simulator: Arc<LocalSimulator>,
    default_network: String,
    gateways: Mutex<HashMap<String, Arc<HttpChainGateway>>>,
}

impl DefaultChainFactory {
    pub fn new(default_network: &str) -> Self {
        Self {
            simulator: Arc::new(LocalSimulator::new()),
            default_network: default_network.to_string(),
            gateways: Mutex::new(HashMap::new()),
        }
    }
}

impl ChainFactory for DefaultChainFactory {
    fn chain_for(&self, kind: ContractKind, network: Option<&str>) -> Result<Arc<dyn ChainApi>> {
        match kind {
            ContractKind::Local => Ok(self.simulator.clone()),
            ContractKind::Live => {
                let endpoint = network.unwrap_or(&self.default_network).to_string();
                let mut gateways = self.gateways.lock();
                let gateway = gateways
                    .entry(endpoint.clone())
                    .or_insert_with(|| Arc::new(HttpChainGateway::new(&endpoint)))
                    .clone();
                Ok(gateway)
            }
        }
    }
}

/// Everything one orchestration run needs. Cheap to clone; all collaborators
/// are shared.
#[derive(Clone)]
pub struct OrchestratorCtx {
    pub checker: Arc<dyn CheckerApi>,
    pub chains: Arc<dyn ChainFactory>,
    pub store: Arc<dyn ContractStore>,
    pub state: StateHandle,
    pub config: Arc<Config>,
}

impl OrchestratorCtx {
    pub fn new(
        checker: Arc<dyn CheckerApi>,
        chains: Arc<dyn ChainFactory>,
        store: Arc<dyn ContractStore>,
        state: StateHandle,
        config: Config,
    ) -> Self {
        Self {
            checker,
            chains,
            store,
            state,
            config: Arc::new(config),
        }
    }
}
