//! In-memory contract store for tests and ephemeral sessions.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use savant_types::Contract;

use crate::ContractStore;

/// Map-backed store. Keeps records in address order so `get_all` is
/// deterministic.
#[derive(Default)]
pub struct MemoryContractStore {
    records: RwLock<BTreeMap<String, Contract>>,
}

impl MemoryContractStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl ContractStore for MemoryContractStore {
    async fn get_all(&self) -> Result<Vec<Contract>> {
        Ok(self.records.read().values().cloned().collect())
    }

    async fn set(&self, address: &str, contract: &Contract) -> Result<()> {
        self.records
            .write()
            .insert(address.to_string(), contract.clone());
        Ok(())
    }
}
