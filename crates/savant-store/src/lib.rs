//! Persistent contract store.
//!
//! Deployed contract records are persisted keyed by address. The call
//! orchestrator writes an updated record before publishing the matching
//! success event, so a crash never exposes state that did not survive.

use anyhow::Result;
use async_trait::async_trait;

use savant_types::Contract;

pub mod fs;
pub mod memory;

pub use fs::FsContractStore;
pub use memory::MemoryContractStore;

/// Async key-value persistence for contract records.
#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Load every persisted contract.
    async fn get_all(&self) -> Result<Vec<Contract>>;

    /// Persist a contract record under its address.
    async fn set(&self, address: &str, contract: &Contract) -> Result<()>;
}
