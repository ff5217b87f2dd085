//! Filesystem-backed contract store.
//!
//! One JSON document per contract, named `<address>.json` under the store
//! root. Writes go through a temp-file-then-rename so a crash mid-write
//! never leaves a torn record behind.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use savant_types::address::normalize_address;
use savant_types::Contract;

use crate::ContractStore;

pub struct FsContractStore {
    root: Arc<Path>,
}

impl FsContractStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)
            .map_err(|e| anyhow!("failed to create store root {}: {}", root.display(), e))?;
        Ok(Self {
            root: Arc::from(root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, address: &str) -> Result<PathBuf> {
        // Addresses come from orchestrator-controlled records, but normalize
        // anyway so the key is never attacker-shaped path input.
        let canonical = normalize_address(address)?;
        Ok(self.root.join(format!("{}.json", canonical)))
    }

    fn read_all_blocking(root: &Path) -> Result<Vec<Contract>> {
        let mut contracts = Vec::new();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(root)
            .with_context(|| format!("failed to read store root {}", root.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        // Stable order so repeated loads reproduce an identical set.
        paths.sort();

        for path in paths {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            match serde_json::from_str::<Contract>(&raw) {
                Ok(contract) => contracts.push(contract),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable contract record");
                }
            }
        }
        Ok(contracts)
    }

    fn write_blocking(path: &Path, contract: &Contract) -> Result<()> {
        let json = serde_json::to_string_pretty(contract)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json.as_bytes())
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to commit {}", path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl ContractStore for FsContractStore {
    async fn get_all(&self) -> Result<Vec<Contract>> {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || Self::read_all_blocking(&root))
            .await
            .context("store read task failed")?
    }

    async fn set(&self, address: &str, contract: &Contract) -> Result<()> {
        let path = self.record_path(address)?;
        let contract = contract.clone();
        tokio::task::spawn_blocking(move || Self::write_blocking(&path, &contract))
            .await
            .context("store write task failed")?
    }
}
