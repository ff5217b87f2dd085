//! Chain client: deploy transaction submission.
//!
//! Two implementations of the same boundary:
//! - [`LocalSimulator`] — in-process, used for simulator-only contracts;
//!   accepts every well-formed deploy and synthesizes a transaction id.
//! - [`HttpChainGateway`] — submits to a network gateway endpoint for live
//!   contracts. Transaction signing and confirmation tracking stay inside
//!   the gateway; this client only speaks the deploy boundary.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use savant_types::address::{address_from_bytes, ADDRESS_LEN};
use savant_types::ParamValue;

/// Message version packed into the transaction version field.
const MSG_VERSION: u16 = 1;

/// Flat gas charged by the simulator for a deploy, capped by the gas limit.
const SIMULATOR_DEPLOY_GAS: u64 = 10;

/// Default request timeout for gateway calls.
const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Outcome of a submitted deploy transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct DeployReceipt {
    /// Absent or empty means the transaction was not accepted.
    #[serde(rename = "transactionId")]
    pub transaction_id: Option<String>,
    /// Gas consumed, from the transaction receipt.
    #[serde(rename = "cumulativeGas", default)]
    pub cumulative_gas: u64,
}

/// The chain-client boundary.
#[async_trait]
pub trait ChainApi: Send + Sync {
    /// Submit a deploy transaction.
    async fn deploy(
        &self,
        code: &str,
        init: &[ParamValue],
        amount: &str,
        gas_limit: u64,
        gas_price: u64,
        private_key: &str,
    ) -> Result<DeployReceipt>;

    /// Derive the signer's address from its private key.
    fn address_from_private_key(&self, private_key: &str) -> Result<String>;
}

/// Pack a chain id and message version into a transaction version field.
pub fn pack_version(chain_id: u16, msg_version: u16) -> u32 {
    ((chain_id as u32) << 16) | msg_version as u32
}

/// Chain id for a network endpoint (dev network uses a distinct id).
pub fn chain_id_for(network: &str) -> u16 {
    if network.contains("dev-api") {
        333
    } else {
        1
    }
}

/// Simulator address derivation: last 20 bytes of SHA-256 over the raw key.
fn derive_address(private_key: &str) -> Result<String> {
    let stripped = private_key
        .trim()
        .strip_prefix("0x")
        .unwrap_or_else(|| private_key.trim());
    let key_bytes =
        hex::decode(stripped).map_err(|e| anyhow!("invalid private key hex: {}", e))?;
    if key_bytes.is_empty() {
        return Err(anyhow!("empty private key"));
    }
    let digest = Sha256::digest(&key_bytes);
    let mut addr = [0u8; ADDRESS_LEN];
    addr.copy_from_slice(&digest[digest.len() - ADDRESS_LEN..]);
    Ok(address_from_bytes(&addr))
}

/// In-process deploy target for simulator-only contracts.
pub struct LocalSimulator {
    sequence: AtomicU64,
}

impl LocalSimulator {
    pub fn new() -> Self {
        Self {
            sequence: AtomicU64::new(0),
        }
    }
}

impl Default for LocalSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainApi for LocalSimulator {
    async fn deploy(
        &self,
        code: &str,
        _init: &[ParamValue],
        _amount: &str,
        gas_limit: u64,
        _gas_price: u64,
        private_key: &str,
    ) -> Result<DeployReceipt> {
        let deployer = self.address_from_private_key(private_key)?;
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        // Transaction id: digest over deployer, per-instance sequence and code.
        let mut hasher = Sha256::new();
        hasher.update(deployer.as_bytes());
        hasher.update(seq.to_be_bytes());
        hasher.update(code.as_bytes());
        let id = hex::encode(hasher.finalize());
        Ok(DeployReceipt {
            transaction_id: Some(id),
            cumulative_gas: SIMULATOR_DEPLOY_GAS.min(gas_limit),
        })
    }

    fn address_from_private_key(&self, private_key: &str) -> Result<String> {
        derive_address(private_key)
    }
}

/// HTTP client for a live-network deploy gateway.
#[derive(Clone)]
pub struct HttpChainGateway {
    network: Arc<str>,
    agent: ureq::Agent,
}

impl HttpChainGateway {
    pub fn new(network: &str) -> Self {
        Self::with_timeout(network, Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    pub fn with_timeout(network: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self {
            network: Arc::from(network.trim_end_matches('/')),
            agent,
        }
    }

    /// The network endpoint this gateway submits to.
    pub fn network(&self) -> &str {
        &self.network
    }
}

#[async_trait]
impl ChainApi for HttpChainGateway {
    async fn deploy(
        &self,
        code: &str,
        init: &[ParamValue],
        amount: &str,
        gas_limit: u64,
        gas_price: u64,
        private_key: &str,
    ) -> Result<DeployReceipt> {
        let version = pack_version(chain_id_for(&self.network), MSG_VERSION);
        let body = serde_json::json!({
            "version": version,
            "code": code,
            "init": init,
            "amount": amount,
            "gasLimit": gas_limit,
            "gasPrice": gas_price,
            "privateKey": private_key,
        });
        let url = format!("{}/contract/deploy", self.network);
        debug!(url = %url, version, "submitting deploy transaction");

        let agent = self.agent.clone();
        let raw: Value = tokio::task::spawn_blocking(move || -> Result<Value> {
            let resp = agent
                .post(&url)
                .send_json(body)
                .map_err(|e| anyhow!("deploy submission failed: {}", e))?;
            resp.into_json::<Value>()
                .context("invalid JSON from chain gateway")
        })
        .await
        .context("deploy request task failed")??;

        let receipt: DeployReceipt = serde_json::from_value(raw.clone())
            .with_context(|| format!("unexpected deploy response: {}", raw))?;
        Ok(receipt)
    }

    fn address_from_private_key(&self, private_key: &str) -> Result<String> {
        derive_address(private_key)
    }
}
