//! Runtime configuration.

use std::path::PathBuf;

use savant_types::env_utils::{env_string_or, env_var_or};

/// Default checker/interpreter service endpoint.
pub const DEFAULT_CHECKER_URL: &str = "https://scilla-runner.zilliqa.com";
/// Default live-network endpoint.
pub const DEFAULT_NETWORK_URL: &str = "https://dev-api.zilliqa.com";
/// Language version appended to every init parameter list at deploy time.
pub const DEFAULT_SCILLA_VERSION: &str = "0";

/// Workspace configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the checker/interpreter service.
    pub checker_url: String,
    /// Default network endpoint for live deploys.
    pub network_url: String,
    /// Value of the synthesized `_scilla_version` init field.
    pub scilla_version: String,
    /// Root directory of the persistent contract store.
    pub store_dir: PathBuf,
    /// Initial block number for the simulated blockchain context.
    pub block_num: u64,
    /// HTTP request timeout for external service calls.
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checker_url: DEFAULT_CHECKER_URL.to_string(),
            network_url: DEFAULT_NETWORK_URL.to_string(),
            scilla_version: DEFAULT_SCILLA_VERSION.to_string(),
            store_dir: PathBuf::from(".savant"),
            block_num: 1,
            request_timeout_ms: 30_000,
        }
    }
}

impl Config {
    /// Build a config from `SAVANT_*` environment variables, with defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            checker_url: env_string_or("SAVANT_CHECKER_URL", &defaults.checker_url),
            network_url: env_string_or("SAVANT_NETWORK_URL", &defaults.network_url),
            scilla_version: env_string_or("SAVANT_SCILLA_VERSION", &defaults.scilla_version),
            store_dir: PathBuf::from(env_string_or(
                "SAVANT_STORE_DIR",
                &defaults.store_dir.display().to_string(),
            )),
            block_num: env_var_or("SAVANT_BLOCK_NUM", defaults.block_num),
            request_timeout_ms: env_var_or(
                "SAVANT_REQUEST_TIMEOUT_MS",
                defaults.request_timeout_ms,
            ),
        }
    }
}
