//! savant-sandbox CLI.
//!
//! Thin wrapper over the orchestration core: checks source against the
//! checker service, deploys contracts (simulator or live network), calls
//! transitions and inspects the persisted contract set. Results are printed
//! as JSON so the output is scriptable.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::{mpsc, oneshot};

use savant_core::{
    Config, DefaultChainFactory, DeployRequest, CallRequest, Listener, OrchestratorCtx, Request,
    StateHandle,
};
use savant_store::{ContractStore, FsContractStore};
use savant_transport::{ChainApi, CheckResult, CheckerApi, HttpCheckerClient, LocalSimulator};
use savant_types::{ContractKind, ParamValue, RunnerResult};

/// Default simulator signing key (dev-only, well-known).
const DEFAULT_KEY: &str = "db11cfa086b92497c8ed5a4cc6edb3a5bfe3a640c43ffb9fc6aa0873c56f2ee3";
/// Default simulator account balance.
const DEFAULT_BALANCE: &str = "1000000000000";

const REQUEST_CHANNEL_CAPACITY: usize = 16;

#[derive(Parser)]
#[command(name = "savant-sandbox", about = "Contract IDE orchestration core", version)]
struct Cli {
    /// Checker/interpreter service base URL (overrides SAVANT_CHECKER_URL).
    #[arg(long, global = true)]
    checker_url: Option<String>,

    /// Persistent store directory (overrides SAVANT_STORE_DIR).
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Type-check a contract source file and print the parsed ABI.
    Check {
        /// Path to the contract source.
        file: PathBuf,
    },
    /// Deploy a contract and print the runner result.
    Deploy {
        /// Path to the contract source.
        file: PathBuf,
        /// Init parameters as a JSON array of {vname, type, value}.
        #[arg(long, default_value = "[]")]
        init_json: String,
        #[arg(long, default_value = "0")]
        amount: String,
        #[arg(long, default_value_t = 1000)]
        gas_limit: u64,
        #[arg(long, default_value_t = 1)]
        gas_price: u64,
        /// Signer private key (hex). Defaults to the dev simulator key.
        #[arg(long, default_value = DEFAULT_KEY)]
        key: String,
        /// Deploy to a live network instead of the simulator.
        #[arg(long)]
        live: bool,
        /// Live network endpoint (defaults to the configured network).
        #[arg(long)]
        network: Option<String>,
    },
    /// Call a transition on a deployed contract.
    Call {
        /// Target contract address.
        address: String,
        /// Transition name.
        transition: String,
        /// Transition parameters as a JSON array of {vname, type, value}.
        #[arg(long, default_value = "[]")]
        params_json: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long, default_value_t = 1000)]
        gas_limit: u64,
        #[arg(long, default_value_t = 1)]
        gas_price: u64,
        /// Caller private key (hex). Defaults to the dev simulator key.
        #[arg(long, default_value = DEFAULT_KEY)]
        key: String,
    },
    /// List persisted contracts.
    Contracts,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(url) = cli.checker_url {
        config.checker_url = url;
    }
    if let Some(dir) = cli.store_dir {
        config.store_dir = dir;
    }

    match cli.command {
        Command::Check { file } => check(&config, &file).await,
        Command::Deploy {
            file,
            init_json,
            amount,
            gas_limit,
            gas_price,
            key,
            live,
            network,
        } => {
            let code = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let init: Vec<ParamValue> =
                serde_json::from_str(&init_json).context("invalid --init-json")?;
            let kind = if live {
                ContractKind::Live
            } else {
                ContractKind::Local
            };
            let network = network.or_else(|| live.then(|| config.network_url.clone()));
            let deployer = LocalSimulator::new().address_from_private_key(&key)?;
            let (done, result) = oneshot::channel();
            let request = Request::Deploy(DeployRequest {
                code,
                init,
                amount,
                gas_limit,
                gas_price,
                private_key: key,
                kind,
                network,
                done,
            });
            dispatch(&config, request, result, &deployer).await
        }
        Command::Call {
            address,
            transition,
            params_json,
            amount,
            gas_limit,
            gas_price,
            key,
        } => {
            let params: Vec<ParamValue> =
                serde_json::from_str(&params_json).context("invalid --params-json")?;
            let caller_address = LocalSimulator::new().address_from_private_key(&key)?;
            let (done, result) = oneshot::channel();
            let request = Request::Call(CallRequest {
                address,
                transition,
                params,
                amount,
                caller_address: caller_address.clone(),
                gas_limit,
                gas_price,
                done,
            });
            dispatch(&config, request, result, &caller_address).await
        }
        Command::Contracts => {
            let store = FsContractStore::new(&config.store_dir)?;
            let contracts = store.get_all().await?;
            println!("{}", serde_json::to_string_pretty(&contracts)?);
            Ok(())
        }
    }
}

async fn check(config: &Config, file: &PathBuf) -> Result<()> {
    let code = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let checker = HttpCheckerClient::with_timeout(
        &config.checker_url,
        Duration::from_millis(config.request_timeout_ms),
    );
    match checker.check(&code).await? {
        CheckResult::Valid(abi) => {
            println!("{}", serde_json::to_string_pretty(&abi)?);
            Ok(())
        }
        CheckResult::Invalid(message) => Err(anyhow!("check failed: {}", message)),
    }
}

/// Stand up the orchestration stack, run one request through the listener
/// and print its result. `fund_address` is the signer account seeded with
/// the dev balance so the request has a funded caller.
async fn dispatch(
    config: &Config,
    request: Request,
    result: oneshot::Receiver<RunnerResult>,
    fund_address: &str,
) -> Result<()> {
    let state = StateHandle::new(config.block_num);
    let store = Arc::new(FsContractStore::new(&config.store_dir)?);
    let checker = Arc::new(HttpCheckerClient::with_timeout(
        &config.checker_url,
        Duration::from_millis(config.request_timeout_ms),
    ));
    let chains = Arc::new(DefaultChainFactory::new(&config.network_url));
    let ctx = OrchestratorCtx::new(checker, chains, store, state.clone(), config.clone());

    let (tx, rx) = mpsc::channel(REQUEST_CHANNEL_CAPACITY);
    let listener = tokio::spawn(Listener::new(ctx).run(rx));

    tx.send(Request::Init)
        .await
        .map_err(|_| anyhow!("listener stopped before init"))?;

    // Pre-fund the signer's account so the request has a caller record.
    state.create_account(fund_address, DEFAULT_BALANCE);

    tx.send(request)
        .await
        .map_err(|_| anyhow!("listener stopped before request"))?;
    let result = result.await.context("orchestrator dropped the request")?;
    drop(tx);
    listener.await.context("listener task panicked")??;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
