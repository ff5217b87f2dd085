//! Deploy orchestration.
//!
//! One run per [`DeployRequest`]: check the source, derive the deployer
//! address, submit the deploy transaction, then publish the new contract
//! record before completing the callback. A failure at any step converts
//! into a failure result plus a `DeployError` event; no contract record is
//! ever published on failure, and nothing propagates past this boundary.

use tracing::{debug, warn};

use savant_types::account::parse_uint128;
use savant_types::{
    Contract, FailureKind, ParamValue, RunnerError, RunnerResult,
};
use savant_transport::CheckResult;

use crate::context::OrchestratorCtx;
use crate::request::DeployRequest;
use crate::state::StateEvent;

/// Run one deploy to completion. Never returns an error; the outcome goes
/// through the state store and the request's completion channel.
pub async fn run_deploy(ctx: &OrchestratorCtx, request: DeployRequest) {
    let gas_price = request.gas_price;
    let done = request.done;

    match deploy_inner(
        ctx,
        &request.code,
        request.init,
        &request.amount,
        request.gas_limit,
        gas_price,
        &request.private_key,
        request.kind,
        request.network,
    )
    .await
    {
        Ok((contract, result)) => {
            // Record first, callback second: a caller reacting to the result
            // must already see the contract in application state.
            ctx.state.publish(StateEvent::DeploySuccess(contract));
            let _ = done.send(result);
        }
        Err(error) => {
            warn!(kind = ?error.kind, message = %error.message, "deploy failed");
            ctx.state.publish(StateEvent::DeployError(error.clone()));
            let _ = done.send(RunnerResult::failure("", gas_price, error));
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn deploy_inner(
    ctx: &OrchestratorCtx,
    code: &str,
    user_init: Vec<ParamValue>,
    amount: &str,
    gas_limit: u64,
    gas_price: u64,
    private_key: &str,
    kind: savant_types::ContractKind,
    network: Option<String>,
) -> Result<(Contract, RunnerResult), RunnerError> {
    // 1. Type-check. Nothing has been mutated yet, so a checker error (or an
    //    unreachable checker) aborts with zero side effects.
    let abi = match ctx.checker.check(code).await {
        Ok(CheckResult::Valid(abi)) => abi,
        Ok(CheckResult::Invalid(message)) => {
            return Err(RunnerError::new(FailureKind::Validation, message));
        }
        Err(e) => {
            return Err(RunnerError::new(FailureKind::Validation, e.to_string()));
        }
    };

    let tx_amount = parse_uint128(amount)
        .map_err(|e| RunnerError::new(FailureKind::Validation, e.to_string()))?;

    // 2. The language version field is synthesized, never user-supplied.
    let mut init = user_init;
    init.push(ParamValue::new(
        "_scilla_version",
        "Uint32",
        &ctx.config.scilla_version,
    ));

    // 3. Derive the deployer's address from the signer credential.
    let chain = ctx
        .chains
        .chain_for(kind, network.as_deref())
        .map_err(|e| RunnerError::new(FailureKind::Submission, e.to_string()))?;
    let address = chain
        .address_from_private_key(private_key)
        .map_err(|e| RunnerError::new(FailureKind::Submission, e.to_string()))?;

    // 4. Submit the signed deploy transaction.
    let receipt = chain
        .deploy(code, &init, amount, gas_limit, gas_price, private_key)
        .await
        .map_err(|e| RunnerError::new(FailureKind::Submission, e.to_string()))?;

    // 5. No transaction id means the chain did not accept the deploy.
    let tx_id = match receipt.transaction_id {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Err(RunnerError::new(
                FailureKind::Submission,
                "Contract could not be deployed.",
            ));
        }
    };
    debug!(tx_id = %tx_id, address = %address, "deploy accepted");

    // 6. Construct the contract record. State is seeded with the transferred
    //    balance only; init fields never leak into constructed state.
    let contract = Contract {
        address,
        code: code.to_string(),
        abi: Some(abi),
        init,
        state: vec![ParamValue::new(
            "_balance",
            "Uint128",
            &tx_amount.to_string(),
        )],
        previous_states: vec![],
        event_log: vec![],
        message_log: vec![],
        kind,
        network,
    };

    let result = RunnerResult::success(tx_id, receipt.cumulative_gas, gas_price);
    Ok((contract, result))
}
