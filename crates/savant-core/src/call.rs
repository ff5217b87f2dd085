//! Transition call orchestration.
//!
//! One run per [`CallRequest`]: snapshot the target contract and caller
//! account, assemble the execution payload, run it through the interpreter,
//! compute the account and contract deltas, persist the updated contract,
//! and only then publish the success events. Failure before the persist
//! leaves no visible account or contract mutation.

use serde_json::Value;
use tracing::{debug, warn};

use savant_types::account::parse_uint128;
use savant_types::address::sender_form;
use savant_types::{Account, Contract, FailureKind, ParamValue, RunnerError, RunnerResult};
use savant_transport::{CallOutput, ExecutionPayload};

use crate::context::OrchestratorCtx;
use crate::request::CallRequest;
use crate::state::StateEvent;

/// Run one transition call to completion. Never returns an error; the
/// outcome goes through the state store and the request's completion channel.
pub async fn run_call(ctx: &OrchestratorCtx, request: CallRequest) {
    let address = request.address.clone();
    let gas_price = request.gas_price;
    let done = request.done;

    match call_inner(ctx, &request.address, &request.transition, request.params,
        request.amount.as_deref(), &request.caller_address, request.gas_limit, gas_price)
        .await
    {
        Ok(outcome) => {
            // Persisted already; publish account first, then the contract,
            // then one notification per emitted event.
            ctx.state
                .publish(StateEvent::AccountUpdated(outcome.account));
            let abi_name = outcome.contract.abi_name().to_string();
            let events = outcome.contract.event_log
                [outcome.contract.event_log.len() - outcome.new_events..]
                .to_vec();
            ctx.state.publish(StateEvent::CallSuccess {
                address: address.clone(),
                contract: outcome.contract,
            });
            for event in events {
                ctx.state.publish(StateEvent::EventAdded {
                    address: address.clone(),
                    abi_name: abi_name.clone(),
                    event,
                });
            }
            let _ = done.send(RunnerResult::success(
                address,
                outcome.gas_used,
                gas_price,
            ));
        }
        Err(error) => {
            warn!(address = %address, kind = ?error.kind, message = %error.message, "call failed");
            ctx.state.publish(StateEvent::CallError {
                address: address.clone(),
                error: error.clone(),
            });
            let _ = done.send(RunnerResult::failure(address, gas_price, error));
        }
    }
}

struct CallOutcome {
    account: Account,
    contract: Contract,
    gas_used: u64,
    new_events: usize,
}

#[allow(clippy::too_many_arguments)]
async fn call_inner(
    ctx: &OrchestratorCtx,
    address: &str,
    transition: &str,
    params: Vec<ParamValue>,
    amount: Option<&str>,
    caller_address: &str,
    gas_limit: u64,
    gas_price: u64,
) -> Result<CallOutcome, RunnerError> {
    // 1. Snapshot the target and the caller from current application state.
    let contract = ctx.state.contract(address).ok_or_else(|| {
        RunnerError::new(
            FailureKind::NotFound,
            format!("contract {} not found", address),
        )
    })?;
    let caller = ctx.state.account(caller_address).ok_or_else(|| {
        RunnerError::new(
            FailureKind::NotFound,
            format!("account {} not found", caller_address),
        )
    })?;

    // 2. Transferred amount defaults to zero.
    let tx_amount = parse_uint128(amount.unwrap_or("0"))
        .map_err(|e| RunnerError::new(FailureKind::Validation, e.to_string()))?;

    // 3. Assemble the execution payload against the contract's stored code
    //    and current state, plus the derived blockchain context.
    let blockchain = vec![ParamValue::new(
        "BLOCKNUMBER",
        "BNum",
        &ctx.state.block_num().to_string(),
    )];
    let message = serde_json::json!({
        "_tag": transition,
        "_amount": tx_amount.to_string(),
        "_sender": sender_form(&caller.address),
        "params": params,
    });
    let payload = ExecutionPayload {
        code: contract.code.clone(),
        init: contract.init.clone(),
        blockchain,
        state: contract.state.clone(),
        message,
        gas_limit,
    };

    // 4. Execute.
    let output = ctx
        .checker
        .call_execution(payload)
        .await
        .map_err(|e| RunnerError::new(FailureKind::Submission, e.to_string()))?;

    // 5. Gas accounting. Malformed or impossible gas_remaining is an
    //    execution error, never silently accepted.
    let gas_used = gas_used(gas_limit, &output.gas_remaining)?;
    debug!(address = %address, transition = %transition, gas_used, "transition executed");

    // 6. Caller delta: debit amount and gas, credit any amount sent back to
    //    the caller, bump the nonce. Checked arithmetic throughout.
    let refund = refund_to_caller(output.message.as_ref(), &caller.address)?;
    let account = caller
        .apply_call_charge(tx_amount, gas_used, gas_price, refund)
        .map_err(|e| RunnerError::new(FailureKind::Consistency, e.to_string()))?;

    // 7. Contract delta: replace state, append history and logs.
    let new_events = output.events.len();
    let updated = apply_call_output(&contract, &output);

    // 8. Persist before publishing; a record that did not survive must not
    //    become visible.
    ctx.store
        .set(address, &updated)
        .await
        .map_err(|e| RunnerError::new(FailureKind::Persistence, e.to_string()))?;

    Ok(CallOutcome {
        account,
        contract: updated,
        gas_used,
        new_events,
    })
}

/// `gas_limit − gas_remaining`, with malformed values rejected.
fn gas_used(gas_limit: u64, gas_remaining: &str) -> Result<u64, RunnerError> {
    let remaining = gas_remaining.trim().parse::<u64>().map_err(|_| {
        RunnerError::new(
            FailureKind::Consistency,
            format!("malformed gas_remaining '{}'", gas_remaining),
        )
    })?;
    gas_limit.checked_sub(remaining).ok_or_else(|| {
        RunnerError::new(
            FailureKind::Consistency,
            format!(
                "gas_remaining {} exceeds gas limit {}",
                remaining, gas_limit
            ),
        )
    })
}

/// Amount credited back to the caller by an outgoing message addressed to
/// them. Messages to other recipients carry no refund.
fn refund_to_caller(message: Option<&Value>, caller: &str) -> Result<u128, RunnerError> {
    let Some(message) = message else {
        return Ok(0);
    };
    let recipient = message
        .get("_recipient")
        .and_then(Value::as_str)
        .map(|r| r.trim_start_matches("0x").to_lowercase());
    if recipient.as_deref() != Some(caller) {
        return Ok(0);
    }
    match message.get("_amount") {
        None | Some(Value::Null) => Ok(0),
        Some(Value::String(s)) => parse_uint128(s).map_err(|e| {
            RunnerError::new(
                FailureKind::Consistency,
                format!("malformed message _amount: {}", e),
            )
        }),
        Some(other) => Err(RunnerError::new(
            FailureKind::Consistency,
            format!("malformed message _amount: {}", other),
        )),
    }
}

/// Build the replacement contract record for a successful call.
///
/// State is replaced wholesale; `previous_states` gains the pre-call state;
/// event and message logs are appended in emission order.
fn apply_call_output(contract: &Contract, output: &CallOutput) -> Contract {
    let mut updated = contract.clone();
    updated
        .previous_states
        .push(std::mem::replace(&mut updated.state, output.states.clone()));
    updated.event_log.extend(output.events.iter().cloned());
    if let Some(message) = &output.message {
        updated.message_log.push(message.clone());
    }
    updated
}
