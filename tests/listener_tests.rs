//! Listener tests: bootstrap hydration, pre-init rejection, and per-address
//! call serialization.

mod common;

use std::sync::Arc;
use std::time::Duration;

use savant_core::{CallRequest, Listener, Request, StateEvent, StateHandle};
use savant_store::{ContractStore, MemoryContractStore};
use savant_types::{FailureKind, ParamValue, RunStatus};
use tokio::sync::{mpsc, oneshot};

use common::*;

fn call_request(
    address: &str,
    transition: &str,
    gas_limit: u64,
) -> (Request, oneshot::Receiver<savant_types::RunnerResult>) {
    let (done, rx) = oneshot::channel();
    (
        Request::Call(CallRequest {
            address: address.to_string(),
            transition: transition.to_string(),
            params: vec![],
            amount: None,
            caller_address: CALLER.to_string(),
            gas_limit,
            gas_price: 1,
            done,
        }),
        rx,
    )
}

#[tokio::test]
async fn init_loads_persisted_contracts_into_state() {
    let state = StateHandle::new(1);
    let checker = Arc::new(MockChecker::valid(hello_abi()));
    let store = Arc::new(MemoryContractStore::new());
    store
        .set(CONTRACT_ADDR, &deployed_contract(CONTRACT_ADDR, "50"))
        .await
        .unwrap();

    let ctx = ctx(
        checker,
        MockChain::accepting(0),
        store as Arc<dyn ContractStore>,
        state.clone(),
    );

    let (tx, rx) = mpsc::channel(8);
    let mut events = state.subscribe();
    let listener = tokio::spawn(Listener::new(ctx).run(rx));

    tx.send(Request::Init).await.unwrap();
    match events.recv().await.unwrap() {
        StateEvent::Initialized(contracts) => {
            assert_eq!(contracts.len(), 1);
            assert_eq!(contracts[0].address, CONTRACT_ADDR);
        }
        other => panic!("expected Initialized, got {:?}", other),
    }
    assert!(state.contract(CONTRACT_ADDR).is_some());

    drop(tx);
    listener.await.unwrap().unwrap();
}

#[tokio::test]
async fn requests_before_init_fail_instead_of_hanging() {
    let state = StateHandle::new(1);
    let checker = Arc::new(MockChecker::valid(hello_abi()));
    let (ctx, _store) = ctx_with_memory_store(checker, MockChain::accepting(0), state.clone());

    let (tx, rx) = mpsc::channel(8);
    let listener = tokio::spawn(Listener::new(ctx).run(rx));

    let (request, result) = call_request(CONTRACT_ADDR, "setHello", 1000);
    tx.send(request).await.unwrap();

    let result = result.await.unwrap();
    assert_eq!(result.status, RunStatus::Failure);
    assert_eq!(result.error.unwrap().kind, FailureKind::Submission);

    drop(tx);
    listener.await.unwrap().unwrap();
}

// Two back-to-back calls against the same address must apply strictly
// sequentially: the second sees the first's state, the history never skips
// or swaps.
#[tokio::test]
async fn same_address_calls_serialize_strictly() {
    let state = StateHandle::new(1);
    let checker = Arc::new(
        MockChecker::valid(hello_abi()).with_delay(Duration::from_millis(50)),
    );
    let s1 = vec![ParamValue::new("counter", "Uint32", "1")];
    let s2 = vec![ParamValue::new("counter", "Uint32", "2")];
    checker.script_output(call_output(1000, 10, s1.clone()));
    checker.script_output(call_output(1000, 10, s2.clone()));

    let store = Arc::new(MemoryContractStore::new());
    let initial = deployed_contract(CONTRACT_ADDR, "0");
    store.set(CONTRACT_ADDR, &initial).await.unwrap();

    let ctx = ctx(
        checker.clone(),
        MockChain::accepting(0),
        store.clone() as Arc<dyn ContractStore>,
        state.clone(),
    );

    let (tx, rx) = mpsc::channel(8);
    let listener = tokio::spawn(Listener::new(ctx).run(rx));
    tx.send(Request::Init).await.unwrap();
    state.create_account(CALLER, "1000");

    let (first, first_result) = call_request(CONTRACT_ADDR, "setHello", 1000);
    let (second, second_result) = call_request(CONTRACT_ADDR, "setHello", 1000);
    tx.send(first).await.unwrap();
    tx.send(second).await.unwrap();

    assert_eq!(first_result.await.unwrap().status, RunStatus::Success);
    assert_eq!(second_result.await.unwrap().status, RunStatus::Success);

    let contract = state.contract(CONTRACT_ADDR).unwrap();
    assert_eq!(contract.previous_states.len(), 2);
    assert_eq!(contract.previous_states[0], initial.state);
    assert_eq!(contract.previous_states[1], s1);
    assert_eq!(contract.state, s2);

    // Exactly one nonce bump per call, applied sequentially.
    assert_eq!(state.account(CALLER).unwrap().nonce, 2);

    // The second execution read the first execution's output state.
    let payloads = checker.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0].state, initial.state);
    assert_eq!(payloads[1].state, s1);

    drop(tx);
    listener.await.unwrap().unwrap();
}

// Submission order is execution order for the same address, even on a
// multi-thread scheduler that polls the later-spawned task first.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn same_address_calls_run_in_submission_order() {
    let state = StateHandle::new(1);
    let checker = Arc::new(
        MockChecker::valid(hello_abi()).with_delay(Duration::from_millis(20)),
    );
    checker.script_output(call_output(1000, 10, vec![]));
    checker.script_output(call_output(1000, 10, vec![]));

    let store = Arc::new(MemoryContractStore::new());
    store
        .set(CONTRACT_ADDR, &deployed_contract(CONTRACT_ADDR, "0"))
        .await
        .unwrap();

    let ctx = ctx(
        checker.clone(),
        MockChain::accepting(0),
        store as Arc<dyn ContractStore>,
        state.clone(),
    );
    let (tx, rx) = mpsc::channel(8);
    let listener = tokio::spawn(Listener::new(ctx).run(rx));
    tx.send(Request::Init).await.unwrap();
    state.create_account(CALLER, "1000");

    let (first, first_result) = call_request(CONTRACT_ADDR, "first", 1000);
    let (second, second_result) = call_request(CONTRACT_ADDR, "second", 1000);
    tx.send(first).await.unwrap();
    tx.send(second).await.unwrap();

    assert_eq!(first_result.await.unwrap().status, RunStatus::Success);
    assert_eq!(second_result.await.unwrap().status, RunStatus::Success);

    // The interpreter saw the requests in the order they were submitted.
    let payloads = checker.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0].message["_tag"], "first");
    assert_eq!(payloads[1].message["_tag"], "second");

    drop(tx);
    listener.await.unwrap().unwrap();
}

// Replaying the persisted set with no intervening calls reproduces an
// identical contract set.
#[tokio::test]
async fn bootstrap_is_idempotent() {
    let store = Arc::new(MemoryContractStore::new());
    store
        .set(CONTRACT_ADDR, &deployed_contract(CONTRACT_ADDR, "5"))
        .await
        .unwrap();
    store
        .set(CALLER, &deployed_contract(CALLER, "9"))
        .await
        .unwrap();

    let first = store.get_all().await.unwrap();
    let second = store.get_all().await.unwrap();
    assert_eq!(first, second);
}
