//! Bootstrap and request dispatch loop.
//!
//! The listener waits for an explicit [`Request::Init`], loads the persisted
//! contract set, publishes it as the initial application state, and then
//! accepts deploy and call requests until the channel closes.
//!
//! Concurrency: requests for different addresses run as independent tasks;
//! calls against the same address run strictly in submission order. The
//! dispatch loop chains each call task onto the completion of the previous
//! call for that address before spawning it, so ordering holds regardless of
//! which spawned task the scheduler polls first. A call's predecessor link
//! covers its whole run, state snapshot through persist-then-publish.

use std::collections::HashMap;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use savant_types::{FailureKind, RunnerError, RunnerResult};

use crate::call::run_call;
use crate::context::OrchestratorCtx;
use crate::deploy::run_deploy;
use crate::request::Request;
use crate::state::StateEvent;

/// Per-address FIFO registry. Holds the completion signal of the most
/// recently enqueued call per address; the next call for that address awaits
/// it before running.
#[derive(Default)]
pub(crate) struct CallQueues {
    tails: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

impl CallQueues {
    /// Register the next call for `address`. Returns the predecessor's
    /// completion signal (if one is still queued or running) and the sender
    /// this call fires when it finishes.
    pub(crate) fn enqueue(
        &self,
        address: &str,
    ) -> (Option<oneshot::Receiver<()>>, oneshot::Sender<()>) {
        let (done, next) = oneshot::channel();
        let prev = self.tails.lock().insert(address.to_string(), next);
        (prev, done)
    }
}

/// The orchestrating request loop.
pub struct Listener {
    ctx: OrchestratorCtx,
    queues: CallQueues,
}

impl Listener {
    pub fn new(ctx: OrchestratorCtx) -> Self {
        Self {
            ctx,
            queues: CallQueues::default(),
        }
    }

    /// Run until the request channel closes.
    ///
    /// Requests arriving before `Init` are completed as failures rather than
    /// silently dropped.
    pub async fn run(self, mut requests: mpsc::Receiver<Request>) -> Result<()> {
        // (a) Wait for the explicit initialization signal.
        loop {
            match requests.recv().await {
                None => return Ok(()),
                Some(Request::Init) => break,
                Some(request) => reject_uninitialized(request),
            }
        }

        // (b) Hydrate from the persistent store and publish the initial set.
        let contracts = self
            .ctx
            .store
            .get_all()
            .await
            .context("failed to load persisted contracts")?;
        info!(count = contracts.len(), "loaded persisted contracts");
        self.ctx.state.publish(StateEvent::Initialized(contracts));

        // (c) Dispatch until the channel closes.
        while let Some(request) = requests.recv().await {
            match request {
                Request::Init => {} // already initialized
                Request::Deploy(deploy) => {
                    debug!("dispatching deploy request");
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        run_deploy(&ctx, deploy).await;
                    });
                }
                Request::Call(call) => {
                    debug!(address = %call.address, transition = %call.transition, "dispatching call request");
                    let ctx = self.ctx.clone();
                    // The predecessor link is taken here, in channel order,
                    // before any task has a chance to run.
                    let (prev, done) = self.queues.enqueue(&call.address);
                    tokio::spawn(async move {
                        // A finished (or panicked) predecessor resolves
                        // immediately either way.
                        if let Some(prev) = prev {
                            let _ = prev.await;
                        }
                        run_call(&ctx, call).await;
                        let _ = done.send(());
                    });
                }
            }
        }
        Ok(())
    }
}

fn reject_uninitialized(request: Request) {
    let error = RunnerError::new(FailureKind::Submission, "orchestrator not initialized");
    match request {
        Request::Init => {}
        Request::Deploy(deploy) => {
            let _ = deploy
                .done
                .send(RunnerResult::failure("", deploy.gas_price, error));
        }
        Request::Call(call) => {
            let _ = call
                .done
                .send(RunnerResult::failure(call.address.clone(), call.gas_price, error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_call_per_address_has_no_predecessor() {
        let queues = CallQueues::default();
        let (prev, _done) = queues.enqueue("aa");
        assert!(prev.is_none());
        // A different address chains independently.
        let (prev_b, _done_b) = queues.enqueue("bb");
        assert!(prev_b.is_none());
    }

    #[tokio::test]
    async fn successor_waits_for_predecessor_completion() {
        let queues = CallQueues::default();
        let (_, done_first) = queues.enqueue("aa");
        let (prev, _done_second) = queues.enqueue("aa");
        let mut prev = prev.expect("second call links to the first");

        // Predecessor still running: the link is not yet resolved.
        assert!(prev.try_recv().is_err());
        done_first.send(()).unwrap();
        assert!(prev.await.is_ok());
    }

    #[tokio::test]
    async fn dropped_predecessor_unblocks_successor() {
        let queues = CallQueues::default();
        let (_, done_first) = queues.enqueue("aa");
        let (prev, _done_second) = queues.enqueue("aa");
        drop(done_first);
        // Resolves with an error, which the dispatch loop ignores.
        assert!(prev.unwrap().await.is_err());
    }
}
