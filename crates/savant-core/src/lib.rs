//! Deploy/call orchestration engine.
//!
//! The core coordination problem: take a user-supplied deploy or call
//! request, combine it with derived blockchain context (block number, sender
//! balance, nonce), run it through the external checker/interpreter and
//! chain clients, apply the resulting state delta, persist it, and report a
//! terminal status — exactly once, with no partial state visible on failure.
//!
//! Structure:
//! - [`state`] — the single owned application state aggregate, mutated only
//!   through published [`state::StateEvent`]s.
//! - [`deploy`] / [`call`] — one orchestration run per request.
//! - [`listener`] — bootstrap (load persisted contracts) plus the request
//!   loop with per-address call serialization.
//! - [`context`] — the collaborator bundle handed to every run.

pub mod call;
pub mod config;
pub mod context;
pub mod deploy;
pub mod listener;
pub mod request;
pub mod state;

pub use config::Config;
pub use context::{ChainFactory, DefaultChainFactory, OrchestratorCtx};
pub use listener::Listener;
pub use request::{CallRequest, DeployRequest, Request};
pub use state::{AppState, StateEvent, StateHandle};
