//! Network transport layer for savant-sandbox.
//!
//! Two external collaborators live behind the traits defined here:
//! - the checker/interpreter service ([`checker::CheckerApi`]), which
//!   type-checks source and executes transitions, and
//! - the chain client ([`chain::ChainApi`]), which submits deploy
//!   transactions to a simulator or a live network gateway.
//!
//! HTTP implementations use a blocking `ureq` agent wrapped in
//! `tokio::task::spawn_blocking` at the async boundary.

pub mod chain;
pub mod checker;

pub use chain::{ChainApi, DeployReceipt, HttpChainGateway, LocalSimulator};
pub use checker::{CallOutput, CheckResult, CheckerApi, ExecutionPayload, HttpCheckerClient};
