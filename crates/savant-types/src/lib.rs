//! Shared types for the savant-sandbox workspace.
//!
//! Everything that crosses a crate boundary lives here: the contract and
//! account records owned by the application state store, the parsed ABI
//! produced by the checker, and the runner result delivered back to callers.

pub mod account;
pub mod address;
pub mod contract;
pub mod env_utils;
pub mod runner;
pub mod value;

pub use account::Account;
pub use contract::{Abi, AbiParam, Contract, ContractKind, Transition};
pub use runner::{FailureKind, RunStatus, RunnerError, RunnerResult};
pub use value::ParamValue;
