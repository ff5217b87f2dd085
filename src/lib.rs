//! savant-sandbox: deploy/call orchestration core for a Scilla contract IDE.
//!
//! Re-exports the workspace crates for embedding; the binary in `main.rs`
//! wraps the same APIs in a small CLI.

pub use savant_core as core;
pub use savant_store as store;
pub use savant_transport as transport;
pub use savant_types as types;
