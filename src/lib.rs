//! Black-box conformance probe for an MCP-style process manager.
//!
//! The probe treats the service under test as an opaque JSON-RPC endpoint on
//! child-process stdio. For each step it:
//! - spawns a fresh target instance with piped stdio
//! - writes one line-framed `tools/call` request and flushes
//! - reads one response line under a bounded wait and decodes it
//! - tears the target down unconditionally
//!
//! Three fixed steps make up the smoke scenario: create a managed process,
//! list managed processes, fetch aggregate status. Steps are independent and
//! every outcome is reported; no failure aborts the run.

pub mod config;
pub mod errors;
pub mod exchange;
pub mod launcher;
pub mod protocol;
pub mod report;
pub mod scenario;

// Re-exports for convenience
pub use config::{ProbeConfig, TargetConfig};
pub use errors::ProbeError;
pub use launcher::TargetProcess;
pub use protocol::{JsonRpcRequest, JsonRpcResponse, ToolCall};
pub use report::ProbeSummary;
pub use scenario::{default_scenario, run_scenario, ProbeStep, StepOutcome, StepReport};
