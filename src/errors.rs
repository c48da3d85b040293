//! Probe error types.

use thiserror::Error;

/// Errors a single probe step can report.
///
/// An absent response (closed stream or timeout) is deliberately not an error
/// variant; the exchange returns it as an absence value so callers report it
/// as a failed step rather than propagating a failure.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The target process failed to start.
    #[error("failed to launch target '{command}': {reason}")]
    Launch {
        command: String,
        reason: String,
    },

    /// I/O failure while writing the request or reading the reply.
    #[error("exchange with target failed: {reason}")]
    Exchange {
        reason: String,
    },

    /// The response line was not valid JSON or did not match the expected
    /// response shape. Carries a truncated copy of the offending line.
    #[error("malformed response line ({reason}): {line}")]
    Decode {
        reason: String,
        line: String,
    },
}
