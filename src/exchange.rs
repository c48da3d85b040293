//! One-shot JSON-RPC exchange over the target's stdio.
//!
//! Per step: serialize the request to a single line, write it to the
//! target's stdin and flush, then read exactly one line from its stdout
//! under a bounded wait and decode it. No retries and no re-reads. Each
//! step gets one attempt, and whatever comes back (or does not) is the
//! step's outcome.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

use crate::errors::ProbeError;
use crate::launcher::TargetProcess;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};

/// Truncation limit when quoting an offending line in a decode error.
const QUOTED_LINE_LIMIT: usize = 200;

// ─── Wire Encoding ───────────────────────────────────────────────────────────

/// Serialize a request to its canonical single-line wire form, without the
/// trailing newline.
pub fn encode_request_line(request: &JsonRpcRequest) -> Result<String, ProbeError> {
    serde_json::to_string(request).map_err(|e| ProbeError::Exchange {
        reason: format!("failed to serialize request: {e}"),
    })
}

/// Parse one stdout line into a shape-checked response.
pub fn decode_response_line(line: &str) -> Result<JsonRpcResponse, ProbeError> {
    let trimmed = line.trim();

    let response: JsonRpcResponse =
        serde_json::from_str(trimmed).map_err(|e| ProbeError::Decode {
            reason: format!("{e}"),
            line: quote_line(trimmed),
        })?;

    if let Some(violation) = response.shape_violation() {
        return Err(ProbeError::Decode {
            reason: violation,
            line: quote_line(trimmed),
        });
    }

    Ok(response)
}

/// Quote a line for an error message, truncating on a char boundary.
fn quote_line(line: &str) -> String {
    if line.len() <= QUOTED_LINE_LIMIT {
        return line.to_string();
    }
    let mut end = QUOTED_LINE_LIMIT;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &line[..end])
}

// ─── Exchange ────────────────────────────────────────────────────────────────

/// Perform exactly one request/response round trip against the target.
///
/// Returns `Ok(Some(response))` when a line came back and decoded,
/// `Ok(None)` when the target closed stdout without writing a line or the
/// bounded wait expired, and `Err` for I/O and decode failures. The caller
/// reports `Ok(None)` as a failed step; it is an absence, not a crash.
pub async fn exchange(
    process: &mut TargetProcess,
    request: &JsonRpcRequest,
    response_timeout: Duration,
) -> Result<Option<JsonRpcResponse>, ProbeError> {
    // Serialize and send
    let mut json = encode_request_line(request)?;
    json.push('\n');

    let stdin = process.stdin().ok_or(ProbeError::Exchange {
        reason: "target stdin already closed".into(),
    })?;
    stdin
        .write_all(json.as_bytes())
        .await
        .map_err(|e| ProbeError::Exchange {
            reason: format!("failed to write to stdin: {e}"),
        })?;
    stdin.flush().await.map_err(|e| ProbeError::Exchange {
        reason: format!("failed to flush stdin: {e}"),
    })?;

    tracing::debug!(method = %request.method, id = request.id, "request written");

    // Read exactly one line, bounded
    let mut line_buf = String::new();
    let read = tokio::time::timeout(
        response_timeout,
        process.stdout().read_line(&mut line_buf),
    )
    .await;

    let bytes_read = match read {
        Ok(Ok(n)) => n,
        Ok(Err(e)) => {
            return Err(ProbeError::Exchange {
                reason: format!("failed to read from stdout: {e}"),
            });
        }
        Err(_) => {
            tracing::warn!(
                timeout_ms = response_timeout.as_millis() as u64,
                "target wrote no line within the response timeout"
            );
            return Ok(None);
        }
    };

    if bytes_read == 0 {
        tracing::warn!("target stdout closed without a response line");
        return Ok(None);
    }

    let response = decode_response_line(&line_buf)?;

    if response.id != request.id {
        tracing::warn!(
            expected = request.id,
            received = response.id,
            "response id does not echo the request id"
        );
    }

    Ok(Some(response))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
