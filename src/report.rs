//! Human-readable rendering of step outcomes and the run summary.
//!
//! All renderers are pure string builders; the sequencer and the binary do
//! the actual printing. Report lines go to stdout, diagnostic logging goes
//! to stderr via `tracing`, so the two never interleave.

use crate::protocol::{error_codes, JsonRpcResponse};
use crate::scenario::{ProbeStep, StepOutcome, StepReport};

// ─── Renderers ───────────────────────────────────────────────────────────────

/// Progress line announcing a step before it runs.
pub fn render_step_header(index: usize, total: usize, step: &ProbeStep) -> String {
    format!("[{index}/{total}] {}...", step.summary)
}

/// Outcome block for a finished step: the outcome line with elapsed time,
/// plus the captured stderr tail when there is one.
pub fn render_step_outcome(report: &StepReport) -> String {
    let mut out = match &report.outcome {
        StepOutcome::Answered(response) => render_answered(response),
        StepOutcome::NoResponse => {
            "  no response from target (stdout closed or timed out)".to_string()
        }
        StepOutcome::Failed(e) => format!("  failed: {e}"),
    };

    out.push_str(&format!(" ({} ms)", report.elapsed_ms));

    if !report.stderr_tail.trim().is_empty() {
        out.push_str(&format!("\n  target stderr: {}", report.stderr_tail.trim()));
    }

    out
}

fn render_answered(response: &JsonRpcResponse) -> String {
    if let Some(error) = &response.error {
        let label = error_codes::label(error.code)
            .map(|l| format!(" {l}"))
            .unwrap_or_default();
        format!(
            "  response error [{}{label}]: {}",
            error.code, error.message
        )
    } else if let Some(result) = &response.result {
        format!("  response: {result}")
    } else {
        // Decode rejects responses with neither side present
        "  response: <empty>".to_string()
    }
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Aggregate counts for the run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProbeSummary {
    pub answered: usize,
    pub no_response: usize,
    pub failed: usize,
}

impl ProbeSummary {
    /// Tally the outcomes of a finished run.
    pub fn from_reports(reports: &[StepReport]) -> Self {
        let mut summary = ProbeSummary::default();
        for report in reports {
            match &report.outcome {
                StepOutcome::Answered(_) => summary.answered += 1,
                StepOutcome::NoResponse => summary.no_response += 1,
                StepOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.answered + self.no_response + self.failed
    }

    /// Process exit code: 0 only when every step was answered.
    pub fn exit_code(&self) -> i32 {
        if self.no_response == 0 && self.failed == 0 {
            0
        } else {
            1
        }
    }
}

/// Final summary line.
pub fn render_summary(summary: &ProbeSummary) -> String {
    format!(
        "{}/{} steps answered ({} no-response, {} failed)",
        summary.answered,
        summary.total(),
        summary.no_response,
        summary.failed
    )
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProbeError;
    use crate::protocol::ToolCall;

    fn step(summary: &str, tool: &str) -> ProbeStep {
        ProbeStep {
            summary: summary.to_string(),
            call: ToolCall::new(tool, serde_json::json!({})),
        }
    }

    fn report_with(outcome: StepOutcome) -> StepReport {
        StepReport {
            summary: "Listing processes".to_string(),
            tool: "list_processes".to_string(),
            outcome,
            elapsed_ms: 42,
            stderr_tail: String::new(),
        }
    }

    fn answered(json: &str) -> StepOutcome {
        StepOutcome::Answered(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_render_step_header() {
        let line = render_step_header(1, 3, &step("Creating test process", "create_process"));
        assert_eq!(line, "[1/3] Creating test process...");
    }

    #[test]
    fn test_render_answered_result() {
        let out = render_step_outcome(&report_with(answered(
            r#"{"jsonrpc":"2.0","result":{"processes":[]},"id":1}"#,
        )));
        assert!(out.contains(r#"response: {"processes":[]}"#));
        assert!(out.contains("(42 ms)"));
    }

    #[test]
    fn test_render_answered_error_reply_with_label() {
        let out = render_step_outcome(&report_with(answered(
            r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":1}"#,
        )));
        assert!(out.contains("response error [-32601 method not found]: Method not found"));
    }

    #[test]
    fn test_render_no_response() {
        let out = render_step_outcome(&report_with(StepOutcome::NoResponse));
        assert!(out.contains("no response from target"));
    }

    #[test]
    fn test_render_failed_step_with_stderr_tail() {
        let mut report = report_with(StepOutcome::Failed(ProbeError::Exchange {
            reason: "broken pipe".into(),
        }));
        report.stderr_tail = "thread 'main' panicked\n".to_string();
        let out = render_step_outcome(&report);
        assert!(out.contains("failed: exchange with target failed: broken pipe"));
        assert!(out.contains("target stderr: thread 'main' panicked"));
    }

    #[test]
    fn test_summary_counts_and_exit_code() {
        let reports = vec![
            report_with(answered(r#"{"jsonrpc":"2.0","result":{},"id":1}"#)),
            report_with(StepOutcome::NoResponse),
            report_with(StepOutcome::Failed(ProbeError::Exchange {
                reason: "broken pipe".into(),
            })),
        ];
        let summary = ProbeSummary::from_reports(&reports);
        assert_eq!(summary.answered, 1);
        assert_eq!(summary.no_response, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(
            render_summary(&summary),
            "1/3 steps answered (1 no-response, 1 failed)"
        );
    }

    #[test]
    fn test_summary_all_answered_exits_zero() {
        let reports = vec![
            report_with(answered(r#"{"jsonrpc":"2.0","result":{},"id":1}"#)),
            report_with(answered(r#"{"jsonrpc":"2.0","result":{},"id":1}"#)),
        ];
        let summary = ProbeSummary::from_reports(&reports);
        assert_eq!(summary.exit_code(), 0);
    }
}
