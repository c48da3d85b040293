//! Probe steps and the fixed smoke scenario.
//!
//! Each step is one tool call run against its own fresh target instance:
//! spawn, a single exchange, unconditional teardown. Steps are independent;
//! a failed step never stops the ones after it.

use std::path::Path;
use std::time::Instant;

use crate::config::ProbeConfig;
use crate::errors::ProbeError;
use crate::exchange;
use crate::launcher::TargetProcess;
use crate::protocol::{JsonRpcResponse, ToolCall};
use crate::report;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Request id used for every probe request.
///
/// Calls are sequential and non-overlapping, so a constant id cannot
/// misroute; a conforming target echoes it back unchanged.
pub const PROBE_REQUEST_ID: u64 = 1;

/// Name under which the scenario registers its managed process.
pub const TEST_PROCESS_NAME: &str = "test-process";

/// Fixture script the create_process call points the target at.
pub const TEST_PROCESS_SCRIPT: &str = "test_process.sh";

// ─── Steps ───────────────────────────────────────────────────────────────────

/// One probe step: a progress line for the report plus the tool call to issue.
#[derive(Debug, Clone)]
pub struct ProbeStep {
    pub summary: String,
    pub call: ToolCall,
}

/// How a step ended.
#[derive(Debug)]
pub enum StepOutcome {
    /// The target wrote back one line that decoded as a response. Covers
    /// result and error payloads alike; the report shows which it was.
    Answered(JsonRpcResponse),
    /// The target closed stdout without writing a line, or the bounded wait
    /// expired.
    NoResponse,
    /// Launch, exchange I/O, or decode failure.
    Failed(ProbeError),
}

impl StepOutcome {
    /// Whether the step counts as answered for the summary and exit code.
    pub fn is_answered(&self) -> bool {
        matches!(self, StepOutcome::Answered(_))
    }
}

/// Record of one executed step.
#[derive(Debug)]
pub struct StepReport {
    pub summary: String,
    pub tool: String,
    pub outcome: StepOutcome,
    pub elapsed_ms: u64,
    /// Post-mortem stderr tail, captured only when the step did not answer.
    pub stderr_tail: String,
}

/// The three fixed smoke calls, in execution order.
///
/// The base directory supplies the command path and working directory for
/// the managed process the first call registers.
pub fn default_scenario(base_dir: &Path) -> Vec<ProbeStep> {
    let script = base_dir.join(TEST_PROCESS_SCRIPT);
    vec![
        ProbeStep {
            summary: "Creating test process".to_string(),
            call: ToolCall::new(
                "create_process",
                serde_json::json!({
                    "name": TEST_PROCESS_NAME,
                    "command": script.display().to_string(),
                    "args": [],
                    "env": {},
                    "cwd": base_dir.display().to_string(),
                }),
            ),
        },
        ProbeStep {
            summary: "Listing processes".to_string(),
            call: ToolCall::new("list_processes", serde_json::json!({})),
        },
        ProbeStep {
            summary: "Getting status".to_string(),
            call: ToolCall::new("get_status", serde_json::json!({})),
        },
    ]
}

// ─── Execution ───────────────────────────────────────────────────────────────

/// Run one step: spawn a fresh target, perform the single exchange, and tear
/// the target down before returning, whatever the exchange outcome was.
pub async fn run_step(config: &ProbeConfig, step: &ProbeStep) -> StepReport {
    let start = Instant::now();
    let request = step.call.request(PROBE_REQUEST_ID);

    let mut process = match TargetProcess::spawn(&config.target) {
        Ok(process) => process,
        Err(e) => {
            // Nothing spawned, nothing to tear down; the step is skipped
            return StepReport {
                summary: step.summary.clone(),
                tool: step.call.name.clone(),
                outcome: StepOutcome::Failed(e),
                elapsed_ms: start.elapsed().as_millis() as u64,
                stderr_tail: String::new(),
            };
        }
    };

    let outcome = match exchange::exchange(&mut process, &request, config.response_timeout).await {
        Ok(Some(response)) => StepOutcome::Answered(response),
        Ok(None) => StepOutcome::NoResponse,
        Err(e) => StepOutcome::Failed(e),
    };
    let elapsed_ms = start.elapsed().as_millis() as u64;

    // Teardown is unconditional; a failed exchange still reclaims the target
    process.shutdown(config.shutdown_grace).await;

    let stderr_tail = if outcome.is_answered() {
        String::new()
    } else {
        process.stderr_tail().await
    };

    StepReport {
        summary: step.summary.clone(),
        tool: step.call.name.clone(),
        outcome,
        elapsed_ms,
        stderr_tail,
    }
}

/// Run all steps in order, printing each outcome before moving to the next.
///
/// Steps are independent: every step runs regardless of earlier failures.
pub async fn run_scenario(config: &ProbeConfig, steps: &[ProbeStep]) -> Vec<StepReport> {
    let total = steps.len();
    let mut reports = Vec::with_capacity(total);

    for (index, step) in steps.iter().enumerate() {
        println!(
            "{}",
            report::render_step_header(index + 1, total, step)
        );

        let step_report = run_step(config, step).await;

        println!("{}", report::render_step_outcome(&step_report));
        tracing::info!(
            tool = %step_report.tool,
            answered = step_report.outcome.is_answered(),
            elapsed_ms = step_report.elapsed_ms,
            "step finished"
        );

        reports.push(step_report);
    }

    reports
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_fixed_order() {
        let steps = default_scenario(Path::new("/tmp/probe"));
        let tools: Vec<&str> = steps.iter().map(|s| s.call.name.as_str()).collect();
        assert_eq!(tools, vec!["create_process", "list_processes", "get_status"]);
    }

    #[test]
    fn test_default_scenario_create_process_arguments() {
        let steps = default_scenario(Path::new("/tmp/probe"));
        let args = &steps[0].call.arguments;

        assert_eq!(args["name"], TEST_PROCESS_NAME);
        assert_eq!(args["command"], "/tmp/probe/test_process.sh");
        assert_eq!(args["cwd"], "/tmp/probe");
        assert_eq!(args["args"], serde_json::json!([]));
        assert_eq!(args["env"], serde_json::json!({}));
    }

    #[test]
    fn test_default_scenario_later_steps_take_no_arguments() {
        let steps = default_scenario(Path::new("/tmp/probe"));
        for step in &steps[1..] {
            assert_eq!(step.call.arguments, serde_json::json!({}));
        }
    }

    #[test]
    fn test_step_outcome_answered_classification() {
        let answered = StepOutcome::Answered(
            serde_json::from_str(r#"{"jsonrpc":"2.0","result":{},"id":1}"#).unwrap(),
        );
        assert!(answered.is_answered());
        assert!(!StepOutcome::NoResponse.is_answered());
        assert!(!StepOutcome::Failed(ProbeError::Exchange {
            reason: "broken pipe".into()
        })
        .is_answered());
    }
}
