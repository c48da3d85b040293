//! Command-line entry point for the probe.
//!
//! Parses the invocation surface, wires up tracing on stderr, runs the fixed
//! three-step scenario, and exits 0 only when every step was answered.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use mcp_probe::config::{ProbeConfig, TargetConfig};
use mcp_probe::report::{self, ProbeSummary};
use mcp_probe::scenario;

// ─── CLI ─────────────────────────────────────────────────────────────────────

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_env_pair(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, val)) if !key.is_empty() => Ok((key.to_string(), val.to_string())),
        _ => Err("expected KEY=VALUE".to_string()),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "mcp-probe",
    about = "Black-box smoke probe for an MCP-style process manager speaking JSON-RPC over stdio",
    version
)]
struct Cli {
    #[arg(
        value_name = "BASE_DIR",
        help = "Base directory used to build the command path and working directory for the managed process registered by the create_process step"
    )]
    base_dir: PathBuf,

    #[arg(
        long,
        env = "MCP_PROBE_SERVER_BIN",
        help = "Path to the service executable under test"
    )]
    server_bin: PathBuf,

    #[arg(
        long = "server-arg",
        value_name = "ARG",
        allow_hyphen_values = true,
        help = "Extra argument passed to the target on every spawn (repeatable)"
    )]
    server_args: Vec<String>,

    #[arg(
        long = "server-env",
        value_name = "KEY=VALUE",
        value_parser = parse_env_pair,
        help = "Environment variable set for the target on every spawn (repeatable)"
    )]
    server_env: Vec<(String, String)>,

    #[arg(
        long,
        env = "MCP_PROBE_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = parse_positive_u64,
        help = "Bounded wait for the single response line, in seconds"
    )]
    timeout_secs: u64,

    #[arg(
        long,
        env = "MCP_PROBE_SHUTDOWN_GRACE_SECS",
        default_value_t = 2,
        value_parser = parse_positive_u64,
        help = "Voluntary-exit window before the target is killed, in seconds"
    )]
    shutdown_grace_secs: u64,
}

impl Cli {
    fn probe_config(&self) -> ProbeConfig {
        let mut target = TargetConfig::new(&self.server_bin);
        target.args = self.server_args.clone();
        target.env = self.server_env.iter().cloned().collect();

        ProbeConfig {
            target,
            response_timeout: Duration::from_secs(self.timeout_secs),
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
        }
    }
}

// ─── Entry Point ─────────────────────────────────────────────────────────────

/// Initialize the tracing subscriber: human-readable diagnostics on stderr.
///
/// Stdout stays reserved for report lines. `RUST_LOG` overrides the default
/// filter.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mcp_probe=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn run(cli: Cli) -> ProbeSummary {
    let config = cli.probe_config();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        target = %config.target.command_display(),
        base_dir = %cli.base_dir.display(),
        timeout_secs = cli.timeout_secs,
        "probe starting"
    );

    if !cli.base_dir.is_dir() {
        // The base directory only feeds create_process arguments; the target
        // decides whether a missing path is an error, so warn and continue
        tracing::warn!(base_dir = %cli.base_dir.display(), "base directory does not exist");
    }

    let steps = scenario::default_scenario(&cli.base_dir);
    let reports = scenario::run_scenario(&config, &steps).await;

    let summary = ProbeSummary::from_reports(&reports);
    println!();
    println!("{}", report::render_summary(&summary));

    summary
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let summary = run(cli).await;
    ExitCode::from(summary.exit_code() as u8)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_pair() {
        assert_eq!(
            parse_env_pair("RUST_LOG=debug"),
            Ok(("RUST_LOG".to_string(), "debug".to_string()))
        );
        assert_eq!(
            parse_env_pair("EMPTY="),
            Ok(("EMPTY".to_string(), String::new()))
        );
        assert!(parse_env_pair("no-equals-sign").is_err());
        assert!(parse_env_pair("=value").is_err());
    }

    #[test]
    fn test_parse_positive_u64_rejects_zero() {
        assert_eq!(parse_positive_u64("10"), Ok(10));
        assert!(parse_positive_u64("0").is_err());
        assert!(parse_positive_u64("ten").is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from([
            "mcp-probe",
            "/tmp/fixtures",
            "--server-bin",
            "/usr/local/bin/procman",
        ])
        .unwrap();

        let config = cli.probe_config();
        assert_eq!(config.response_timeout, Duration::from_secs(10));
        assert_eq!(config.shutdown_grace, Duration::from_secs(2));
        assert!(config.target.args.is_empty());
        assert!(config.target.env.is_empty());
    }

    #[test]
    fn test_cli_repeatable_server_args_keep_order() {
        let cli = Cli::try_parse_from([
            "mcp-probe",
            "/tmp/fixtures",
            "--server-bin",
            "/usr/local/bin/procman",
            "--server-arg",
            "--no-web",
            "--server-arg",
            "--quiet",
            "--server-env",
            "PORT=0",
        ])
        .unwrap();

        let config = cli.probe_config();
        assert_eq!(config.target.args, vec!["--no-web", "--quiet"]);
        assert_eq!(config.target.env.get("PORT").map(String::as_str), Some("0"));
    }

    #[test]
    fn test_cli_requires_server_bin() {
        assert!(Cli::try_parse_from(["mcp-probe", "/tmp/fixtures"]).is_err());
    }

    #[test]
    fn test_cli_rejects_zero_durations() {
        assert!(Cli::try_parse_from([
            "mcp-probe",
            "/tmp/fixtures",
            "--server-bin",
            "/usr/local/bin/procman",
            "--timeout-secs",
            "0",
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "mcp-probe",
            "/tmp/fixtures",
            "--server-bin",
            "/usr/local/bin/procman",
            "--shutdown-grace-secs",
            "0",
        ])
        .is_err());
    }
}
