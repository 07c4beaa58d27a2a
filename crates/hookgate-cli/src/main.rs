//! # hookgate
//!
//! One short-lived process per hook invocation: read one event from stdin,
//! print one decision to stdout, exit 0. The `diagnose` subcommand prints a
//! health report instead.

#![deny(unsafe_code)]

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hookgate_core::clock::now_ms;
use hookgate_core::io::{emit_decision, read_stdin_bounded};
use hookgate_core::logging::{init_subscriber, init_subscriber_with_error_log};
use hookgate_core::HookInput;
use hookgate_diagnostics::OutputMode;
use hookgate_hooks::{ContextInjector, HookHandler, LearningReminder, PhaseGate, run_hook};
use hookgate_settings::{HookgateSettings, expand_path, load_settings_or_default, settings_path};
use tracing::{debug, error, warn};

/// Pre-action hooks for AI coding assistants.
#[derive(Parser, Debug)]
#[command(name = "hookgate", version, about = "Pre-action hooks for AI coding assistants")]
struct Cli {
    /// Settings file (default: `$HOOKGATE_SETTINGS` or `~/.hookgate/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deny delegated sub-tasks the current workflow phase does not permit.
    PhaseGate,
    /// Suggest storing an insight after edit bursts or error fixes.
    LearningReminder,
    /// Inject recalled learnings when planning starts.
    PlanContext,
    /// Report hook health (read-only).
    Diagnose(DiagnoseArgs),
}

#[derive(Args, Debug)]
struct DiagnoseArgs {
    /// Only the error log section.
    #[arg(long, conflicts_with_all = ["inventory", "json"])]
    errors: bool,
    /// Only the hook inventory.
    #[arg(long, conflicts_with = "json")]
    inventory: bool,
    /// The whole report as JSON.
    #[arg(long)]
    json: bool,
}

impl DiagnoseArgs {
    fn mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.errors {
            OutputMode::Errors
        } else if self.inventory {
            OutputMode::Inventory
        } else {
            OutputMode::Full
        }
    }
}

fn init_logging(settings: &HookgateSettings, for_hook: bool) {
    let level = settings.logging.level.as_str();
    if for_hook && settings.logging.write_error_log {
        init_subscriber_with_error_log(level, expand_path(&settings.diagnostics.error_log_path));
    } else {
        init_subscriber(level);
    }
}

async fn run_hook_command(handler: Arc<dyn HookHandler>, stdin_timeout_ms: u64) {
    let raw = read_stdin_bounded(Duration::from_millis(stdin_timeout_ms));
    let input = HookInput::parse(&raw);
    if let HookInput::Malformed { reason } = &input {
        debug!(hook = %handler.name(), %reason, "hook input malformed");
    }
    let decision = run_hook(handler, input, now_ms()).await;
    emit_decision(&decision);
}

fn run_diagnose(settings: &HookgateSettings, args: &DiagnoseArgs) -> Result<()> {
    let text = hookgate_diagnostics::diagnose(&settings.diagnostics, args.mode());
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .context("failed to write diagnostics report")?;
    stdout.flush().context("failed to flush diagnostics report")
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let path = cli.settings.clone().unwrap_or_else(settings_path);
    let (settings, load_error) = load_settings_or_default(&path);

    init_logging(&settings, !matches!(cli.command, Command::Diagnose(_)));
    if let Some(e) = load_error {
        warn!(path = %path.display(), error = %e, "settings unreadable, using defaults");
    }

    match cli.command {
        Command::PhaseGate => {
            let timeout = settings.phase_gate.stdin_timeout_ms;
            run_hook_command(Arc::new(PhaseGate::new(settings.phase_gate)), timeout).await;
        }
        Command::LearningReminder => {
            let timeout = settings.heuristics.stdin_timeout_ms;
            run_hook_command(Arc::new(LearningReminder::new(settings.heuristics)), timeout).await;
        }
        Command::PlanContext => {
            let timeout = settings.context_injection.stdin_timeout_ms;
            run_hook_command(Arc::new(ContextInjector::new(settings.context_injection)), timeout)
                .await;
        }
        Command::Diagnose(args) => {
            if let Err(e) = run_diagnose(&settings, &args) {
                error!(error = %e, "diagnose failed");
            }
        }
    }
}
