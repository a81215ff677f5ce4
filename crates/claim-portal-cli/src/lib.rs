#![forbid(unsafe_code)]

mod commands;
mod helpers;
mod round_jobs;

use claim_portal_core::env::{env_bool, MissingEnv};
use claim_portal_core::{resolve_data_dir, ExitCode, MachineError, ENV_CLAIM_LOG_JSON};
use claim_portal_engine::EngineError;
use claim_portal_model::ValidationError;
use claim_portal_store::{StoreError, StoreErrorCode};
use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Generator, Shell};
use commands::ScheduleCommand;
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "claim-portal")]
#[command(about = "Claim portal round jobs and admin commands")]
#[command(
    after_help = "Environment:\n  CLAIM_DATA_DIR     Data directory (default ./data)\n  CLAIM_TOKEN_MINT   Token mint for holder snapshots\n  CLAIM_LOG_JSON     Emit logs as JSON"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[arg(long, global = true, default_value_t = false)]
    trace: bool,
    /// Overrides `CLAIM_DATA_DIR`.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace a finished automatic round with a freshly generated one.
    Rotate {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        now: Option<String>,
    },
    /// Resolve the stored schedule's phase.
    Phase {
        #[arg(long)]
        now: Option<String>,
    },
    /// Write the active portal state for the configured round.
    Publish {
        #[arg(long)]
        now: Option<String>,
    },
    /// Record the round's token holders once.
    Snapshot {
        #[arg(long)]
        round: Option<u64>,
        #[arg(long)]
        mint: Option<String>,
        #[arg(long)]
        max_holders: Option<usize>,
    },
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
    Analytics,
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Copy)]
struct LogFlags {
    quiet: bool,
    verbose: u8,
    trace: bool,
}

#[derive(Clone, Copy)]
struct OutputMode {
    json: bool,
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code as u8)
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => {
                return Err(CliError {
                    exit_code: ExitCode::Usage,
                    machine: MachineError::new("usage_error", "invalid command line arguments")
                        .with_detail("error", &err.to_string()),
                });
            }
        },
    };
    let output_mode = OutputMode { json: cli.json };
    let command = cli
        .command
        .ok_or_else(|| CliError::usage("missing command; see --help"))?;
    init_logging(LogFlags {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
    });
    let data_dir = cli.data_dir.unwrap_or_else(resolve_data_dir);

    match command {
        Commands::Rotate { seed, now } => {
            round_jobs::run_rotate(&data_dir, seed, now.as_deref(), output_mode)
        }
        Commands::Phase { now } => round_jobs::run_phase(&data_dir, now.as_deref(), output_mode),
        Commands::Publish { now } => {
            round_jobs::run_publish(&data_dir, now.as_deref(), output_mode)
        }
        Commands::Snapshot {
            round,
            mint,
            max_holders,
        } => round_jobs::run_snapshot(&data_dir, round, mint, max_holders, output_mode),
        Commands::Schedule { command } => match command {
            ScheduleCommand::Show => round_jobs::run_schedule_show(&data_dir, output_mode),
            ScheduleCommand::SetMode { mode } => {
                round_jobs::run_schedule_set_mode(&data_dir, &mode, output_mode)
            }
            ScheduleCommand::Set {
                snapshot_at,
                opens_at,
                closes_at,
                distribution_starts_at,
                distribution_done_at,
                round,
            } => round_jobs::run_schedule_set(
                &data_dir,
                [
                    snapshot_at,
                    opens_at,
                    closes_at,
                    distribution_starts_at,
                    distribution_done_at,
                ],
                round,
                output_mode,
            ),
        },
        Commands::Analytics => round_jobs::run_analytics(&data_dir, output_mode),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout only carries command output.
fn init_logging(flags: LogFlags) {
    let level = if flags.trace {
        Some("trace")
    } else if flags.verbose > 0 {
        Some("debug")
    } else if flags.quiet {
        Some("error")
    } else {
        None
    };
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if env_bool(ENV_CLAIM_LOG_JSON, false) {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if let Err(err) = installed {
        tracing::debug!(error = %err, "tracing subscriber already installed");
    }
}

fn print_completion<G: Generator>(generator: G) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    generate(generator, &mut command, name, &mut std::io::stdout());
}

#[derive(Debug)]
struct CliError {
    exit_code: ExitCode,
    machine: MachineError,
}

impl CliError {
    fn internal(message: String) -> Self {
        Self {
            exit_code: ExitCode::Internal,
            machine: MachineError::new("internal_error", &message),
        }
    }

    fn usage(message: &str) -> Self {
        Self {
            exit_code: ExitCode::Usage,
            machine: MachineError::new("usage_error", message),
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(value: ValidationError) -> Self {
        let mut machine = MachineError::new("validation_error", &value.to_string())
            .with_detail("subject", &value.subject);
        for issue in &value.issues {
            machine = machine.with_detail(&issue.field, &issue.problem);
        }
        Self {
            exit_code: ExitCode::Validation,
            machine,
        }
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        let (exit_code, code) = match value.code {
            StoreErrorCode::Validation => (ExitCode::Validation, "validation_error"),
            StoreErrorCode::Rpc => (ExitCode::DependencyFailure, "dependency_failure"),
            StoreErrorCode::NotFound => (ExitCode::Internal, "missing_file"),
            _ => (ExitCode::Internal, "store_error"),
        };
        Self {
            exit_code,
            machine: MachineError::new(code, &value.message)
                .with_detail("store_code", value.code.as_str()),
        }
    }
}

impl From<EngineError> for CliError {
    fn from(value: EngineError) -> Self {
        match value {
            EngineError::Store(e) => e.into(),
            EngineError::Validation(e) => e.into(),
        }
    }
}

impl From<MissingEnv> for CliError {
    fn from(value: MissingEnv) -> Self {
        Self {
            exit_code: ExitCode::Usage,
            machine: MachineError::new("missing_env", &value.to_string())
                .with_detail("variable", &value.0),
        }
    }
}

fn emit_error(error: &CliError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(&error.machine) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"internal_error\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}", error.machine.message);
    }
}
