use clap::{Parser, Subcommand};
use dcheck_runner::checker::CommandChecker;
use dcheck_runner::spec::{load_spec, SpecError};
use dcheck_runner::{logging, runner, Result};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit code for anything that stops a run before it produces an exit code of
/// its own: spec errors, I/O errors.
const EXIT_FATAL: u8 = 2;

#[derive(Parser)]
#[command(name = "dcheck-runner")]
#[command(about = "Run a batch of dcheck validation jobs from a YAML spec", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, env = "DCHECK_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute every check in the spec and write <output_dir>/run.json.
    Run {
        #[arg(long, env = "DCHECK_SPEC")]
        spec: PathBuf,

        /// Checker program; receives the check input as JSON on stdin and
        /// prints the report JSON on stdout.
        #[arg(long, env = "DCHECK_CHECKER")]
        checker: PathBuf,

        /// Extra argument for the checker program (repeatable).
        #[arg(long = "checker-arg", allow_hyphen_values = true)]
        checker_args: Vec<String>,
    },

    /// Validate the spec and print its normalized form without running anything.
    Validate {
        #[arg(long, env = "DCHECK_SPEC")]
        spec: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_json);

    match dispatch(cli.cmd) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            if let Some(spec_err) = e.downcast_ref::<SpecError>() {
                tracing::error!(error = %spec_err, "invalid spec");
                eprintln!("spec error: {:#}", e);
            } else {
                tracing::error!(error = %format!("{:#}", e), "run aborted");
                eprintln!("error: {:#}", e);
            }
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn dispatch(cmd: Commands) -> Result<u8> {
    match cmd {
        Commands::Run {
            spec,
            checker,
            checker_args,
        } => {
            let mut checker = CommandChecker::new(checker, checker_args);
            let done = runner::run_and_write(&spec, &mut checker)?;
            println!("Wrote {}", done.path.display());
            Ok(if done.report.exit_code() == 0 { 0 } else { 1 })
        }
        Commands::Validate { spec } => {
            let spec = load_spec(&spec)?;
            println!("{}", serde_json::to_string_pretty(&spec)?);
            Ok(0)
        }
    }
}
