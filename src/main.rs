use clap::Parser;
use log::{debug, warn};
use shellcheck_gate::{
    Result, Verdict, VerifyError, cli::Cli, run_command, tool_management::CleanupRegistry,
};
use std::process;
use std::time::Duration;
use tokio::task::JoinError;

/// Any error that stops the run before a verdict
const EXIT_SETUP_ERROR: i32 = 2;
const EXIT_INTERRUPTED: i32 = 130;

/// How long an interrupted run waits for in-flight sandbox work to notice the teardown
const TEARDOWN_GRACE: Duration = Duration::from_secs(30);

enum Finished {
    Pipeline(std::result::Result<Result<Verdict>, JoinError>),
    Interrupted,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    let cleanup = CleanupRegistry::new();
    let pipeline_cleanup = cleanup.clone();
    let mut pipeline = tokio::task::spawn_blocking(move || run_command(cli, &pipeline_cleanup));

    let finished = tokio::select! {
        joined = &mut pipeline => Finished::Pipeline(joined),
        Ok(()) = tokio::signal::ctrl_c() => Finished::Interrupted,
    };

    let code = match finished {
        Finished::Pipeline(Ok(Ok(verdict))) => verdict.exit_code(),
        Finished::Pipeline(Ok(Err(e))) => {
            print_error(&e);
            EXIT_SETUP_ERROR
        }
        Finished::Pipeline(Err(e)) => {
            eprintln!("Error: verification aborted: {}", e);
            cleanup.run_all();
            EXIT_SETUP_ERROR
        }
        Finished::Interrupted => {
            eprintln!("\nInterrupted, removing sandbox containers...");
            // A container still starting is removed again by its creator once
            // `run` returns, so that thread has to be given the chance to finish.
            if cleanup.run_all() > 0
                && tokio::time::timeout(TEARDOWN_GRACE, &mut pipeline).await.is_err()
            {
                warn!(
                    "Gave up waiting {}s for sandbox teardown",
                    TEARDOWN_GRACE.as_secs()
                );
            }
            EXIT_INTERRUPTED
        }
    };

    debug!("Exiting with status {}", code);
    process::exit(code);
}

fn print_error(error: &VerifyError) {
    eprintln!("Error: {}", error);
    eprintln!("{}", error.remedy());
}
