//! # shellcheck-gate
//!
//! A repository-wide ShellCheck gate. Every shell script in a git work tree is
//! linted with one pinned ShellCheck release, and the results are reconciled
//! with a sorted allow-list of scripts that are known to fail.
//!
//! ## Features
//!
//! - **Discovery**: walks the tree, honours exclude/re-include prefixes and `.gitignore`
//! - **Allow-list**: strictly sorted, never rewritten, stale entries are reported
//! - **Provisioning**: host binary, digest-pinned container, or downloaded release
//! - **Reporting**: human-readable or JSON output with a 0/1 exit status
//!
//! ## Example
//!
//! ```rust,no_run
//! use shellcheck_gate::{cli::OutputFormat, handlers::VerifyOptions, handle_verify};
//! use shellcheck_gate::tool_management::CleanupRegistry;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = VerifyOptions {
//!     path: PathBuf::from("."),
//!     config: None,
//!     jobs: 4,
//!     format: OutputFormat::Human,
//!     quiet: false,
//! };
//! let verdict = handle_verify(options, &CleanupRegistry::new())?;
//! std::process::exit(verdict.exit_code());
//! # }
//! ```

pub mod allowlist;
pub mod cli;
pub mod common;
pub mod config;
pub mod discovery;
pub mod error;
pub mod handlers;
pub mod lint;
pub mod reporter;
pub mod tool_management;

// Re-export commonly used types and functions
pub use allowlist::AllowList;
pub use discovery::{ScriptPath, discover_scripts};
pub use error::{ConfigError, Result, VerifyError};
pub use handlers::*;
pub use lint::{LintOutcome, ProblemSets, classify};
pub use reporter::{Reporter, Verdict};
use cli::{Cli, Commands};
use tool_management::CleanupRegistry;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run one parsed command. Sandboxes created along the way are registered with
/// `cleanup` so an interrupt handler can remove them.
pub fn run_command(cli: Cli, cleanup: &CleanupRegistry) -> Result<Verdict> {
    match cli.command {
        Commands::Verify { path, jobs, format } => handlers::handle_verify(
            VerifyOptions {
                path,
                config: cli.config,
                jobs: usize::from(jobs),
                format,
                quiet: cli.quiet,
            },
            cleanup,
        ),
        Commands::Tools { command } => {
            handlers::handle_tools(command, cli.config.as_deref()).map(|_| Verdict::Passed)
        }
    }
}
