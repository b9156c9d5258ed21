//! Error types for the shellcheck gate.
//!
//! Every variant here is a setup fault that aborts the run before (or instead
//! of) classification. Lint diagnostics are never errors; they travel as
//! [`crate::lint::LintOutcome::Failed`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a verification run
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The root is not a git work tree, or the ignore oracle could not answer
    #[error("Discovery failed in {root}: {reason}")]
    Discovery { root: PathBuf, reason: String },

    /// The allow-list file is not in canonical byte-wise order
    #[error("{path} is not in sorted order")]
    UnsortedAllowList {
        path: PathBuf,
        /// The order the file must have
        expected: Vec<String>,
    },

    /// No execution strategy could provide the pinned tool
    #[error("ShellCheck is unavailable: {0}")]
    ToolUnavailable(String),

    /// The sandbox container could not be started
    #[error("Failed to create sandbox from {image}: {reason}")]
    SandboxCreation { image: String, reason: String },

    /// The tool process could not be spawned for a script
    #[error("Failed to run ShellCheck on {path}: {reason}")]
    ToolInvocation { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading `.shellcheck-gate.toml`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    ParsingFailed { path: PathBuf, reason: String },

    #[error("Invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl VerifyError {
    /// An actionable next step for the user, printed after the error itself.
    pub fn remedy(&self) -> String {
        match self {
            VerifyError::UnsortedAllowList { path, expected } => {
                let path = path.display();
                let mut remedy = format!(
                    "Please sort it with:\n  LC_ALL=C sort -u -o {path} {path}\nExpected order:"
                );
                for entry in expected {
                    remedy.push_str("\n  ");
                    remedy.push_str(entry);
                }
                remedy
            }
            VerifyError::Discovery { .. } => {
                "Run from inside a git work tree, or pass its path explicitly.".to_string()
            }
            VerifyError::ToolUnavailable(_) => "Install the pinned ShellCheck version, start a \
                 container runtime, or run on a platform with a published ShellCheck release."
                .to_string(),
            VerifyError::SandboxCreation { image, .. } => {
                format!("Check that the container runtime is healthy and can pull {image}.")
            }
            VerifyError::ToolInvocation { .. } => {
                "Check that ShellCheck runs on its own, or rerun with -vv to see the failing command."
                    .to_string()
            }
            VerifyError::Config(e) => e.remedy(),
            VerifyError::Io(_) => "Rerun with -vv to see which operation failed.".to_string(),
        }
    }
}

impl ConfigError {
    pub fn remedy(&self) -> String {
        match self {
            ConfigError::Unreadable { path, .. } => {
                format!("Check that {} exists and is readable.", path.display())
            }
            ConfigError::ParsingFailed { path, .. } => format!(
                "Fix the TOML syntax in {}, or pass a different file with --config.",
                path.display()
            ),
            ConfigError::InvalidPattern { .. } => {
                "Fix the pattern in the [discovery] section of the configuration.".to_string()
            }
        }
    }
}

/// Result type alias for gate operations
pub type Result<T> = std::result::Result<T, VerifyError>;
