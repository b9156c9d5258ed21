//! # Lint
//!
//! Per-script ShellCheck execution and reconciliation of the results with the
//! allow-list.

pub mod classifier;
pub mod runner;

pub use classifier::{ProblemSets, classify};
pub use runner::{LintOptions, LintOutcome, LintRunner, ScriptLinter};
