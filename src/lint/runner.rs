//! Runs ShellCheck over every discovered script.
//!
//! Any non-empty output counts as a failure. ShellCheck's exit code is only
//! logged: a non-zero exit with no text and a zero exit with text both occur
//! in practice, and the text is what gets reported.

use crate::common::command_utils::combined_output;
use crate::config::ToolConfig;
use crate::discovery::ScriptPath;
use crate::error::{Result, VerifyError};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use rayon::prelude::*;
use std::collections::HashMap;
use std::process::Output;

/// Result of linting one script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintOutcome {
    Clean,
    Failed(String),
}

impl LintOutcome {
    /// Classify captured tool output; the diagnostic text is the only signal
    pub fn from_output(script: &ScriptPath, output: &Output) -> Self {
        let text = combined_output(output);
        debug!(
            "{}: exit status {:?}, {} bytes of diagnostics",
            script,
            output.status.code(),
            text.trim().len()
        );
        Self::from_diagnostics(text)
    }

    pub fn from_diagnostics(text: String) -> Self {
        if text.trim().is_empty() {
            LintOutcome::Clean
        } else {
            LintOutcome::Failed(text)
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, LintOutcome::Clean)
    }
}

/// The fixed ShellCheck option set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOptions {
    pub disabled_rules: Vec<u32>,
}

impl LintOptions {
    pub fn from_config(tool: &ToolConfig) -> Self {
        Self {
            disabled_rules: tool.disabled_rules.clone(),
        }
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["--external-sources".to_string()];
        if !self.disabled_rules.is_empty() {
            let codes = self
                .disabled_rules
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(",");
            args.push(format!("--exclude={}", codes));
        }
        args.push("--color=auto".to_string());
        args
    }
}

/// Something that can lint a single script
pub trait ScriptLinter: Sync {
    fn lint(&self, script: &ScriptPath) -> Result<LintOutcome>;
}

/// Lints a set of scripts, one tool invocation per script
pub struct LintRunner<'a, L: ScriptLinter> {
    linter: &'a L,
    jobs: usize,
    show_progress: bool,
}

impl<'a, L: ScriptLinter> LintRunner<'a, L> {
    pub fn new(linter: &'a L) -> Self {
        Self {
            linter,
            jobs: 1,
            show_progress: false,
        }
    }

    /// Number of scripts linted concurrently
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Lint every script; returns once all outcomes are in
    pub fn run_all(&self, scripts: &[ScriptPath]) -> Result<HashMap<ScriptPath, LintOutcome>> {
        let progress = self.progress_bar(scripts.len());

        let lint_one = |script: &ScriptPath| -> Result<(ScriptPath, LintOutcome)> {
            progress.set_message(script.to_string());
            let outcome = self.linter.lint(script)?;
            progress.inc(1);
            Ok((script.clone(), outcome))
        };

        let outcomes = if self.jobs == 1 {
            scripts.iter().map(lint_one).collect::<Result<HashMap<_, _>>>()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .map_err(|e| VerifyError::Io(std::io::Error::other(e)))?;
            pool.install(|| {
                scripts
                    .par_iter()
                    .map(lint_one)
                    .collect::<Result<HashMap<_, _>>>()
            })
        };

        progress.finish_and_clear();
        outcomes
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("  {spinner:.cyan} [{bar:40.cyan/dim}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("━━╸"));
        }
        pb
    }
}
