//! Turns classified problems into a verdict and user-facing output.
//!
//! Human output puts problems on stderr and the single success line on
//! stdout. JSON output is one document on stdout either way.

use crate::cli::OutputFormat;
use crate::lint::ProblemSets;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Outcome of a verification run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Passed,
    Failed,
}

impl Verdict {
    pub fn of(problems: &ProblemSets) -> Self {
        if problems.is_clean() {
            Verdict::Passed
        } else {
            Verdict::Failed
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Passed => 0,
            Verdict::Failed => 1,
        }
    }
}

#[derive(Serialize)]
struct Counts {
    checked: usize,
    unexpected_failures: usize,
    stale_passes: usize,
    stale_entries: usize,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    passed: bool,
    counts: Counts,
    #[serde(flatten)]
    problems: &'a ProblemSets,
}

pub struct Reporter {
    allow_list: PathBuf,
    format: OutputFormat,
}

impl Reporter {
    /// `allow_list` is shown to the user as written, usually repository-relative
    pub fn new(allow_list: &Path, format: OutputFormat) -> Self {
        Self {
            allow_list: allow_list.to_path_buf(),
            format,
        }
    }

    /// Report to the process's stdout and stderr
    pub fn report(&self, problems: &ProblemSets, checked: usize) -> io::Result<Verdict> {
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.write_report(problems, checked, &mut stdout.lock(), &mut stderr.lock())
    }

    pub fn write_report(
        &self,
        problems: &ProblemSets,
        checked: usize,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<Verdict> {
        let verdict = Verdict::of(problems);
        match self.format {
            OutputFormat::Json => self.write_json(problems, checked, verdict, out)?,
            OutputFormat::Human => match verdict {
                Verdict::Passed => writeln!(
                    out,
                    "✅ All {} shell scripts pass ShellCheck or are listed in {}",
                    checked,
                    self.allow_list.display()
                )?,
                Verdict::Failed => self.write_problems(problems, err)?,
            },
        }
        out.flush()?;
        err.flush()?;
        Ok(verdict)
    }

    fn write_json(
        &self,
        problems: &ProblemSets,
        checked: usize,
        verdict: Verdict,
        out: &mut impl Write,
    ) -> io::Result<()> {
        let report = JsonReport {
            passed: verdict == Verdict::Passed,
            counts: Counts {
                checked,
                unexpected_failures: problems.unexpected_failures.len(),
                stale_passes: problems.stale_passes.len(),
                stale_entries: problems.stale_entries.len(),
            },
            problems,
        };
        serde_json::to_writer_pretty(&mut *out, &report).map_err(io::Error::other)?;
        writeln!(out)
    }

    fn write_problems(&self, problems: &ProblemSets, err: &mut impl Write) -> io::Result<()> {
        let allow_list = self.allow_list.display();

        if !problems.unexpected_failures.is_empty() {
            writeln!(
                err,
                "{}",
                format!(
                    "❌ {} script(s) fail ShellCheck:",
                    problems.unexpected_failures.len()
                )
                .red()
                .bold()
            )?;
            for diagnostic in problems.unexpected_failures.values() {
                writeln!(err, "{}", diagnostic.trim_end())?;
                writeln!(err)?;
            }
            writeln!(err, "Please review the above warnings and fix them.")?;
            writeln!(
                err,
                "If a warning does not make sense, exempt it with a `# shellcheck disable=SCxxxx` \
                 comment, or (with your reviewer's approval) add the file to {}.",
                allow_list
            )?;
            writeln!(err)?;
        }

        if !problems.stale_passes.is_empty() {
            writeln!(
                err,
                "{}",
                format!(
                    "⚠️  {} allow-listed script(s) now pass ShellCheck:",
                    problems.stale_passes.len()
                )
                .yellow()
                .bold()
            )?;
            for script in &problems.stale_passes {
                writeln!(err, "  {}", script)?;
            }
            writeln!(err, "Please remove them from {}.", allow_list)?;
            writeln!(err)?;
        }

        if !problems.stale_entries.is_empty() {
            writeln!(
                err,
                "{}",
                format!(
                    "⚠️  {} allow-list entr(ies) no longer exist:",
                    problems.stale_entries.len()
                )
                .yellow()
                .bold()
            )?;
            for script in &problems.stale_entries {
                writeln!(err, "  {}", script)?;
            }
            writeln!(err, "Please remove them from {}.", allow_list)?;
            writeln!(err)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::ScriptPath;

    fn render(problems: &ProblemSets, format: OutputFormat) -> (Verdict, String, String) {
        let reporter = Reporter::new(Path::new("hack/.shellcheck_failures"), format);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let verdict = reporter.write_report(problems, 3, &mut out, &mut err).unwrap();
        (
            verdict,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_clean_run_prints_one_line_to_stdout() {
        let (verdict, out, err) = render(&ProblemSets::default(), OutputFormat::Human);

        assert_eq!(verdict, Verdict::Passed);
        assert_eq!(verdict.exit_code(), 0);
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("All 3 shell scripts"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_problems_go_to_stderr() {
        let mut problems = ProblemSets::default();
        problems.unexpected_failures.insert(
            ScriptPath::new("x.sh"),
            "In x.sh line 3:\necho $foo\n     ^-- SC2086".to_string(),
        );
        problems.stale_passes.insert(ScriptPath::new("c.sh"));
        problems.stale_entries.insert(ScriptPath::new("d.sh"));

        let (verdict, out, err) = render(&problems, OutputFormat::Human);

        assert_eq!(verdict, Verdict::Failed);
        assert_eq!(verdict.exit_code(), 1);
        assert!(out.is_empty());
        assert!(err.contains("In x.sh line 3:"));
        assert!(err.contains("  c.sh"));
        assert!(err.contains("  d.sh"));
        assert!(err.contains("remove them from hack/.shellcheck_failures"));
    }

    #[test]
    fn test_json_document() {
        let mut problems = ProblemSets::default();
        problems.stale_passes.insert(ScriptPath::new("c.sh"));

        let (verdict, out, err) = render(&problems, OutputFormat::Json);
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(verdict, Verdict::Failed);
        assert!(err.is_empty());
        assert_eq!(json["passed"], false);
        assert_eq!(json["counts"]["checked"], 3);
        assert_eq!(json["counts"]["stale_passes"], 1);
        assert_eq!(json["stale_passes"][0], "c.sh");
        assert!(json["unexpected_failures"].as_object().unwrap().is_empty());
    }
}
