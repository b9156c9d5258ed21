use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shellcheck-gate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lint every shell script in a repository against a pinned ShellCheck")]
#[command(long_about = "Runs a pinned ShellCheck release over every shell script in a git work tree \
and reconciles the results with a sorted allow-list of known failures. New failures, allow-listed \
scripts that now pass, and allow-list entries for missing files all fail the run.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint all shell scripts and check them against the allow-list
    Verify {
        /// Repository root to verify
        #[arg(default_value = ".", value_name = "PATH")]
        path: PathBuf,

        /// Number of scripts to lint concurrently
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        jobs: u16,

        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Inspect how ShellCheck would be provided
    Tools {
        #[command(subcommand)]
        command: ToolsCommand,
    },
}

#[derive(Subcommand)]
pub enum ToolsCommand {
    /// Show which ShellCheck source a verify run would use
    Status {
        /// Repository root whose configuration applies
        #[arg(default_value = ".", value_name = "PATH")]
        path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verify_defaults() {
        let cli = Cli::try_parse_from(["shellcheck-gate", "verify"]).unwrap();
        match cli.command {
            Commands::Verify { path, jobs, format } => {
                assert_eq!(path, PathBuf::from("."));
                assert_eq!(jobs, 1);
                assert_eq!(format, OutputFormat::Human);
            }
            _ => panic!("expected verify"),
        }
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "shellcheck-gate",
            "tools",
            "status",
            "repo",
            "--format",
            "json",
            "-vv",
            "-c",
            "gate.toml",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("gate.toml")));
        match cli.command {
            Commands::Tools {
                command: ToolsCommand::Status { path, format },
            } => {
                assert_eq!(path, PathBuf::from("repo"));
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected tools status"),
        }
    }

    #[test]
    fn test_zero_jobs_is_rejected() {
        assert!(Cli::try_parse_from(["shellcheck-gate", "verify", "--jobs", "0"]).is_err());
    }
}
