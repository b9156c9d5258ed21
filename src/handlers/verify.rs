use crate::{
    allowlist::AllowList,
    cli::OutputFormat,
    config::{self, Config},
    discovery::discover_scripts,
    error::VerifyError,
    lint::{classify, LintRunner},
    reporter::{Reporter, Verdict},
    tool_management::{CleanupRegistry, ExecutionStrategy},
};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments of a `verify` run
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub path: PathBuf,
    pub config: Option<PathBuf>,
    pub jobs: usize,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Resolve the repository root to an absolute path
pub fn resolve_root(path: &Path) -> crate::Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| VerifyError::Discovery {
        root: path.to_path_buf(),
        reason: e.to_string(),
    })
}

pub fn handle_verify(options: VerifyOptions, cleanup: &CleanupRegistry) -> crate::Result<Verdict> {
    let root = resolve_root(&options.path)?;
    let config = config::load_config(options.config.as_deref(), &root)?;
    verify_with_config(&root, &config, &options, cleanup)
}

fn verify_with_config(
    root: &Path,
    config: &Config,
    options: &VerifyOptions,
    cleanup: &CleanupRegistry,
) -> crate::Result<Verdict> {
    // Sort order is checked before any linting happens
    let allow_list = AllowList::load(&root.join(&config.discovery.allow_list))?;
    let scripts = discover_scripts(root, &config.discovery)?;

    let outcomes = {
        let strategy = ExecutionStrategy::provision(config, root, cleanup)?;
        info!(
            "🔍 Linting {} scripts with the {} ({} jobs)",
            scripts.len(),
            strategy.source_name(),
            options.jobs
        );
        LintRunner::new(&strategy)
            .with_jobs(options.jobs)
            .with_progress(!options.quiet && options.format == OutputFormat::Human)
            .run_all(&scripts)?
        // Sandbox, if any, is removed here
    };

    let problems = classify(&scripts, &allow_list, &outcomes);
    let verdict = Reporter::new(&config.discovery.allow_list, options.format)
        .report(&problems, scripts.len())?;
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(path: &Path) -> VerifyOptions {
        VerifyOptions {
            path: path.to_path_buf(),
            config: None,
            jobs: 1,
            format: OutputFormat::Json,
            quiet: true,
        }
    }

    #[test]
    fn test_missing_root_is_a_discovery_error() {
        let err = resolve_root(Path::new("/definitely/not/a/repo")).unwrap_err();
        assert!(matches!(err, VerifyError::Discovery { .. }));
    }

    #[test]
    fn test_unsorted_allow_list_fails_before_discovery() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("hack")).unwrap();
        fs::write(dir.path().join("hack/.shellcheck_failures"), "b.sh\na.sh\n").unwrap();

        // Not a git repository either; the allow-list error must win
        let err = handle_verify(options(dir.path()), &CleanupRegistry::new()).unwrap_err();
        match err {
            VerifyError::UnsortedAllowList { expected, .. } => {
                assert_eq!(expected, vec!["a.sh", "b.sh"]);
            }
            other => panic!("expected unsorted allow-list, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_local_config_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".shellcheck-gate.toml"), "[tool\n").unwrap();

        let err = handle_verify(options(dir.path()), &CleanupRegistry::new()).unwrap_err();
        assert!(matches!(err, VerifyError::Config(_)));
    }
}
