//! # Script Discovery
//!
//! Walks a repository and yields every shell script that should be linted:
//! the configured extensions, minus excluded prefixes, minus whatever git
//! ignores.

pub mod ignore;
pub mod rules;

pub use ignore::{GitIgnoreOracle, IgnoreOracle};
pub use rules::PathRules;

use crate::config::DiscoveryConfig;
use crate::error::Result;
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A script path relative to the repository root, always `/`-separated and
/// without a leading `./`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ScriptPath(String);

impl ScriptPath {
    pub fn new(raw: &str) -> Self {
        let mut normalized = raw.trim().replace('\\', "/");
        while let Some(rest) = normalized.strip_prefix("./") {
            normalized = rest.to_string();
        }
        Self(normalized)
    }

    /// Build from a path below `root`; `None` when `path` is outside it
    pub fn from_relative(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        let joined = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Some(Self::new(&joined))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_path(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }
}

impl fmt::Display for ScriptPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finds lintable scripts below a repository root
pub struct ScriptDiscoverer<O: IgnoreOracle> {
    root: PathBuf,
    extensions: Vec<String>,
    rules: PathRules,
    oracle: O,
}

impl<O: IgnoreOracle> ScriptDiscoverer<O> {
    pub fn new(root: &Path, config: &DiscoveryConfig, oracle: O) -> Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            extensions: config.extensions.clone(),
            rules: PathRules::new(&config.exclude, &config.include)?,
            oracle,
        })
    }

    /// Walk the tree. Order follows the walk (file names sorted per directory).
    pub fn discover(&self) -> Result<Vec<ScriptPath>> {
        let mut scripts = Vec::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                if entry.file_name() == ".git" {
                    return false;
                }
                match ScriptPath::from_relative(&self.root, entry.path()) {
                    Some(dir) if self.rules.prunes_dir(dir.as_str()) => {
                        debug!("Pruning excluded directory {}", dir);
                        false
                    }
                    _ => true,
                }
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable path: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.has_script_extension(entry.path()) {
                continue;
            }
            let Some(script) = ScriptPath::from_relative(&self.root, entry.path()) else {
                continue;
            };
            if !self.rules.is_eligible(script.as_str()) {
                continue;
            }
            if self.oracle.is_ignored(&script)? {
                continue;
            }
            scripts.push(script);
        }

        info!("Discovered {} shell scripts", scripts.len());
        Ok(scripts)
    }

    fn has_script_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }
}

/// Discover scripts in a git work tree using `git check-ignore`
pub fn discover_scripts(root: &Path, config: &DiscoveryConfig) -> Result<Vec<ScriptPath>> {
    let oracle = GitIgnoreOracle::new(root)?;
    ScriptDiscoverer::new(root, config, oracle)?.discover()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    struct FixedIgnores(HashSet<String>);

    impl IgnoreOracle for FixedIgnores {
        fn is_ignored(&self, path: &ScriptPath) -> Result<bool> {
            Ok(self.0.contains(path.as_str()))
        }
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "#!/usr/bin/env bash\n").unwrap();
    }

    #[test]
    fn test_script_path_normalization() {
        assert_eq!(ScriptPath::new("./hack/a.sh").as_str(), "hack/a.sh");
        assert_eq!(ScriptPath::new("././a.sh"), ScriptPath::new("a.sh"));
        assert_eq!(ScriptPath::new("hack\\a.sh").as_str(), "hack/a.sh");
        assert_eq!(ScriptPath::new(" a.sh ").to_string(), "a.sh");
    }

    #[test]
    fn test_discovery_applies_rules_and_ignores() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for file in [
            "build.sh",
            "notes.txt",
            "hack/lib/util.sh",
            "hack/_tmp/scratch.sh",
            "_output/bin/gen.sh",
            ".git/hooks/pre-commit.sh",
            "vendor/github.com/x/install.sh",
            "third_party/etcd/run.sh",
            "third_party/forked/shell2junit/sh2ju.sh",
            "generated/out.sh",
        ] {
            touch(root, file);
        }

        let ignores = FixedIgnores(HashSet::from(["generated/out.sh".to_string()]));
        let discoverer =
            ScriptDiscoverer::new(root, &DiscoveryConfig::default(), ignores).unwrap();
        let found: Vec<String> = discoverer
            .discover()
            .unwrap()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let expected: HashSet<&str> = HashSet::from([
            "build.sh",
            "hack/_tmp/scratch.sh",
            "hack/lib/util.sh",
            "third_party/forked/shell2junit/sh2ju.sh",
        ]);
        assert_eq!(found.len(), expected.len(), "found: {:?}", found);
        for script in &found {
            assert!(expected.contains(script.as_str()), "unexpected {}", script);
        }
    }

    #[test]
    fn test_discovery_honours_configured_extensions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.sh");
        touch(dir.path(), "b.bash");

        let config = DiscoveryConfig {
            extensions: vec!["sh".to_string(), "bash".to_string()],
            ..DiscoveryConfig::default()
        };
        let discoverer =
            ScriptDiscoverer::new(dir.path(), &config, FixedIgnores(HashSet::new())).unwrap();
        let found = discoverer.discover().unwrap();

        assert_eq!(found, vec![ScriptPath::new("a.sh"), ScriptPath::new("b.bash")]);
    }

    #[test]
    fn test_ignore_oracle_errors_abort_discovery() {
        struct Broken;
        impl IgnoreOracle for Broken {
            fn is_ignored(&self, _path: &ScriptPath) -> Result<bool> {
                Err(crate::error::VerifyError::Discovery {
                    root: PathBuf::from("."),
                    reason: "boom".to_string(),
                })
            }
        }

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.sh");
        let discoverer =
            ScriptDiscoverer::new(dir.path(), &DiscoveryConfig::default(), Broken).unwrap();
        assert!(discoverer.discover().is_err());
    }
}
