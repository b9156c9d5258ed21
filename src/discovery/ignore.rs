use super::ScriptPath;
use crate::common::command_utils::execute_in;
use crate::error::{Result, VerifyError};
use log::debug;
use std::path::{Path, PathBuf};

/// Answers whether version control ignores a path
pub trait IgnoreOracle {
    fn is_ignored(&self, path: &ScriptPath) -> Result<bool>;
}

/// Asks `git check-ignore` about one file at a time
#[derive(Debug, Clone)]
pub struct GitIgnoreOracle {
    root: PathBuf,
}

impl GitIgnoreOracle {
    /// Fails with [`VerifyError::Discovery`] unless `root` is inside a git work tree
    pub fn new(root: &Path) -> Result<Self> {
        let output = execute_in(root, "git", &["rev-parse", "--is-inside-work-tree"]).map_err(
            |e| VerifyError::Discovery {
                root: root.to_path_buf(),
                reason: format!("failed to run git: {}", e),
            },
        )?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() || stdout.trim() != "true" {
            return Err(VerifyError::Discovery {
                root: root.to_path_buf(),
                reason: format!(
                    "not a git work tree: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

impl IgnoreOracle for GitIgnoreOracle {
    fn is_ignored(&self, path: &ScriptPath) -> Result<bool> {
        let output = execute_in(&self.root, "git", &["check-ignore", "-q", "--", path.as_str()])?;

        // 0: ignored, 1: not ignored, anything else is a fatal git error
        match output.status.code() {
            Some(0) => {
                debug!("{} is ignored by git", path);
                Ok(true)
            }
            Some(1) => Ok(false),
            _ => Err(VerifyError::Discovery {
                root: self.root.clone(),
                reason: format!(
                    "git check-ignore failed for {}: {}",
                    path,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }),
        }
    }
}
