//! Allow-list of scripts with known, accepted ShellCheck failures.
//!
//! The file holds one repository-relative path per line and must stay in
//! byte-wise (`LC_ALL=C`) sorted order without duplicates. An out-of-order
//! file is a hard error; it is never rewritten here.

use crate::discovery::ScriptPath;
use crate::error::{Result, VerifyError};
use log::{debug, info};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct AllowList {
    path: PathBuf,
    entries: BTreeSet<ScriptPath>,
}

impl AllowList {
    /// Load and validate the allow-list. A missing file is an empty list.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No allow-list at {}, treating as empty", path.display());
                String::new()
            }
            Err(e) => return Err(e.into()),
        };
        Self::parse(path, &content)
    }

    /// Validate `content` as the contents of the allow-list at `path`
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let lines: Vec<&str> = content
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .collect();

        let expected = canonical_order(&lines);
        if lines != expected {
            return Err(VerifyError::UnsortedAllowList {
                path: path.to_path_buf(),
                expected: expected.into_iter().map(str::to_string).collect(),
            });
        }

        let entries: BTreeSet<ScriptPath> = lines.iter().map(|l| ScriptPath::new(l)).collect();
        debug!("Loaded {} allow-list entries from {}", entries.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn contains(&self, script: &ScriptPath) -> bool {
        self.entries.contains(script)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ScriptPath> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Byte-wise sorted, de-duplicated copy of `lines`
pub fn canonical_order<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut sorted = lines.to_vec();
    // str ordering is byte-wise, matching `LC_ALL=C sort`
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}
