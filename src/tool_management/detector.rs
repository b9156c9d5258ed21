use crate::common::command_utils::command_succeeds;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// `version: 0.7.2` line of `shellcheck --version`
static VERSION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^version:\s*(\S+)\s*$").expect("version regex is valid"));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolStatus {
    pub available: bool,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
    pub installation_source: InstallationSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum InstallationSource {
    /// Found on `PATH`
    SystemPath,
    /// Previously downloaded into the user cache
    Downloaded,
    NotFound,
}

impl ToolStatus {
    fn not_found() -> Self {
        Self {
            available: false,
            path: None,
            version: None,
            installation_source: InstallationSource::NotFound,
        }
    }

    /// True when the tool is present and reports exactly `required`
    pub fn matches_version(&self, required: &str) -> bool {
        self.available && self.version.as_deref() == Some(required)
    }
}

/// Probes the host for the lint tool and the container runtime
#[derive(Debug, Clone, Default)]
pub struct ToolDetector;

impl ToolDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect a tool by name on `PATH`
    pub fn detect_tool(&self, tool_name: &str) -> ToolStatus {
        debug!("Starting detection for {}", tool_name);

        match self.version_of(Path::new(tool_name)) {
            Some(version) => {
                let path = find_tool_path(tool_name).unwrap_or_else(|| PathBuf::from(tool_name));
                info!("Found {} at {:?} with version {}", tool_name, path, version);
                ToolStatus {
                    available: true,
                    path: Some(path),
                    version: Some(version),
                    installation_source: InstallationSource::SystemPath,
                }
            }
            None => {
                debug!("Tool {} not found in PATH", tool_name);
                ToolStatus::not_found()
            }
        }
    }

    /// Detect a tool at an explicit location, such as a cached download
    pub fn detect_at(&self, executable: &Path) -> ToolStatus {
        if !executable.is_file() {
            return ToolStatus::not_found();
        }
        match self.version_of(executable) {
            Some(version) => ToolStatus {
                available: true,
                path: Some(executable.to_path_buf()),
                version: Some(version),
                installation_source: InstallationSource::Downloaded,
            },
            None => ToolStatus::not_found(),
        }
    }

    /// Whether a container runtime answers `<runtime> info`
    pub fn runtime_reachable(&self, runtime: &str) -> bool {
        let reachable = command_succeeds(runtime, &["info"]);
        debug!("Container runtime {} reachable: {}", runtime, reachable);
        reachable
    }

    fn version_of(&self, executable: &Path) -> Option<String> {
        let output = Command::new(executable)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        parse_version_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the version from output like
/// `ShellCheck - shell script analysis tool\nversion: 0.7.2\n...`
pub fn parse_version_output(output: &str) -> Option<String> {
    VERSION_LINE
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Find the actual path of a tool using system commands
fn find_tool_path(tool_name: &str) -> Option<PathBuf> {
    let locator = if cfg!(windows) { "where" } else { "which" };
    let output = Command::new(locator).arg(tool_name).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .next()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}
