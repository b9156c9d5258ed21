use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub tool: ToolConfig,
    pub discovery: DiscoveryConfig,
    pub sandbox: SandboxConfig,
}

/// The pinned lint tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolConfig {
    /// Executable name looked up on the host and inside the sandbox
    pub name: String,
    /// Exact version string the host binary must report
    pub version: String,
    /// Digest-pinned image used for the sandbox
    pub image: String,
    /// Base URL of the release downloads, without the version segment
    pub release_url: String,
    /// ShellCheck codes passed to `--exclude`
    pub disabled_rules: Vec<u32>,
}

/// Which files are linted and where the allow-list lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File extensions (without the dot) considered shell scripts
    pub extensions: Vec<String>,
    /// Path prefixes (glob components allowed), relative to the repository
    /// root, that are never linted
    pub exclude: Vec<String>,
    /// Prefixes that are linted even though an exclude prefix covers them
    pub include: Vec<String>,
    /// Allow-list file, relative to the repository root
    pub allow_list: PathBuf,
}

/// Container runtime used for the sandbox
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SandboxConfig {
    pub runtime: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            name: "shellcheck".to_string(),
            version: "0.7.2".to_string(),
            image: "docker.io/koalaman/shellcheck-alpine:v0.7.2@sha256:ce6fd9cc808a47d1d121ba92c203ecc02e8ed78e0e4c412f7fca54c2e954526d".to_string(),
            release_url: "https://github.com/koalaman/shellcheck/releases/download".to_string(),
            // 1090/1091: non-constant or unresolvable `source`
            // 2230: `which` is not the same as `command -v`
            disabled_rules: vec![1090, 1091, 2230],
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["sh".to_string()],
            exclude: vec![
                "_*".to_string(),
                ".git".to_string(),
                "vendor".to_string(),
                "third_party".to_string(),
            ],
            include: vec!["third_party/forked".to_string()],
            allow_list: PathBuf::from("hack/.shellcheck_failures"),
        }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            runtime: "docker".to_string(),
        }
    }
}
