use crate::common::command_utils::execute_in;
use crate::config::ToolConfig;
use crate::error::{Result, VerifyError};
use crate::tool_management::ToolDetector;
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// A platform ShellCheck publishes release binaries for, in release naming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub os: &'static str,
    pub arch: &'static str,
}

impl Platform {
    pub fn detect() -> Option<Self> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust's OS/arch names onto release archive names
    pub fn from_parts(os: &str, arch: &str) -> Option<Self> {
        let (os, arch) = match (os, arch) {
            ("linux", "x86_64") => ("linux", "x86_64"),
            ("linux", "aarch64") => ("linux", "aarch64"),
            ("linux", "arm") => ("linux", "armv6hf"),
            ("macos", "x86_64") => ("darwin", "x86_64"),
            _ => return None,
        };
        Some(Self { os, arch })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.os, self.arch)
    }
}

/// Release archive URL, e.g.
/// `<base>/v0.7.2/shellcheck-v0.7.2.linux.x86_64.tar.xz`
pub fn release_archive_url(tool: &ToolConfig, platform: Platform) -> String {
    format!(
        "{}/v{}/{}.{}.tar.xz",
        tool.release_url.trim_end_matches('/'),
        tool.version,
        release_dir_name(tool),
        platform
    )
}

/// Top-level directory inside the release archive
fn release_dir_name(tool: &ToolConfig) -> String {
    format!("{}-v{}", tool.name, tool.version)
}

/// Downloads the pinned release into the user cache
pub struct ToolInstaller {
    install_root: PathBuf,
    tool_detector: ToolDetector,
}

impl ToolInstaller {
    pub fn new() -> Self {
        let install_root = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shellcheck-gate");
        Self::with_install_root(install_root)
    }

    pub fn with_install_root(install_root: PathBuf) -> Self {
        Self {
            install_root,
            tool_detector: ToolDetector::new(),
        }
    }

    /// Where the pinned binary lives once installed
    pub fn binary_path(&self, tool: &ToolConfig) -> PathBuf {
        let file_name = if cfg!(windows) {
            format!("{}.exe", tool.name)
        } else {
            tool.name.clone()
        };
        self.install_root.join(release_dir_name(tool)).join(file_name)
    }

    /// The cached binary, if it is already installed at the pinned version
    pub fn cached_binary(&self, tool: &ToolConfig) -> Option<PathBuf> {
        let binary = self.binary_path(tool);
        self.tool_detector
            .detect_at(&binary)
            .matches_version(&tool.version)
            .then_some(binary)
    }

    /// Return a verified binary of the pinned version, downloading it if needed
    pub fn ensure_installed(&self, tool: &ToolConfig, platform: Platform) -> Result<PathBuf> {
        if let Some(binary) = self.cached_binary(tool) {
            info!("Using cached {} at {}", tool.name, binary.display());
            return Ok(binary);
        }

        fs::create_dir_all(&self.install_root)?;
        let url = release_archive_url(tool, platform);
        info!("📥 Downloading {} {} from {}", tool.name, tool.version, url);

        let mut archive = tempfile::Builder::new()
            .prefix("download-")
            .suffix(".tar.xz")
            .tempfile_in(&self.install_root)?;
        download(&url, archive.as_file_mut())?;

        let staging = tempfile::Builder::new()
            .prefix("extract-")
            .tempdir_in(&self.install_root)?;
        extract_tar_xz(archive.path(), staging.path())?;

        let extracted = staging.path().join(release_dir_name(tool));
        let target = self.install_root.join(release_dir_name(tool));
        if target.exists() {
            debug!("Replacing stale install at {}", target.display());
            fs::remove_dir_all(&target)?;
        }
        fs::rename(&extracted, &target).map_err(|e| {
            VerifyError::ToolUnavailable(format!(
                "release archive from {} did not contain {}: {}",
                url,
                release_dir_name(tool),
                e
            ))
        })?;

        match self.cached_binary(tool) {
            Some(binary) => {
                info!("✅ {} {} installed to {}", tool.name, tool.version, binary.display());
                Ok(binary)
            }
            None => {
                warn!("❌ Downloaded {} does not report version {}", tool.name, tool.version);
                Err(VerifyError::ToolUnavailable(format!(
                    "downloaded {} does not report version {}",
                    tool.name, tool.version
                )))
            }
        }
    }
}

impl Default for ToolInstaller {
    fn default() -> Self {
        Self::new()
    }
}

fn download(url: &str, destination: &mut fs::File) -> Result<()> {
    let failed = |e: reqwest::Error| VerifyError::ToolUnavailable(format!("download of {} failed: {}", url, e));

    let client = reqwest::blocking::Client::builder()
        .user_agent(format!("shellcheck-gate/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(failed)?;
    let mut response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(failed)?;
    let bytes = response.copy_to(destination).map_err(failed)?;
    debug!("Downloaded {} bytes from {}", bytes, url);
    Ok(())
}

fn extract_tar_xz(archive: &Path, destination: &Path) -> Result<()> {
    let archive_arg = archive.to_string_lossy().into_owned();
    let output = execute_in(destination, "tar", &["-xJf", archive_arg.as_str()])?;
    if !output.status.success() {
        return Err(VerifyError::ToolUnavailable(format!(
            "failed to extract {}: {}",
            archive.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}
