//! Chooses, once per run, how ShellCheck is executed.
//!
//! Precedence: a host binary reporting the pinned version, then a sandbox
//! container, then a downloaded release. Once the sandbox path is chosen its
//! failure is final.

use crate::config::Config;
use crate::discovery::ScriptPath;
use crate::error::{Result, VerifyError};
use crate::lint::{LintOptions, LintOutcome, ScriptLinter};
use crate::tool_management::installer::{Platform, ToolInstaller};
use crate::tool_management::sandbox::{CleanupRegistry, Sandbox};
use crate::tool_management::{ToolDetector, ToolStatus};
use log::{debug, info};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Facts about the environment that drive the choice
pub trait ToolProbe {
    /// The host binary as found on `PATH`
    fn host_tool(&self, tool: &str) -> ToolStatus;
    fn runtime_reachable(&self, runtime: &str) -> bool;
    fn platform(&self) -> Option<Platform>;
}

/// Probes the real machine
#[derive(Debug, Default)]
pub struct SystemProbe {
    detector: ToolDetector,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ToolProbe for SystemProbe {
    fn host_tool(&self, tool: &str) -> ToolStatus {
        self.detector.detect_tool(tool)
    }

    fn runtime_reachable(&self, runtime: &str) -> bool {
        self.detector.runtime_reachable(runtime)
    }

    fn platform(&self) -> Option<Platform> {
        Platform::detect()
    }
}

/// Environment facts gathered once, so a report and the selection made from it
/// see the same facts
#[derive(Debug, Clone)]
pub struct ToolFacts {
    pub host: ToolStatus,
    pub runtime_reachable: bool,
    pub platform: Option<Platform>,
}

impl ToolFacts {
    pub fn capture(probe: &impl ToolProbe, config: &Config) -> Self {
        Self {
            host: probe.host_tool(&config.tool.name),
            runtime_reachable: probe.runtime_reachable(&config.sandbox.runtime),
            platform: probe.platform(),
        }
    }
}

impl ToolProbe for ToolFacts {
    fn host_tool(&self, _tool: &str) -> ToolStatus {
        self.host.clone()
    }

    fn runtime_reachable(&self, _runtime: &str) -> bool {
        self.runtime_reachable
    }

    fn platform(&self) -> Option<Platform> {
        self.platform
    }
}

/// Where the tool will come from, before anything is created or downloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToolSource {
    HostBinary,
    Sandbox,
    Download(Platform),
}

impl fmt::Display for ToolSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolSource::HostBinary => write!(f, "host binary"),
            ToolSource::Sandbox => write!(f, "sandbox container"),
            ToolSource::Download(platform) => write!(f, "downloaded release ({})", platform),
        }
    }
}

/// Apply the precedence rules without side effects
pub fn select_source(probe: &impl ToolProbe, config: &Config) -> Result<ToolSource> {
    let tool = &config.tool;

    match probe.host_tool(&tool.name).version {
        Some(version) if version == tool.version => {
            info!("Using host {} {}", tool.name, version);
            return Ok(ToolSource::HostBinary);
        }
        Some(version) => info!(
            "Host {} is version {}, need {}",
            tool.name, version, tool.version
        ),
        None => debug!("No host {} found", tool.name),
    }

    if probe.runtime_reachable(&config.sandbox.runtime) {
        info!("Using {} sandbox with {}", config.sandbox.runtime, tool.image);
        return Ok(ToolSource::Sandbox);
    }

    match probe.platform() {
        Some(platform) => {
            info!("Using downloaded {} {} for {}", tool.name, tool.version, platform);
            Ok(ToolSource::Download(platform))
        }
        None => Err(VerifyError::ToolUnavailable(format!(
            "{} {} is not installed, {} is not reachable, and no release is published for {}/{}",
            tool.name,
            tool.version,
            config.sandbox.runtime,
            std::env::consts::OS,
            std::env::consts::ARCH
        ))),
    }
}

/// A ShellCheck executable on this machine
#[derive(Debug, Clone)]
pub struct LocalTool {
    executable: PathBuf,
    root: PathBuf,
    args: Vec<String>,
}

impl LocalTool {
    pub fn new(executable: PathBuf, root: &Path, options: &LintOptions) -> Self {
        Self {
            executable,
            root: root.to_path_buf(),
            args: options.args(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

/// How ShellCheck runs for the rest of this invocation
#[derive(Debug)]
pub enum ExecutionStrategy {
    HostBinary(LocalTool),
    Sandbox { sandbox: Sandbox, args: Vec<String> },
    DownloadedBinary(LocalTool),
}

impl ExecutionStrategy {
    /// Select a source and create whatever it needs.
    ///
    /// `root` must be absolute; a sandbox is registered with `cleanup` before
    /// it is started.
    pub fn provision(config: &Config, root: &Path, cleanup: &CleanupRegistry) -> Result<Self> {
        Self::provision_with(&SystemProbe::new(), config, root, cleanup)
    }

    pub fn provision_with(
        probe: &impl ToolProbe,
        config: &Config,
        root: &Path,
        cleanup: &CleanupRegistry,
    ) -> Result<Self> {
        let options = LintOptions::from_config(&config.tool);

        match select_source(probe, config)? {
            ToolSource::HostBinary => Ok(ExecutionStrategy::HostBinary(LocalTool::new(
                PathBuf::from(&config.tool.name),
                root,
                &options,
            ))),
            ToolSource::Sandbox => Ok(ExecutionStrategy::Sandbox {
                sandbox: Sandbox::create(&config.sandbox, &config.tool, root, cleanup)?,
                args: options.args(),
            }),
            ToolSource::Download(platform) => {
                let executable = ToolInstaller::new().ensure_installed(&config.tool, platform)?;
                Ok(ExecutionStrategy::DownloadedBinary(LocalTool::new(
                    executable, root, &options,
                )))
            }
        }
    }

    pub fn source_name(&self) -> &'static str {
        match self {
            ExecutionStrategy::HostBinary(_) => "host binary",
            ExecutionStrategy::Sandbox { .. } => "sandbox container",
            ExecutionStrategy::DownloadedBinary(_) => "downloaded binary",
        }
    }
}

impl ScriptLinter for ExecutionStrategy {
    fn lint(&self, script: &ScriptPath) -> Result<LintOutcome> {
        let invocation_failed = |e: std::io::Error| VerifyError::ToolInvocation {
            path: script.to_string(),
            reason: e.to_string(),
        };

        let output = match self {
            ExecutionStrategy::HostBinary(tool) | ExecutionStrategy::DownloadedBinary(tool) => {
                debug!("Linting {} with {}", script, tool.executable.display());
                Command::new(&tool.executable)
                    .args(&tool.args)
                    .arg(script.as_str())
                    .current_dir(&tool.root)
                    .stdin(Stdio::null())
                    .output()
            }
            ExecutionStrategy::Sandbox { sandbox, args } => {
                if sandbox.container().is_removed() {
                    return Err(VerifyError::ToolInvocation {
                        path: script.to_string(),
                        reason: format!("sandbox {} was torn down", sandbox.container().name()),
                    });
                }
                debug!("Linting {} in {}", script, sandbox.container().name());
                sandbox.exec(args, script.as_str())
            }
        }
        .map_err(invocation_failed)?;

        Ok(LintOutcome::from_output(script, &output))
    }
}
