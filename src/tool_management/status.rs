use crate::config::Config;
use crate::tool_management::installer::{Platform, ToolInstaller};
use crate::tool_management::strategy::{
    select_source, ToolFacts, SystemProbe, ToolProbe, ToolSource,
};
use crate::tool_management::{InstallationSource, ToolStatus};
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Handles reporting and display of tool status information
#[derive(Default)]
pub struct ToolStatusReporter {
    installer: ToolInstaller,
}

impl ToolStatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_installer(installer: ToolInstaller) -> Self {
        Self { installer }
    }

    /// Describe what a `verify` run would use, without creating or downloading anything
    pub fn generate_report(&self, config: &Config) -> ToolStatusReport {
        self.generate_report_with(&SystemProbe::new(), config)
    }

    /// Each fact is gathered once; the selection is made from the same answers
    /// the report shows
    pub fn generate_report_with(&self, probe: &impl ToolProbe, config: &Config) -> ToolStatusReport {
        let facts = ToolFacts::capture(probe, config);
        let (selected, unavailable_reason) = match select_source(&facts, config) {
            Ok(source) => (Some(source), None),
            Err(e) => (None, Some(e.to_string())),
        };

        ToolStatusReport {
            tool: config.tool.name.clone(),
            required_version: config.tool.version.clone(),
            host: facts.host,
            runtime: config.sandbox.runtime.clone(),
            runtime_reachable: facts.runtime_reachable,
            image: config.tool.image.clone(),
            platform: facts.platform,
            cached_download: self.installer.cached_binary(&config.tool),
            selected,
            unavailable_reason,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolStatusReport {
    pub tool: String,
    pub required_version: String,
    pub host: ToolStatus,
    pub runtime: String,
    pub runtime_reachable: bool,
    pub image: String,
    pub platform: Option<Platform>,
    pub cached_download: Option<PathBuf>,
    pub selected: Option<ToolSource>,
    pub unavailable_reason: Option<String>,
}

impl ToolStatusReport {
    /// Print a formatted report to the console
    pub fn print_console_report(&self) -> io::Result<()> {
        self.write_console_report(&mut io::stdout().lock())
    }

    pub fn write_console_report(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "\n🔧 Tool Status Report")?;
        writeln!(out, "{}", "=".repeat(50))?;
        writeln!(out, "Required: {} {}", self.tool, self.required_version)?;

        write!(out, "\n  • host binary: ")?;
        match (&self.host.installation_source, &self.host.version) {
            (InstallationSource::NotFound, _) | (_, None) => {
                writeln!(out, "{}", "not found".dimmed())?
            }
            (_, Some(version)) => {
                let label = format!("v{}", version);
                if self.host.matches_version(&self.required_version) {
                    write!(out, "{}", label.green())?;
                } else {
                    write!(out, "{} (need v{})", label.yellow(), self.required_version)?;
                }
                if let Some(ref path) = self.host.path {
                    write!(out, " at {}", path.display())?;
                }
                writeln!(out)?;
            }
        }

        let reachable = if self.runtime_reachable {
            "reachable".green()
        } else {
            "unreachable".dimmed()
        };
        writeln!(out, "  • {} runtime: {} ({})", self.runtime, reachable, self.image)?;

        match self.platform {
            Some(platform) => writeln!(out, "  • release platform: {}", platform)?,
            None => writeln!(out, "  • release platform: {}", "unsupported".dimmed())?,
        }
        match self.cached_download {
            Some(ref path) => writeln!(out, "  • cached download: {}", path.display())?,
            None => writeln!(out, "  • cached download: {}", "none".dimmed())?,
        }

        match (&self.selected, &self.unavailable_reason) {
            (Some(source), _) => writeln!(out, "\n✅ verify would use the {}", source)?,
            (None, Some(reason)) => writeln!(out, "\n❌ {}", reason.red())?,
            (None, None) => {}
        }
        writeln!(out)
    }
}
