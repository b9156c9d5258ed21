//! # Tool Management Module
//!
//! Detection, download and sandboxing of the pinned ShellCheck release, and
//! the choice between them.

pub mod detector;
#[cfg(all(test, unix))]
pub(crate) mod fake_runtime;
pub mod installer;
pub mod sandbox;
pub mod status;
pub mod strategy;

pub use detector::{InstallationSource, ToolDetector, ToolStatus};
pub use installer::{Platform, ToolInstaller};
pub use sandbox::{CleanupRegistry, Container, Sandbox};
pub use status::{ToolStatusReport, ToolStatusReporter};
pub use strategy::{
    select_source, ExecutionStrategy, LocalTool, ToolFacts, SystemProbe, ToolProbe, ToolSource,
};
