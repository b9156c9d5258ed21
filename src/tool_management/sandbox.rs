//! Long-lived ShellCheck container reused for every script in a run.
//!
//! The container handle is registered for teardown before the runtime is
//! asked to start it. Removal happens once no matter whether it is triggered
//! by drop, by the interrupt handler, or by both. A removal that lands while
//! the runtime is still starting the container is repeated once the start
//! returns, so a late-appearing container is not left running.

use crate::common::command_utils::execute_in;
use crate::config::{SandboxConfig, ToolConfig};
use crate::error::{Result, VerifyError};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::{Arc, Weak};

/// Keeps the container alive without doing any work
const KEEP_ALIVE: &str = "trap 'exit' TERM; while sleep 1; do :; done";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerState {
    /// `run` has not returned yet
    Starting,
    Running,
    Removed,
}

/// A named container that is force-removed exactly once
#[derive(Debug)]
pub struct Container {
    runtime: String,
    name: String,
    state: Mutex<ContainerState>,
}

impl Container {
    fn new(runtime: &str) -> Self {
        Self {
            runtime: runtime.to_string(),
            name: format!("shellcheck-gate-{}", uuid::Uuid::new_v4().simple()),
            state: Mutex::new(ContainerState::Starting),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Force-remove the container; later calls are no-ops
    pub fn remove(&self) {
        {
            let mut state = self.state.lock();
            if *state == ContainerState::Removed {
                return;
            }
            *state = ContainerState::Removed;
        }
        self.force_remove();
    }

    /// Record that `run` returned successfully. Returns false when a removal
    /// already happened during the start, in which case the container is
    /// removed again now that it exists.
    fn mark_started(&self) -> bool {
        {
            let mut state = self.state.lock();
            if *state == ContainerState::Starting {
                *state = ContainerState::Running;
                return true;
            }
        }
        debug!("Sandbox {} was torn down while starting", self.name);
        self.force_remove();
        false
    }

    fn force_remove(&self) {
        debug!("Removing sandbox container {}", self.name);
        let status = Command::new(&self.runtime)
            .args(["rm", "-f", self.name.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(s) if s.success() => info!("Removed sandbox container {}", self.name),
            Ok(s) => debug!("{} rm -f {} exited with {}", self.runtime, self.name, s),
            Err(e) => warn!("Failed to remove sandbox container {}: {}", self.name, e),
        }
    }

    pub fn is_removed(&self) -> bool {
        *self.state.lock() == ContainerState::Removed
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Teardowns that must run before the process exits, even on interrupt
#[derive(Debug, Clone, Default)]
pub struct CleanupRegistry {
    containers: Arc<Mutex<Vec<Weak<Container>>>>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, container: &Arc<Container>) {
        self.containers.lock().push(Arc::downgrade(container));
    }

    /// Remove every container still alive and return how many there were
    pub fn run_all(&self) -> usize {
        let pending: Vec<Weak<Container>> = self.containers.lock().drain(..).collect();
        let live: Vec<Arc<Container>> = pending.iter().filter_map(Weak::upgrade).collect();
        for container in &live {
            container.remove();
        }
        live.len()
    }
}

/// A running container with the repository mounted read-only at its host path
#[derive(Debug)]
pub struct Sandbox {
    container: Arc<Container>,
    runtime: String,
    tool: String,
    root: PathBuf,
}

impl Sandbox {
    /// Start the sandbox. `root` must be absolute.
    pub fn create(
        sandbox: &SandboxConfig,
        tool: &ToolConfig,
        root: &Path,
        cleanup: &CleanupRegistry,
    ) -> Result<Self> {
        let container = Arc::new(Container::new(&sandbox.runtime));
        cleanup.register(&container);

        let root_arg = root.to_string_lossy().into_owned();
        let mount = format!("{root_arg}:{root_arg}:ro");
        info!(
            "🐳 Starting sandbox {} from {}",
            container.name(),
            tool.image
        );

        let failed = |reason: String| VerifyError::SandboxCreation {
            image: tool.image.clone(),
            reason,
        };
        let output = execute_in(
            root,
            &sandbox.runtime,
            &[
                "run",
                "--rm",
                "--detach",
                "--volume",
                mount.as_str(),
                "--workdir",
                root_arg.as_str(),
                "--name",
                container.name(),
                "--entrypoint",
                "/bin/sh",
                tool.image.as_str(),
                "-c",
                KEEP_ALIVE,
            ],
        )
        .map_err(|e| failed(e.to_string()))?;

        if !output.status.success() {
            return Err(failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        if !container.mark_started() {
            return Err(failed("interrupted while the container was starting".to_string()));
        }

        Ok(Self {
            container,
            runtime: sandbox.runtime.clone(),
            tool: tool.name.clone(),
            root: root.to_path_buf(),
        })
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Run the tool inside the container against one repository-relative path
    pub fn exec(&self, args: &[String], script: &str) -> std::io::Result<Output> {
        let root_arg = self.root.to_string_lossy().into_owned();
        Command::new(&self.runtime)
            .args([
                "exec",
                "--workdir",
                root_arg.as_str(),
                self.container.name(),
                self.tool.as_str(),
            ])
            .args(args)
            .arg(script)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_removal_happens_once() {
        let container = Arc::new(Container::new("definitely-not-a-runtime-xyz"));
        let registry = CleanupRegistry::new();
        registry.register(&container);

        assert!(!container.is_removed());
        assert_eq!(registry.run_all(), 1);
        assert!(container.is_removed());

        // Second trigger is a no-op and the registry is drained
        container.remove();
        assert_eq!(registry.run_all(), 0);
        assert!(container.is_removed());
        assert!(registry.containers.lock().is_empty());
    }

    #[test]
    fn test_registry_skips_dropped_containers() {
        let registry = CleanupRegistry::new();
        {
            let container = Arc::new(Container::new("definitely-not-a-runtime-xyz"));
            registry.register(&container);
        }
        assert_eq!(registry.run_all(), 0);
        assert!(registry.containers.lock().is_empty());
    }

    #[test]
    fn test_container_names_are_unique() {
        let a = Container::new("docker");
        let b = Container::new("docker");
        assert_ne!(a.name(), b.name());
        assert!(a.name().starts_with("shellcheck-gate-"));
        // Never asked the runtime to start these
        *a.state.lock() = ContainerState::Removed;
        *b.state.lock() = ContainerState::Removed;
    }

    #[test]
    fn test_failed_start_is_fatal_and_cleans_up() {
        let registry = CleanupRegistry::new();
        let sandbox = SandboxConfig {
            runtime: "definitely-not-a-runtime-xyz".to_string(),
        };
        let err = Sandbox::create(
            &sandbox,
            &ToolConfig::default(),
            &std::env::temp_dir(),
            &registry,
        )
        .unwrap_err();

        assert!(matches!(err, VerifyError::SandboxCreation { .. }));
        // The handle was dropped on the error path, so nothing is left to clean
        assert!(
            registry
                .containers
                .lock()
                .iter()
                .all(|c| c.upgrade().is_none())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_sandbox_lifecycle_removes_container_once() {
        use crate::tool_management::fake_runtime::FakeRuntime;

        let fake = FakeRuntime::new(0);
        fake.write_script("a.sh", "echo ok\n");
        let registry = CleanupRegistry::new();
        let config = SandboxConfig {
            runtime: fake.runtime(),
        };

        let sandbox = Sandbox::create(&config, &ToolConfig::default(), &fake.repo(), &registry).unwrap();
        let name = sandbox.container().name().to_string();
        assert!(fake.is_alive(&name));

        let output = sandbox.exec(&["--external-sources".to_string()], "a.sh").unwrap();
        assert!(output.status.success());

        drop(sandbox);
        registry.run_all();

        assert!(!fake.is_alive(&name));
        assert_eq!(fake.calls_starting_with("rm"), vec![format!("rm -f {name}")]);
        let verbs: Vec<String> = fake
            .calls()
            .iter()
            .map(|c| c.split(' ').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(verbs, vec!["run", "exec", "rm"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_interrupt_during_start_removes_late_container() {
        use crate::tool_management::fake_runtime::FakeRuntime;
        use std::thread;

        let fake = FakeRuntime::new(2);
        let registry = CleanupRegistry::new();
        let config = SandboxConfig {
            runtime: fake.runtime(),
        };

        let starting = {
            let registry = registry.clone();
            let root = fake.repo();
            thread::spawn(move || {
                Sandbox::create(&config, &ToolConfig::default(), &root, &registry).map(|s| {
                    // Leak the handle the way process::exit would
                    std::mem::forget(s);
                })
            })
        };

        fake.wait_for_run();
        assert_eq!(registry.run_all(), 1);

        let result = starting.join().unwrap();
        assert!(matches!(result, Err(VerifyError::SandboxCreation { .. })));
        assert_eq!(fake.alive_count(), 0, "calls: {:?}", fake.calls());
        assert_eq!(fake.calls_starting_with("rm").len(), 2);
    }
}
