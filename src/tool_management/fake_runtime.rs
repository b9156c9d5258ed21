//! A stand-in container runtime for tests: a shell script that logs every
//! call and tracks which containers exist as marker files.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const SCRIPT: &str = r#"#!/bin/sh
state="$(dirname "$0")"
echo "$*" >> "$state/calls.log"
case "$1" in
  run)
    sleep "$(cat "$state/run_delay")"
    prev=""
    for arg; do
      [ "$prev" = "--name" ] && name="$arg"
      prev="$arg"
    done
    touch "$state/alive-$name"
    echo "0123456789abcdef"
    ;;
  exec)
    if [ ! -e "$state/alive-$4" ]; then
      echo "Error: No such container: $4" >&2
      exit 1
    fi
    for last; do :; done
    if grep -q BAD "$last"; then
      echo "In $last line 1:"
      echo "SC2086: Double quote to prevent globbing and word splitting."
      exit 1
    fi
    ;;
  rm)
    rm -f "$state/alive-$3"
    ;;
esac
exit 0
"#;

pub struct FakeRuntime {
    dir: TempDir,
}

impl FakeRuntime {
    /// `run_delay` is how long, in whole seconds, `run` takes to return
    pub fn new(run_delay: u32) -> Self {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("runtime");
        fs::write(&script, SCRIPT).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(dir.path().join("run_delay"), run_delay.to_string()).unwrap();
        fs::create_dir_all(dir.path().join("repo")).unwrap();
        Self { dir }
    }

    /// Value for `[sandbox] runtime`
    pub fn runtime(&self) -> String {
        self.dir.path().join("runtime").to_string_lossy().into_owned()
    }

    /// An empty directory to mount as the repository root
    pub fn repo(&self) -> PathBuf {
        self.dir.path().join("repo")
    }

    pub fn write_script(&self, relative: &str, content: &str) {
        fs::write(self.repo().join(relative), content).unwrap();
    }

    /// Every invocation, one argv per line
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn calls_starting_with(&self, verb: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split(' ').next() == Some(verb))
            .collect()
    }

    pub fn is_alive(&self, name: &str) -> bool {
        self.dir.path().join(format!("alive-{name}")).exists()
    }

    pub fn alive_count(&self) -> usize {
        fs::read_dir(self.dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("alive-"))
            .count()
    }

    /// Block until `run` has been invoked
    pub fn wait_for_run(&self) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while self.calls_starting_with("run").is_empty() {
            assert!(Instant::now() < deadline, "runtime was never asked to run");
            thread::sleep(Duration::from_millis(20));
        }
    }
}
