use super::LintOutcome;
use crate::allowlist::AllowList;
use crate::discovery::ScriptPath;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Everything a run found wrong with the tree or the allow-list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProblemSets {
    /// Failing scripts that are not allow-listed, with their diagnostics
    pub unexpected_failures: BTreeMap<ScriptPath, String>,
    /// Allow-listed scripts that now lint clean
    pub stale_passes: BTreeSet<ScriptPath>,
    /// Allow-list entries whose script no longer exists
    pub stale_entries: BTreeSet<ScriptPath>,
}

impl ProblemSets {
    pub fn is_clean(&self) -> bool {
        self.unexpected_failures.is_empty()
            && self.stale_passes.is_empty()
            && self.stale_entries.is_empty()
    }
}

/// Reconcile lint outcomes with the allow-list.
///
/// | outcome | allow-listed | result              |
/// |---------|--------------|---------------------|
/// | Failed  | no           | unexpected failure  |
/// | Failed  | yes          | accepted            |
/// | Clean   | yes          | stale pass          |
/// | Clean   | no           | accepted            |
///
/// Scripts without a recorded outcome are skipped.
pub fn classify(
    discovered: &[ScriptPath],
    allow_list: &AllowList,
    outcomes: &HashMap<ScriptPath, LintOutcome>,
) -> ProblemSets {
    let mut problems = ProblemSets::default();

    for script in discovered {
        let Some(outcome) = outcomes.get(script) else {
            continue;
        };
        match (outcome, allow_list.contains(script)) {
            (LintOutcome::Failed(diagnostic), false) => {
                problems
                    .unexpected_failures
                    .insert(script.clone(), diagnostic.clone());
            }
            (LintOutcome::Clean, true) => {
                problems.stale_passes.insert(script.clone());
            }
            (LintOutcome::Failed(_), true) | (LintOutcome::Clean, false) => {}
        }
    }

    let present: HashSet<&ScriptPath> = discovered.iter().collect();
    problems.stale_entries = allow_list
        .entries()
        .filter(|entry| !present.contains(entry))
        .cloned()
        .collect();

    problems
}
