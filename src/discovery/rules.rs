//! Prefix rules deciding which parts of the tree are linted.
//!
//! A rule is a `/`-separated path prefix whose components may contain glob
//! syntax. It covers a path when it matches the path itself or one of its
//! ancestor directories, so `vendor` covers `vendor/a/b.sh` and `_*` covers
//! `_output/x.sh` but not `hack/_tmp/x.sh`.

use crate::error::{ConfigError, Result};
use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One compiled prefix rule, kept per component
#[derive(Debug, Clone)]
struct PrefixRule {
    components: Vec<Pattern>,
}

impl PrefixRule {
    fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_start_matches("./").trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "empty prefix".to_string(),
            }
            .into());
        }
        let components = trimmed
            .split('/')
            .map(|c| {
                Pattern::new(c).map_err(|e| ConfigError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { components })
    }

    /// True when the rule matches `path` or one of its ancestors
    fn covers(&self, path: &[&str]) -> bool {
        if self.components.len() > path.len() {
            return false;
        }
        self.components
            .iter()
            .zip(path)
            .all(|(pattern, component)| component_matches(pattern, component))
    }

    /// True when some path below `dir` could be covered by this rule
    fn reaches_below(&self, dir: &[&str]) -> bool {
        if self.covers(dir) {
            return true;
        }
        self.components.len() > dir.len()
            && self
                .components
                .iter()
                .zip(dir)
                .all(|(pattern, component)| component_matches(pattern, component))
    }
}

fn component_matches(pattern: &Pattern, component: &str) -> bool {
    pattern.matches_with(component, MATCH_OPTIONS)
}

/// Exclusion prefixes plus the re-include prefixes that punch holes in them
#[derive(Debug, Clone)]
pub struct PathRules {
    exclude: Vec<PrefixRule>,
    include: Vec<PrefixRule>,
}

impl PathRules {
    pub fn new<S: AsRef<str>>(exclude: &[S], include: &[S]) -> Result<Self> {
        Ok(Self {
            exclude: exclude
                .iter()
                .map(|r| PrefixRule::new(r.as_ref()))
                .collect::<Result<_>>()?,
            include: include
                .iter()
                .map(|r| PrefixRule::new(r.as_ref()))
                .collect::<Result<_>>()?,
        })
    }

    /// Whether a repository-relative file path is eligible for linting
    pub fn is_eligible(&self, relative: &str) -> bool {
        let components: Vec<&str> = relative.split('/').collect();
        !self.exclude.iter().any(|r| r.covers(&components))
            || self.include.iter().any(|r| r.covers(&components))
    }

    /// Whether a directory can be skipped without missing an eligible file
    pub fn prunes_dir(&self, relative: &str) -> bool {
        let components: Vec<&str> = relative.split('/').collect();
        self.exclude.iter().any(|r| r.covers(&components))
            && !self.include.iter().any(|r| r.reaches_below(&components))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiscoveryConfig;

    fn default_rules() -> PathRules {
        let config = DiscoveryConfig::default();
        PathRules::new(&config.exclude, &config.include).unwrap()
    }

    #[test]
    fn test_default_exclusions() {
        let rules = default_rules();

        assert!(rules.is_eligible("hack/verify.sh"));
        assert!(rules.is_eligible("build.sh"));
        assert!(!rules.is_eligible("_output/bin/run.sh"));
        assert!(!rules.is_eligible(".git/hooks/pre-commit.sh"));
        assert!(!rules.is_eligible("vendor/github.com/x/y.sh"));
        assert!(!rules.is_eligible("third_party/etcd/install.sh"));
    }

    #[test]
    fn test_forked_third_party_is_linted() {
        let rules = default_rules();

        assert!(rules.is_eligible("third_party/forked/shell2junit/sh2ju.sh"));
        assert!(!rules.is_eligible("third_party/forkedish/x.sh"));
    }

    #[test]
    fn test_underscore_rule_only_applies_at_root() {
        let rules = default_rules();

        assert!(rules.is_eligible("hack/_tmp/x.sh"));
        assert!(!rules.is_eligible("_artifacts/x.sh"));
    }

    #[test]
    fn test_pruning_respects_includes() {
        let rules = default_rules();

        assert!(rules.prunes_dir("vendor"));
        assert!(rules.prunes_dir("_output"));
        assert!(rules.prunes_dir("third_party/etcd"));
        assert!(!rules.prunes_dir("third_party"));
        assert!(!rules.prunes_dir("third_party/forked"));
        assert!(!rules.prunes_dir("hack"));
    }

    #[test]
    fn test_glob_components() {
        let rules = PathRules::new(&["*/generated", "test?ata"], &[]).unwrap();

        assert!(!rules.is_eligible("api/generated/x.sh"));
        assert!(rules.is_eligible("api/v1/generated/x.sh"));
        assert!(rules.is_eligible("generated/x.sh"));
        assert!(!rules.is_eligible("testdata/x.sh"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(PathRules::new(&["[unclosed"], &[]).is_err());
        assert!(PathRules::new(&["./"], &[]).is_err());
    }
}
