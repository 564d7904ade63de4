//! Static consistency checks over a full rule set.
//!
//! These run independently of any query, typically right after load, to catch
//! authoring mistakes before they surface as runtime ambiguity. The pass only
//! reports; it never mutates the rule set.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::resolve::matches_scenario;
use crate::rules::{RuleSet, ScriptRule};

/// One structural conflict between two rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    /// A wildcard rule and an exact rule cover the same scenario on a shared
    /// platform and both set `override_script`.
    OverrideCollision {
        wildcard: String,
        scenario: String,
        platforms: Vec<String>,
        rules: [String; 2],
    },
    /// A wildcard rule and an exact rule cover the same scenario on a shared
    /// platform and neither sets `override_script`, so the winner would depend
    /// on load order.
    AmbiguousDefault {
        wildcard: String,
        scenario: String,
        platforms: Vec<String>,
        rules: [String; 2],
    },
    /// Two exact rules share a (scenario, platform) key but disagree on
    /// `override_script`.
    DisagreeingOverride {
        scenario: String,
        platform: String,
        rules: [String; 2],
    },
    /// Two exact non-override rules share a (scenario, platform) key.
    DuplicateDefault {
        scenario: String,
        platform: String,
        rules: [String; 2],
    },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::OverrideCollision {
                wildcard,
                scenario,
                platforms,
                rules,
            } => write!(
                f,
                "wildcard '{wildcard}' and exact '{scenario}' both set override_script \
                 on platform(s) [{}]: {} vs {}",
                platforms.join(", "),
                rules[0],
                rules[1]
            ),
            Conflict::AmbiguousDefault {
                wildcard,
                scenario,
                platforms,
                rules,
            } => write!(
                f,
                "wildcard '{wildcard}' and exact '{scenario}' both leave override_script \
                 unset on platform(s) [{}], selection would depend on load order: {} vs {}",
                platforms.join(", "),
                rules[0],
                rules[1]
            ),
            Conflict::DisagreeingOverride {
                scenario,
                platform,
                rules,
            } => write!(
                f,
                "rules for '{scenario}' on '{platform}' disagree on override_script: \
                 {} vs {}",
                rules[0], rules[1]
            ),
            Conflict::DuplicateDefault {
                scenario,
                platform,
                rules,
            } => write!(
                f,
                "duplicate non-override rules for '{scenario}' on '{platform}': {} vs {}",
                rules[0], rules[1]
            ),
        }
    }
}

/// Run every consistency check and collect the findings in rule order.
pub fn validate_consistency(rules: &RuleSet) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    wildcard_exact_conflicts(rules, &mut conflicts);
    duplicate_exact_conflicts(rules, &mut conflicts);
    conflicts
}

/// Fail-fast wrapper for callers that treat any conflict as fatal.
pub fn ensure_consistent(rules: &RuleSet) -> Result<()> {
    let conflicts = validate_consistency(rules);
    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(Error::RuleConflicts { conflicts })
    }
}

fn is_wildcard(pattern: &str) -> bool {
    pattern.ends_with(".*")
}

fn shared_platforms(a: &ScriptRule, b: &ScriptRule) -> Vec<String> {
    a.platforms
        .iter()
        .filter(|platform| b.platforms.contains(platform))
        .cloned()
        .collect()
}

/// Pair every wildcard pattern against every exact scenario it covers.
///
/// Wildcard non-override refined by an exact override is the one sanctioned
/// combination. An override wildcard shadowing a non-override exact rule stays
/// deterministic, so it is only logged.
fn wildcard_exact_conflicts(rules: &RuleSet, conflicts: &mut Vec<Conflict>) {
    let all = rules.rules();
    for (i, wild) in all.iter().enumerate() {
        for pattern in wild.scenarios.iter().filter(|p| is_wildcard(p)) {
            for (j, exact) in all.iter().enumerate() {
                if i == j {
                    continue;
                }
                let platforms = shared_platforms(wild, exact);
                if platforms.is_empty() {
                    continue;
                }
                for scenario in exact.scenarios.iter().filter(|s| !is_wildcard(s)) {
                    if !matches_scenario(pattern, scenario) {
                        continue;
                    }
                    let rules = [wild.summary(), exact.summary()];
                    if wild.override_script && exact.override_script {
                        conflicts.push(Conflict::OverrideCollision {
                            wildcard: pattern.clone(),
                            scenario: scenario.clone(),
                            platforms: platforms.clone(),
                            rules,
                        });
                    } else if !wild.override_script && !exact.override_script {
                        conflicts.push(Conflict::AmbiguousDefault {
                            wildcard: pattern.clone(),
                            scenario: scenario.clone(),
                            platforms: platforms.clone(),
                            rules,
                        });
                    } else if wild.override_script {
                        tracing::warn!(
                            wildcard = %pattern,
                            scenario = %scenario,
                            "override wildcard shadows a non-override exact rule"
                        );
                    }
                }
            }
        }
    }
}

/// Group exact (scenario, platform) keys and flag duplicates that either
/// disagree on `override_script` or both rely on load order.
fn duplicate_exact_conflicts(rules: &RuleSet, conflicts: &mut Vec<Conflict>) {
    let all = rules.rules();
    let mut by_key: BTreeMap<(&str, &str), Vec<usize>> = BTreeMap::new();
    for (idx, rule) in all.iter().enumerate() {
        for scenario in rule.scenarios.iter().filter(|s| !is_wildcard(s)) {
            for platform in &rule.platforms {
                let entry = by_key.entry((scenario.as_str(), platform.as_str())).or_default();
                if !entry.contains(&idx) {
                    entry.push(idx);
                }
            }
        }
    }

    for ((scenario, platform), indices) in by_key {
        for (pos, &a) in indices.iter().enumerate() {
            for &b in &indices[pos + 1..] {
                let (first, second) = (&all[a], &all[b]);
                let rules = [first.summary(), second.summary()];
                if first.override_script != second.override_script {
                    conflicts.push(Conflict::DisagreeingOverride {
                        scenario: scenario.to_string(),
                        platform: platform.to_string(),
                        rules,
                    });
                } else if !first.override_script {
                    conflicts.push(Conflict::DuplicateDefault {
                        scenario: scenario.to_string(),
                        platform: platform.to_string(),
                        rules,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Script;

    fn rule(scenarios: &[&str], platforms: &[&str], override_script: bool) -> ScriptRule {
        ScriptRule {
            scenarios: scenarios.iter().map(|s| s.to_string()).collect(),
            platforms: platforms.iter().map(|s| s.to_string()).collect(),
            override_script,
            pre_script: Some(Script {
                path: "a.sh".to_string(),
                timeout: None,
            }),
            post_flash_script: None,
            post_script: None,
            comment: String::new(),
        }
    }

    fn set(rules: Vec<ScriptRule>) -> RuleSet {
        RuleSet::from_rules(rules).unwrap()
    }

    #[test]
    fn override_wildcard_with_override_exact_is_flagged() {
        let rules = set(vec![
            rule(&["kernel.*"], &["p1"], true),
            rule(&["kernel.semaphore"], &["p1"], true),
        ]);
        let conflicts = validate_consistency(&rules);
        assert_eq!(conflicts.len(), 1);
        assert!(matches!(
            &conflicts[0],
            Conflict::OverrideCollision { wildcard, scenario, .. }
                if wildcard == "kernel.*" && scenario == "kernel.semaphore"
        ));
    }

    #[test]
    fn default_wildcard_with_default_exact_is_flagged() {
        let rules = set(vec![
            rule(&["kernel.*"], &["p1"], false),
            rule(&["kernel.semaphore"], &["p1"], false),
        ]);
        let conflicts = validate_consistency(&rules);
        assert_eq!(conflicts.len(), 1);
        assert!(matches!(&conflicts[0], Conflict::AmbiguousDefault { .. }));
    }

    #[test]
    fn default_wildcard_refined_by_override_exact_is_accepted() {
        let rules = set(vec![
            rule(&["kernel.*"], &["p1"], false),
            rule(&["kernel.semaphore"], &["p1"], true),
        ]);
        assert!(validate_consistency(&rules).is_empty());
        ensure_consistent(&rules).unwrap();
    }

    #[test]
    fn override_wildcard_over_default_exact_is_accepted() {
        // Deterministic (the wildcard wins everywhere), so not a conflict.
        let rules = set(vec![
            rule(&["kernel.*"], &["p1"], true),
            rule(&["kernel.semaphore"], &["p1"], false),
        ]);
        assert!(validate_consistency(&rules).is_empty());
    }

    #[test]
    fn wildcard_pairs_on_disjoint_platforms_are_accepted() {
        let rules = set(vec![
            rule(&["kernel.*"], &["p1"], true),
            rule(&["kernel.semaphore"], &["p2"], true),
        ]);
        assert!(validate_consistency(&rules).is_empty());
    }

    #[test]
    fn unrelated_wildcard_bases_are_accepted() {
        let rules = set(vec![
            rule(&["net.*"], &["p1"], true),
            rule(&["kernel.semaphore"], &["p1"], true),
        ]);
        assert!(validate_consistency(&rules).is_empty());
    }

    #[test]
    fn duplicate_exact_keys_with_disagreeing_flags_are_flagged() {
        let rules = set(vec![
            rule(&["s1"], &["p1"], true),
            rule(&["s1"], &["p1"], false),
        ]);
        let conflicts = validate_consistency(&rules);
        assert_eq!(conflicts.len(), 1);
        assert!(matches!(
            &conflicts[0],
            Conflict::DisagreeingOverride { scenario, platform, .. }
                if scenario == "s1" && platform == "p1"
        ));
    }

    #[test]
    fn duplicate_exact_non_override_keys_are_flagged() {
        let rules = set(vec![
            rule(&["s1"], &["p1"], false),
            rule(&["s1"], &["p1"], false),
        ]);
        let conflicts = validate_consistency(&rules);
        assert_eq!(conflicts.len(), 1);
        assert!(matches!(&conflicts[0], Conflict::DuplicateDefault { .. }));
    }

    #[test]
    fn duplicate_exact_override_keys_are_left_to_resolution() {
        // Two override rules for the same exact key fail at query time with an
        // override conflict; the static pass stays within its three checks.
        let rules = set(vec![
            rule(&["s1"], &["p1"], true),
            rule(&["s1"], &["p1"], true),
        ]);
        assert!(validate_consistency(&rules).is_empty());
        assert!(crate::resolve::resolve(&rules, "s1", "p1").is_err());
    }

    #[test]
    fn one_key_overlap_is_reported_once_per_pair() {
        // The same rule pair shares two platforms; the wildcard check reports
        // one conflict carrying both platforms.
        let rules = set(vec![
            rule(&["kernel.*"], &["p1", "p2"], true),
            rule(&["kernel.semaphore"], &["p2", "p1"], true),
        ]);
        let conflicts = validate_consistency(&rules);
        assert_eq!(conflicts.len(), 1);
        match &conflicts[0] {
            Conflict::OverrideCollision { platforms, .. } => {
                assert_eq!(platforms, &vec!["p1".to_string(), "p2".to_string()]);
            }
            other => panic!("unexpected conflict: {other}"),
        }
    }

    #[test]
    fn ensure_consistent_fails_with_the_collected_conflicts() {
        let rules = set(vec![
            rule(&["s1"], &["p1"], false),
            rule(&["s1"], &["p1"], false),
        ]);
        let err = ensure_consistent(&rules).unwrap_err();
        match err {
            Error::RuleConflicts { conflicts } => assert_eq!(conflicts.len(), 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn clean_rule_set_has_no_conflicts() {
        let rules = set(vec![
            rule(&["kernel.*"], &["p1"], false),
            rule(&["net.socket"], &["p1"], false),
            rule(&["kernel.semaphore"], &["p2"], false),
        ]);
        assert!(validate_consistency(&rules).is_empty());
    }
}
