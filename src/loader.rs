//! Rule file loading and merging.
//!
//! Rule files are YAML with a single top-level `rules` list. Serde does the
//! schema work: unknown fields, wrong types, and missing required keys are
//! load errors naming the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::rules::{RuleSet, ScriptRule};

/// Top-level shape of a rules file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RulesFile {
    #[serde(default)]
    rules: Vec<ScriptRule>,
}

/// Load a single YAML rules file into a rule set.
pub fn load_rules_file(path: &Path) -> Result<RuleSet> {
    let text = fs::read_to_string(path).map_err(|source| Error::ReadRules {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Err(Error::EmptyRulesFile {
            path: path.to_path_buf(),
        });
    }
    let file: RulesFile = serde_yaml::from_str(&text).map_err(|source| Error::ParseRules {
        path: path.to_path_buf(),
        source,
    })?;
    let set = RuleSet::from_rules(file.rules)?;
    tracing::info!(file = %path.display(), rules = set.len(), "loaded scripting rules");
    Ok(set)
}

/// Load and merge several rules files, appending in argument order.
pub fn load_rule_files(paths: &[PathBuf]) -> Result<RuleSet> {
    let mut merged = RuleSet::new();
    for path in paths {
        merged.extend(load_rules_file(path)?);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_rules(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn loads_a_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rules(
            &dir,
            "rules.yaml",
            "rules:\n\
             \x20 - scenarios: [kernel.semaphore]\n\
             \x20   platforms: [native_sim]\n\
             \x20   pre_script: {path: pre.sh, timeout: 30}\n\
             \x20   comment: semaphore prep\n",
        );
        let set = load_rules_file(&path).unwrap();
        assert_eq!(set.len(), 1);
        let rule = &set.rules()[0];
        assert_eq!(rule.scenarios, vec!["kernel.semaphore"]);
        assert_eq!(rule.pre_script.as_ref().unwrap().timeout, Some(30));
        assert_eq!(rule.comment, "semaphore prep");
        assert!(!rule.override_script);
    }

    #[test]
    fn merges_files_in_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_rules(
            &dir,
            "first.yaml",
            "rules:\n  - {scenarios: [s1], platforms: [p1], pre_script: {path: a.sh}}\n",
        );
        let second = write_rules(
            &dir,
            "second.yaml",
            "rules:\n  - {scenarios: [s1], platforms: [p1], pre_script: {path: b.sh}}\n",
        );
        let set = load_rule_files(&[first, second]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.rules()[0].pre_script.as_ref().unwrap().path, "a.sh");
        assert_eq!(set.rules()[1].pre_script.as_ref().unwrap().path, "b.sh");
    }

    #[test]
    fn missing_file_fails_naming_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let err = load_rules_file(&path).unwrap_err();
        assert!(matches!(err, Error::ReadRules { .. }));
        assert!(err.to_string().contains("absent.yaml"));
    }

    #[test]
    fn empty_file_fails_naming_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rules(&dir, "empty.yaml", "\n");
        let err = load_rules_file(&path).unwrap_err();
        assert!(matches!(err, Error::EmptyRulesFile { .. }));
        assert!(err.to_string().contains("empty.yaml"));
    }

    #[test]
    fn unknown_fields_fail_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rules(
            &dir,
            "typo.yaml",
            "rules:\n  - {scenarios: [s1], platforms: [p1], pre_scrpit: {path: a.sh}}\n",
        );
        let err = load_rules_file(&path).unwrap_err();
        assert!(matches!(err, Error::ParseRules { .. }));
    }

    #[test]
    fn rule_binding_no_script_fails_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rules(
            &dir,
            "empty_rule.yaml",
            "rules:\n  - {scenarios: [s1], platforms: [p1]}\n",
        );
        let err = load_rules_file(&path).unwrap_err();
        assert!(matches!(err, Error::EmptyRule { .. }));
    }
}
