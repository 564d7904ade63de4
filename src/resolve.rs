//! Scenario/platform resolution over a rule set.
//!
//! Resolution is a pure, synchronous computation: filter candidates, arbitrate
//! overrides, extract the bound scripts. No match is an explicit empty result,
//! never an error.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::rules::{RuleSet, Script, ScriptRule, ScriptSlot};

/// Resolved slot-to-script bindings, ordered canonically by slot.
pub type ScriptMap = BTreeMap<ScriptSlot, Script>;

/// Outcome of a successful resolution: the selected rule and its bound
/// scripts. Slots the rule leaves unbound are absent from the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub rule: &'a ScriptRule,
    pub scripts: ScriptMap,
}

/// Whether a scenario pattern matches an input scenario.
///
/// A trailing `.*` makes the pattern a dot-separated prefix match: `kernel.*`
/// matches `kernel` and `kernel.semaphore` but not `kernelish`. Any other
/// pattern must match exactly. Case-sensitive.
pub(crate) fn matches_scenario(pattern: &str, scenario: &str) -> bool {
    match pattern.strip_suffix(".*") {
        Some(base) => {
            scenario == base
                || scenario
                    .strip_prefix(base)
                    .is_some_and(|rest| rest.starts_with('.'))
        }
        None => pattern == scenario,
    }
}

/// Pick the single rule applying to `(scenario, platform)` and extract its
/// scripts.
///
/// Platform membership is exact; a rule becomes a candidate at most once even
/// if several of its scenario patterns match. Among candidates a single
/// override rule wins regardless of position, no override falls back to the
/// earliest-loaded candidate, and two or more overrides refuse to guess.
pub fn resolve<'a>(
    rules: &'a RuleSet,
    scenario: &str,
    platform: &str,
) -> Result<Option<Resolution<'a>>> {
    let candidates: Vec<&ScriptRule> = rules
        .rules()
        .iter()
        .filter(|rule| {
            rule.platforms.iter().any(|name| name == platform)
                && rule
                    .scenarios
                    .iter()
                    .any(|pattern| matches_scenario(pattern, scenario))
        })
        .collect();

    if candidates.is_empty() {
        tracing::debug!(scenario, platform, "no scripting rule matches");
        return Ok(None);
    }

    let overrides: Vec<&ScriptRule> = candidates
        .iter()
        .copied()
        .filter(|rule| rule.override_script)
        .collect();

    let selected = match overrides.as_slice() {
        [] => {
            tracing::warn!(
                scenario,
                platform,
                candidates = candidates.len(),
                "no override rule for key, selecting first match"
            );
            candidates[0]
        }
        [single] => *single,
        conflicting => {
            return Err(Error::OverrideConflict {
                scenario: scenario.to_string(),
                platform: platform.to_string(),
                rules: conflicting.iter().map(|rule| rule.summary()).collect(),
            });
        }
    };

    let mut scripts = ScriptMap::new();
    for slot in ScriptSlot::ALL {
        if let Some(script) = selected.script(slot) {
            if !script.path.is_empty() {
                scripts.insert(slot, script.clone());
            }
        }
    }

    tracing::debug!(
        scenario,
        platform,
        rule = %selected.summary(),
        scripts = scripts.len(),
        "selected scripting rule"
    );

    Ok(Some(Resolution {
        rule: selected,
        scripts,
    }))
}

/// Verify every resolved script path exists on disk.
///
/// This is a convenience for callers that want to fail before flashing
/// anything; it is not part of the resolution algorithm.
pub fn check_script_files(scripts: &ScriptMap) -> Result<()> {
    for (slot, script) in scripts {
        let path = Path::new(&script.path);
        if !path.is_file() {
            return Err(Error::MissingScriptFile {
                slot: slot.key(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}
