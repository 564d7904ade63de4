//! Rendering for resolutions, rule listings, and conflict reports.
//!
//! Text output is for terminals; `--json` output is stable and
//! machine-readable. Slot keys always appear in canonical order.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::conflicts::Conflict;
use crate::resolve::{Resolution, ScriptMap};
use crate::rules::{RuleSet, Script, ScriptRule, ScriptSlot};

#[derive(Serialize)]
struct ResolveReport<'a> {
    scenario: &'a str,
    platform: &'a str,
    matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<&'a ScriptRule>,
    scripts: &'a ScriptMap,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    conflicts: &'a [Conflict],
    count: usize,
}

#[derive(Serialize)]
struct ListReport<'a> {
    rules: &'a [ScriptRule],
    count: usize,
}

fn script_line(slot: ScriptSlot, script: &Script) -> String {
    match script.timeout {
        Some(timeout) => format!("{slot}: {} (timeout {timeout}s)", script.path),
        None => format!("{slot}: {}", script.path),
    }
}

pub fn resolve_json(
    scenario: &str,
    platform: &str,
    resolution: Option<&Resolution<'_>>,
) -> Result<String> {
    let empty = ScriptMap::new();
    let report = ResolveReport {
        scenario,
        platform,
        matched: resolution.is_some(),
        rule: resolution.map(|resolution| resolution.rule),
        scripts: resolution.map_or(&empty, |resolution| &resolution.scripts),
    };
    serde_json::to_string_pretty(&report).context("serialize resolve report")
}

pub fn resolve_text(scenario: &str, platform: &str, resolution: Option<&Resolution<'_>>) -> String {
    let Some(resolution) = resolution else {
        return format!("no scripting configured for '{scenario}' on '{platform}'\n");
    };
    let mut out = format!("selected rule: {}\n", resolution.rule.summary());
    for (slot, script) in &resolution.scripts {
        out.push_str(&format!("  {}\n", script_line(*slot, script)));
    }
    out
}

pub fn check_json(conflicts: &[Conflict]) -> Result<String> {
    let report = CheckReport {
        conflicts,
        count: conflicts.len(),
    };
    serde_json::to_string_pretty(&report).context("serialize check report")
}

pub fn check_text(conflicts: &[Conflict]) -> String {
    if conflicts.is_empty() {
        return "no conflicts found\n".to_string();
    }
    let mut out = String::new();
    for conflict in conflicts {
        out.push_str(&format!("conflict: {conflict}\n"));
    }
    out.push_str(&format!("{} conflict(s) found\n", conflicts.len()));
    out
}

pub fn list_json(rules: &RuleSet) -> Result<String> {
    let report = ListReport {
        rules: rules.rules(),
        count: rules.len(),
    };
    serde_json::to_string_pretty(&report).context("serialize rule listing")
}

pub fn list_text(rules: &RuleSet) -> String {
    if rules.is_empty() {
        return "no scripting rules loaded\n".to_string();
    }
    let mut out = String::new();
    for (index, rule) in rules.rules().iter().enumerate() {
        out.push_str(&format!("rule #{}\n", index + 1));
        out.push_str(&format!("  scenarios: {}\n", rule.scenarios.join(", ")));
        out.push_str(&format!("  platforms: {}\n", rule.platforms.join(", ")));
        out.push_str(&format!("  override: {}\n", rule.override_script));
        for slot in ScriptSlot::ALL {
            if let Some(script) = rule.script(slot) {
                out.push_str(&format!("  {}\n", script_line(slot, script)));
            }
        }
        if !rule.comment.is_empty() {
            out.push_str(&format!("  comment: {}\n", rule.comment));
        }
    }
    out
}
