//! Scripting rule model and rule-set construction.
//!
//! Rules are parsed from YAML records, validated once, and read-only for the
//! rest of the process. The set never deduplicates: overlapping or duplicate
//! rules are surfaced by the consistency pass instead of being silently
//! arbitrated away.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single auxiliary script binding.
///
/// `timeout` is opaque configuration handed to whatever runs the script; the
/// resolver never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// The three script slots a rule may bind, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ScriptSlot {
    #[serde(rename = "pre_script")]
    Pre,
    #[serde(rename = "post_flash_script")]
    PostFlash,
    #[serde(rename = "post_script")]
    Post,
}

impl ScriptSlot {
    pub const ALL: [ScriptSlot; 3] = [ScriptSlot::Pre, ScriptSlot::PostFlash, ScriptSlot::Post];

    pub fn key(self) -> &'static str {
        match self {
            ScriptSlot::Pre => "pre_script",
            ScriptSlot::PostFlash => "post_flash_script",
            ScriptSlot::Post => "post_script",
        }
    }
}

impl fmt::Display for ScriptSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One scripting rule as written in a rules file.
///
/// Scenario patterns support a trailing `.*` wildcard; platform names are
/// always exact. A rule must bind at least one script slot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptRule {
    pub scenarios: Vec<String>,
    pub platforms: Vec<String>,
    #[serde(default)]
    pub override_script: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_script: Option<Script>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_flash_script: Option<Script>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_script: Option<Script>,
    #[serde(default)]
    pub comment: String,
}

impl ScriptRule {
    /// Reject rules that bind no script at all; always an authoring mistake.
    pub fn validate(&self) -> Result<()> {
        if ScriptSlot::ALL.iter().all(|slot| self.script(*slot).is_none()) {
            return Err(Error::EmptyRule {
                scenarios: self.scenarios.clone(),
            });
        }
        Ok(())
    }

    pub fn script(&self, slot: ScriptSlot) -> Option<&Script> {
        match slot {
            ScriptSlot::Pre => self.pre_script.as_ref(),
            ScriptSlot::PostFlash => self.post_flash_script.as_ref(),
            ScriptSlot::Post => self.post_script.as_ref(),
        }
    }

    /// Short one-line identification used when naming rules in diagnostics.
    pub(crate) fn summary(&self) -> String {
        let mut out = format!(
            "scenarios=[{}] platforms=[{}] override={}",
            self.scenarios.join(", "),
            self.platforms.join(", "),
            self.override_script
        );
        if !self.comment.is_empty() {
            out.push_str(&format!(" comment={:?}", self.comment));
        }
        out
    }
}

/// An ordered collection of scripting rules.
///
/// Order is load order and establishes tie-break priority among non-override
/// matches.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<ScriptRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from already-parsed records, validating each rule.
    pub fn from_rules(rules: Vec<ScriptRule>) -> Result<Self> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self { rules })
    }

    /// Append another set, preserving load order.
    pub fn extend(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }

    pub fn rules(&self) -> &[ScriptRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
