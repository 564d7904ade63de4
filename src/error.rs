//! Error types for rule loading, resolution, and validation.
//!
//! No-match is not represented here: a query with zero candidates resolves to
//! an explicit empty result, and only ambiguous or broken configuration is an
//! error.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::conflicts::Conflict;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rule loading, resolution, and validation.
#[derive(Error, Debug)]
pub enum Error {
    /// A rule record bound none of the three script slots.
    #[error(
        "rule for scenarios [{}] binds no script; \
         at least one of pre_script, post_flash_script, post_script is required",
        scenarios.join(", ")
    )]
    EmptyRule { scenarios: Vec<String> },

    /// More than one override rule matched a single (scenario, platform) query.
    #[error(
        "multiple override rules match scenario '{scenario}' on platform '{platform}': {}",
        rules.join("; ")
    )]
    OverrideConflict {
        scenario: String,
        platform: String,
        rules: Vec<String>,
    },

    /// Fail-fast wrapper over the consistency pass.
    #[error("rule set has {} conflict(s); run `sman check` for details", conflicts.len())]
    RuleConflicts { conflicts: Vec<Conflict> },

    /// A resolved script path does not exist on disk.
    #[error("{slot} script {} does not exist", path.display())]
    MissingScriptFile { slot: &'static str, path: PathBuf },

    #[error("read rules file {}", path.display())]
    ReadRules {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse rules file {}", path.display())]
    ParseRules {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A present-but-empty rules file is an authoring mistake, distinct from a
    /// file whose rules list is empty.
    #[error("rules file {} is empty", path.display())]
    EmptyRulesFile { path: PathBuf },
}
