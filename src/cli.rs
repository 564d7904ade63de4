//! CLI argument parsing for the scripting-rule resolver.
//!
//! The CLI is intentionally thin: it wires the load/resolve/check passes
//! without embedding policy, so the same core logic can be reused elsewhere.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
///
/// Keeping a single `RootArgs` type makes command routing obvious and avoids
/// hidden defaults in subcommand constructors.
#[derive(Parser, Debug)]
#[command(
    name = "sman",
    version,
    about = "Scripting-rule resolver for device test runs",
    after_help = "Commands:\n  resolve --rules <FILE> --scenario <S> --platform <P>  Resolve the scripts for one run\n  check --rules <FILE>                                  Detect conflicting rules\n  list --rules <FILE>                                   Print the loaded rules\n\nExamples:\n  sman resolve --rules scripting.yaml --scenario kernel.semaphore --platform frdm_k64f\n  sman resolve --rules base.yaml --rules board.yaml --scenario net.socket --platform qemu_x86 --json\n  sman check --rules scripting.yaml\n  sman list --rules scripting.yaml --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Resolve(ResolveArgs),
    Check(CheckArgs),
    List(ListArgs),
}

/// Resolve command inputs for a single (scenario, platform) query.
#[derive(Parser, Debug)]
#[command(about = "Resolve the scripts bound to a scenario/platform pair")]
pub struct ResolveArgs {
    /// Scripting rule files, merged in argument order
    #[arg(long = "rules", value_name = "FILE", required = true)]
    pub rules: Vec<PathBuf>,

    /// Scenario identifier, e.g. kernel.semaphore
    #[arg(long, value_name = "SCENARIO")]
    pub scenario: String,

    /// Platform the scenario runs on
    #[arg(long, value_name = "PLATFORM")]
    pub platform: String,

    /// Fail if any resolved script path does not exist
    #[arg(long)]
    pub check_paths: bool,

    /// Fail before resolving if the merged rule set has conflicts
    #[arg(long)]
    pub strict: bool,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Check command inputs for the full-set consistency pass.
#[derive(Parser, Debug)]
#[command(about = "Detect conflicting or ambiguous scripting rules")]
pub struct CheckArgs {
    /// Scripting rule files, merged in argument order
    #[arg(long = "rules", value_name = "FILE", required = true)]
    pub rules: Vec<PathBuf>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// List command inputs for printing the merged rule set.
#[derive(Parser, Debug)]
#[command(about = "Print every loaded scripting rule")]
pub struct ListArgs {
    /// Scripting rule files, merged in argument order
    #[arg(long = "rules", value_name = "FILE", required = true)]
    pub rules: Vec<PathBuf>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}
