use anyhow::{bail, Result};
use clap::Parser;

mod cli;
mod conflicts;
mod error;
mod loader;
mod output;
mod resolve;
mod rules;

use cli::{CheckArgs, Command, ListArgs, ResolveArgs, RootArgs};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = RootArgs::parse();
    match args.command {
        Command::Resolve(args) => cmd_resolve(args),
        Command::Check(args) => cmd_check(args),
        Command::List(args) => cmd_list(args),
    }
}

fn cmd_resolve(args: ResolveArgs) -> Result<()> {
    let rules = loader::load_rule_files(&args.rules)?;
    if args.strict {
        conflicts::ensure_consistent(&rules)?;
    }
    let resolution = resolve::resolve(&rules, &args.scenario, &args.platform)?;

    if args.check_paths {
        if let Some(resolution) = &resolution {
            resolve::check_script_files(&resolution.scripts)?;
        }
    }

    if args.json {
        println!(
            "{}",
            output::resolve_json(&args.scenario, &args.platform, resolution.as_ref())?
        );
    } else {
        print!(
            "{}",
            output::resolve_text(&args.scenario, &args.platform, resolution.as_ref())
        );
    }
    Ok(())
}

fn cmd_check(args: CheckArgs) -> Result<()> {
    let rules = loader::load_rule_files(&args.rules)?;
    let conflicts = conflicts::validate_consistency(&rules);

    if args.json {
        println!("{}", output::check_json(&conflicts)?);
    } else {
        print!("{}", output::check_text(&conflicts));
    }

    if !conflicts.is_empty() {
        bail!("rule set has {} conflict(s)", conflicts.len());
    }
    Ok(())
}

fn cmd_list(args: ListArgs) -> Result<()> {
    let rules = loader::load_rule_files(&args.rules)?;
    if args.json {
        println!("{}", output::list_json(&rules)?);
    } else {
        print!("{}", output::list_text(&rules));
    }
    Ok(())
}
