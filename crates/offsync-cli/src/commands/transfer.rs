//! Transfer command implementations
//!
//! `summon`, `push` and `revert` run the configured transfer program. With
//! `--dry-run=local` the assembled command is printed instead.

use std::path::{Path, PathBuf};

use colored::Colorize;
use offsync_core::{
    Direction, DryRun, Registry, Target, TransferOptions, TransferPlan, TransferReport,
};

use crate::cli::TransferArgs;
use crate::context::{Context, resolve};
use crate::error::{CliError, Result};

/// Run the summon command
///
/// The inclusion is validated up front but recorded only once the transfer
/// succeeded. The registry lock is not held while the transfer runs.
pub fn run_summon(ctx: &Context, path: &Path, args: &TransferArgs) -> Result<()> {
    let path = resolve(path)?;
    let registry = ctx.registry()?;

    let relative = registry.clone().include(&path)?;
    let (target, _) = registry.locate(&path)?;

    println!(
        "{} Summoning {} from {}",
        "=>".blue().bold(),
        relative.to_string().cyan(),
        target.source.cyan()
    );

    let options = ctx.transfer_options(args);
    if options.dry_run.is_none() {
        std::fs::create_dir_all(&path)?;
    }
    let report = transfer(ctx, target, &Direction::Summon(relative.clone()), &options)?;

    if options.dry_run.is_some() || !report.executed {
        return Ok(());
    }

    ctx.update(|registry| Ok(registry.include(&path)?))?;
    println!("{} Included {}.", "OK".green().bold(), relative.to_string().cyan());
    Ok(())
}

/// Run the push command
pub fn run_push(
    ctx: &Context,
    paths: &[PathBuf],
    invert: bool,
    diff: bool,
    args: &TransferArgs,
) -> Result<()> {
    let registry = ctx.registry()?;
    let mut options = ctx.transfer_options(args);
    if diff {
        options.dry_run = Some(DryRun::Tool);
        options.verbosity = 1;
    }

    let selected = if paths.is_empty() {
        vec![true; registry.targets().len()]
    } else {
        select(&registry, paths)?
    };

    let targets: Vec<&Target> = registry
        .targets()
        .iter()
        .zip(selected)
        .filter(|(_, chosen)| *chosen != invert)
        .map(|(target, _)| target)
        .collect();

    if targets.is_empty() {
        return Err(CliError::user("no targets selected"));
    }

    for target in targets {
        if options.verbosity > 0 {
            println!(
                "{} Pushing target {}",
                "=>".blue().bold(),
                target.root.display().to_string().cyan()
            );
        }
        transfer(ctx, target, &Direction::Push, &options)?;
    }
    Ok(())
}

/// Run the revert command
pub fn run_revert(ctx: &Context, paths: &[PathBuf], all: bool, args: &TransferArgs) -> Result<()> {
    if paths.is_empty() && !all {
        return Err(CliError::user("no target selected (did you mean --all?)"));
    }

    let registry = ctx.registry()?;
    let options = ctx.transfer_options(args);

    let selected = if paths.is_empty() {
        vec![true; registry.targets().len()]
    } else {
        select(&registry, paths)?
    };

    for (target, _) in registry
        .targets()
        .iter()
        .zip(selected)
        .filter(|(_, chosen)| *chosen)
    {
        if options.verbosity > 0 {
            println!(
                "{} Reverting target {}",
                "=>".blue().bold(),
                target.root.display().to_string().cyan()
            );
        }
        transfer(ctx, target, &Direction::Revert, &options)?;
    }
    Ok(())
}

/// Flags, parallel to `registry.targets()`, for the targets named by
/// `paths`. Every path must be a target root.
fn select(registry: &Registry, paths: &[PathBuf]) -> Result<Vec<bool>> {
    let mut selected = vec![false; registry.targets().len()];
    let mut unmatched = Vec::new();

    for path in paths {
        let root = resolve(path)?;
        match registry.targets().iter().position(|t| t.root == root) {
            Some(idx) => selected[idx] = true,
            None => unmatched.push(root),
        }
    }

    if !unmatched.is_empty() {
        let listed: Vec<String> = unmatched
            .iter()
            .map(|p| format!("  {}", p.display()))
            .collect();
        return Err(CliError::user(format!(
            "no matching target for paths:\n{}",
            listed.join("\n")
        )));
    }
    Ok(selected)
}

fn transfer(
    ctx: &Context,
    target: &Target,
    direction: &Direction,
    options: &TransferOptions,
) -> Result<TransferReport> {
    let settings = ctx.settings()?;
    let plan = TransferPlan::new(&settings.transfer, target, direction, options)?;
    let report = plan.run()?;

    if !report.executed {
        println!("{}", report.command_line());
        if ctx.verbosity > 0 {
            for rule in plan.rules().unwrap_or_default() {
                println!("  {}", rule.dimmed());
            }
        }
    }
    Ok(report)
}
