//! Include, exclude and reset command implementations
//!
//! These only change the bookkeeping; `exclude --evict` additionally
//! deletes the local copy.

use std::path::Path;

use colored::Colorize;

use crate::cli::TransferArgs;
use crate::context::{Context, resolve};
use crate::error::Result;

/// Run the include command
pub fn run_include(ctx: &Context, path: &Path, args: &TransferArgs) -> Result<()> {
    let path = resolve(path)?;

    if args.dry_run.is_some() {
        let relative = ctx.registry()?.include(&path)?;
        println!(
            "{} Would include {} (dry run, nothing saved).",
            "=>".blue().bold(),
            relative.to_string().cyan()
        );
        return Ok(());
    }

    let relative = ctx.update(|registry| Ok(registry.include(&path)?))?;
    println!("{} Included {}.", "OK".green().bold(), relative.to_string().cyan());
    Ok(())
}

/// Run the exclude command
pub fn run_exclude(ctx: &Context, path: &Path, evict: bool) -> Result<()> {
    let path = resolve(path)?;
    let relative = ctx.update(|registry| Ok(registry.evict(&path)?))?;

    println!("{} Excluded {}.", "OK".green().bold(), relative.to_string().cyan());

    if evict {
        delete_local(&path)?;
        println!(
            "{} Deleted local copy {}.",
            "OK".green().bold(),
            path.display()
        );
    }
    Ok(())
}

/// Run the reset command
pub fn run_reset(ctx: &Context, path: &Path) -> Result<()> {
    let path = resolve(path)?;
    let relative = ctx.update(|registry| Ok(registry.revert(&path)?))?;

    println!(
        "{} {} no longer carries a mark.",
        "OK".green().bold(),
        relative.to_string().cyan()
    );
    Ok(())
}

fn delete_local(path: &Path) -> Result<()> {
    tracing::debug!(path = %path.display(), "deleting evicted local copy");
    if path.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
