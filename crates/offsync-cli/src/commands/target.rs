//! Target management command implementations
//!
//! Adds, removes and re-points targets in targets.toml. None of these
//! transfer files.

use std::path::Path;

use colored::Colorize;
use offsync_core::Error;

use crate::context::{Context, resolve};
use crate::error::Result;
use crate::interactive;

/// Run the add command
pub fn run_add(ctx: &Context, source: &str, dest: &Path) -> Result<()> {
    let root = resolve(dest)?;
    let source = directory_source(source, &root);

    if !root.exists() {
        eprintln!(
            "{} {} does not exist yet",
            "warning:".yellow().bold(),
            root.display()
        );
    }

    ctx.update(|registry| {
        registry.add(source.clone(), root.clone())?;
        Ok(())
    })?;

    println!(
        "{} Target {} => {} added.",
        "OK".green().bold(),
        source.cyan(),
        root.display().to_string().cyan()
    );
    Ok(())
}

/// Run the remove command
pub fn run_remove(ctx: &Context, dest: &Path, yes: bool) -> Result<()> {
    let root = resolve(dest)?;

    if ctx.registry()?.get(&root).is_none() {
        return Err(Error::UnknownTarget { path: root }.into());
    }

    if !yes {
        interactive::confirm_or_cancel(
            &format!(
                "Forget all include/exclude decisions for {}?",
                root.display()
            ),
            "Remove",
        )?;
    }

    ctx.update(|registry| {
        registry.remove(&root)?;
        Ok(())
    })?;

    println!(
        "{} Target {} removed. Local files were left untouched.",
        "OK".green().bold(),
        root.display().to_string().cyan()
    );
    Ok(())
}

/// Run the set-source command
pub fn run_set_source(ctx: &Context, dest: &Path, source: &str) -> Result<()> {
    let root = resolve(dest)?;
    let source = directory_source(source, &root);

    ctx.update(|registry| Ok(registry.set_source(&root, source.clone())?))?;

    println!(
        "{} Source of {} is now {}.",
        "OK".green().bold(),
        root.display().to_string().cyan(),
        source.cyan()
    );
    Ok(())
}

/// A directory root needs the rsync "contents of" form of its source.
fn directory_source(source: &str, root: &Path) -> String {
    if root.is_dir() && !source.ends_with('/') {
        format!("{}/", source)
    } else {
        source.to_string()
    }
}
