//! Status command implementation

use std::path::Path;

use colored::Colorize;
use offsync_core::{Directive, Registry, Target};
use serde::Serialize;

use crate::context::Context;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct TargetStatus<'a> {
    source: &'a str,
    root: &'a Path,
    rules: Vec<String>,
}

/// Run the status command
pub fn run_status(ctx: &Context, json: bool) -> Result<()> {
    let registry = ctx.registry()?;

    if json {
        println!("{}", status_json(&registry)?);
        return Ok(());
    }

    if registry.targets().is_empty() {
        println!(
            "{} (use {} to create one)",
            "No targets".dimmed(),
            "offsync add".cyan()
        );
        return Ok(());
    }

    for target in registry.targets() {
        println!("{} => {}", target.source, display_root(target));
        for rule in rules(target)? {
            let styled = if rule.starts_with('+') {
                rule.green()
            } else {
                rule.red()
            };
            println!("  {}", styled);
        }
    }
    Ok(())
}

fn status_json(registry: &Registry) -> Result<String> {
    let statuses = registry
        .targets()
        .iter()
        .map(|target| {
            Ok(TargetStatus {
                source: &target.source,
                root: &target.root,
                rules: rules(target)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(serde_json::to_string_pretty(&statuses)?)
}

fn rules(target: &Target) -> Result<Vec<String>> {
    Ok(target
        .directives()?
        .iter()
        .map(Directive::to_string)
        .collect())
}

fn display_root(target: &Target) -> String {
    let root = target.root.display().to_string();
    if target.root.is_dir() && !root.ends_with('/') {
        format!("{}/", root)
    } else {
        root
    }
}
