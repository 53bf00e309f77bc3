//! offsync CLI
//!
//! Keeps selected parts of a remote tree in a local directory and drives
//! rsync with filter rules generated from the include/exclude decisions.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use context::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        if e.is_fatal() {
            eprintln!("{}: {}", "fatal".red().bold(), e);
            eprintln!("The stored targets are inconsistent; please report this.");
            std::process::exit(2);
        }
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "offsync", &mut std::io::stdout());
            Ok(())
        }
        Some(cmd) => {
            let ctx = Context::new(cli.config_dir, cli.verbose)?;
            tracing::debug!(config_dir = %ctx.config().path().display(), ?cmd, "running command");
            execute_command(&ctx, cmd)
        }
        None => {
            // No command provided - show help hint
            println!("{} selective offline copies", "offsync".green().bold());
            println!();
            println!("Run {} for available commands.", "offsync --help".cyan());
            Ok(())
        }
    }
}

/// `RUST_LOG` applies by default; `-v` and `-vv` raise offsync's own
/// logging to debug and trace.
fn init_logging(verbosity: u8) -> Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("warn,offsync_cli=debug,offsync_core=debug,offsync_fs=debug"),
        _ => EnvFilter::new("warn,offsync_cli=trace,offsync_core=trace,offsync_fs=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()?;
    Ok(())
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Add { source, dest } => commands::run_add(ctx, &source, &dest),
        Commands::Remove { dest, yes } => commands::run_remove(ctx, &dest, yes),
        Commands::Include { path, transfer } => commands::run_include(ctx, &path, &transfer),
        Commands::Summon { path, transfer } => commands::run_summon(ctx, &path, &transfer),
        Commands::Exclude { path, evict } => commands::run_exclude(ctx, &path, evict),
        Commands::Reset { path } => commands::run_reset(ctx, &path),
        Commands::Push {
            targets,
            invert,
            diff,
            transfer,
        } => commands::run_push(ctx, &targets, invert, diff, &transfer),
        Commands::Revert {
            targets,
            all,
            transfer,
        } => commands::run_revert(ctx, &targets, all, &transfer),
        Commands::SetSource { dest, source } => commands::run_set_source(ctx, &dest, &source),
        Commands::Status { json } => commands::run_status(ctx, json),
        Commands::Completions { .. } => Ok(()),
    }
}
