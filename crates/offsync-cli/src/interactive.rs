//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for terminal-based confirmation.

use colored::Colorize;
use dialoguer::Confirm;

use crate::error::{CliError, Result};

/// Ask before a destructive step; declining cancels the command.
pub fn confirm_or_cancel(prompt: &str, what: &str) -> Result<()> {
    let proceed = Confirm::new()
        .with_prompt(format!("{} {}", "!".yellow().bold(), prompt))
        .default(false)
        .interact()?;

    if proceed {
        Ok(())
    } else {
        Err(CliError::user(format!("{} cancelled by user.", what)))
    }
}
