//! Transfer invocation
//!
//! A [`TransferPlan`] is the complete command line for one run of the
//! rsync-compatible program, kept as data until [`TransferPlan::run`]
//! spawns it. Push and revert hand the target's rules to the program
//! through a temporary filter file; summon copies a single subtree and
//! needs no filter.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;

use tempfile::NamedTempFile;

use crate::settings::TransferSettings;
use crate::target::Target;
use crate::tree::TreePath;
use crate::{Directive, Error, Result};

/// Which way data flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Direction {
    /// Local root to source, propagating local deletions
    Push,
    /// Source to local root, discarding local changes
    Revert,
    /// Fetch one subtree from the source without touching existing files
    Summon(TreePath),
}

impl Direction {
    fn deletes(&self) -> bool {
        !matches!(self, Self::Summon(_))
    }
}

/// How a dry run is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DryRun {
    /// Print the command without running it
    #[default]
    Local,
    /// Run the program with its own `--dry-run`
    Tool,
}

impl FromStr for DryRun {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "tool" | "rsync" => Ok(Self::Tool),
            other => Err(format!(
                "unknown dry-run mode '{}', expected 'local' or 'tool'",
                other
            )),
        }
    }
}

impl fmt::Display for DryRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Tool => f.write_str("tool"),
        }
    }
}

/// Per-invocation knobs from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferOptions {
    pub verbosity: u8,
    pub dry_run: Option<DryRun>,
    /// Passed through verbatim after the filter argument
    pub extra_args: Vec<String>,
}

/// A fully assembled transfer command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    program: String,
    options: Vec<String>,
    rules: Option<Vec<String>>,
    trailing: Vec<String>,
    source: String,
    destination: String,
    dry_run: Option<DryRun>,
}

/// What happened when a plan was run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    /// The command line, program first
    pub command: Vec<String>,
    /// `false` for a local dry run
    pub executed: bool,
}

impl TransferReport {
    /// The command as a single shell-quoted line.
    pub fn command_line(&self) -> String {
        self.command
            .iter()
            .map(|arg| shell_quote(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl TransferPlan {
    pub fn new(
        settings: &TransferSettings,
        target: &Target,
        direction: &Direction,
        options: &TransferOptions,
    ) -> Result<Self> {
        let mut args = settings.base_options.clone();
        args.extend(settings.options.iter().cloned());
        if direction.deletes() {
            args.push("--delete".to_string());
        }
        if options.verbosity >= 1 {
            args.push("-v".to_string());
            args.push("--itemize-changes".to_string());
        }
        if options.verbosity <= 2 {
            args.push("--progress".to_string());
        }

        let mut trailing = options.extra_args.clone();
        let root = root_argument(&target.root);

        let (rules, source, destination) = match direction {
            Direction::Push => (Some(rendered_rules(target)?), root, target.source.clone()),
            Direction::Revert => (Some(rendered_rules(target)?), target.source.clone(), root),
            Direction::Summon(path) => {
                trailing.push("--ignore-existing".to_string());
                let source = format!("{}/{}/", target.source.trim_end_matches('/'), path);
                let destination = format!("{}/", target.root.join(path.to_string()).display());
                (None, source, destination)
            }
        };

        Ok(Self {
            program: settings.program.clone(),
            options: args,
            rules,
            trailing,
            source,
            destination,
            dry_run: options.dry_run,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Anchored filter lines, one per directive, or `None` for summon.
    pub fn rules(&self) -> Option<&[String]> {
        self.rules.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Arguments after the program name, given the filter file path.
    pub fn arguments(&self, filter_file: Option<&Path>) -> Vec<String> {
        let mut args = Vec::with_capacity(self.options.len() + self.trailing.len() + 5);
        if self.dry_run == Some(DryRun::Tool) {
            args.push("--dry-run".to_string());
        }
        args.extend(self.options.iter().cloned());
        if let Some(file) = filter_file {
            args.push("--filter".to_string());
            args.push(format!(". {}", file.display()));
        }
        args.extend(self.trailing.iter().cloned());
        args.push(self.source.clone());
        args.push(self.destination.clone());
        args
    }

    /// Write the rules to a temporary filter file, removed when dropped.
    pub fn write_filter_file(&self) -> Result<Option<NamedTempFile>> {
        let Some(rules) = &self.rules else {
            return Ok(None);
        };

        let mut file = tempfile::Builder::new()
            .prefix("offsync-")
            .suffix(".filter")
            .tempfile()?;
        for line in rules {
            writeln!(file, "{}", line)?;
        }
        file.flush()?;
        Ok(Some(file))
    }

    /// Run the program, or only report the command for a local dry run.
    ///
    /// # Errors
    ///
    /// `Io` when the program cannot be spawned, `TransferFailed` when it
    /// exits unsuccessfully.
    pub fn run(&self) -> Result<TransferReport> {
        let filter_file = self.write_filter_file()?;
        let args = self.arguments(filter_file.as_ref().map(NamedTempFile::path));

        let mut command = Vec::with_capacity(args.len() + 1);
        command.push(self.program.clone());
        command.extend(args.iter().cloned());

        if self.dry_run == Some(DryRun::Local) {
            tracing::debug!(program = %self.program, "dry run, not executing");
            return Ok(TransferReport {
                command,
                executed: false,
            });
        }

        tracing::debug!(
            program = %self.program,
            source = %self.source,
            destination = %self.destination,
            "running transfer"
        );
        let status = Command::new(&self.program).args(&args).status()?;
        if !status.success() {
            return Err(Error::TransferFailed {
                program: self.program.clone(),
                code: status.code(),
            });
        }

        Ok(TransferReport {
            command,
            executed: true,
        })
    }
}

fn rendered_rules(target: &Target) -> Result<Vec<String>> {
    Ok(target
        .filter_rules()?
        .iter()
        .map(Directive::anchored)
        .collect())
}

fn root_argument(root: &Path) -> String {
    let rendered = root.display().to_string();
    if root.is_dir() && !rendered.ends_with('/') {
        format!("{}/", rendered)
    } else {
        rendered
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
