//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;
use offsync_core::DryRun;

/// offsync - keep selected parts of a remote tree in a local directory
#[derive(Parser, Debug)]
#[command(name = "offsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (up to -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory holding config.toml and targets.toml
    #[arg(long, global = true, env = "OFFSYNC_CONFIG_DIR", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by commands that run the transfer program
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferArgs {
    /// Dry run. `local` prints the transfer command without running it,
    /// `tool` runs it with --dry-run
    #[arg(
        short = 'n',
        long = "dry-run",
        value_name = "MODE",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "local"
    )]
    pub dry_run: Option<DryRun>,

    /// Extra option for the transfer program, for this command only.
    /// Use --rsync=OPTION for options starting with `-`
    #[arg(long = "rsync", value_name = "OPTION", allow_hyphen_values = true)]
    pub rsync: Vec<String>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Add a new synchronization target
    ///
    /// A target pairs a remote SOURCE (rsync syntax such as `user@host:/path`)
    /// with a local DEST. Nothing is transferred: a new target starts with
    /// everything excluded; use `summon` to fetch parts of it.
    Add {
        /// Remote source of the target
        source: String,

        /// Local destination; must not be inside or contain another target
        dest: PathBuf,
    },

    /// Remove a target from the bookkeeping
    ///
    /// No files are deleted, but all include/exclude decisions are lost.
    Remove {
        /// Destination directory of the target
        dest: PathBuf,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Mark a path as included without transferring anything
    Include {
        /// Path inside a target
        path: PathBuf,

        #[command(flatten)]
        transfer: TransferArgs,
    },

    /// Fetch a path from the source and mark it as included
    ///
    /// Other parts of the target are left alone, existing local files are
    /// never overwritten, and the path is only marked after the transfer
    /// succeeded.
    Summon {
        /// Path inside a target
        path: PathBuf,

        #[command(flatten)]
        transfer: TransferArgs,
    },

    /// Exclude a path from synchronization
    Exclude {
        /// Path inside a target
        path: PathBuf,

        /// Delete the local copy after excluding it
        #[arg(long, alias = "delete")]
        evict: bool,
    },

    /// Drop the include or exclude mark on a path
    Reset {
        /// Path inside a target
        path: PathBuf,
    },

    /// Transfer targets to their source
    ///
    /// Runs with --delete, so local deletions propagate to the source.
    /// Exclude paths whose local deletion must not propagate.
    Push {
        /// Target destinations (default: all targets)
        #[arg(value_name = "PATH")]
        targets: Vec<PathBuf>,

        /// Push every target except the given ones
        #[arg(long = "not")]
        invert: bool,

        /// Show what would change on the source (tool dry run with -v)
        #[arg(long)]
        diff: bool,

        #[command(flatten)]
        transfer: TransferArgs,
    },

    /// Transfer targets from their source, discarding local changes
    ///
    /// Local contents that are not excluded are replaced or removed. Name
    /// the targets explicitly, or pass --all.
    Revert {
        /// Target destinations
        #[arg(value_name = "PATH")]
        targets: Vec<PathBuf>,

        /// Revert every target when no PATH is given
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        transfer: TransferArgs,
    },

    /// Change the source of a target
    SetSource {
        /// Destination directory of the target
        dest: PathBuf,

        /// New remote source
        source: String,
    },

    /// Show targets and their filter rules
    #[command(visible_alias = "list")]
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   offsync completions bash > ~/.local/share/bash-completion/completions/offsync
    ///   offsync completions zsh > ~/.zfunc/_offsync
    ///   offsync completions fish > ~/.config/fish/completions/offsync.fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_add_command() {
        let cli = Cli::parse_from(["offsync", "add", "host:/srv/media", "media"]);
        match cli.command {
            Some(Commands::Add { source, dest }) => {
                assert_eq!(source, "host:/srv/media");
                assert_eq!(dest, PathBuf::from("media"));
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn parse_verbosity_count() {
        let cli = Cli::parse_from(["offsync", "-vv", "status"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn parse_dry_run_without_mode() {
        let cli = Cli::parse_from(["offsync", "push", "-n"]);
        match cli.command {
            Some(Commands::Push { transfer, .. }) => {
                assert_eq!(transfer.dry_run, Some(DryRun::Local));
            }
            _ => panic!("Expected Push command"),
        }
    }

    #[test]
    fn parse_dry_run_with_mode() {
        let cli = Cli::parse_from(["offsync", "revert", "--all", "--dry-run=tool"]);
        match cli.command {
            Some(Commands::Revert { all, transfer, .. }) => {
                assert!(all);
                assert_eq!(transfer.dry_run, Some(DryRun::Tool));
            }
            _ => panic!("Expected Revert command"),
        }
    }

    #[test]
    fn parse_rsync_options() {
        let cli = Cli::parse_from([
            "offsync",
            "summon",
            "media/music",
            "--rsync=--bwlimit=100",
            "--rsync=-z",
        ]);
        match cli.command {
            Some(Commands::Summon { path, transfer }) => {
                assert_eq!(path, PathBuf::from("media/music"));
                assert_eq!(transfer.rsync, ["--bwlimit=100", "-z"]);
                assert_eq!(transfer.dry_run, None);
            }
            _ => panic!("Expected Summon command"),
        }
    }

    #[test]
    fn parse_push_selection() {
        let cli = Cli::parse_from(["offsync", "push", "--not", "a", "b"]);
        match cli.command {
            Some(Commands::Push {
                targets,
                invert,
                diff,
                ..
            }) => {
                assert_eq!(targets, [PathBuf::from("a"), PathBuf::from("b")]);
                assert!(invert);
                assert!(!diff);
            }
            _ => panic!("Expected Push command"),
        }
    }

    #[test]
    fn parse_exclude_delete_alias() {
        let cli = Cli::parse_from(["offsync", "exclude", "--delete", "x"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Exclude { evict: true, .. })
        ));
    }

    #[test]
    fn parse_list_alias() {
        let cli = Cli::parse_from(["offsync", "list"]);
        assert!(matches!(cli.command, Some(Commands::Status { json: false })));
    }

    #[test]
    fn parse_completions_command() {
        let cli = Cli::parse_from(["offsync", "completions", "bash"]);
        assert!(matches!(cli.command, Some(Commands::Completions { .. })));
    }

    #[test]
    fn parse_config_dir() {
        let cli = Cli::parse_from(["offsync", "--config-dir", "/tmp/cfg", "status"]);
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/cfg")));
    }
}
