//! Command-line interface for lsc-inbox.
//!
//! This module provides the CLI structure, output rendering and the stdin
//! confirmation prompt for the `lscinbox` binary.

mod commands;
pub mod render;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::dashboard::Confirm;

pub use commands::{
    ConfigCommand, DeleteCommand, FilterArg, ListCommand, OutputFormat, QuarantineCommand,
    ShowCommand, StaffArgs, StatusCommand, SubmitCommand, SupportArgs,
};

/// lscinbox - Review LSC_Studio support requests and staff applications
///
/// Forms append submissions; the admin commands list, search, mark and
/// delete them.
#[derive(Debug, Parser)]
#[command(name = "lscinbox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a form
    #[command(subcommand)]
    Submit(SubmitCommand),

    /// Set the admin flag
    Login,

    /// Clear the admin flag
    Logout,

    /// List submissions with counts
    List(ListCommand),

    /// Show one submission in full
    Show(ShowCommand),

    /// Mark a submission read
    Read {
        /// Submission id
        id: String,
    },

    /// Mark a submission unread
    Unread {
        /// Submission id
        id: String,
    },

    /// Delete one submission
    Delete(DeleteCommand),

    /// Delete all submissions
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show counts and storage details
    Status(StatusCommand),

    /// Inspect entries that could not be decoded
    #[command(subcommand)]
    Quarantine(QuarantineCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

/// Asks `[y/N]` on stderr and reads the answer from a line reader.
#[derive(Debug)]
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl PromptConfirm<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Prompt on the terminal.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    /// Prompt using the given reader and writer.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if write!(self.output, "{prompt} [y/N] ").is_err() || self.output.flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if self.input.read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "lscinbox");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(
            parse(&["lscinbox", "-q", "login"]).verbosity(),
            crate::logging::Verbosity::Quiet
        );
        assert_eq!(
            parse(&["lscinbox", "login"]).verbosity(),
            crate::logging::Verbosity::Normal
        );
        assert_eq!(
            parse(&["lscinbox", "-v", "login"]).verbosity(),
            crate::logging::Verbosity::Verbose
        );
        assert_eq!(
            parse(&["lscinbox", "-vv", "login"]).verbosity(),
            crate::logging::Verbosity::Trace
        );
    }

    #[test]
    fn test_parse_submit_support() {
        let cli = parse(&[
            "lscinbox",
            "submit",
            "support",
            "--name",
            "דנה",
            "--contact-method",
            "דיסקורד",
            "--message",
            "שלום",
        ]);
        match cli.command {
            Command::Submit(SubmitCommand::Support(args)) => {
                assert_eq!(args.name, "דנה");
                assert_eq!(args.contact_method, "דיסקורד");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_submit_staff_defaults() {
        let cli = parse(&[
            "lscinbox",
            "submit",
            "staff",
            "--full-name",
            "Noa",
            "--position",
            "Builder",
            "--discord",
            "noa#1",
        ]);
        match cli.command {
            Command::Submit(SubmitCommand::Staff(args)) => {
                assert_eq!(args.discord_username, "noa#1");
                assert_eq!(args.age, "");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list() {
        let cli = parse(&[
            "lscinbox",
            "list",
            "--filter",
            "staff-application",
            "--search",
            "noa",
            "--format",
            "json",
        ]);
        match cli.command {
            Command::List(list) => {
                assert_eq!(list.filter, Some(FilterArg::StaffApplication));
                assert_eq!(list.search.as_deref(), Some("noa"));
                assert_eq!(list.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_delete_and_clear() {
        assert!(matches!(
            parse(&["lscinbox", "delete", "1-abc", "--yes"]).command,
            Command::Delete(DeleteCommand { yes: true, .. })
        ));
        assert!(matches!(
            parse(&["lscinbox", "clear"]).command,
            Command::Clear { yes: false }
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["lscinbox", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_prompt_confirm_accepts_yes() {
        let mut output = Vec::new();
        let mut confirm = PromptConfirm::new("Yes\n".as_bytes(), &mut output);
        assert!(confirm.confirm("Delete?"));
        drop(confirm);
        assert_eq!(String::from_utf8(output).unwrap(), "Delete? [y/N] ");
    }

    #[test]
    fn test_prompt_confirm_defaults_to_no() {
        for input in ["\n", "n\n", "maybe\n", ""] {
            let mut confirm = PromptConfirm::new(input.as_bytes(), Vec::new());
            assert!(!confirm.confirm("Delete?"), "input {input:?}");
        }
    }
}
