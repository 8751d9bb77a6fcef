//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::dashboard::Filter;
use crate::submission::{ContactForm, StaffApplicationForm};

/// Form submission commands.
#[derive(Debug, Subcommand)]
pub enum SubmitCommand {
    /// Send a support request
    Support(SupportArgs),

    /// Send a staff application
    Staff(StaffArgs),
}

/// Fields of the support form.
#[derive(Debug, Args)]
pub struct SupportArgs {
    /// Your name
    #[arg(long)]
    pub name: String,

    /// How to reach you (Discord, e-mail, ...)
    #[arg(long)]
    pub contact_method: String,

    /// What you need help with
    #[arg(long)]
    pub message: String,
}

impl From<SupportArgs> for ContactForm {
    fn from(args: SupportArgs) -> Self {
        Self {
            name: args.name,
            contact_method: args.contact_method,
            message: args.message,
        }
    }
}

/// Fields of the staff application form.
#[derive(Debug, Args)]
pub struct StaffArgs {
    /// Full name
    #[arg(long)]
    pub full_name: String,

    /// Age
    #[arg(long, default_value = "")]
    pub age: String,

    /// Timezone
    #[arg(long, default_value = "")]
    pub timezone: String,

    /// Discord username
    #[arg(long = "discord", default_value = "")]
    pub discord_username: String,

    /// Roblox username
    #[arg(long = "roblox", default_value = "")]
    pub roblox_username: String,

    /// Position applied for
    #[arg(long)]
    pub position: String,

    /// Hours per week available
    #[arg(long, default_value = "")]
    pub weekly_hours: String,

    /// Previous experience
    #[arg(long, default_value = "")]
    pub experience: String,

    /// Why you want the position
    #[arg(long, default_value = "")]
    pub motivation: String,

    /// Answer to the scenario question
    #[arg(long, default_value = "")]
    pub scenario: String,

    /// Anything else
    #[arg(long, default_value = "")]
    pub additional_info: String,
}

impl From<StaffArgs> for StaffApplicationForm {
    fn from(args: StaffArgs) -> Self {
        Self {
            full_name: args.full_name,
            age: args.age,
            timezone: args.timezone,
            discord_username: args.discord_username,
            roblox_username: args.roblox_username,
            position: args.position,
            weekly_hours: args.weekly_hours,
            experience: args.experience,
            motivation: args.motivation,
            scenario: args.scenario,
            additional_info: args.additional_info,
        }
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Which submissions to show (defaults to `dashboard.default_filter`)
    #[arg(short, long, value_enum)]
    pub filter: Option<FilterArg>,

    /// Case-insensitive text to search for
    #[arg(short, long)]
    pub search: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Submission id
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Also mark the submission read
    #[arg(short, long)]
    pub mark_read: bool,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Submission id
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Quarantine commands.
#[derive(Debug, Subcommand)]
pub enum QuarantineCommand {
    /// Print quarantined raw entries as JSON
    Show,

    /// Drop all quarantined entries
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Filter argument for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    /// Everything
    All,
    /// Unread only
    Unread,
    /// Support requests only
    Support,
    /// Staff applications only
    StaffApplication,
}

impl From<FilterArg> for Filter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => Self::All,
            FilterArg::Unread => Self::Unread,
            FilterArg::Support => Self::Support,
            FilterArg::StaffApplication => Self::StaffApplication,
        }
    }
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Two lines per submission
    #[default]
    Plain,
    /// One row per submission
    Table,
    /// JSON output
    Json,
}
