//! `lscinbox` - CLI for lsc-inbox
//!
//! This binary submits forms into the local store and runs the admin
//! dashboard commands over it.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use lsc_inbox::cli::render::{self, ListDocument};
use lsc_inbox::cli::{
    Cli, Command, ConfigCommand, DeleteCommand, ListCommand, OutputFormat, PromptConfirm,
    QuarantineCommand, ShowCommand, SubmitCommand,
};
use lsc_inbox::{
    init_logging, Config, Confirm, ContactForm, Dashboard, Error, SqliteStore,
    StaffApplicationForm, SubmissionStore,
};

type Store = SubmissionStore<SqliteStore>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Submit(submit_cmd) => handle_submit(&open_store(&config)?, submit_cmd),
        Command::Login => {
            open_store(&config)?.set_admin_authenticated(true)?;
            println!("Logged in.");
            Ok(())
        }
        Command::Logout => handle_logout(&open_store(&config)?),
        Command::List(list_cmd) => handle_list(&config, &open_store(&config)?, &list_cmd),
        Command::Show(show_cmd) => handle_show(&open_store(&config)?, &show_cmd),
        Command::Read { id } => handle_mark(&open_store(&config)?, &id, true),
        Command::Unread { id } => handle_mark(&open_store(&config)?, &id, false),
        Command::Delete(delete_cmd) => handle_delete(&config, &open_store(&config)?, &delete_cmd),
        Command::Clear { yes } => handle_clear(&config, &open_store(&config)?, yes),
        Command::Status(status_cmd) => {
            handle_status(&config, &open_store(&config)?, status_cmd.json)
        }
        Command::Quarantine(quarantine_cmd) => {
            handle_quarantine(&config, &open_store(&config)?, quarantine_cmd)
        }
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

/// Open the configured database. `config` commands never call this.
fn open_store(config: &Config) -> anyhow::Result<Store> {
    let path = config.database_path();
    let backend = SqliteStore::open(&path)
        .with_context(|| format!("cannot open storage at {}", path.display()))?;
    Ok(SubmissionStore::with_keys(backend, config.storage.keys.clone()))
}

/// Open the dashboard, turning a missing login into a hint.
fn open_dashboard(store: &Store) -> anyhow::Result<Dashboard<'_, SqliteStore>> {
    Dashboard::open(store).map_err(|e| {
        if e.is_login_required() {
            anyhow::Error::new(e).context("run `lscinbox login` first")
        } else {
            e.into()
        }
    })
}

/// Run a destructive step, prompting unless confirmation is skipped.
///
/// Returns `Ok(None)` when the user declines.
fn confirmed<T>(
    config: &Config,
    yes: bool,
    action: impl FnOnce(&mut dyn Confirm) -> lsc_inbox::Result<T>,
) -> anyhow::Result<Option<T>> {
    let mut assume_yes = |_: &str| true;
    let result = if yes || !config.dashboard.confirm_destructive {
        action(&mut assume_yes)
    } else {
        action(&mut PromptConfirm::stdin())
    };
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_cancelled() => {
            println!("Cancelled.");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn handle_submit(store: &Store, cmd: SubmitCommand) -> anyhow::Result<()> {
    let submission = match cmd {
        SubmitCommand::Support(args) => store.save(ContactForm::from(args))?,
        SubmitCommand::Staff(args) => store.save(StaffApplicationForm::from(args))?,
    };
    println!("{}", submission.id);
    Ok(())
}

fn handle_logout(store: &Store) -> anyhow::Result<()> {
    match Dashboard::open(store) {
        Ok(dashboard) => {
            dashboard.logout()?;
            println!("Logged out.");
        }
        Err(e) if e.is_login_required() => println!("Not logged in."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn handle_list(config: &Config, store: &Store, cmd: &ListCommand) -> anyhow::Result<()> {
    let mut dashboard = open_dashboard(store)?;
    dashboard.set_filter(cmd.filter.map_or(config.dashboard.default_filter, Into::into));
    dashboard.set_query(cmd.search.clone().unwrap_or_default());

    let visible = dashboard.visible();
    let limit = config.dashboard.list_limit;
    let shown = if limit > 0 && visible.len() > limit {
        &visible[..limit]
    } else {
        &visible[..]
    };

    match cmd.format {
        OutputFormat::Json => {
            let document = ListDocument {
                filter: dashboard.filter(),
                search: dashboard.query(),
                counts: dashboard.counts(),
                submissions: shown.to_vec(),
            };
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        format => {
            println!("{}", render::counts_line(&dashboard.counts()));
            println!();
            if shown.is_empty() {
                println!("No submissions match.");
            } else if format == OutputFormat::Table {
                print!("{}", render::table_list(shown));
            } else {
                print!("{}", render::plain_list(shown));
            }
            if shown.len() < visible.len() {
                println!();
                println!("Showing {} of {} matches.", shown.len(), visible.len());
            }
        }
    }
    Ok(())
}

fn handle_show(store: &Store, cmd: &ShowCommand) -> anyhow::Result<()> {
    let mut dashboard = open_dashboard(store)?;
    dashboard.select(&cmd.id)?;
    if cmd.mark_read {
        dashboard.mark_read(&cmd.id)?;
    }
    let submission = dashboard
        .selected()
        .ok_or_else(|| Error::not_found(cmd.id.clone()))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(submission)?);
    } else {
        print!("{}", render::detail(submission));
    }
    Ok(())
}

fn handle_mark(store: &Store, id: &str, read: bool) -> anyhow::Result<()> {
    let mut dashboard = open_dashboard(store)?;
    let found = if read {
        dashboard.mark_read(id)?
    } else {
        dashboard.mark_unread(id)?
    };
    if found {
        println!("Marked {id} {}.", if read { "read" } else { "unread" });
    } else {
        println!("No submission with id {id}.");
    }
    Ok(())
}

fn handle_delete(config: &Config, store: &Store, cmd: &DeleteCommand) -> anyhow::Result<()> {
    let mut dashboard = open_dashboard(store)?;
    // Show what is about to go before asking.
    if let Ok(submission) = dashboard.select(&cmd.id) {
        if !cmd.yes && config.dashboard.confirm_destructive {
            print!("{}", render::detail(submission));
            println!();
        }
    }
    match confirmed(config, cmd.yes, |confirm| dashboard.delete(&cmd.id, confirm))? {
        Some(true) => println!("Deleted {}.", cmd.id),
        Some(false) => println!("No submission with id {}.", cmd.id),
        None => {}
    }
    Ok(())
}

fn handle_clear(config: &Config, store: &Store, yes: bool) -> anyhow::Result<()> {
    let mut dashboard = open_dashboard(store)?;
    let total = dashboard.counts().total;
    if confirmed(config, yes, |confirm| dashboard.clear_all(confirm))?.is_some() {
        println!("Deleted {total} submissions.");
    }
    Ok(())
}

fn handle_status(config: &Config, store: &Store, json: bool) -> anyhow::Result<()> {
    let logged_in = store.is_admin_authenticated()?;
    let counts = if logged_in {
        Some(open_dashboard(store)?.counts())
    } else {
        None
    };
    let quarantined = store.quarantined()?.len();

    if json {
        let status = serde_json::json!({
            "logged_in": logged_in,
            "database_path": config.database_path(),
            "counts": counts,
            "quarantined": quarantined,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("lscinbox status");
        println!("---------------");
        println!("Database:      {}", config.database_path().display());
        println!(
            "Admin:         {}",
            if logged_in { "logged in" } else { "not logged in" }
        );
        match counts {
            Some(counts) => println!("Submissions:   {}", render::counts_line(&counts)),
            None => println!("Submissions:   (log in to see counts)"),
        }
        println!("Quarantined:   {quarantined}");
    }
    Ok(())
}

fn handle_quarantine(
    config: &Config,
    store: &Store,
    cmd: QuarantineCommand,
) -> anyhow::Result<()> {
    // Quarantined entries are submission data, so they sit behind the same gate.
    open_dashboard(store)?;
    match cmd {
        QuarantineCommand::Show => {
            println!("{}", render::quarantine(&store.quarantined()?)?);
        }
        QuarantineCommand::Clear { yes } => {
            let count = store.quarantined()?.len();
            let cleared = confirmed(config, yes, |confirm| {
                if confirm.confirm("Drop all quarantined entries?") {
                    store.clear_quarantine()
                } else {
                    Err(Error::cancelled("clear quarantine"))
                }
            })?;
            if cleared.is_some() {
                println!("Dropped {count} quarantined entries.");
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                let keys = &config.storage.keys;
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Submissions key:    {}", keys.submissions);
                println!("  Admin key:          {}", keys.admin);
                println!("  Quarantine key:     {}", keys.quarantine);
                println!();
                println!("[Dashboard]");
                println!("  Default filter:     {}", config.dashboard.default_filter);
                println!(
                    "  Confirm destructive: {}",
                    config.dashboard.confirm_destructive
                );
                println!(
                    "  List limit:         {}",
                    match config.dashboard.list_limit {
                        0 => "unlimited".to_string(),
                        n => n.to_string(),
                    }
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
