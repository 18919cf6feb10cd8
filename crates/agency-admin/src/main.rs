//! Agency admin dashboard CLI
//!
//! Signs in against the backend and drives the same controllers the dashboard
//! screens use, printing their table views as text.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use agency_admin::{AdminError, AdminResult, AppState};
use agency_client::{Credentials, Resource};
use agency_core::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Command line interface for the agency admin dashboard
#[derive(Parser)]
#[command(
    name = "agency-admin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Headless admin dashboard for the agency website",
    long_about = "Manage blog posts, case studies, portfolio items, products, services, reviews and job openings from the command line."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the configuration
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log format (json, text); overrides the configuration
    #[arg(long)]
    log_format: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Sign in and persist the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "AGENCY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the persisted session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List records of a resource
    List {
        /// Resource (blogs, case-studies, portfolio, products, services, reviews, careers)
        resource: Resource,

        /// Only show records containing this text
        #[arg(short, long)]
        search: Option<String>,

        /// Page to show
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Delete one record
    Delete {
        /// Resource the record belongs to
        resource: Resource,

        /// Record identifier
        id: String,

        /// Confirm the deletion (nothing is deleted without it)
        #[arg(long)]
        yes: bool,
    },

    /// Resolve a dashboard path through the auth guard
    Route {
        /// Path, such as /dashboard/content/products
        path: String,
    },
}

/// Main entry point for the admin CLI
///
/// # Errors
///
/// Returns error if configuration, logging or the selected command fails
#[tokio::main]
async fn main() -> AdminResult<()> {
    let cli = Cli::parse();

    let mut config = match Config::load_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => return Err(e.into()),
        Err(e) => {
            eprintln!("Note: using default configuration: {e}");
            Config::default()
        }
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    agency_core::init_logging(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        api = %config.api.root(),
        "Agency admin starting"
    );

    let state = AppState::new(config)?;

    let result = match cli.command {
        Commands::Login { email, password } => login(&state, email, password).await,
        Commands::Logout => {
            state.auth.logout()?;
            println!("Signed out");
            Ok(())
        }
        Commands::Whoami => {
            whoami(&state);
            Ok(())
        }
        Commands::List {
            resource,
            search,
            page,
        } => list(&state, resource, search, page).await,
        Commands::Delete { resource, id, yes } => delete(&state, resource, &id, yes).await,
        Commands::Route { path } => {
            println!("{}", state.route(&path));
            Ok(())
        }
    };

    if let Err(e) = &result {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e.user_message());
    }
    result
}

/// Sign in with the given credentials
///
/// # Errors
///
/// Returns error if the credentials are rejected or the session cannot be saved
async fn login(state: &AppState, email: String, password: String) -> AdminResult<()> {
    let session = state
        .auth
        .try_login(&Credentials::new(email, password))
        .await?;
    println!("Signed in as {}", session.user.email);
    Ok(())
}

fn whoami(state: &AppState) {
    match state.auth.current_user() {
        Some(user) => {
            let name = user.name.as_deref().unwrap_or("-");
            let role = user.role.as_deref().unwrap_or("-");
            println!("{} ({name}, {role})", user.email);
        }
        None => println!("Not signed in"),
    }
}

/// Print one page of a resource
///
/// # Errors
///
/// Returns error if the resource cannot be listed
async fn list(
    state: &AppState,
    resource: Resource,
    search: Option<String>,
    page: usize,
) -> AdminResult<()> {
    let mut controller = state.controller(resource);
    controller.load().await?;
    if let Some(term) = search {
        controller.set_search_term(term);
    }
    controller.set_page(page);

    println!("{}", resource.label());
    print!("{}", controller.table_view());
    Ok(())
}

/// Delete a record after explicit confirmation
///
/// # Errors
///
/// Returns error if the record is not listed or the backend refuses the delete
async fn delete(state: &AppState, resource: Resource, id: &str, yes: bool) -> AdminResult<()> {
    let mut controller = state.controller(resource);
    controller.load().await?;

    let record = controller
        .records()
        .iter()
        .find(|r| r.id().as_deref() == Some(id))
        .cloned()
        .ok_or_else(|| AdminError::RecordNotFound { id: id.to_string() })?;
    controller.request_delete(&record)?;

    if !yes {
        if let Some(prompt) = controller.status() {
            println!("{}\n{}", prompt.title, prompt.message);
        }
        warn!("Delete of {} {} not confirmed", resource, id);
        println!("Re-run with --yes to delete");
        controller.cancel_delete();
        return Ok(());
    }

    controller.confirm_delete().await?;
    if let Some(status) = controller.status() {
        println!("{}: {}", status.title, status.message);
    }
    Ok(())
}
