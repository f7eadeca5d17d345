//! Asrama CLI - staff console for the dormitory electricity-token backend.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password from --password or ASRAMA_PASSWORD)
//! asrama login -e admin@unair.ac.id
//!
//! # Finish a sign-in that arrived as a redirect URL
//! asrama login-url "http://localhost:5173/dashboard?token=eyJ..."
//!
//! # Browse
//! asrama dashboard
//! asrama users --search budi
//! asrama purchases --status pending
//!
//! # Manage
//! asrama tokens create --amount 20000 --kwh 13,4
//! asrama master-data set --harga-per-kwh 1444,70 --biaya-admin-persen 2,5
//! asrama admins create -n "Siti" -e siti@unair.ac.id -r operator --password ...
//! ```
//!
//! # Commands
//!
//! - `login`, `login-url`, `logout`, `whoami` - Session
//! - `dashboard`, `users`, `purchases` - Read-only views
//! - `admins`, `tokens`, `master-data`, `upload` - Management

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use asrama_token_admin::filters::StatusFilter;
use asrama_token_admin::{AdminConfig, ApiClient, FileTokenStore, SessionStore, TracingNavigator};
use asrama_token_core::{AdminId, Role, TokenPriceId};

mod commands;

use commands::{CliError, Console};

#[derive(Parser)]
#[command(name = "asrama")]
#[command(author, version, about = "Asrama electricity-token admin console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        /// Staff email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(long, env = "ASRAMA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in from a redirect URL carrying a `token` parameter
    LoginUrl {
        /// The full URL the browser landed on
        url: String,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Summary statistics
    Dashboard,
    /// List dormitory residents
    Users {
        /// Match name, email or NIM
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// List token purchases
    Purchases {
        /// Match resident name or token code
        #[arg(short, long, default_value = "")]
        search: String,

        /// `all`, `completed`, `pending` or `failed`
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Manage admin and operator accounts
    Admins {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage token denominations
    Tokens {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Per-kWh rate and admin fee
    MasterData {
        #[command(subcommand)]
        action: MasterDataAction,
    },
    /// Upload an image and print its URL
    Upload {
        /// Image file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List accounts
    List,
    /// Create an account
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        /// `admin` or `operator`
        #[arg(short, long, default_value = "operator")]
        role: Role,

        #[arg(long, env = "ASRAMA_NEW_PASSWORD", hide_env_values = true)]
        password: String,

        /// Avatar image to upload
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
    /// Update an account; omitted fields keep their value
    Update {
        id: AdminId,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        role: Option<Role>,

        #[arg(long)]
        password: Option<String>,

        #[arg(long)]
        avatar: Option<PathBuf>,
    },
    /// Delete an account
    Delete { id: AdminId },
    /// Activate or deactivate an account
    Toggle { id: AdminId },
}

#[derive(Subcommand)]
enum TokenAction {
    /// List denominations
    List,
    /// Add a denomination
    Create {
        /// Price in rupiah
        #[arg(long)]
        amount: String,

        /// Energy in kWh
        #[arg(long)]
        kwh: String,
    },
    /// Change a denomination; omitted fields keep their value
    Update {
        id: TokenPriceId,

        #[arg(long)]
        amount: Option<String>,

        #[arg(long)]
        kwh: Option<String>,
    },
    /// Remove a denomination
    Delete { id: TokenPriceId },
    /// Offer or withdraw a denomination
    Toggle { id: TokenPriceId },
}

#[derive(Subcommand)]
enum MasterDataAction {
    /// Show the current rate and fee
    Show,
    /// Save the rate and fee
    Set {
        /// Rupiah per kWh; a comma is accepted as decimal separator
        #[arg(long)]
        harga_per_kwh: String,

        /// Admin fee percentage
        #[arg(long)]
        biaya_admin_persen: String,
    },
    /// Delete the current record
    Delete,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "asrama_token_admin=info,asrama_cli=info".into());

    // Logs go to stderr so command output stays pipeable
    let json = std::env::var_os("ASRAMA_LOG_JSON").is_some();
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    let cli = Cli::parse();

    let config = match AdminConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Sentry before the subscriber so the tracing layer has a client
    let sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, &config).await {
        tracing::debug!(error = ?e, "Command failed");
        eprintln!("{}", e.user_message());
        // exit() skips destructors; flush Sentry first
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &AdminConfig) -> Result<(), CliError> {
    let session = SessionStore::new(
        Arc::new(FileTokenStore::new(&config.state_dir)),
        Arc::new(TracingNavigator),
    );
    session.initialize()?;
    let console = Console::new(ApiClient::new(config, session)?);

    match cli.command {
        Commands::Login { email, password } => {
            commands::session::login(&console, email, password).await?;
        }
        Commands::LoginUrl { url } => commands::session::login_url(&console, &url)?,
        Commands::Logout => commands::session::logout(&console),
        Commands::Whoami => commands::session::whoami(&console)?,
        Commands::Dashboard => commands::reports::dashboard(&console).await?,
        Commands::Users { search } => commands::reports::users(&console, &search).await?,
        Commands::Purchases { search, status } => {
            commands::reports::purchases(&console, &search, status).await?;
        }
        Commands::Admins { action } => match action {
            AdminAction::List => commands::admins::list(&console).await?,
            AdminAction::Create {
                name,
                email,
                role,
                password,
                avatar,
            } => {
                let changes = commands::admins::AdminChanges {
                    name: Some(name),
                    email: Some(email),
                    role: Some(role),
                    password: Some(password),
                    avatar,
                };
                commands::admins::create(&console, changes).await?;
            }
            AdminAction::Update {
                id,
                name,
                email,
                role,
                password,
                avatar,
            } => {
                let changes = commands::admins::AdminChanges {
                    name,
                    email,
                    role,
                    password,
                    avatar,
                };
                commands::admins::update(&console, id, changes).await?;
            }
            AdminAction::Delete { id } => commands::admins::delete(&console, id).await?,
            AdminAction::Toggle { id } => commands::admins::toggle(&console, id).await?,
        },
        Commands::Tokens { action } => match action {
            TokenAction::List => commands::tokens::list(&console).await?,
            TokenAction::Create { amount, kwh } => {
                commands::tokens::create(&console, amount, kwh).await?;
            }
            TokenAction::Update { id, amount, kwh } => {
                commands::tokens::update(&console, &id, amount, kwh).await?;
            }
            TokenAction::Delete { id } => commands::tokens::delete(&console, &id).await?,
            TokenAction::Toggle { id } => commands::tokens::toggle(&console, &id).await?,
        },
        Commands::MasterData { action } => match action {
            MasterDataAction::Show => commands::master_data::show(&console).await?,
            MasterDataAction::Set {
                harga_per_kwh,
                biaya_admin_persen,
            } => {
                commands::master_data::set(&console, harga_per_kwh, biaya_admin_persen).await?;
            }
            MasterDataAction::Delete => commands::master_data::delete(&console).await?,
        },
        Commands::Upload { file } => commands::upload::upload(&console, &file).await?,
    }
    Ok(())
}
