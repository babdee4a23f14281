//! Marketplace CLI - browse products, manage the cart and sign in.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally filtered
//! market products --search kente
//!
//! # Manage the cart
//! market cart add 3
//! market cart update 3 -1
//! market cart show
//! market checkout
//!
//! # Accounts (requires AUTH_BASE_URL and AUTH_API_KEY)
//! market register -n "Ama Owusu" -e ama@example.com -p hunter22 -c hunter22 -l "Kumasi, Ghana"
//! market login -e ama@example.com -p hunter22
//! market account
//! market logout
//!
//! # Validate a product listing
//! market list -n "Kente Scarf" -d "Hand woven" -p 29.99 -c Fashion -l "Accra, Ghana"
//! ```
//!
//! Every invocation opens a storefront session on the configured storage
//! file and runs one command. Only commands that change the cart or the
//! signed-in user close the session with a final save; read-only commands
//! leave the storage file untouched.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketplace_core::ProductId;
use marketplace_storefront::config::StorefrontConfig;
use marketplace_storefront::{AppError, Storefront};

mod commands;

#[derive(Parser)]
#[command(name = "market")]
#[command(author, version, about = "Marketplace storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Products {
        /// Only show products matching this term
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Proceed to checkout with the current cart
    Checkout,
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Repeat the password
        #[arg(short, long)]
        confirm_password: String,

        /// City and country, e.g. "Accra, Ghana"
        #[arg(short, long)]
        location: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in account
    Account,
    /// Validate a new product listing
    List {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: String,

        #[arg(short, long)]
        price: String,

        #[arg(short, long)]
        category: String,

        #[arg(short, long)]
        location: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add one unit of a product
    Add { id: ProductId },
    /// Remove a product
    Remove { id: ProductId },
    /// Change a product's quantity by DELTA (e.g. 2 or -1)
    Update {
        id: ProductId,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Remove everything
    Clear,
}

impl Commands {
    /// Whether the command changes the cart or the signed-in user.
    const fn mutates(&self) -> bool {
        match self {
            Self::Cart { action } => action.mutates(),
            Self::Login { .. } | Self::Logout => true,
            Self::Products { .. }
            | Self::Checkout
            | Self::Register { .. }
            | Self::Account
            | Self::List { .. } => false,
        }
    }
}

impl CartAction {
    const fn mutates(&self) -> bool {
        !matches!(self, Self::Show)
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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
        .unwrap_or_else(|_| "marketplace_storefront=info,marketplace_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            let err = AppError::from(e);
            err.report();
            commands::print_error(&err);
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, config).await {
        e.report();
        commands::print_error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> marketplace_storefront::Result<()> {
    // Listing validation needs no session.
    let command = match cli.command {
        Commands::List {
            name,
            description,
            price,
            category,
            location,
        } => return commands::listing::validate(name, description, price, category, location),
        command => command,
    };

    let mutates = command.mutates();
    let mut session = Storefront::open(config)?;

    match command {
        Commands::Products { search } => {
            commands::catalog::products(&session, search.as_deref()).await;
        }
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&session),
            CartAction::Add { id } => commands::cart::add(&mut session, id).await?,
            CartAction::Remove { id } => commands::cart::remove(&mut session, id)?,
            CartAction::Update { id, delta } => commands::cart::update(&mut session, id, delta)?,
            CartAction::Clear => commands::cart::clear(&mut session)?,
        },
        Commands::Checkout => commands::cart::checkout(&session)?,
        Commands::Login { email, password } => {
            commands::account::login(&mut session, email, password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
            location,
        } => {
            commands::account::register(
                &mut session,
                commands::account::Registration {
                    name,
                    email,
                    password,
                    confirm_password,
                    location,
                },
            )
            .await?;
        }
        Commands::Logout => commands::account::logout(&mut session).await?,
        Commands::Account => commands::account::show(&session),
        Commands::List { .. } => {}
    }

    if mutates {
        session.close()?;
    }
    Ok(())
}
