//! TechFix CLI - Manage the storefront cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Add two units of a product
//! techfix add screen-repair "Screen Repair" 49.00 --quantity 2
//!
//! # Add a product and play the toast notification in real time
//! techfix add 42 "USB-C Cable" 4.99 --watch
//!
//! # Set a quantity (zero or below removes the product)
//! techfix update screen-repair 3
//!
//! # Inspect the cart
//! techfix show
//! techfix total
//! techfix subtotal
//!
//! # Use a different storage file
//! techfix --storage /tmp/cart.json show
//! ```
//!
//! # Commands
//!
//! - `add` - Add a product to the cart
//! - `update` - Set a product's quantity
//! - `remove` - Remove a product
//! - `clear` - Empty the cart
//! - `show` - List line items
//! - `total` - Print the number of units
//! - `subtotal` - Print the cart subtotal

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use techfix_core::{Price, ProductId};
use techfix_storefront::clock::SystemClock;
use techfix_storefront::config::StorefrontConfig;
use techfix_storefront::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;
use commands::cart::AddArgs;

#[derive(Parser)]
#[command(name = "techfix")]
#[command(author, version, about = "TechFix storefront cart")]
struct Cli {
    /// Storage file (overrides `TECHFIX_STORAGE_PATH`)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a product to the cart
    Add {
        /// Product ID (numbers are stored as numbers)
        id: ProductId,

        /// Display name
        title: String,

        /// Unit price
        price: Price,

        /// Units to add (0 adds one)
        #[arg(short, long)]
        quantity: Option<u32>,

        /// Image URL
        #[arg(long)]
        image: Option<String>,

        /// Product category
        #[arg(short, long)]
        category: Option<String>,

        /// Stay running until the toast notification is gone
        #[arg(short, long)]
        watch: bool,
    },
    /// Set a product's quantity
    #[command(allow_negative_numbers = true)]
    Update {
        /// Product ID
        id: ProductId,

        /// New quantity; zero or below removes the product
        quantity: i64,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Remove every product
    Clear,
    /// List the line items
    Show,
    /// Print the number of units in the cart
    Total,
    /// Print the cart subtotal
    Subtotal,
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
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "techfix_storefront=info,techfix_cli=info".into());

    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let mut config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };
    if let Some(path) = cli.storage {
        config.storage_path = path;
    }

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli.command, config).await {
        if let CliError::Cart(cart_error) = &e {
            cart_error.report();
        } else {
            tracing::error!("Command failed: {e}");
        }
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn run(command: Commands, config: StorefrontConfig) -> Result<(), CliError> {
    let mut state = AppState::open(config, Rc::new(SystemClock));
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Add {
            id,
            title,
            price,
            quantity,
            image,
            category,
            watch,
        } => {
            let args = AddArgs {
                id,
                title,
                price,
                quantity,
                image,
                category,
            };
            commands::cart::add(&mut state, args, &mut out)?;
            if watch {
                commands::cart::watch(&state, &mut out).await?;
            }
        }
        Commands::Update { id, quantity } => {
            commands::cart::update(&mut state, &id, quantity, &mut out)?;
        }
        Commands::Remove { id } => commands::cart::remove(&mut state, &id, &mut out)?,
        Commands::Clear => commands::cart::clear(&mut state, &mut out)?,
        Commands::Show => commands::report::show(&state, &mut out)?,
        Commands::Total => commands::report::total(&state, &mut out)?,
        Commands::Subtotal => commands::report::subtotal(&state, &mut out)?,
    }

    out.flush()?;
    Ok(())
}
