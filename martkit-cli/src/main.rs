//! martkit – a headless storefront client for the terminal.
//!
//! Drives the same session services the mobile app uses: sign in, browse
//! the catalog, mutate the cart, manage delivery addresses, and run the
//! three-phase payment handshake.

mod collect;
mod commands;
mod config;
mod token;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// martkit - headless storefront client
#[derive(Parser, Debug)]
#[command(name = "martkit")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./martkit.toml", env = "MARTKIT_CONFIG")]
    config: PathBuf,

    /// Override the API base URL from the config file
    #[arg(short, long)]
    base_url: Option<Url>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account (a verification email is sent)
    Register {
        name: String,
        email: String,
        password: String,
    },
    /// Sign in and persist the session token
    Login { email: String, password: String },
    /// Drop the persisted session token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Change the signed-in user's password
    ChangePassword {
        old_password: String,
        new_password: String,
    },
    /// Browse the product catalog
    Products {
        /// Full-text search term
        #[arg(short, long)]
        search: Option<String>,
        /// Filter by category slug
        #[arg(long)]
        category: Option<String>,
        #[arg(short, long, default_value = "1")]
        page: u32,
    },
    /// List product categories
    Categories,
    /// Inspect or mutate the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage delivery addresses
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Place and pay for an order from the current cart
    Checkout {
        /// Address id to deliver to (defaults to the first saved address)
        #[arg(long)]
        address_id: Option<String>,
    },
    /// Show order history
    Orders,
}

#[derive(Subcommand, Debug)]
enum CartAction {
    /// Show the cart with its price breakdown
    Show,
    /// Add a product
    Add {
        product_id: String,
        #[arg(default_value = "1")]
        quantity: u32,
    },
    /// Remove a product
    Remove { product_id: String },
    /// Set the quantity of a product (0 removes it)
    Set { product_id: String, quantity: u32 },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand, Debug)]
enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address (phone number is verified by OTP first)
    Add {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        country: String,
        #[arg(long)]
        postal_code: String,
        /// 10-digit phone number to verify and attach
        #[arg(long)]
        phone: String,
    },
    /// Delete an address
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = config::load(&args.config, args.base_url).map_err(|e| {
        tracing::error!("failed to load configuration: {e}");
        e
    })?;

    match args.command {
        Command::Register {
            name,
            email,
            password,
        } => commands::register(&config, &name, &email, &password).await,
        Command::Login { email, password } => commands::login(&config, &email, &password).await,
        Command::Logout => commands::logout(&config).await,
        Command::Whoami => commands::whoami(&config).await,
        Command::ChangePassword {
            old_password,
            new_password,
        } => commands::change_password(&config, &old_password, &new_password).await,
        Command::Products {
            search,
            category,
            page,
        } => commands::products(&config, search, category, page).await,
        Command::Categories => commands::categories(&config).await,
        Command::Cart { action } => match action {
            CartAction::Show => commands::cart_show(&config).await,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart_add(&config, &product_id, quantity).await,
            CartAction::Remove { product_id } => commands::cart_remove(&config, &product_id).await,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart_set(&config, &product_id, quantity).await,
            CartAction::Clear => commands::cart_clear(&config).await,
        },
        Command::Address { action } => match action {
            AddressAction::List => commands::address_list(&config).await,
            AddressAction::Add {
                full_name,
                address,
                city,
                state,
                country,
                postal_code,
                phone,
            } => {
                commands::address_add(
                    &config,
                    commands::NewAddress {
                        full_name,
                        address,
                        city,
                        state,
                        country,
                        postal_code,
                        phone,
                    },
                )
                .await
            }
            AddressAction::Delete { id } => commands::address_delete(&config, &id).await,
        },
        Command::Checkout { address_id } => {
            commands::checkout(&config, address_id.as_deref()).await
        }
        Command::Orders => commands::orders(&config).await,
    }
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
