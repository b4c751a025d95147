//! # Storefront CLI
//!
//! Drives the cart service from the command line. Every command prints its
//! result as pretty JSON on stdout; failures print an `ApiError` as JSON on
//! stderr and exit with status 1.
//!
//! ```bash
//! storefront --owner session:abc add p1 --quantity 2
//! storefront --owner session:abc show
//! storefront --owner session:abc checkout
//! echo '[{"productId":"p1","quantity":2,"unitPrice":"10.00"}]' | storefront price
//! ```

use std::io::Read;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use storefront::{init_tracing, service, ApiError, StoreConfig, Storefront};
use storefront_core::CartOwner;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront cart pricing service", version)]
struct Cli {
    /// Cart owner as `session:<id>` or `user:<id>`
    #[arg(short, long, global = true, default_value = "session:local")]
    owner: CartOwner,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the cart with its totals
    Show,

    /// Add a product to the cart
    Add {
        product_id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },

    /// Set the quantity of a cart line (0 removes it)
    Set {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a line from the cart
    Remove { product_id: String },

    /// Empty the cart
    Clear,

    /// Place an order from the cart
    Checkout,

    /// List placed orders, most recent first
    Orders {
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },

    /// Show one placed order
    Order { order_id: String },

    /// Price a JSON line-item payload (reads stdin when omitted)
    Price { json: Option<String> },

    /// List catalog products
    Products {
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match serde_json::to_string_pretty(&err) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ApiError> {
    let config = StoreConfig::from_env()?;

    // Pricing a payload needs no database
    if let Command::Price { json } = &cli.command {
        let payload = match json {
            Some(json) => json.clone(),
            None => read_stdin()?,
        };
        return print(&service::price_lines(&config, &payload)?);
    }

    let store = Storefront::open(config).await?;
    info!(store = %store.config().store_name, owner = %cli.owner, "Storefront ready");

    let owner = &cli.owner;
    let result = match cli.command {
        Command::Show => print(&store.get_cart(owner).await?),
        Command::Add {
            product_id,
            quantity,
        } => print(&store.add_to_cart(owner, &product_id, quantity).await?),
        Command::Set {
            product_id,
            quantity,
        } => print(&store.update_cart_item(owner, &product_id, quantity).await?),
        Command::Remove { product_id } => {
            print(&store.remove_from_cart(owner, &product_id).await?)
        }
        Command::Clear => print(&store.clear_cart(owner).await?),
        Command::Checkout => print(&store.checkout(owner).await?),
        Command::Orders { limit } => print(&store.list_orders(owner, limit).await?),
        Command::Order { order_id } => print(&store.get_order(owner, &order_id).await?),
        Command::Products { limit } => print(&store.list_products(limit).await?),
        Command::Price { .. } => Ok(()),
    };

    store.database().close().await;
    result
}

fn read_stdin() -> Result<String, ApiError> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| ApiError::validation(format!("Could not read stdin: {}", e)))?;
    Ok(buf)
}

fn print<T: Serialize>(value: &T) -> Result<(), ApiError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::internal(format!("Could not serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}
