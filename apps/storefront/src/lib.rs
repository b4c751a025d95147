//! # Storefront
//!
//! Cart and checkout service over `storefront-core` pricing and
//! `storefront-db` storage.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load [`config::StoreConfig`] from the environment
//! 3. Resolve the database path (platform data directory)
//! 4. Connect to the database and run migrations
//! 5. Serve operations through [`service::Storefront`]
//!
//! ```rust,ignore
//! use storefront::{config::StoreConfig, service::Storefront};
//! use storefront_core::CartOwner;
//!
//! let store = Storefront::open(StoreConfig::from_env()?).await?;
//! let owner = CartOwner::Session("abc".into());
//!
//! let cart = store.add_to_cart(&owner, "p1", 2).await?;
//! println!("{}", cart.totals.total_price);
//! ```

use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use error::{ApiError, ErrorCode};
pub use service::{CartResponse, OrderResponse, Storefront};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront=trace` - Show trace for storefront crates only
/// - Default: INFO, with DEBUG for storefront crates
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
