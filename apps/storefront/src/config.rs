//! # Store Configuration
//!
//! Pricing and display settings loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`STOREFRONT_*`)
//! 2. Defaults (this file)
//!
//! ## Environment Variables
//! | Variable | Example | Meaning |
//! |---|---|---|
//! | `STOREFRONT_DB_PATH` | `./dev.db` | SQLite file (default: platform data dir) |
//! | `STOREFRONT_STORE_NAME` | `Amazona` | Shown in CLI output |
//! | `STOREFRONT_CURRENCY_SYMBOL` | `€` | Prefix for formatted amounts |
//! | `STOREFRONT_TAX_RATE` | `8.25` | Percent, 0 to 100 |
//! | `STOREFRONT_SHIPPING_FEE` | `10.00` | Fee below the threshold; `0` means free |
//! | `STOREFRONT_FREE_SHIPPING_THRESHOLD` | `100.00` | `none` means always charge the fee |
//!
//! Configuration is read-only after initialization.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use storefront_core::validation::validate_tax_rate_bps;
use storefront_core::{Money, ShippingRule, TaxRate, DEFAULT_TAX_RATE_BPS};

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Store name
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Tax applied to the items price
    pub tax_rate: TaxRate,

    /// Shipping rule applied to non-empty carts
    pub shipping: ShippingRule,

    /// Database file override; `None` uses the platform data directory
    pub database_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    /// Development defaults: 15% tax, 10.00 shipping, free above 100.00.
    fn default() -> Self {
        StoreConfig {
            store_name: "Storefront Dev Store".to_string(),
            currency_symbol: "$".to_string(),
            tax_rate: TaxRate::from_bps(DEFAULT_TAX_RATE_BPS),
            shipping: ShippingRule::default(),
            database_path: None,
        }
    }
}

impl StoreConfig {
    /// Loads configuration from `STOREFRONT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StoreConfig::default();

        if let Some(path) = lookup("STOREFRONT_DB_PATH") {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup("STOREFRONT_STORE_NAME") {
            config.store_name = name;
        }

        if let Some(symbol) = lookup("STOREFRONT_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(rate) = lookup("STOREFRONT_TAX_RATE") {
            config.tax_rate = parse_tax_rate(&rate)?;
        }

        let (default_threshold, default_fee) = match config.shipping {
            ShippingRule::FreeOverThreshold { threshold, fee } => (Some(threshold), fee),
            ShippingRule::Flat { fee } => (None, fee),
            ShippingRule::Free => (None, Money::zero()),
        };

        let fee = match lookup("STOREFRONT_SHIPPING_FEE") {
            Some(raw) => parse_amount("STOREFRONT_SHIPPING_FEE", &raw)?,
            None => default_fee,
        };

        let threshold = match lookup("STOREFRONT_FREE_SHIPPING_THRESHOLD") {
            Some(raw) if raw.trim().eq_ignore_ascii_case("none") => None,
            Some(raw) => Some(parse_amount("STOREFRONT_FREE_SHIPPING_THRESHOLD", &raw)?),
            None => default_threshold,
        };

        config.shipping = match (fee.is_zero(), threshold) {
            (true, _) => ShippingRule::Free,
            (false, Some(threshold)) => ShippingRule::FreeOverThreshold { threshold, fee },
            (false, None) => ShippingRule::Flat { fee },
        };

        Ok(config)
    }

    /// Resolves the database file, creating the data directory if needed.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.storefront.storefront/storefront.db`
    /// - **Windows**: `%APPDATA%\storefront\storefront\data\storefront.db`
    /// - **Linux**: `~/.local/share/storefront/storefront.db`
    pub fn resolve_database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let proj_dirs =
            ProjectDirs::from("com", "storefront", "storefront").ok_or(ConfigError::NoDataDir)?;
        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join("storefront.db"))
    }

    /// Formats an amount with the store's currency symbol.
    ///
    /// ```rust,ignore
    /// let config = StoreConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let digits = amount.to_decimal_string();
        match digits.strip_prefix('-') {
            Some(abs) => format!("-{}{}", self.currency_symbol, abs),
            None => format!("{}{}", self.currency_symbol, digits),
        }
    }
}

fn parse_tax_rate(raw: &str) -> Result<TaxRate, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: "STOREFRONT_TAX_RATE".to_string(),
        reason,
    };

    let pct: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(format!("'{}' is not a number", raw)))?;
    if !pct.is_finite() || pct < 0.0 {
        return Err(invalid(format!("'{}' is not a valid percentage", raw)));
    }

    let rate = TaxRate::from_percentage(pct);
    validate_tax_rate_bps(rate.bps()).map_err(|e| invalid(e.to_string()))?;
    Ok(rate)
}

fn parse_amount(key: &str, raw: &str) -> Result<Money, ConfigError> {
    Money::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Could not determine app data directory")]
    NoDataDir,

    #[error("Could not create data directory: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StoreConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StoreConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.tax_rate.bps(), 1500);
        assert_eq!(
            config.shipping,
            ShippingRule::FreeOverThreshold {
                threshold: Money::from_cents(10000),
                fee: Money::from_cents(1000),
            }
        );
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOREFRONT_STORE_NAME", "Amazona"),
            ("STOREFRONT_CURRENCY_SYMBOL", "€"),
            ("STOREFRONT_TAX_RATE", "8.25"),
            ("STOREFRONT_SHIPPING_FEE", "4.99"),
            ("STOREFRONT_FREE_SHIPPING_THRESHOLD", "50"),
            ("STOREFRONT_DB_PATH", "/tmp/shop.db"),
        ])
        .unwrap();

        assert_eq!(config.store_name, "Amazona");
        assert_eq!(config.tax_rate.bps(), 825);
        assert_eq!(
            config.shipping,
            ShippingRule::FreeOverThreshold {
                threshold: Money::from_cents(5000),
                fee: Money::from_cents(499),
            }
        );
        assert_eq!(
            config.resolve_database_path().unwrap(),
            PathBuf::from("/tmp/shop.db")
        );
        assert_eq!(config.format_currency(Money::from_cents(1234)), "€12.34");
    }

    #[test]
    fn test_shipping_variants() {
        let flat = load(&[("STOREFRONT_FREE_SHIPPING_THRESHOLD", "none")]).unwrap();
        assert_eq!(flat.shipping, ShippingRule::Flat { fee: Money::from_cents(1000) });

        let free = load(&[("STOREFRONT_SHIPPING_FEE", "0")]).unwrap();
        assert_eq!(free.shipping, ShippingRule::Free);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("STOREFRONT_TAX_RATE", "abc")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            load(&[("STOREFRONT_TAX_RATE", "150")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            load(&[("STOREFRONT_TAX_RATE", "-1")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            load(&[("STOREFRONT_SHIPPING_FEE", "9.999")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_format_currency() {
        let config = StoreConfig::default();
        assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
        assert_eq!(config.format_currency(Money::from_cents(1)), "$0.01");
        assert_eq!(config.format_currency(Money::zero()), "$0.00");
        assert_eq!(config.format_currency(Money::from_cents(-1234)), "-$12.34");
    }
}
