//! # Storefront Service
//!
//! Cart and checkout operations as the display layer calls them. Each call
//! loads the owner's cart, applies one change through the core cart rules,
//! saves it under its version guard, and returns the cart with freshly
//! derived totals.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐  add_to_cart   ┌───────────┐   checkout   ┌────────────┐ │
//! │  │  Empty   │───────────────►│ Populated │─────────────►│ CheckedOut │ │
//! │  └──────────┘                └───────────┘              └─────┬──────┘ │
//! │       ▲      remove last /        │ update_cart_item          │        │
//! │       │      clear_cart           │ remove_from_cart          │        │
//! │       └───────────────────────────┘                           │        │
//! │       └───────────────────────────────────────────────────────┘        │
//! │                         order placed, cart empty again                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A concurrent edit surfaces as `ErrorCode::Conflict`; nothing here retries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::validation::validate_product_id;
use storefront_core::{
    compute_totals, parse_cart_lines, Cart, CartItem, CartOwner, CartStatus, CartSummary,
    CoreError, Order, Product,
};
use storefront_db::{Database, DbConfig};
use tracing::{debug, info};
use ts_rs::TS;

use crate::config::StoreConfig;
use crate::error::ApiError;

// =============================================================================
// Responses
// =============================================================================

/// Cart response including items and totals.
///
/// ```json
/// {
///   "items": [{ "productId": "p1", "quantity": 2, "unitPrice": 1000, ... }],
///   "status": "populated",
///   "version": 3,
///   "totals": { "itemCount": 2, "itemsPrice": "20.00", ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub status: CartStatus,
    pub version: i64,
    pub totals: CartSummary,
}

/// A placed order as the display layer shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub items: Vec<CartItem>,
    pub status: CartStatus,
    pub totals: CartSummary,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        OrderResponse {
            id: order.id.clone(),
            items: order.items.clone(),
            status: CartStatus::CheckedOut,
            totals: order.totals.summary(),
            created_at: order.created_at,
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// The storefront: a database handle plus the store's pricing rules.
///
/// Cheap to clone; every clone shares the same pool.
#[derive(Debug, Clone)]
pub struct Storefront {
    db: Database,
    config: StoreConfig,
}

impl Storefront {
    /// Creates a storefront over an existing database.
    pub fn new(db: Database, config: StoreConfig) -> Self {
        Storefront { db, config }
    }

    /// Opens the configured database (running migrations) and wraps it.
    pub async fn open(config: StoreConfig) -> Result<Self, ApiError> {
        let path = config.resolve_database_path()?;
        info!(path = %path.display(), store = %config.store_name, "Opening storefront");

        let db = Database::new(DbConfig::new(path)).await?;
        Ok(Storefront::new(db, config))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Gets the owner's cart. An owner with no cart sees an empty one.
    pub async fn get_cart(&self, owner: &CartOwner) -> Result<CartResponse, ApiError> {
        debug!(owner = %owner, "get_cart");

        match self.db.carts().get_by_owner(&owner.key()).await? {
            Some(cart) => self.respond(&cart),
            None => self.respond(&Cart::new(owner.key())),
        }
    }

    /// Adds a product to the cart.
    ///
    /// ## Behavior
    /// - If product already in cart: quantity increases
    /// - If product not in cart: added as new item
    /// - Price is "frozen" at time of adding
    pub async fn add_to_cart(
        &self,
        owner: &CartOwner,
        product_id: &str,
        quantity: i64,
    ) -> Result<CartResponse, ApiError> {
        debug!(owner = %owner, product_id = %product_id, quantity = %quantity, "add_to_cart");

        let product = self.product(product_id).await?;
        let mut cart = self.db.carts().get_or_create(&owner.key()).await?;

        cart.add_item(&product, quantity)?;

        let cart = self.db.carts().save(&cart).await?;
        self.respond(&cart)
    }

    /// Sets the quantity of a line. Quantity 0 removes it.
    pub async fn update_cart_item(
        &self,
        owner: &CartOwner,
        product_id: &str,
        quantity: i64,
    ) -> Result<CartResponse, ApiError> {
        debug!(owner = %owner, product_id = %product_id, quantity = %quantity, "update_cart_item");

        let mut cart = self.stored_cart(owner).await?;

        if quantity > 0 {
            // Stock is checked against the live catalog; a delisted product
            // can still be adjusted at its frozen price.
            if let Some(product) = self.db.products().get_by_id(product_id).await? {
                if !product.can_sell(quantity) {
                    return Err(CoreError::InsufficientStock {
                        product_id: product.id,
                        available: product.count_in_stock,
                        requested: quantity,
                    }
                    .into());
                }
            }
        }

        cart.update_quantity(product_id, quantity)?;

        let cart = self.db.carts().save(&cart).await?;
        self.respond(&cart)
    }

    /// Removes a line from the cart.
    pub async fn remove_from_cart(
        &self,
        owner: &CartOwner,
        product_id: &str,
    ) -> Result<CartResponse, ApiError> {
        debug!(owner = %owner, product_id = %product_id, "remove_from_cart");

        let mut cart = self.stored_cart(owner).await?;
        cart.remove_item(product_id)?;

        let cart = self.db.carts().save(&cart).await?;
        self.respond(&cart)
    }

    /// The owner's saved cart, or an unsaved empty one.
    ///
    /// Edits to a line can only fail on an empty cart, so no row is written
    /// for an owner who has never added anything.
    async fn stored_cart(&self, owner: &CartOwner) -> Result<Cart, ApiError> {
        let cart = self.db.carts().get_by_owner(&owner.key()).await?;
        Ok(cart.unwrap_or_else(|| Cart::new(owner.key())))
    }

    /// Empties the cart.
    pub async fn clear_cart(&self, owner: &CartOwner) -> Result<CartResponse, ApiError> {
        debug!(owner = %owner, "clear_cart");

        let mut cart = self.db.carts().get_or_create(&owner.key()).await?;
        if cart.is_empty() {
            return self.respond(&cart);
        }

        cart.clear();
        let cart = self.db.carts().save(&cart).await?;
        self.respond(&cart)
    }

    /// Places an order from the cart and empties it.
    ///
    /// Fails with `CART_EMPTY` when there is nothing to check out and with
    /// `CONFLICT` if the cart changed while the order was being placed.
    pub async fn checkout(&self, owner: &CartOwner) -> Result<OrderResponse, ApiError> {
        debug!(owner = %owner, "checkout");

        let loaded = self
            .db
            .carts()
            .get_by_owner(&owner.key())
            .await?
            .ok_or(CoreError::CartEmpty)?;

        let mut cart = loaded.clone();
        let snapshot = cart.check_out(self.config.tax_rate, &self.config.shipping)?;

        let order = self.db.orders().place_order(&loaded, &snapshot).await?;

        info!(
            owner = %owner,
            order_id = %order.id,
            total = %self.config.format_currency(order.totals.total_price),
            "Checkout complete"
        );

        Ok(OrderResponse::from(&order))
    }

    /// Gets one of the owner's orders.
    ///
    /// Another owner's order is reported as not found.
    pub async fn get_order(
        &self,
        owner: &CartOwner,
        order_id: &str,
    ) -> Result<OrderResponse, ApiError> {
        debug!(owner = %owner, order_id = %order_id, "get_order");

        self.db
            .orders()
            .get_by_id(order_id)
            .await?
            .filter(|order| order.owner_key == owner.key())
            .map(|order| OrderResponse::from(&order))
            .ok_or_else(|| ApiError::not_found("Order", order_id))
    }

    /// Lists the owner's orders, most recent first.
    pub async fn list_orders(
        &self,
        owner: &CartOwner,
        limit: u32,
    ) -> Result<Vec<OrderResponse>, ApiError> {
        debug!(owner = %owner, limit = limit, "list_orders");

        let orders = self.db.orders().list_by_owner(&owner.key(), limit).await?;
        Ok(orders.iter().map(OrderResponse::from).collect())
    }

    /// Lists catalog products.
    pub async fn list_products(&self, limit: u32) -> Result<Vec<Product>, ApiError> {
        Ok(self.db.products().list(limit).await?)
    }

    /// Prices a line-item payload without touching any stored cart.
    ///
    /// `json` is an array of `{ productId, quantity, unitPrice }` objects as
    /// the display layer holds them; `null` is an empty cart.
    pub fn price_lines(&self, json: &str) -> Result<CartSummary, ApiError> {
        price_lines(&self.config, json)
    }

    async fn product(&self, product_id: &str) -> Result<Product, ApiError> {
        validate_product_id(product_id).map_err(CoreError::from)?;

        self.db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product", product_id))
    }

    fn respond(&self, cart: &Cart) -> Result<CartResponse, ApiError> {
        let totals = cart.totals(self.config.tax_rate, &self.config.shipping)?;

        Ok(CartResponse {
            items: cart.items.clone(),
            status: cart.status(),
            version: cart.version,
            totals: totals.summary(),
        })
    }
}

/// Prices a line-item payload under `config`'s tax rate and shipping rule.
///
/// Needs no database; the CLI's `price` command calls this directly.
pub fn price_lines(config: &StoreConfig, json: &str) -> Result<CartSummary, ApiError> {
    let lines = parse_cart_lines(json)?;
    let totals = compute_totals(&lines, config.tax_rate, &config.shipping)?;

    debug!(lines = lines.len(), item_count = totals.item_count, "price_lines");
    Ok(totals.summary())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use storefront_core::{Money, ShippingRule, TaxRate};

    use super::*;
    use crate::error::ErrorCode;

    async fn storefront() -> Storefront {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        for (id, name, price, stock) in [
            ("p1", "Slim Shirt", 1000, 10),
            ("p2", "Classic Pants", 500, 10),
            ("p3", "Rain Jacket", 9000, 1),
        ] {
            db.products()
                .insert(&Product {
                    id: id.to_string(),
                    name: name.to_string(),
                    slug: name.to_lowercase().replace(' ', "-"),
                    image: format!("/images/{}.jpg", id),
                    price: Money::from_cents(price),
                    count_in_stock: stock,
                })
                .await
                .unwrap();
        }

        Storefront::new(db, StoreConfig::default())
    }

    fn shopper() -> CartOwner {
        CartOwner::Session("s1".to_string())
    }

    #[tokio::test]
    async fn test_new_owner_sees_empty_cart() {
        let store = storefront().await;
        let cart = store.get_cart(&shopper()).await.unwrap();

        assert_eq!(cart.status, CartStatus::Empty);
        assert_eq!(cart.totals.item_count, 0);
        assert_eq!(cart.totals.total_price, "0.00");
        assert_eq!(cart.totals.shipping_price, "0.00");
    }

    #[tokio::test]
    async fn test_add_to_cart_prices_the_cart() {
        let store = storefront().await;

        store.add_to_cart(&shopper(), "p1", 2).await.unwrap();
        let cart = store.add_to_cart(&shopper(), "p2", 3).await.unwrap();

        assert_eq!(cart.status, CartStatus::Populated);
        assert_eq!(cart.version, 2);
        assert_eq!(cart.totals.item_count, 5);
        assert_eq!(cart.totals.items_price, "35.00");
        assert_eq!(cart.totals.tax_price, "5.25");
        assert_eq!(cart.totals.shipping_price, "10.00");
        assert_eq!(cart.totals.total_price, "50.25");

        assert_eq!(store.get_cart(&shopper()).await.unwrap(), cart);
    }

    #[tokio::test]
    async fn test_carts_are_per_owner() {
        let store = storefront().await;
        let other = CartOwner::User("42".to_string());

        store.add_to_cart(&shopper(), "p1", 1).await.unwrap();

        assert_eq!(store.get_cart(&other).await.unwrap().totals.item_count, 0);
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let store = storefront().await;
        let err = store.add_to_cart(&shopper(), "nope", 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = store.add_to_cart(&shopper(), "  ", 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_add_beyond_stock() {
        let store = storefront().await;

        store.add_to_cart(&shopper(), "p3", 1).await.unwrap();
        let err = store.add_to_cart(&shopper(), "p3", 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err = store.update_cart_item(&shopper(), "p3", 2).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let store = storefront().await;
        store.add_to_cart(&shopper(), "p1", 2).await.unwrap();
        store.add_to_cart(&shopper(), "p2", 1).await.unwrap();

        let cart = store.update_cart_item(&shopper(), "p1", 4).await.unwrap();
        assert_eq!(cart.totals.item_count, 5);

        let cart = store.update_cart_item(&shopper(), "p1", 0).await.unwrap();
        assert_eq!(cart.items.len(), 1);

        let err = store.update_cart_item(&shopper(), "p2", -1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);

        let cart = store.remove_from_cart(&shopper(), "p2").await.unwrap();
        assert_eq!(cart.status, CartStatus::Empty);

        let err = store.remove_from_cart(&shopper(), "p2").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[tokio::test]
    async fn test_failed_edit_leaves_no_cart_behind() {
        let store = storefront().await;

        let err = store.update_cart_item(&shopper(), "p1", 3).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        let err = store.update_cart_item(&shopper(), "p1", -1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);

        let err = store.remove_from_cart(&shopper(), "p1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        let stored = store.database().carts().get_by_owner(&shopper().key()).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let store = storefront().await;
        store.add_to_cart(&shopper(), "p1", 2).await.unwrap();

        let cart = store.clear_cart(&shopper()).await.unwrap();
        assert_eq!(cart.status, CartStatus::Empty);
        assert_eq!(cart.totals.total_price, "0.00");

        // Clearing an empty cart is a no-op
        let again = store.clear_cart(&shopper()).await.unwrap();
        assert_eq!(again.version, cart.version);
    }

    #[tokio::test]
    async fn test_checkout_places_order_and_empties_cart() {
        let store = storefront().await;
        store.add_to_cart(&shopper(), "p1", 2).await.unwrap();
        store.add_to_cart(&shopper(), "p2", 3).await.unwrap();

        let order = store.checkout(&shopper()).await.unwrap();
        assert_eq!(order.status, CartStatus::CheckedOut);
        assert_eq!(order.totals.total_price, "50.25");
        assert_eq!(order.items.len(), 2);

        let cart = store.get_cart(&shopper()).await.unwrap();
        assert_eq!(cart.status, CartStatus::Empty);

        let fetched = store.get_order(&shopper(), &order.id).await.unwrap();
        assert_eq!(fetched.totals, order.totals);

        let orders = store.list_orders(&shopper(), 10).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, order.id);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let store = storefront().await;

        let err = store.checkout(&shopper()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartEmpty);

        store.add_to_cart(&shopper(), "p1", 1).await.unwrap();
        store.clear_cart(&shopper()).await.unwrap();
        let err = store.checkout(&shopper()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartEmpty);
    }

    #[tokio::test]
    async fn test_orders_are_private_to_owner() {
        let store = storefront().await;
        store.add_to_cart(&shopper(), "p1", 1).await.unwrap();
        let order = store.checkout(&shopper()).await.unwrap();

        let other = CartOwner::User("42".to_string());
        let err = store.get_order(&other, &order.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(store.list_orders(&other, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_free_shipping_above_threshold() {
        let store = storefront().await;
        store.add_to_cart(&shopper(), "p3", 1).await.unwrap();
        let cart = store.add_to_cart(&shopper(), "p1", 2).await.unwrap();

        // 90.00 + 20.00 = 110.00 > 100.00
        assert_eq!(cart.totals.items_price, "110.00");
        assert_eq!(cart.totals.shipping_price, "0.00");
    }

    #[tokio::test]
    async fn test_price_lines() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Storefront::new(
            db,
            StoreConfig {
                tax_rate: TaxRate::zero(),
                shipping: ShippingRule::Free,
                ..StoreConfig::default()
            },
        );

        let summary = store
            .price_lines(
                r#"[{"productId":"p1","quantity":2,"unitPrice":"10.00"},
                    {"productId":"p2","quantity":3,"unitPrice":"5.00"}]"#,
            )
            .unwrap();
        assert_eq!(summary.item_count, 5);
        assert_eq!(summary.items_price, "35.00");

        assert_eq!(store.price_lines("[]").unwrap().total_price, "0.00");
        assert_eq!(store.price_lines("null").unwrap().item_count, 0);

        let err = store
            .price_lines(r#"[{"productId":"p1","quantity":1,"unitPrice":"9.999"}]"#)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidMoneyAmount);

        let err = store
            .price_lines(r#"[{"productId":"p1","quantity":-1,"unitPrice":"5.00"}]"#)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);

        let err = store
            .price_lines(
                r#"[{"productId":"p1","quantity":1,"unitPrice":"1.00"},
                    {"productId":"p1","quantity":2,"unitPrice":"5.00"}]"#,
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
