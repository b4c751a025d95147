//! # Order Repository
//!
//! Placing an order is the one write that spans two aggregates:
//!
//! ```text
//! BEGIN
//!   UPDATE carts SET version = version + 1 WHERE id = ? AND version = ?   ← guard
//!   DELETE FROM cart_items WHERE cart_id = ?                              ← cart → Empty
//!   INSERT INTO orders (...)                                              ← frozen totals
//!   INSERT INTO order_items (...) × N                                     ← frozen lines
//! COMMIT
//! ```
//!
//! Either the shopper has an order and an empty cart, or nothing changed.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use storefront_core::{Cart, CartItem, CartTotals, CheckoutSnapshot, Money, Order};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::cart::bump_version;
use crate::repository::{fetch_lines, insert_lines, LineTable};

#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderRecord {
    id: String,
    owner_key: String,
    item_count: i64,
    items_price_cents: i64,
    tax_price_cents: i64,
    shipping_price_cents: i64,
    total_price_cents: i64,
    created_at: DateTime<Utc>,
}

impl OrderRecord {
    fn totals(&self) -> CartTotals {
        CartTotals {
            item_count: self.item_count,
            items_price: Money::from_cents(self.items_price_cents),
            tax_price: Money::from_cents(self.tax_price_cents),
            shipping_price: Money::from_cents(self.shipping_price_cents),
            total_price: Money::from_cents(self.total_price_cents),
        }
    }
}

const SELECT_ORDER: &str = r#"
    SELECT
        id, owner_key, item_count,
        items_price_cents, tax_price_cents, shipping_price_cents, total_price_cents,
        created_at
    FROM orders
"#;

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Records an order and empties the cart it came from, atomically.
    ///
    /// `cart` is the cart as loaded (its `version` guards the write);
    /// `snapshot` is what [`Cart::check_out`] produced from it.
    ///
    /// ## Returns
    /// * `Ok(Order)` - The placed order
    /// * `Err(DbError::Conflict)` - The cart changed since it was loaded
    pub async fn place_order(&self, cart: &Cart, snapshot: &CheckoutSnapshot) -> DbResult<Order> {
        let order = Order {
            id: Uuid::new_v4().to_string(),
            owner_key: cart.owner_key.clone(),
            items: snapshot.items.clone(),
            totals: snapshot.totals,
            created_at: Utc::now(),
        };

        debug!(
            order_id = %order.id,
            cart_id = %cart.id,
            item_count = order.totals.item_count,
            "Placing order"
        );

        let mut tx = self.pool.begin().await?;

        bump_version(&mut tx, cart).await?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1")
            .bind(&cart.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, owner_key, item_count,
                items_price_cents, tax_price_cents, shipping_price_cents, total_price_cents,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&order.id)
        .bind(&order.owner_key)
        .bind(order.totals.item_count)
        .bind(order.totals.items_price.cents())
        .bind(order.totals.tax_price.cents())
        .bind(order.totals.shipping_price.cents())
        .bind(order.totals.total_price.cents())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        insert_lines(&mut tx, LineTable::Order, &order.id, &order.items).await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            total = %order.totals.total_price,
            "Order placed"
        );

        Ok(order)
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, OrderRecord>(&format!("{SELECT_ORDER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let order = match record {
            Some(record) => {
                let items = fetch_lines(&mut tx, LineTable::Order, &record.id).await?;
                Some(into_order(record, items))
            }
            None => None,
        };

        tx.commit().await?;
        Ok(order)
    }

    /// Lists an owner's orders, most recent first.
    pub async fn list_by_owner(&self, owner_key: &str, limit: u32) -> DbResult<Vec<Order>> {
        let mut tx = self.pool.begin().await?;

        // rowid follows insertion order
        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            "{SELECT_ORDER} WHERE owner_key = ?1 ORDER BY rowid DESC LIMIT ?2"
        ))
        .bind(owner_key)
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;

        let mut orders = Vec::with_capacity(records.len());
        for record in records {
            let items = fetch_lines(&mut tx, LineTable::Order, &record.id).await?;
            orders.push(into_order(record, items));
        }

        tx.commit().await?;

        debug!(owner = %owner_key, count = orders.len(), "Listed orders");
        Ok(orders)
    }
}

fn into_order(record: OrderRecord, items: Vec<CartItem>) -> Order {
    let totals = record.totals();
    Order {
        id: record.id,
        owner_key: record.owner_key,
        items,
        totals,
        created_at: record.created_at,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use storefront_core::shipping::ShippingRule;
    use storefront_core::{Product, TaxRate};

    use crate::error::DbError;
    use crate::{Database, DbConfig};

    use super::*;

    fn product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            slug: format!("product-{}", id),
            image: format!("/images/{}.jpg", id),
            price: Money::from_cents(price_cents),
            count_in_stock: 20,
        }
    }

    async fn populated_cart(db: &Database, owner: &str) -> Cart {
        let repo = db.carts();
        let mut cart = repo.get_or_create(owner).await.unwrap();
        cart.add_item(&product("p1", 1000), 2).unwrap();
        cart.add_item(&product("p2", 500), 3).unwrap();
        repo.save(&cart).await.unwrap()
    }

    #[tokio::test]
    async fn test_place_order_empties_cart() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let loaded = populated_cart(&db, "user:7").await;

        let mut cart = loaded.clone();
        let snapshot = cart
            .check_out(TaxRate::from_bps(1500), &ShippingRule::default())
            .unwrap();
        let order = db.orders().place_order(&loaded, &snapshot).await.unwrap();

        assert_eq!(order.totals.item_count, 5);
        assert_eq!(order.totals.summary().total_price, "50.25");

        let stored_cart = db.carts().get_by_owner("user:7").await.unwrap().unwrap();
        assert!(stored_cart.is_empty());
        assert_eq!(stored_cart.version, loaded.version + 1);

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored, Order { created_at: stored.created_at, ..order });
        assert_eq!(stored.items[0].product_id, "p1");
    }

    #[tokio::test]
    async fn test_place_order_with_stale_cart_conflicts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let loaded = populated_cart(&db, "user:7").await;

        // Another request edits the cart first
        let mut other = loaded.clone();
        other.update_quantity("p1", 5).unwrap();
        db.carts().save(&other).await.unwrap();

        let mut cart = loaded.clone();
        let snapshot = cart
            .check_out(TaxRate::zero(), &ShippingRule::Free)
            .unwrap();
        let err = db.orders().place_order(&loaded, &snapshot).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        // Nothing was written
        assert!(db.orders().list_by_owner("user:7", 10).await.unwrap().is_empty());
        let stored_cart = db.carts().get_by_owner("user:7").await.unwrap().unwrap();
        assert_eq!(stored_cart.item_count(), 8);
    }

    #[tokio::test]
    async fn test_list_by_owner_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut ids = Vec::new();
        for _ in 0..3 {
            let loaded = populated_cart(&db, "session:s1").await;
            let mut cart = loaded.clone();
            let snapshot = cart.check_out(TaxRate::zero(), &ShippingRule::Free).unwrap();
            ids.push(db.orders().place_order(&loaded, &snapshot).await.unwrap().id);
        }
        populated_cart(&db, "session:other").await;

        let orders = db.orders().list_by_owner("session:s1", 10).await.unwrap();
        let listed: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
        ids.reverse();
        assert_eq!(listed, ids);

        assert_eq!(db.orders().list_by_owner("session:s1", 2).await.unwrap().len(), 2);
        assert!(db.orders().list_by_owner("session:other", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.orders().get_by_id("nope").await.unwrap().is_none());
    }
}
