//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storefront service                                                    │
//! │       │                                                                 │
//! │       │  db.carts().get_or_create("session:abc")                       │
//! │       ▼                                                                 │
//! │  CartRepository          OrderRepository         ProductRepository     │
//! │  ├── get_by_owner        ├── place_order         ├── get_by_id         │
//! │  ├── get_or_create       ├── get_by_id           ├── insert            │
//! │  ├── save (versioned)    └── list_by_owner       ├── list              │
//! │  └── delete                                      └── count             │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked, FromRow records)                        │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart lines and order lines share one row shape; [`LineRecord`] maps both
//! back to [`CartItem`].

use sqlx::{Sqlite, Transaction};
use storefront_core::{CartItem, Money};

use crate::error::DbResult;

pub mod cart;
pub mod order;
pub mod product;

/// A stored line from `cart_items` or `order_items`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct LineRecord {
    pub product_id: String,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl From<LineRecord> for CartItem {
    fn from(record: LineRecord) -> Self {
        CartItem {
            product_id: record.product_id,
            name: record.name,
            slug: record.slug,
            image: record.image,
            quantity: record.quantity,
            unit_price: Money::from_cents(record.unit_price_cents),
        }
    }
}

/// Where a line sequence lives.
#[derive(Debug, Clone, Copy)]
pub(crate) enum LineTable {
    Cart,
    Order,
}

impl LineTable {
    fn select_sql(self) -> &'static str {
        match self {
            LineTable::Cart => {
                r#"
                SELECT product_id, name, slug, image, quantity, unit_price_cents
                FROM cart_items
                WHERE cart_id = ?1
                ORDER BY position
                "#
            }
            LineTable::Order => {
                r#"
                SELECT product_id, name, slug, image, quantity, unit_price_cents
                FROM order_items
                WHERE order_id = ?1
                ORDER BY position
                "#
            }
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            LineTable::Cart => {
                r#"
                INSERT INTO cart_items (
                    cart_id, product_id, position, name, slug, image,
                    quantity, unit_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#
            }
            LineTable::Order => {
                r#"
                INSERT INTO order_items (
                    order_id, product_id, position, name, slug, image,
                    quantity, unit_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#
            }
        }
    }
}

/// Loads the lines of a cart or order in their stored order.
pub(crate) async fn fetch_lines(
    tx: &mut Transaction<'_, Sqlite>,
    table: LineTable,
    parent_id: &str,
) -> DbResult<Vec<CartItem>> {
    let records = sqlx::query_as::<_, LineRecord>(table.select_sql())
        .bind(parent_id)
        .fetch_all(&mut **tx)
        .await?;

    Ok(records.into_iter().map(CartItem::from).collect())
}

/// Appends `items` under `parent_id`, numbering positions from zero.
pub(crate) async fn insert_lines(
    tx: &mut Transaction<'_, Sqlite>,
    table: LineTable,
    parent_id: &str,
    items: &[CartItem],
) -> DbResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(table.insert_sql())
            .bind(parent_id)
            .bind(&item.product_id)
            .bind(position as i64)
            .bind(&item.name)
            .bind(&item.slug)
            .bind(&item.image)
            .bind(item.quantity)
            .bind(item.unit_price.cents())
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}
