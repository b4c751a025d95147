//! # Cart Repository
//!
//! One cart per owner key, stored as a `carts` row plus an ordered
//! `cart_items` sequence.
//!
//! ## Optimistic Concurrency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load (version = 3) ──► mutate in memory ──► save                      │
//! │                                                │                        │
//! │      UPDATE carts SET version = 4 WHERE id = ? AND version = 3         │
//! │                                                │                        │
//! │                    1 row ──► replace items, commit, return v4          │
//! │                    0 rows ─► DbError::Conflict (nothing written)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Two requests editing the same cart can't silently overwrite each other;
//! the loser reloads and retries.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use storefront_core::Cart;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{fetch_lines, insert_lines, LineTable};

#[derive(Debug, Clone, sqlx::FromRow)]
struct CartRecord {
    id: String,
    owner_key: String,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Loads the cart for an owner key, items in insertion order.
    pub async fn get_by_owner(&self, owner_key: &str) -> DbResult<Option<Cart>> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, CartRecord>(
            r#"
            SELECT id, owner_key, version, created_at, updated_at
            FROM carts
            WHERE owner_key = ?1
            "#,
        )
        .bind(owner_key)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = record else {
            tx.commit().await?;
            return Ok(None);
        };

        let items = fetch_lines(&mut tx, LineTable::Cart, &record.id).await?;
        tx.commit().await?;

        Ok(Some(Cart {
            id: record.id,
            owner_key: record.owner_key,
            items,
            version: record.version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }))
    }

    /// Loads the owner's cart, creating an empty one on first use.
    ///
    /// Safe under concurrent first requests: the unique `owner_key` lets
    /// only one insert win and everyone reads back the same cart.
    pub async fn get_or_create(&self, owner_key: &str) -> DbResult<Cart> {
        if let Some(cart) = self.get_by_owner(owner_key).await? {
            return Ok(cart);
        }

        let cart = Cart::new(owner_key);
        debug!(owner = %owner_key, cart_id = %cart.id, "Creating cart");

        sqlx::query(
            r#"
            INSERT INTO carts (id, owner_key, version, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (owner_key) DO NOTHING
            "#,
        )
        .bind(&cart.id)
        .bind(&cart.owner_key)
        .bind(cart.version)
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(&self.pool)
        .await?;

        self.get_by_owner(owner_key)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", owner_key))
    }

    /// Persists the cart's item sequence, replacing what is stored.
    ///
    /// ## Returns
    /// * `Ok(Cart)` - The saved cart with its new `version`
    /// * `Err(DbError::Conflict)` - Someone saved since this cart was loaded
    /// * `Err(DbError::NotFound)` - The cart row no longer exists
    pub async fn save(&self, cart: &Cart) -> DbResult<Cart> {
        debug!(
            cart_id = %cart.id,
            version = cart.version,
            lines = cart.items.len(),
            "Saving cart"
        );

        let mut tx = self.pool.begin().await?;

        let version = bump_version(&mut tx, cart).await?;
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1")
            .bind(&cart.id)
            .execute(&mut *tx)
            .await?;
        insert_lines(&mut tx, LineTable::Cart, &cart.id, &cart.items).await?;

        tx.commit().await?;

        let mut saved = cart.clone();
        saved.version = version;
        Ok(saved)
    }

    /// Deletes the owner's cart and its items.
    ///
    /// Returns `false` if there was no cart.
    pub async fn delete(&self, owner_key: &str) -> DbResult<bool> {
        debug!(owner = %owner_key, "Deleting cart");

        let result = sqlx::query("DELETE FROM carts WHERE owner_key = ?1")
            .bind(owner_key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Advances the stored version if it still matches `cart.version`.
///
/// Returns the new version. Shared with order placement so checkout and
/// cart edits guard each other.
pub(crate) async fn bump_version(tx: &mut Transaction<'_, Sqlite>, cart: &Cart) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        UPDATE carts
        SET version = version + 1, updated_at = ?3
        WHERE id = ?1 AND version = ?2
        "#,
    )
    .bind(&cart.id)
    .bind(cart.version)
    .bind(cart.updated_at)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(cart.version + 1);
    }

    let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts WHERE id = ?1")
        .bind(&cart.id)
        .fetch_one(&mut **tx)
        .await?;

    if exists == 0 {
        Err(DbError::not_found("Cart", &cart.id))
    } else {
        debug!(cart_id = %cart.id, version = cart.version, "Stale cart version");
        Err(DbError::conflict("Cart", &cart.id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
