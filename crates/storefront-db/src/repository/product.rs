//! # Product Repository
//!
//! Read access to the catalog for cart operations, plus inserts for seeding.
//! Prices are stored as integer cents.

use chrono::Utc;
use sqlx::SqlitePool;
use storefront_core::{Money, Product};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductRecord {
    id: String,
    name: String,
    slug: String,
    image: String,
    price_cents: i64,
    count_in_stock: i64,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Product {
            id: record.id,
            name: record.name,
            slug: record.slug,
            image: record.image,
            price: Money::from_cents(record.price_cents),
            count_in_stock: record.count_in_stock,
        }
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let product = db.products().get_by_id("p1").await?;
/// let page = db.products().list(20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let record = sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT id, name, slug, image, price_cents, count_in_stock
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Product::from))
    }

    /// Lists products sorted by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let records = sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT id, name, slug, image, price_cents, count_in_stock
            FROM products
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Product::from).collect())
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - ID or slug already exists
    /// * `Err(DbError::CheckViolation)` - Negative price or stock
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, slug = %product.slug, "Inserting product");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, slug, image, price_cents, count_in_stock,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.image)
        .bind(product.price.cents())
        .bind(product.count_in_stock)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};

    fn product(name: &str, slug: &str, price_cents: i64) -> Product {
        Product {
            id: generate_product_id(),
            name: name.to_string(),
            slug: slug.to_string(),
            image: format!("/images/{}.jpg", slug),
            price: Money::from_cents(price_cents),
            count_in_stock: 10,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let desk = product("Walnut Desk", "walnut-desk", 24999);
        repo.insert(&desk).await.unwrap();

        let loaded = repo.get_by_id(&desk.id).await.unwrap();
        assert_eq!(loaded, Some(desk));
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&product("Shelf", "shelf", 4500)).await.unwrap();
        repo.insert(&product("Armchair", "armchair", 19900)).await.unwrap();
        repo.insert(&product("Lamp", "lamp", 2999)).await.unwrap();

        let names: Vec<String> = repo.list(10).await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Armchair", "Lamp", "Shelf"]);
        assert_eq!(repo.list(2).await.unwrap().len(), 2);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&product("Lamp", "lamp", 2999)).await.unwrap();
        let err = repo.insert(&product("Lamp II", "lamp", 3999)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db
            .products()
            .insert(&product("Broken", "broken", -1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }
}
