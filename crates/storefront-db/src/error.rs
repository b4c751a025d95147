//! Errors from the storage layer.
//!
//! sqlx failures are classified here (constraint kind, pool state) so the
//! app can map them to stable codes without string-matching SQLite output.
//! Optimistic-concurrency losses get their own `Conflict` variant.

use storefront_core::CoreError;
use thiserror::Error;

/// Anything a repository call can fail with.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row for the given key.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Another writer saved the entity first.
    ///
    /// ## When This Occurs
    /// ```text
    /// Request A: load cart (v3) ──────────────► save(v3) ✓ → v4
    /// Request B: load cart (v3) ───────────────────────────► save(v3) ✗
    /// ```
    /// The caller reloads and reapplies its change.
    #[error("{entity} {id} was modified concurrently")]
    Conflict { entity: String, id: String },

    /// A `UNIQUE` column already holds this value (product slug, owner key).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A line points at a cart or order row that does not exist.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (e.g. a stored quantity below 1).
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// Stored data failed domain validation on the way out.
    #[error("Invalid stored data: {0}")]
    Domain(#[from] CoreError),

    /// The database file could not be opened or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected the statement for a reason not classified above.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::Conflict {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Classifies a sqlx failure.
///
/// ```text
/// RowNotFound               → NotFound
/// Database("UNIQUE ...")    → UniqueViolation { field: "<table>.<column>" }
/// Database("FOREIGN KEY..") → ForeignKeyViolation
/// Database("CHECK ...")     → CheckViolation
/// PoolTimedOut / PoolClosed → PoolExhausted / ConnectionFailed
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();

                let unique_field = message
                    .strip_prefix("UNIQUE constraint failed: ")
                    .map(str::to_owned);

                if let Some(field) = unique_field {
                    DbError::duplicate(field, "unknown")
                } else if message.starts_with("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation { message }
                } else if message.starts_with("CHECK constraint failed") {
                    DbError::CheckViolation { message }
                } else {
                    DbError::QueryFailed(message)
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_pool_errors() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_core_error_converts() {
        let err: DbError = CoreError::invalid_money("-1.00").into();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidMoneyAmount { .. })));
    }

    #[test]
    fn test_conflict_message() {
        let err = DbError::conflict("Cart", "c1");
        assert_eq!(err.to_string(), "Cart c1 was modified concurrently");
    }
}
