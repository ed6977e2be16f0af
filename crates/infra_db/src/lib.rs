//! Infrastructure Database Layer
//!
//! PostgreSQL implementation of the kernel's `RecordStore` port. Every
//! collection (properties, units, readings, payments, ...) lives in a single
//! `records` table as JSONB documents keyed by `(collection, id)`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresRecordStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/rental")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresRecordStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod record_store;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use record_store::PostgresRecordStore;
