// Persistence abstraction: a four-operation capability trait over named
// tables with exact-match row filters. Two interchangeable backends live in
// the infra layer (embedded SQLite file, pooled Postgres); this module only
// defines the contract and the shared row/schema model.

pub mod model;
pub mod schema;
pub mod tables;

pub use model::{Row, RowFilter, Value};
pub use schema::{ColumnDef, ColumnType, SqlDialect, TableSchema};

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("unsupported database URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("invalid table schema: {0}")]
    InvalidSchema(String),
    #[error("unsupported column value in '{column}': {detail}")]
    UnsupportedValue { column: String, detail: String },
    #[error(transparent)]
    Driver(#[from] sqlx::Error),
}

/// The store contract. Filters are exact-match AND-conjunctions; there is no
/// ordering, ranging, or joining, and no locking or transaction guarantee
/// beyond what the driver provides. SQL errors propagate to the caller.
#[async_trait]
pub trait Database: Send + Sync + std::fmt::Debug {
    /// Select all rows, optionally narrowed by an exact-match filter.
    async fn get(&self, table: &str, filter: Option<&RowFilter>) -> Result<Vec<Row>, DatabaseError>;

    async fn insert(&self, table: &str, row: &Row) -> Result<(), DatabaseError>;

    async fn update(
        &self,
        table: &str,
        changes: &Row,
        filter: &RowFilter,
    ) -> Result<(), DatabaseError>;

    async fn delete(&self, table: &str, filter: &RowFilter) -> Result<(), DatabaseError>;

    /// Idempotent `CREATE TABLE IF NOT EXISTS` from a declared descriptor.
    /// Safe to re-run across restarts.
    async fn create_table(&self, table: &TableSchema) -> Result<(), DatabaseError>;
}
