// Backend selection happens once at startup from the connection URL scheme.
// `sqlite:` opens the embedded file engine, `postgres:`/`postgresql:` the
// pooled network engine; anything else is refused.

pub mod postgres;
pub mod sql;
pub mod sqlite;

use crate::core::database::{tables, Database, DatabaseError};
use std::sync::Arc;

pub async fn connect(database_url: &str) -> Result<Arc<dyn Database>, DatabaseError> {
    if database_url.starts_with("sqlite:") {
        Ok(Arc::new(sqlite::SqliteDatabase::connect(database_url).await?))
    } else if database_url.starts_with("postgres:") || database_url.starts_with("postgresql:") {
        Ok(Arc::new(
            postgres::PostgresDatabase::connect(database_url).await?,
        ))
    } else {
        let scheme = database_url
            .split(':')
            .next()
            .unwrap_or(database_url)
            .to_string();
        Err(DatabaseError::UnsupportedScheme(scheme))
    }
}

/// Connect and create every declared table. Schema errors are fatal to the
/// caller; the statements themselves are `IF NOT EXISTS` and safe to re-run.
pub async fn init(database_url: &str) -> Result<Arc<dyn Database>, DatabaseError> {
    let db = connect(database_url).await?;
    for table in tables::declared_tables() {
        db.create_table(&table).await?;
    }
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refuses_unknown_url_schemes() {
        let err = connect("mysql://localhost/bot").await.unwrap_err();
        assert!(matches!(err, DatabaseError::UnsupportedScheme(s) if s == "mysql"));
    }

    #[tokio::test]
    async fn selects_sqlite_for_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("bot.db").display());

        let db = init(&url).await.unwrap();
        // Declared tables exist and are queryable right away.
        let rows = db.get(tables::LOCALES, None).await.unwrap();
        assert!(rows.is_empty());
    }
}
