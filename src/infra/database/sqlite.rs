// Embedded single-file backend. One sqlx pool over the SQLite file; the
// runtime's cooperative scheduling serializes access, no extra locking here.

use crate::core::database::{
    Database, DatabaseError, Row, RowFilter, SqlDialect, TableSchema, Value,
};
use crate::infra::database::sql;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Pool, Row as _, Sqlite, TypeInfo, ValueRef};
use std::path::Path;

#[derive(Debug)]
pub struct SqliteDatabase {
    pool: Pool<Sqlite>,
}

impl SqliteDatabase {
    /// Open (creating if needed) the database file named by `database_url`,
    /// e.g. `sqlite://data/meteor.db`.
    pub async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        let path_str = database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:")
            .split('?')
            .next()
            .unwrap_or_default();
        if !database_url.contains(":memory:") && !Path::new(path_str).exists() {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
            }
            std::fs::File::create(path_str).map_err(sqlx::Error::Io)?;
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{database_url}")
        };

        let pool = SqlitePoolOptions::new().connect(&conn_str).await?;
        Ok(Self { pool })
    }
}

fn bind_values<'q>(
    mut query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    values: impl Iterator<Item = &'q Value>,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            Value::Text(s) => query.bind(s.as_str()),
            Value::Integer(i) => query.bind(*i),
            Value::Boolean(b) => query.bind(*b),
            Value::Null => query.bind(Option::<String>::None),
        };
    }
    query
}

fn decode_row(row: &SqliteRow) -> Result<Row, DatabaseError> {
    let mut out = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            // Prefer the declared column type; SQLite stores booleans as
            // integers, so the raw storage class alone is not enough.
            let type_name = column.type_info().name().to_ascii_uppercase();
            match type_name.as_str() {
                "BOOLEAN" | "BOOL" => Value::Boolean(row.try_get(index)?),
                name if name.contains("INT") => Value::Integer(row.try_get(index)?),
                "TEXT" | "VARCHAR" => Value::Text(row.try_get(index)?),
                _ => {
                    return Err(DatabaseError::UnsupportedValue {
                        column: column.name().to_string(),
                        detail: format!("unsupported SQLite type '{type_name}'"),
                    })
                }
            }
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn get(&self, table: &str, filter: Option<&RowFilter>) -> Result<Vec<Row>, DatabaseError> {
        let filter_keys: Vec<&str> = filter
            .map(|f| f.keys().map(String::as_str).collect())
            .unwrap_or_default();
        let query_sql = sql::build_select(SqlDialect::Sqlite, table, &filter_keys);

        let mut query = sqlx::query(&query_sql);
        if let Some(filter) = filter {
            query = bind_values(query, filter.values());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn insert(&self, table: &str, row: &Row) -> Result<(), DatabaseError> {
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        let query_sql = sql::build_insert(SqlDialect::Sqlite, table, &keys);

        bind_values(sqlx::query(&query_sql), row.values())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        table: &str,
        changes: &Row,
        filter: &RowFilter,
    ) -> Result<(), DatabaseError> {
        let set_keys: Vec<&str> = changes.keys().map(String::as_str).collect();
        let filter_keys: Vec<&str> = filter.keys().map(String::as_str).collect();
        let query_sql = sql::build_update(SqlDialect::Sqlite, table, &set_keys, &filter_keys);

        bind_values(sqlx::query(&query_sql), changes.values().chain(filter.values()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, table: &str, filter: &RowFilter) -> Result<(), DatabaseError> {
        let filter_keys: Vec<&str> = filter.keys().map(String::as_str).collect();
        let query_sql = sql::build_delete(SqlDialect::Sqlite, table, &filter_keys);

        bind_values(sqlx::query(&query_sql), filter.values())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_table(&self, table: &TableSchema) -> Result<(), DatabaseError> {
        let create_sql = table.create_sql(SqlDialect::Sqlite)?;
        sqlx::query(&create_sql).execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::tables;
    use crate::row;

    async fn open_store(dir: &tempfile::TempDir) -> SqliteDatabase {
        let path = dir.path().join("test.db");
        let db = SqliteDatabase::connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .unwrap();
        for table in tables::declared_tables() {
            db.create_table(&table).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn table_creation_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_store(&dir).await;

        // Running schema creation again must not error or alter anything.
        for table in tables::declared_tables() {
            db.create_table(&table).await.unwrap();
        }

        db.insert(tables::LOCALES, &row! { "guildID" => "g1", "locale" => "PL" })
            .await
            .unwrap();
        let rows = db.get(tables::LOCALES, None).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn get_on_empty_table_returns_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_store(&dir).await;

        let filter = row! { "guildID" => "g1" };
        let rows = db.get(tables::LOCALES, Some(&filter)).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn insert_then_get_round_trips_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_store(&dir).await;

        db.insert(tables::LOCALES, &row! { "guildID" => "g1", "locale" => "PL" })
            .await
            .unwrap();

        let filter = row! { "guildID" => "g1" };
        let rows = db.get(tables::LOCALES, Some(&filter)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["locale"], Value::Text("PL".to_string()));
        // The autoincrement id was assigned by the store.
        assert!(matches!(rows[0]["id"], Value::Integer(n) if n > 0));
    }

    #[tokio::test]
    async fn update_changes_only_matching_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_store(&dir).await;

        db.insert(tables::LOCALES, &row! { "guildID" => "g1", "locale" => "PL" })
            .await
            .unwrap();
        db.insert(tables::LOCALES, &row! { "guildID" => "g2", "locale" => "ES" })
            .await
            .unwrap();

        db.update(
            tables::LOCALES,
            &row! { "locale" => "EN" },
            &row! { "guildID" => "g1" },
        )
        .await
        .unwrap();

        let g1 = db
            .get(tables::LOCALES, Some(&row! { "guildID" => "g1" }))
            .await
            .unwrap();
        let g2 = db
            .get(tables::LOCALES, Some(&row! { "guildID" => "g2" }))
            .await
            .unwrap();
        assert_eq!(g1[0]["locale"], Value::Text("EN".to_string()));
        assert_eq!(g2[0]["locale"], Value::Text("ES".to_string()));
    }

    #[tokio::test]
    async fn delete_removes_matching_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_store(&dir).await;

        db.insert(tables::LOGS, &row! { "guildID" => "g1", "channelID" => "c1" })
            .await
            .unwrap();
        db.delete(tables::LOGS, &row! { "guildID" => "g1" })
            .await
            .unwrap();

        let rows = db.get(tables::LOGS, None).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn filters_are_and_conjunctions() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_store(&dir).await;

        db.insert(tables::LOCALES, &row! { "guildID" => "g1", "locale" => "PL" })
            .await
            .unwrap();

        let mismatch = row! { "guildID" => "g1", "locale" => "ES" };
        let rows = db.get(tables::LOCALES, Some(&mismatch)).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn sql_errors_propagate_to_the_caller() {
        let dir = tempfile::tempdir().unwrap();
        let db = open_store(&dir).await;

        let err = db.get("NoSuchTable", None).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Driver(_)));
    }
}
