// Networked backend over a sqlx Postgres pool. Same four-operation contract
// as SQLite; only the placeholder dialect and value decoding differ. The
// pool governs concurrency, nothing else does.

use crate::core::database::{
    Database, DatabaseError, Row, RowFilter, SqlDialect, TableSchema, Value,
};
use crate::infra::database::sql;
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::{Column, Pool, Postgres, Row as _, TypeInfo, ValueRef};

#[derive(Debug)]
pub struct PostgresDatabase {
    pool: Pool<Postgres>,
}

impl PostgresDatabase {
    pub async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new().connect(database_url).await?;
        Ok(Self { pool })
    }
}

fn bind_values<'q>(
    mut query: sqlx::query::Query<'q, Postgres, PgArguments>,
    values: impl Iterator<Item = &'q Value>,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
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

fn decode_row(row: &PgRow) -> Result<Row, DatabaseError> {
    let mut out = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match column.type_info().name() {
                "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" => Value::Text(row.try_get(index)?),
                "INT2" => Value::Integer(i64::from(row.try_get::<i16, _>(index)?)),
                "INT4" => Value::Integer(i64::from(row.try_get::<i32, _>(index)?)),
                "INT8" => Value::Integer(row.try_get(index)?),
                "BOOL" => Value::Boolean(row.try_get(index)?),
                other => {
                    return Err(DatabaseError::UnsupportedValue {
                        column: column.name().to_string(),
                        detail: format!("unsupported Postgres type '{other}'"),
                    })
                }
            }
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn get(&self, table: &str, filter: Option<&RowFilter>) -> Result<Vec<Row>, DatabaseError> {
        let filter_keys: Vec<&str> = filter
            .map(|f| f.keys().map(String::as_str).collect())
            .unwrap_or_default();
        let query_sql = sql::build_select(SqlDialect::Postgres, table, &filter_keys);

        let mut query = sqlx::query(&query_sql);
        if let Some(filter) = filter {
            query = bind_values(query, filter.values());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn insert(&self, table: &str, row: &Row) -> Result<(), DatabaseError> {
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        let query_sql = sql::build_insert(SqlDialect::Postgres, table, &keys);

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
        let query_sql = sql::build_update(SqlDialect::Postgres, table, &set_keys, &filter_keys);

        bind_values(sqlx::query(&query_sql), changes.values().chain(filter.values()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, table: &str, filter: &RowFilter) -> Result<(), DatabaseError> {
        let filter_keys: Vec<&str> = filter.keys().map(String::as_str).collect();
        let query_sql = sql::build_delete(SqlDialect::Postgres, table, &filter_keys);

        bind_values(sqlx::query(&query_sql), filter.values())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_table(&self, table: &TableSchema) -> Result<(), DatabaseError> {
        let create_sql = table.create_sql(SqlDialect::Postgres)?;
        sqlx::query(&create_sql).execute(&self.pool).await?;
        Ok(())
    }
}
