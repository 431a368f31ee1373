// Explicit table descriptors. Each table the bot persists is declared as a
// plain value object, and `create_sql` derives the dialect-specific
// `CREATE TABLE IF NOT EXISTS` statement from it. Descriptors are immutable
// after declaration and schema creation is idempotent.

use super::DatabaseError;

/// Placeholder dialect and identity-column syntax differ between backends;
/// everything else about the generated SQL is shared.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SqlDialect {
    Sqlite,
    Postgres,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
    Boolean,
}

impl ColumnType {
    fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
            ColumnType::Boolean => "BOOLEAN",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub primary: bool,
    pub autoincrement: bool,
}

impl ColumnDef {
    pub fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            primary: false,
            autoincrement: false,
        }
    }

    /// Primary auto-incrementing integer id, the first column of every table.
    pub fn id() -> Self {
        Self {
            name: "id",
            ty: ColumnType::Integer,
            primary: true,
            autoincrement: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(name: &'static str, columns: Vec<ColumnDef>) -> Self {
        Self { name, columns }
    }

    /// Render the idempotent create statement for `dialect`.
    ///
    /// A malformed descriptor (no columns, or autoincrement on a non-integer
    /// column) is a fatal startup error, not something to paper over.
    pub fn create_sql(&self, dialect: SqlDialect) -> Result<String, DatabaseError> {
        if self.name.is_empty() || self.columns.is_empty() {
            return Err(DatabaseError::InvalidSchema(format!(
                "table '{}' has no columns",
                self.name
            )));
        }

        let mut definitions = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            if column.autoincrement && column.ty != ColumnType::Integer {
                return Err(DatabaseError::InvalidSchema(format!(
                    "column '{}.{}' is autoincrement but not INTEGER",
                    self.name, column.name
                )));
            }

            let mut clauses = vec![format!("\"{}\"", column.name), column.ty.sql_type().to_string()];
            if column.primary {
                clauses.push("PRIMARY KEY".to_string());
            }
            if column.autoincrement {
                clauses.push(
                    match dialect {
                        SqlDialect::Sqlite => "AUTOINCREMENT",
                        SqlDialect::Postgres => "GENERATED ALWAYS AS IDENTITY",
                    }
                    .to_string(),
                );
            }
            definitions.push(clauses.join(" "));
        }

        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            self.name,
            definitions.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locales_table() -> TableSchema {
        TableSchema::new(
            "Locales",
            vec![
                ColumnDef::id(),
                ColumnDef::new("guildID", ColumnType::Text),
                ColumnDef::new("locale", ColumnType::Text),
            ],
        )
    }

    #[test]
    fn renders_sqlite_create_statement() {
        let sql = locales_table().create_sql(SqlDialect::Sqlite).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS Locales (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \
             \"guildID\" TEXT, \"locale\" TEXT);"
        );
    }

    #[test]
    fn renders_postgres_identity_column() {
        let sql = locales_table().create_sql(SqlDialect::Postgres).unwrap();
        assert!(sql.contains("\"id\" INTEGER PRIMARY KEY GENERATED ALWAYS AS IDENTITY"));
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS Locales"));
    }

    #[test]
    fn rejects_empty_tables() {
        let schema = TableSchema::new("Empty", vec![]);
        assert!(matches!(
            schema.create_sql(SqlDialect::Sqlite),
            Err(DatabaseError::InvalidSchema(_))
        ));
    }

    #[test]
    fn rejects_autoincrement_on_text_column() {
        let mut column = ColumnDef::new("name", ColumnType::Text);
        column.autoincrement = true;
        let schema = TableSchema::new("Broken", vec![column]);
        assert!(matches!(
            schema.create_sql(SqlDialect::Postgres),
            Err(DatabaseError::InvalidSchema(_))
        ));
    }
}
