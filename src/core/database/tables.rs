// The fixed set of tables the bot persists. Declared here as value objects
// so both backends derive their schema from the same source.

use super::schema::{ColumnDef, ColumnType, TableSchema};

/// Per-guild locale overrides.
pub const LOCALES: &str = "Locales";
/// Per-guild logging destinations.
pub const LOGS: &str = "Logs";

pub fn declared_tables() -> Vec<TableSchema> {
    vec![
        TableSchema::new(
            LOCALES,
            vec![
                ColumnDef::id(),
                ColumnDef::new("guildID", ColumnType::Text),
                ColumnDef::new("locale", ColumnType::Text),
            ],
        ),
        TableSchema::new(
            LOGS,
            vec![
                ColumnDef::id(),
                ColumnDef::new("guildID", ColumnType::Text),
                ColumnDef::new("channelID", ColumnType::Text),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::schema::SqlDialect;

    #[test]
    fn every_declared_table_has_a_primary_id_and_valid_sql() {
        for table in declared_tables() {
            let id = &table.columns[0];
            assert_eq!(id.name, "id");
            assert!(id.primary && id.autoincrement);
            table.create_sql(SqlDialect::Sqlite).unwrap();
            table.create_sql(SqlDialect::Postgres).unwrap();
        }
    }
}
