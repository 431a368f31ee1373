// Parameterized SQL text built from row/filter maps. Both backends share
// these builders; only the placeholder style differs (`?` vs `$n`).
// Callers bind values in the same deterministic order the maps iterate in.

use crate::core::database::SqlDialect;

fn placeholder(dialect: SqlDialect, index: usize) -> String {
    match dialect {
        SqlDialect::Sqlite => "?".to_string(),
        SqlDialect::Postgres => format!("${}", index + 1),
    }
}

fn conjunction(dialect: SqlDialect, keys: &[&str], offset: usize) -> String {
    keys.iter()
        .enumerate()
        .map(|(i, key)| format!("{key} = {}", placeholder(dialect, offset + i)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

pub fn build_select(dialect: SqlDialect, table: &str, filter_keys: &[&str]) -> String {
    if filter_keys.is_empty() {
        format!("SELECT * FROM {table};")
    } else {
        format!(
            "SELECT * FROM {table} WHERE {};",
            conjunction(dialect, filter_keys, 0)
        )
    }
}

pub fn build_insert(dialect: SqlDialect, table: &str, keys: &[&str]) -> String {
    let placeholders = (0..keys.len())
        .map(|i| placeholder(dialect, i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({});",
        keys.join(", "),
        placeholders
    )
}

pub fn build_update(
    dialect: SqlDialect,
    table: &str,
    set_keys: &[&str],
    filter_keys: &[&str],
) -> String {
    let set_clause = set_keys
        .iter()
        .enumerate()
        .map(|(i, key)| format!("{key} = {}", placeholder(dialect, i)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {table} SET {set_clause} WHERE {};",
        conjunction(dialect, filter_keys, set_keys.len())
    )
}

pub fn build_delete(dialect: SqlDialect, table: &str, filter_keys: &[&str]) -> String {
    format!(
        "DELETE FROM {table} WHERE {};",
        conjunction(dialect, filter_keys, 0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_without_filter_has_no_where_clause() {
        assert_eq!(
            build_select(SqlDialect::Sqlite, "Locales", &[]),
            "SELECT * FROM Locales;"
        );
    }

    #[test]
    fn sqlite_uses_question_mark_placeholders() {
        assert_eq!(
            build_select(SqlDialect::Sqlite, "Locales", &["guildID", "locale"]),
            "SELECT * FROM Locales WHERE guildID = ? AND locale = ?;"
        );
        assert_eq!(
            build_insert(SqlDialect::Sqlite, "Locales", &["guildID", "locale"]),
            "INSERT INTO Locales (guildID, locale) VALUES (?, ?);"
        );
    }

    #[test]
    fn postgres_numbers_placeholders_across_set_and_where() {
        assert_eq!(
            build_update(SqlDialect::Postgres, "Locales", &["locale"], &["guildID"]),
            "UPDATE Locales SET locale = $1 WHERE guildID = $2;"
        );
        assert_eq!(
            build_delete(SqlDialect::Postgres, "Logs", &["guildID", "channelID"]),
            "DELETE FROM Logs WHERE guildID = $1 AND channelID = $2;"
        );
    }
}
