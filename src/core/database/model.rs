// Row model for the persistence layer. A row is just an ordered map of
// column name to scalar; filters are exact-match AND-conjunctions of the
// same shape.

use std::collections::BTreeMap;

/// A scalar cell value. The persistence layer deals only in these three
/// primitive types plus NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Null,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

/// One row exchanged with the store. BTreeMap keeps column iteration
/// deterministic, which also fixes the parameter order of generated SQL.
pub type Row = BTreeMap<String, Value>;

/// Exact-match filter over column/value pairs, ANDed together.
pub type RowFilter = BTreeMap<String, Value>;

/// Shorthand for building rows and filters inline.
///
/// ```ignore
/// let filter = row! { "guildID" => "g1" };
/// ```
#[macro_export]
macro_rules! row {
    ( $( $key:expr => $value:expr ),* $(,)? ) => {{
        let mut map = $crate::core::database::Row::new();
        $( map.insert($key.to_string(), $crate::core::database::Value::from($value)); )*
        map
    }};
}
