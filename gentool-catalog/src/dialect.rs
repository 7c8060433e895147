//! Database dialect tags

use serde::{Deserialize, Serialize};
use std::fmt;

/// A database dialect, identified by its lowercase tag.
///
/// Tags outside the known set are kept verbatim in [`Dialect::Other`] so the
/// connect step can report exactly what was asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Dialect {
    #[default]
    MySql,
    Postgres,
    Sqlite,
    SqlServer,
    ClickHouse,
    Other(String),
}

impl Dialect {
    /// Map a tag to a dialect. Matching is exact: `"MySQL"` is not `mysql`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "mysql" => Dialect::MySql,
            "postgres" => Dialect::Postgres,
            "sqlite" => Dialect::Sqlite,
            "sqlserver" => Dialect::SqlServer,
            "clickhouse" => Dialect::ClickHouse,
            other => Dialect::Other(other.to_string()),
        }
    }

    /// The lowercase tag of this dialect
    pub fn as_str(&self) -> &str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
            Dialect::SqlServer => "sqlserver",
            Dialect::ClickHouse => "clickhouse",
            Dialect::Other(tag) => tag,
        }
    }

    /// `<tag>://`, the URL prefix a DSN for this dialect may carry
    pub fn scheme_prefix(&self) -> String {
        format!("{}://", self.as_str())
    }

    /// Whether this is one of the five known dialects
    pub fn is_known(&self) -> bool {
        !matches!(self, Dialect::Other(_))
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Dialect {
    fn from(tag: String) -> Self {
        Dialect::from_tag(&tag)
    }
}

impl From<Dialect> for String {
    fn from(dialect: Dialect) -> Self {
        dialect.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_round_trip() {
        for tag in ["mysql", "postgres", "sqlite", "sqlserver", "clickhouse"] {
            let dialect = Dialect::from_tag(tag);
            assert!(dialect.is_known());
            assert_eq!(dialect.as_str(), tag);
        }
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        assert_eq!(Dialect::from_tag("MySQL"), Dialect::Other("MySQL".into()));
        assert_eq!(Dialect::from_tag("oracle").to_string(), "oracle");
    }

    #[test]
    fn test_default_is_mysql() {
        assert_eq!(Dialect::default(), Dialect::MySql);
        assert_eq!(Dialect::Postgres.scheme_prefix(), "postgres://");
    }
}
