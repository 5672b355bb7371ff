use serde::{Deserialize, Serialize};

use crate::sql::{SqlError, SqlScanner};

/// Positional placeholder convention of a target database.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `?` (MySQL, SQLite, DuckDB, ClickHouse)
    #[default]
    Question,
    /// `$1, $2, ...` (PostgreSQL)
    Dollar,
    /// `@p1, @p2, ...` (SQL Server)
    AtP,
    /// `:1, :2, ...` (Oracle)
    Colon,
}

impl Dialect {
    /// Picks the dialect from a driver name, case-insensitively. Unknown
    /// drivers get `Question`.
    pub fn for_driver(driver: &str) -> Self {
        match driver.to_ascii_lowercase().as_str() {
            "pgx" | "postgres" | "postgresql" | "lib/pq" | "pg" => Dialect::Dollar,
            "sqlserver" | "mssql" => Dialect::AtP,
            "godror" | "oracle" | "goracle" => Dialect::Colon,
            _ => Dialect::Question,
        }
    }

    /// The marker for the `n`-th argument, counting from 1.
    pub fn marker(&self, n: usize) -> String {
        match self {
            Dialect::Question => "?".to_string(),
            Dialect::Dollar => format!("${n}"),
            Dialect::AtP => format!("@p{n}"),
            Dialect::Colon => format!(":{n}"),
        }
    }
}

/// Replaces every bare `?` outside skip regions with the dialect's numbered
/// marker, left to right. Skip regions are copied verbatim.
pub fn rewrite_placeholders(query: &str, dialect: Dialect) -> Result<String, SqlError> {
    let mut scanner = SqlScanner::new(query);
    let mut out = String::with_capacity(query.len() + 16);
    let mut counter = 1;

    while !scanner.eof() {
        if let Some(region) = scanner.skip_region()? {
            out.push_str(&query[region]);
            continue;
        }
        match scanner.current() {
            '?' => {
                out.push_str(&dialect.marker(counter));
                counter += 1;
            }
            c => out.push(c),
        }
        scanner.advance();
    }
    Ok(out)
}
