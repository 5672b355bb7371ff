use std::fmt::Display;

use thiserror::Error;

use crate::value::SqlValue;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("query returned zero columns")]
    ZeroColumns,
    #[error("cannot map {got} columns into {type_name}: scalar destinations take exactly 1 column")]
    ColumnCountMismatch { type_name: &'static str, got: usize },
    #[error("conversion failed: {0}")]
    ConversionFailure(String),
    #[error("record {type_name} nests itself through inline fields")]
    RecursiveType { type_name: &'static str },
    #[error("cursor: {0}")]
    Cursor(String),
    #[error("no rows in result set")]
    NoRows,
}

impl MapError {
    pub fn conversion(message: impl Into<String>) -> Self {
        MapError::ConversionFailure(message.into())
    }

    pub fn unsupported(value: &SqlValue, target: &str) -> Self {
        MapError::ConversionFailure(format!("cannot convert {} value into {target}", value.type_name()))
    }

    pub fn mismatch(source: &str, target: &str) -> Self {
        MapError::ConversionFailure(format!("cannot assign {source} into {target}"))
    }

    pub fn overflow(value: impl Display, target: &str) -> Self {
        MapError::ConversionFailure(format!("value {value} overflows {target}"))
    }

    pub fn null_into(target: &str) -> Self {
        MapError::ConversionFailure(format!("cannot store NULL into {target}"))
    }

    /// Prefixes a conversion failure with the column it happened in.
    pub fn at_column(self, column: usize, name: &str) -> Self {
        match self {
            MapError::ConversionFailure(message) => {
                MapError::ConversionFailure(format!("column {column} ({name}): {message}"))
            }
            other => other,
        }
    }
}
