//! Error types for sqlforge

use thiserror::Error;

/// Result type alias for sqlforge operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while building or rendering a statement.
///
/// All of these are programmer errors: they surface synchronously at
/// construction or render time and are meant to be caught by tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    /// Malformed expression (e.g. a logical operator without operands)
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// Statement missing a mandatory structural piece
    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    /// Explicit alias already taken by another table in the same query
    #[error("Duplicate alias: {0}")]
    DuplicateAlias(String),

    /// Two fields of one table share a logical or physical name
    #[error("Duplicate field '{field}' in table '{table}'")]
    DuplicateField { table: String, field: String },

    /// Field lookup miss against a table descriptor
    #[error("Unknown field '{field}' in table '{table}'")]
    UnknownField { table: String, field: String },

    /// Table lookup miss against a registry
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Join kind outside the supported set
    #[error("Unexpected join type: {0}")]
    UnexpectedJoinType(String),

    /// Physical name that is not a plain SQL identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Configuration could not be parsed or applied
    #[error("Config error: {0}")]
    Config(String),
}

impl SqlError {
    /// Create an invalid expression error
    pub fn invalid_expression(message: impl Into<String>) -> Self {
        Self::InvalidExpression(message.into())
    }

    /// Create an invalid statement error
    pub fn invalid_statement(message: impl Into<String>) -> Self {
        Self::InvalidStatement(message.into())
    }

    /// Create an unknown field error for a specific table
    pub fn unknown_field(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            table: table.into(),
            field: field.into(),
        }
    }

    /// Create an unknown table error
    pub fn unknown_table(name: impl Into<String>) -> Self {
        Self::UnknownTable(name.into())
    }

    /// Check if this is a duplicate alias error
    pub fn is_duplicate_alias(&self) -> bool {
        matches!(self, Self::DuplicateAlias(_))
    }

    /// Check if this is an unknown field or unknown table error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownField { .. } | Self::UnknownTable(_))
    }
}

impl From<toml::de::Error> for SqlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
